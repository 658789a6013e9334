//! Background cycle driver.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::emit::Emitter;
use crate::provider::cycle::Pipeline;
use crate::provider::state::{ProviderStatus, StatusCell};

/// A running driver: the task plus the token that stops it.
///
/// Dropping a driver cancels it; the task winds down on its own.
pub(crate) struct Driver {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl Driver {
    pub(crate) fn spawn(pipeline: Arc<Pipeline>, emitter: Emitter, status: StatusCell) -> Self {
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        let handle = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(run(pipeline, emitter, token))
                .catch_unwind()
                .await;

            if let Err(panic) = outcome {
                let reason = panic_message(panic.as_ref());
                tracing::error!(reason = %reason, "Cycle driver panicked");
                status.set(ProviderStatus::Failed(reason));
            }
        });

        Self { shutdown, handle }
    }

    /// Cancel the driver and wait for it to exit.
    pub(crate) async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Err(e) = (&mut self.handle).await {
            tracing::error!(error = %e, "Cycle driver did not exit cleanly");
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Tick at the poll interval until cancelled.
///
/// The first cycle runs one interval after start. A cycle runs inline, so
/// the next tick cannot begin until it returns; ticks missed meanwhile are
/// delayed rather than bunched up.
async fn run(pipeline: Arc<Pipeline>, emitter: Emitter, shutdown: CancellationToken) {
    let period = pipeline.settings.poll_interval;
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        provider = %pipeline.settings.provider_name,
        interval = ?period,
        endpoints = pipeline.settings.endpoints.len(),
        "Cycle driver starting"
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                tracing::info!("Abandoning in-flight cycle");
                break;
            }
            _ = pipeline.run(&emitter) => {}
        }
    }

    tracing::info!("Cycle driver stopped");
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(boxed.as_ref()), "kaboom");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
