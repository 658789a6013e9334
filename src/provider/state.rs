//! Provider lifecycle state.
//!
//! # States
//! ```text
//! Created → Initialized → Running → Stopped
//!                            ↓
//!                          Failed(reason)
//! ```
//!
//! The current state is published on a watch channel so hosts can poll it
//! or await transitions. A driver that panics lands in `Failed` instead of
//! disappearing silently.

use std::fmt;

use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Created,
    Initialized,
    Running,
    Stopped,
    Failed(String),
}

impl ProviderStatus {
    /// True once no further cycles will run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProviderStatus::Stopped | ProviderStatus::Failed(_))
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderStatus::Created => write!(f, "created"),
            ProviderStatus::Initialized => write!(f, "initialized"),
            ProviderStatus::Running => write!(f, "running"),
            ProviderStatus::Stopped => write!(f, "stopped"),
            ProviderStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Shared handle publishing the provider's status.
#[derive(Debug, Clone)]
pub(crate) struct StatusCell {
    tx: std::sync::Arc<watch::Sender<ProviderStatus>>,
}

impl StatusCell {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(ProviderStatus::Created);
        Self { tx: std::sync::Arc::new(tx) }
    }

    pub(crate) fn get(&self) -> ProviderStatus {
        self.tx.borrow().clone()
    }

    pub(crate) fn set(&self, status: ProviderStatus) {
        let previous = self.tx.send_replace(status.clone());
        if previous != status {
            tracing::debug!(from = %previous, to = %status, "Provider status changed");
        }
    }

    /// Move to `Stopped` unless the driver already failed.
    pub(crate) fn mark_stopped(&self) {
        if !matches!(self.get(), ProviderStatus::Failed(_)) {
            self.set(ProviderStatus::Stopped);
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ProviderStatus> {
        self.tx.subscribe()
    }
}
