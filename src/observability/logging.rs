//! Structured logging.
//!
//! Uses the tracing crate with an `EnvFilter`: `RUST_LOG` wins, otherwise
//! the configured level applies to this crate only.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directive for a configured level.
pub fn default_directive(log_level: &str) -> String {
    format!("multi_http_provider={}", log_level.trim().to_lowercase())
}

/// Initialize the global subscriber. Safe to call more than once.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(" DEBUG "), "multi_http_provider=debug");
    }
}
