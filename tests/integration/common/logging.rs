//! Test logging initialization
//!
//! Uses `std::sync::Once` so that initialization only happens once, even if
//! called from multiple tests.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing subscriber for integration tests.
///
/// Configuration is controlled by the `RUST_LOG` environment variable.
/// Default: warnings and errors only
pub fn init_test_logging() {
    INIT.call_once(|| {
        let default_filter = "warn";

        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
            )
            .with_target(false)
            .with_ansi(false)
            .with_test_writer()
            .try_init();
    });
}
