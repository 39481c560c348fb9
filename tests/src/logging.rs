//! Test-time tracing.
//!
//! Reads `RUST_LOG`, defaulting to `warn`. Output goes through the test
//! writer so it is captured per test.
//!
//! ```bash
//! RUST_LOG=keel_controller=debug cargo test -p keel-tests
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the subscriber. Later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().compact())
        .try_init();
}
