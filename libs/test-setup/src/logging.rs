use once_cell::sync::Lazy;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static LOGGER: Lazy<()> = Lazy::new(|| {
    // Another test harness may have installed a global subscriber already.
    let _ = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_test_writer()
        .try_init();
});

/// Logs to the test output, filtered by `RUST_LOG`. Safe to call from every test.
pub fn init_logger() {
    Lazy::force(&LOGGER);
}
