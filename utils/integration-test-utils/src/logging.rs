use tracing_subscriber::EnvFilter;

/// Installs a `RUST_LOG`-driven fmt subscriber once per test binary.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
