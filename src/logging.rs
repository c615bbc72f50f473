use tracing_subscriber::EnvFilter;

/// Installs a console subscriber filtered by `RUST_LOG`, falling back to
/// `base_level`. Later calls are no-ops.
pub fn init(base_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
}
