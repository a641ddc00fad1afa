use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` controls the
/// filter, defaulting to `info`. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
