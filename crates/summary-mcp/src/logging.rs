use tracing_subscriber::EnvFilter;

/// Installs a compact stderr subscriber. Stdout stays reserved for protocol frames.
///
/// `RUST_LOG` wins over `level` when set. Later calls are no-ops.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}
