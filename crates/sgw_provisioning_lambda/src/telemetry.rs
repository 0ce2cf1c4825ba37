use tracing_subscriber::EnvFilter;

/// Installs a JSON log formatter on stderr, filtered by `RUST_LOG`
/// (default `info`). Calling it again is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_current_span(false)
        .try_init();
}
