use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize structured logging. Level defaults to INFO and can be
/// overridden with the standard `RUST_LOG` syntax.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
