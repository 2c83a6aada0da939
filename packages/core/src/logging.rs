use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset: client logs at info, HTTP
/// internals at warn.
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
///
/// Call once at startup; later calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Logging initialized");
    }
}
