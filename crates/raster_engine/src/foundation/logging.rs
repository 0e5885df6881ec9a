//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// `RUST_LOG` overrides the default `Info` filter.
pub fn init() {
    init_with_level(log::LevelFilter::Info);
}

/// Initialize logging with a specific default level
pub fn init_with_level(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // A second init (e.g. from tests) keeps the first logger.
    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}
