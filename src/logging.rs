//! Logger initialization.
//!
//! Everything goes through the `log` facade; `env_logger` is the only backend.

use std::sync::Once;

/// `filter` follows the `env_logger` filter syntax (e.g. "info",
/// "flashbench=debug").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger. Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);
        builder.format_timestamp_millis();
        builder.init();

        log::debug!("logging initialized");
    });
}
