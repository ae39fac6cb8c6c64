use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "tilescope_engine=debug,wgpu=warn"). When unset, `RUST_LOG` is consulted
/// and then `default_filter`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_filter: String,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            // wgpu is chatty at info.
            default_filter: "info,wgpu_core=warn,wgpu_hal=warn,naga=warn".to_string(),
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// The filter string that will actually be installed.
    pub fn resolve_filter(&self) -> String {
        self.env_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.default_filter.clone())
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter();

        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .format_timestamp_millis()
            .init();

        log::debug!("logging initialized ({filter})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig {
            env_filter: Some("debug".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_filter(), "debug");
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
        log::info!("still alive");
    }
}
