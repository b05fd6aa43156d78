use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g.
/// "drift_engine=debug,wgpu=warn"). When unset, `RUST_LOG` is used, then
/// `info` with wgpu's chatty internals capped at `warn`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// `-v` count → filter: 0 keeps the default, 1 debug, 2+ trace.
    pub fn verbosity(self, level: u8) -> Self {
        match level {
            0 => self,
            1 => self.filter("drift_engine=debug,drift_studio=debug,wgpu=warn"),
            _ => self.filter("drift_engine=trace,drift_studio=trace,wgpu=warn"),
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger. Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
            builder.filter_module("wgpu_core", log::LevelFilter::Warn);
            builder.filter_module("wgpu_hal", log::LevelFilter::Warn);
            builder.filter_module("naga", log::LevelFilter::Warn);
        }

        builder.write_style(config.write_style);
        // Tests may have installed a logger already.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_filters() {
        assert_eq!(LoggingConfig::default().verbosity(0).env_filter, None);
        let debug = LoggingConfig::default().verbosity(1).env_filter.unwrap_or_default();
        assert!(debug.contains("drift_engine=debug"));
        let trace = LoggingConfig::default().verbosity(5).env_filter.unwrap_or_default();
        assert!(trace.contains("drift_engine=trace"));
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default().filter("warn"));
    }
}
