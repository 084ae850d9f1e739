//! Configuration presets for common scenarios

use super::{Config, DisplayConfig, Format};

impl Config {
    /// Create configuration from environment variables
    ///
    /// `CREDBRIDGE_LOG` takes precedence over `RUST_LOG` for the filter;
    /// `CREDBRIDGE_LOG_FORMAT` selects the format.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup("CREDBRIDGE_LOG").or_else(|| lookup("RUST_LOG")) {
            config.level = level;
        }

        // Unknown formats keep the default rather than failing startup
        if let Some(format) = lookup("CREDBRIDGE_LOG_FORMAT") {
            if let Ok(format) = format.parse::<Format>() {
                config.format = format;
            }
        }

        config
    }

    /// Test configuration
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            level: "trace".to_string(),
            format: Format::Compact,
            display: DisplayConfig {
                colors: false,
                ..DisplayConfig::default()
            },
        }
    }
}
