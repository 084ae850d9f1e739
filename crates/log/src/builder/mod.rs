//! Logger builder implementation

#[macro_use]
mod format;

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format};
use crate::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Build the registry for a given format layer and install it globally.
macro_rules! init_subscriber {
    ($filter_layer:expr, $fmt_layer:expr) => {
        Registry::default()
            .with($filter_layer)
            .with($fmt_layer)
            .try_init()
            .map_err(|e| LogError::Init(e.to_string()))
    };
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parse the filter directive without installing anything
    pub fn filter(&self) -> LogResult<EnvFilter> {
        EnvFilter::try_new(&self.config.level).map_err(|e| LogError::Filter {
            filter: self.config.level.clone(),
            reason: e.to_string(),
        })
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<()> {
        let filter = self.filter()?;
        let display = &self.config.display;

        match self.config.format {
            Format::Pretty => init_subscriber!(filter, create_fmt_layer!(pretty, display))?,
            Format::Compact => init_subscriber!(filter, create_fmt_layer!(compact, display))?,
            Format::Json => init_subscriber!(filter, create_json_layer!(display))?,
        }

        tracing::debug!(
            level = %self.config.level,
            format = %self.config.format,
            "Logger initialized"
        );
        Ok(())
    }
}
