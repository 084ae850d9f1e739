//! Credbridge Log - tracing setup for credbridge processes
//!
//! All output goes to stderr: stdout belongs to the host protocol.
//!
//! ```rust,no_run
//! use credbridge_log::{Config, Format};
//!
//! # fn main() -> credbridge_log::LogResult<()> {
//! let config = Config {
//!     level: "info,credbridge_credential=debug".into(),
//!     format: Format::Json,
//!     ..Config::default()
//! };
//! credbridge_log::init(config)?;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod builder;
mod config;
mod error;

pub use builder::LoggerBuilder;
pub use config::{Config, DisplayConfig, Format};
pub use error::{LogError, LogResult};

/// Install the global subscriber described by `config`.
pub fn init(config: Config) -> LogResult<()> {
    LoggerBuilder::from_config(config).build()
}
