//! credbridge-plugin - stdio host shim for the credbridge database backend
//!
//! Speaks line-delimited JSON on stdin/stdout. Logs go to stderr.

mod protocol;
mod serve;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use credbridge_credential::Orchestrator;
use credbridge_log::{Config, Format};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "credbridge-plugin", version, about)]
struct Cli {
    /// Log filter, e.g. `info` or `debug,reqwest=warn`
    #[arg(long, env = "CREDBRIDGE_LOG")]
    log_level: Option<String>,

    /// Log output format: pretty, compact or json
    #[arg(long, env = "CREDBRIDGE_LOG_FORMAT")]
    log_format: Option<Format>,
}

impl Cli {
    fn log_config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(level) = &self.log_level {
            config.level.clone_from(level);
        }
        if let Some(format) = self.log_format {
            config.format = format;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    credbridge_log::init(cli.log_config()).context("failed to initialize logging")?;

    info!(version = env!("CARGO_PKG_VERSION"), "credbridge plugin starting");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received");
                signal.cancel();
            }
            Err(e) => warn!(error = %e, "Cannot listen for interrupt"),
        }
    });

    let db = Arc::new(Orchestrator::new());
    serve::serve(
        db,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown,
    )
    .await?;

    info!("credbridge plugin stopped");
    Ok(())
}
