//! reelcut command-line entry point
//!
//! ```bash
//! reelcut split --config batch.json
//! echo '{"files": ["a.mov"], "config": {"frame_rate": 12}}' | reelcut gif
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use reelcut::adapters::JsonLinesSink;
use reelcut::cli::{commands, Cli};
use reelcut::output::EventEmitter;
use reelcut::utils::logging::LoggingConfig;

/// Main entry point for the reelcut CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();
    LoggingConfig::new(cli.log_level.clone(), cli.log_format).init();

    info!("Starting reelcut");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    match runtime.block_on(commands::run(&cli)) {
        Ok(reports) => {
            let failed = reports.iter().filter(|r| !r.success).count();
            info!(files = reports.len(), failed, "reelcut finished");
            Ok(())
        }
        Err(e) => {
            // fatal setup failures still reach the consumer as one record
            error!("{}", e);
            EventEmitter::new(Arc::new(JsonLinesSink::stdout())).error(e.to_string());
            std::process::exit(1);
        }
    }
}
