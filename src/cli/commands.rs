//! Command implementations

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::FileOperation;
use crate::cli::{Cli, Commands, InputArgs};
use crate::config::BatchInput;
use crate::config_initialization::initialize_tool_settings;
use crate::error::{ReelcutError, ReelcutResult};
use crate::output::events::FileReport;

/// Execute the selected subcommand end to end.
///
/// An `Err` is a fatal setup failure; the caller reports it and exits
/// non-zero. Per-file failures are inside the returned reports.
pub async fn run(cli: &Cli) -> ReelcutResult<Vec<FileReport>> {
    info!(command = cli.command.name(), "Executing command");
    let text = read_input(cli.command.input())?;

    match &cli.command {
        Commands::Split(_) => execute(cli, &text, |c| c.split_interactor()).await,
        Commands::Separate(_) => execute(cli, &text, |c| c.separate_interactor()).await,
        Commands::Gif(_) => execute(cli, &text, |c| c.gif_interactor()).await,
        Commands::Clip(_) => execute(cli, &text, |c| c.clip_interactor()).await,
    }
}

/// Parse the input for `O`, resolve tool settings and run the batch
async fn execute<O, F>(cli: &Cli, text: &str, interactor: F) -> ReelcutResult<Vec<FileReport>>
where
    O: FileOperation,
    F: FnOnce(&DefaultAppContainer) -> Arc<O>,
{
    let input = BatchInput::<O::Config>::from_json(text)?;
    debug!(files = input.files.len(), "Input parsed");

    let settings = initialize_tool_settings(cli.settings_layer(), cli.settings.as_deref())?;
    settings.verify()?;

    let container = DefaultAppContainer::new(&settings);
    let operation = interactor(&container);
    container.orchestrator().run(operation, input).await
}

/// Input text from the named file, else from standard input when piped
pub fn read_input(args: &InputArgs) -> ReelcutResult<String> {
    match args.path() {
        Some(path) => read_config_file(path),
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Err(ReelcutError::MissingInput);
            }
            let mut text = String::new();
            stdin.lock().read_to_string(&mut text)?;
            if text.trim().is_empty() {
                return Err(ReelcutError::MissingInput);
            }
            Ok(text)
        }
    }
}

fn read_config_file(path: &Path) -> ReelcutResult<String> {
    std::fs::read_to_string(path).map_err(|e| ReelcutError::ConfigFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
