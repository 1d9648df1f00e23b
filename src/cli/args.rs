//! Command-line argument definitions

use std::path::{Path, PathBuf};

use clap::Args;

/// Where a subcommand reads its input object from
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// JSON input file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON input file (same as --config)
    #[arg(value_name = "INPUT", conflicts_with = "config")]
    pub input: Option<PathBuf>,
}

impl InputArgs {
    /// Input file, if one was named; standard input otherwise
    pub fn path(&self) -> Option<&Path> {
        self.config.as_deref().or(self.input.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_config_flag_and_positional() {
        let cli = Cli::parse_from(["reelcut", "split", "--config", "batch.json"]);
        assert_eq!(cli.command.input().path(), Some(Path::new("batch.json")));

        let cli = Cli::parse_from(["reelcut", "gif", "batch.json"]);
        assert!(matches!(cli.command, Commands::Gif(_)));
        assert_eq!(cli.command.input().path(), Some(Path::new("batch.json")));

        let cli = Cli::parse_from(["reelcut", "separate"]);
        assert_eq!(cli.command.input().path(), None);
    }

    #[test]
    fn test_config_and_positional_conflict() {
        assert!(Cli::try_parse_from(["reelcut", "clip", "-c", "a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_global_settings_after_subcommand() {
        let cli = Cli::parse_from([
            "reelcut",
            "split",
            "--ffmpeg",
            "/opt/ffmpeg/bin/ffmpeg",
            "--tool-timeout",
            "0",
            "--parallel-jobs",
            "2",
            "--log-format",
            "json",
        ]);
        let layer = cli.settings_layer();
        assert_eq!(layer.ffmpeg, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(layer.timeout_secs, Some(0));
        assert_eq!(layer.parallel_jobs, Some(2));
        assert_eq!(cli.command.name(), "split");
    }
}
