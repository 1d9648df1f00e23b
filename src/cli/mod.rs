//! CLI module for reelcut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::SettingsLayer;
use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

pub use args::InputArgs;

/// Batch video tools driven by a JSON input object
///
/// Each subcommand reads `{ "files": [...], "config": {...} }` from
/// `--config <file>` or standard input and writes one JSON event record per
/// line to standard output. Logs go to standard error.
#[derive(Parser, Debug)]
#[command(name = "reelcut")]
#[command(about = "Batch splitting, stream separation, animated loops and clips")]
#[command(version)]
pub struct Cli {
    /// Logging level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log line format on standard error
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// TOML settings file with a [tools] table
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// Seconds allowed per tool invocation (0 disables the limit)
    #[arg(long, global = true)]
    pub tool_timeout: Option<u64>,

    /// Worker count used when the input omits parallel_jobs
    #[arg(long, global = true)]
    pub parallel_jobs: Option<usize>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Tool settings given on the command line
    pub fn settings_layer(&self) -> SettingsLayer {
        SettingsLayer {
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
            timeout_secs: self.tool_timeout,
            parallel_jobs: self.parallel_jobs,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split each file into fixed-length or equal-count segments
    Split(InputArgs),
    /// Separate each file into a video-only file and a WAV audio file
    Separate(InputArgs),
    /// Convert each file into an animated GIF
    Gif(InputArgs),
    /// Produce a trimmed, cut and rescaled H.264 clip of each file
    Clip(InputArgs),
}

impl Commands {
    pub fn input(&self) -> &InputArgs {
        match self {
            Commands::Split(args)
            | Commands::Separate(args)
            | Commands::Gif(args)
            | Commands::Clip(args) => args,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Commands::Split(_) => "split",
            Commands::Separate(_) => "separate",
            Commands::Gif(_) => "gif",
            Commands::Clip(_) => "clip",
        }
    }
}
