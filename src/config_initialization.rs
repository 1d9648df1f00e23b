//! Tool settings initialization and hierarchy management

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::adapters::exec_ffmpeg::{discover_ffmpeg, ffprobe_beside};
use crate::adapters::toml_config::{ToolsTable, TomlSettingsAdapter};
use crate::error::{ReelcutError, ReelcutResult};

pub const ENV_FFMPEG: &str = "REELCUT_FFMPEG";
pub const ENV_FFPROBE: &str = "REELCUT_FFPROBE";
pub const ENV_TIMEOUT: &str = "REELCUT_TOOL_TIMEOUT_SECS";
pub const ENV_PARALLEL_JOBS: &str = "REELCUT_PARALLEL_JOBS";

/// Per-invocation limit when nothing else is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Upper bound of the CPU-derived default worker count
pub const MAX_DEFAULT_WORKERS: usize = 4;

/// Settings for the external tools, shared by every operation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Seconds per tool invocation; 0 means no limit
    pub timeout_secs: u64,
    /// Worker count used when the input omits `parallel_jobs`
    pub default_workers: usize,
}

impl ToolSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// A bare program name is left to `PATH` lookup at spawn time; a path
    /// with directories must point at an existing file.
    pub fn verify(&self) -> ReelcutResult<()> {
        let located = self.ffmpeg.components().count() > 1;
        if located && !self.ffmpeg.is_file() {
            return Err(ReelcutError::ToolNotFound {
                path: self.ffmpeg.display().to_string(),
            });
        }
        Ok(())
    }
}

/// One layer of the hierarchy; unset fields defer to the next layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsLayer {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub parallel_jobs: Option<usize>,
}

impl SettingsLayer {
    /// Read the `REELCUT_*` variables through `lookup`
    pub fn from_env<F>(lookup: F) -> ReelcutResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Ok(Self {
            ffmpeg: value(ENV_FFMPEG).map(PathBuf::from),
            ffprobe: value(ENV_FFPROBE).map(PathBuf::from),
            timeout_secs: value(ENV_TIMEOUT)
                .map(|v| parse_number(ENV_TIMEOUT, &v))
                .transpose()?,
            parallel_jobs: value(ENV_PARALLEL_JOBS)
                .map(|v| parse_number(ENV_PARALLEL_JOBS, &v))
                .transpose()?,
        })
    }

    /// Fill unset fields from a lower-priority layer
    pub fn or(self, lower: SettingsLayer) -> SettingsLayer {
        SettingsLayer {
            ffmpeg: self.ffmpeg.or(lower.ffmpeg),
            ffprobe: self.ffprobe.or(lower.ffprobe),
            timeout_secs: self.timeout_secs.or(lower.timeout_secs),
            parallel_jobs: self.parallel_jobs.or(lower.parallel_jobs),
        }
    }

    /// Apply defaults to whatever is still unset
    pub fn resolve(self) -> ReelcutResult<ToolSettings> {
        if self.parallel_jobs == Some(0) {
            return Err(ReelcutError::config("parallel_jobs must be at least 1"));
        }
        let ffmpeg = self.ffmpeg.unwrap_or_else(discover_ffmpeg);
        let ffprobe = self.ffprobe.unwrap_or_else(|| ffprobe_beside(&ffmpeg));
        Ok(ToolSettings {
            ffmpeg,
            ffprobe,
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            default_workers: self.parallel_jobs.unwrap_or_else(default_workers),
        })
    }
}

impl From<ToolsTable> for SettingsLayer {
    fn from(table: ToolsTable) -> Self {
        Self {
            ffmpeg: table.ffmpeg,
            ffprobe: table.ffprobe,
            timeout_secs: table.timeout_secs,
            parallel_jobs: table.parallel_jobs,
        }
    }
}

/// Logical CPUs clamped to `1..=MAX_DEFAULT_WORKERS`
pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS)
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> ReelcutResult<T> {
    value.trim().parse().map_err(|_| {
        ReelcutError::config(format!("{} must be a non-negative integer, got '{}'", name, value))
    })
}

/// Initialize tool settings following precedence: CLI > Env > File > Defaults
pub fn initialize_tool_settings(
    cli: SettingsLayer,
    settings_path: Option<&Path>,
) -> ReelcutResult<ToolSettings> {
    info!("Initializing tool settings");

    let env = SettingsLayer::from_env(|name| std::env::var(name).ok())?;
    if env != SettingsLayer::default() {
        debug!(?env, "Environment overrides");
    }
    let file = SettingsLayer::from(TomlSettingsAdapter::discover(settings_path)?.tools);

    let settings = cli.or(env).or(file).resolve()?;
    info!(
        ffmpeg = %settings.ffmpeg.display(),
        ffprobe = %settings.ffprobe.display(),
        timeout_secs = settings.timeout_secs,
        default_workers = settings.default_workers,
        "Tool settings resolved"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let cli = SettingsLayer {
            ffmpeg: Some("/cli/ffmpeg".into()),
            ..SettingsLayer::default()
        };
        let env = SettingsLayer::from_env(env(&[
            (ENV_FFMPEG, "/env/ffmpeg"),
            (ENV_TIMEOUT, "90"),
        ]))
        .unwrap();
        let file = SettingsLayer {
            ffmpeg: Some("/file/ffmpeg".into()),
            timeout_secs: Some(30),
            parallel_jobs: Some(3),
            ..SettingsLayer::default()
        };

        let settings = cli.or(env).or(file).resolve().unwrap();
        assert_eq!(settings.ffmpeg, PathBuf::from("/cli/ffmpeg"));
        assert_eq!(settings.ffprobe, PathBuf::from("/cli/ffprobe"));
        assert_eq!(settings.timeout_secs, 90);
        assert_eq!(settings.default_workers, 3);
    }

    #[test]
    fn test_defaults() {
        let settings = SettingsLayer {
            ffmpeg: Some("ffmpeg".into()),
            ..SettingsLayer::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(settings.ffprobe, PathBuf::from("ffprobe"));
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!((1..=MAX_DEFAULT_WORKERS).contains(&settings.default_workers));
        assert_eq!(settings.timeout(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let settings = SettingsLayer {
            ffmpeg: Some("ffmpeg".into()),
            timeout_secs: Some(0),
            ..SettingsLayer::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn test_verify_tool_location() {
        let mut settings = SettingsLayer {
            ffmpeg: Some("ffmpeg".into()),
            ..SettingsLayer::default()
        }
        .resolve()
        .unwrap();
        assert!(settings.verify().is_ok());

        settings.ffmpeg = PathBuf::from("/nonexistent/bin/ffmpeg");
        assert!(matches!(settings.verify(), Err(ReelcutError::ToolNotFound { .. })));
    }

    #[test]
    fn test_bad_env_values() {
        assert!(SettingsLayer::from_env(env(&[(ENV_TIMEOUT, "soon")])).is_err());
        assert!(SettingsLayer::from_env(env(&[(ENV_PARALLEL_JOBS, "-1")])).is_err());

        let zero = SettingsLayer::from_env(env(&[(ENV_PARALLEL_JOBS, "0")])).unwrap();
        assert!(zero.resolve().is_err());
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let layer = SettingsLayer::from_env(env(&[(ENV_FFMPEG, "  ")])).unwrap();
        assert_eq!(layer, SettingsLayer::default());
    }
}
