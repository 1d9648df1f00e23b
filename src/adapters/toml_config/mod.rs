// TOML settings adapter - Tool settings read from a `[tools]` table

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{ReelcutError, ReelcutResult};

/// File looked up in the working directory when no path is given
pub const DEFAULT_SETTINGS_FILE: &str = "reelcut.toml";

/// Environment variable naming a settings file
pub const SETTINGS_ENV: &str = "REELCUT_SETTINGS";

/// Settings file layout
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub tools: ToolsTable,
}

/// Values of the `[tools]` table; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsTable {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub parallel_jobs: Option<usize>,
}

/// Loads tool settings from TOML
pub struct TomlSettingsAdapter;

impl TomlSettingsAdapter {
    /// Parse settings text; `origin` names the source in errors
    pub fn parse(content: &str, origin: &Path) -> ReelcutResult<SettingsFile> {
        toml::from_str(content).map_err(|e| ReelcutError::Settings {
            path: origin.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Read the settings file at `path`
    pub fn load(path: &Path) -> ReelcutResult<SettingsFile> {
        let content = std::fs::read_to_string(path).map_err(|e| ReelcutError::Settings {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let settings = Self::parse(&content, path)?;
        info!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    /// Pick the settings file: explicit path, then `REELCUT_SETTINGS`, then
    /// `./reelcut.toml` when it exists. An explicit or environment path that
    /// cannot be read is an error; a missing default file is not.
    pub fn locate(explicit: Option<&Path>, env_value: Option<String>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
            return Some(PathBuf::from(value));
        }
        let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
        fallback.is_file().then_some(fallback)
    }

    /// Resolve and load the applicable settings file, if any
    pub fn discover(explicit: Option<&Path>) -> ReelcutResult<SettingsFile> {
        match Self::locate(explicit, std::env::var(SETTINGS_ENV).ok()) {
            Some(path) => Self::load(&path),
            None => Ok(SettingsFile::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_tools_table() {
        let settings = TomlSettingsAdapter::parse(
            "[tools]\nffmpeg = \"/opt/ff/ffmpeg\"\ntimeout_secs = 120\nparallel_jobs = 2\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(settings.tools.ffmpeg, Some(PathBuf::from("/opt/ff/ffmpeg")));
        assert_eq!(settings.tools.ffprobe, None);
        assert_eq!(settings.tools.timeout_secs, Some(120));
        assert_eq!(settings.tools.parallel_jobs, Some(2));
    }

    #[test]
    fn test_empty_file_is_default() {
        let settings = TomlSettingsAdapter::parse("", Path::new("empty.toml")).unwrap();
        assert_eq!(settings, SettingsFile::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = TomlSettingsAdapter::parse("[tools]\nffmpg = \"x\"\n", Path::new("typo.toml"));
        match result {
            Err(ReelcutError::Settings { path, .. }) => assert_eq!(path, "typo.toml"),
            other => panic!("expected settings error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tools]\nffprobe = \"/usr/bin/ffprobe\"").unwrap();
        let settings = TomlSettingsAdapter::load(file.path()).unwrap();
        assert_eq!(settings.tools.ffprobe, Some(PathBuf::from("/usr/bin/ffprobe")));

        assert!(TomlSettingsAdapter::load(Path::new("/nonexistent/reelcut.toml")).is_err());
    }

    #[test]
    fn test_locate_precedence() {
        let explicit = PathBuf::from("cli.toml");
        let path = TomlSettingsAdapter::locate(Some(&explicit), Some("env.toml".into()));
        assert_eq!(path, Some(explicit));

        let path = TomlSettingsAdapter::locate(None, Some("env.toml".into()));
        assert_eq!(path, Some(PathBuf::from("env.toml")));
    }
}
