//! Validated per-run configuration
//!
//! The input object `{ "files": [...], "config": {...} }` is deserialized
//! into one typed struct per operation. Unknown keys are rejected up front.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::model::CutRequest;
use crate::error::{ReelcutError, ReelcutResult};

pub mod operations;

pub use operations::{ClipConfig, GifConfig, SeparateConfig, SplitConfig};

/// Batch input as read from the config file or standard input
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchInput<C> {
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub config: C,
}

impl<C: OperationConfig> BatchInput<C> {
    /// Parse and validate an input document
    pub fn from_json(text: &str) -> ReelcutResult<Self> {
        let input: Self = serde_json::from_str(text)?;
        input.config.validate()?;
        Ok(input)
    }
}

/// Whether a setting comes from one run-wide value or a per-file map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    #[default]
    Single,
    PerFile,
}

/// Per-file value when the mode asks for it and the map has the file,
/// otherwise the run default
pub fn resolve_override<T: Copy>(
    mode: ValueMode,
    overrides: &HashMap<String, T>,
    default: T,
    file: &str,
) -> T {
    match mode {
        ValueMode::PerFile => overrides.get(file).copied().unwrap_or(default),
        ValueMode::Single => default,
    }
}

/// Behavior shared by every operation's configuration
pub trait OperationConfig: DeserializeOwned + Default + Send + Sync + 'static {
    fn validate(&self) -> ReelcutResult<()>;

    /// Worker count requested by the input, if any
    fn parallel_jobs(&self) -> Option<usize>;

    /// Run-wide settings echoed in the `start` record
    fn start_settings(&self) -> Map<String, Value>;
}

pub(crate) fn require_positive(name: &str, value: f64) -> ReelcutResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ReelcutError::config(format!("{} must be positive, got {}", name, value)))
    }
}

pub(crate) fn require_workers(parallel_jobs: Option<usize>) -> ReelcutResult<()> {
    match parallel_jobs {
        Some(0) => Err(ReelcutError::config("parallel_jobs must be at least 1")),
        _ => Ok(()),
    }
}

pub(crate) fn validate_overrides<T: Copy + Into<f64>>(
    name: &str,
    overrides: &HashMap<String, T>,
) -> ReelcutResult<()> {
    for (file, value) in overrides {
        require_positive(&format!("{}[{}]", name, file), (*value).into())?;
    }
    Ok(())
}

/// Trim and cut ranges shared by the gif and clip operations
pub(crate) fn validate_timeline(
    trim_start: f64,
    trim_end: Option<f64>,
    cuts: &[CutRequest],
) -> ReelcutResult<()> {
    if !(trim_start.is_finite() && trim_start >= 0.0) {
        return Err(ReelcutError::config(format!(
            "trim_start must be non-negative, got {}",
            trim_start
        )));
    }
    if let Some(end) = trim_end {
        if !(end.is_finite() && end > trim_start) {
            return Err(ReelcutError::config(format!(
                "trim_end ({}) must be greater than trim_start ({})",
                end, trim_start
            )));
        }
    }
    for (index, cut) in cuts.iter().enumerate() {
        if !(cut.start.is_finite() && cut.end.is_finite() && cut.start < cut.end) {
            return Err(ReelcutError::config(format!(
                "cut_segments[{}] must have start < end, got {}..{}",
                index, cut.start, cut.end
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_override() {
        let mut map = HashMap::new();
        map.insert("a.mp4".to_string(), 24.0);

        assert_eq!(resolve_override(ValueMode::PerFile, &map, 30.0, "a.mp4"), 24.0);
        assert_eq!(resolve_override(ValueMode::PerFile, &map, 30.0, "b.mp4"), 30.0);
        assert_eq!(resolve_override(ValueMode::Single, &map, 30.0, "a.mp4"), 30.0);
    }

    #[test]
    fn test_timeline_validation() {
        assert!(validate_timeline(0.0, None, &[]).is_ok());
        assert!(validate_timeline(-1.0, None, &[]).is_err());
        assert!(validate_timeline(5.0, Some(5.0), &[]).is_err());
        assert!(validate_timeline(0.0, Some(10.0), &[CutRequest::new(4.0, 2.0)]).is_err());
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let result = BatchInput::<SplitConfig>::from_json(r#"{"files": [], "options": {}}"#);
        assert!(matches!(result, Err(ReelcutError::Json(_))));
    }
}
