//! Configuration of each batch operation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::*;
use crate::domain::model::{CutRequest, DitherMethod, Resolution, SplitMethod};
use crate::error::{ReelcutError, ReelcutResult};
use crate::planner::{ClipSettings, LoopSettings};

fn default_split_value() -> f64 {
    60.0
}

fn default_fps() -> f64 {
    30.0
}

fn default_sample_rate() -> u32 {
    48_000
}

fn default_loop_fps() -> f64 {
    15.0
}

fn default_speed() -> f64 {
    1.0
}

fn default_color_count() -> u32 {
    256
}

fn settings(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Fixed-duration splitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitConfig {
    #[serde(default = "default_split_method")]
    pub split_method: SplitMethod,
    #[serde(default = "default_split_value")]
    pub split_value: f64,
    #[serde(default)]
    pub fps_mode: ValueMode,
    #[serde(default = "default_fps")]
    pub fps_value: f64,
    #[serde(default)]
    pub fps_values: HashMap<String, f64>,
    #[serde(default)]
    pub parallel_jobs: Option<usize>,
}

fn default_split_method() -> SplitMethod {
    SplitMethod::Duration
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            split_method: default_split_method(),
            split_value: default_split_value(),
            fps_mode: ValueMode::Single,
            fps_value: default_fps(),
            fps_values: HashMap::new(),
            parallel_jobs: None,
        }
    }
}

impl SplitConfig {
    pub fn frame_rate_for(&self, file: &str) -> f64 {
        resolve_override(self.fps_mode, &self.fps_values, self.fps_value, file)
    }
}

impl OperationConfig for SplitConfig {
    fn validate(&self) -> ReelcutResult<()> {
        require_positive("split_value", self.split_value)?;
        if self.split_method == SplitMethod::Segments && self.split_value < 1.0 {
            return Err(ReelcutError::config("split_value must be at least 1 segment"));
        }
        require_positive("fps_value", self.fps_value)?;
        validate_overrides("fps_values", &self.fps_values)?;
        require_workers(self.parallel_jobs)
    }

    fn parallel_jobs(&self) -> Option<usize> {
        self.parallel_jobs
    }

    fn start_settings(&self) -> Map<String, Value> {
        settings(json!({
            "split_method": self.split_method,
            "split_value": self.split_value,
            "fps_mode": self.fps_mode,
        }))
    }
}

/// Stream separation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeparateConfig {
    #[serde(default)]
    pub sample_rate_mode: ValueMode,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default)]
    pub sample_rates: HashMap<String, u32>,
    #[serde(default)]
    pub parallel_jobs: Option<usize>,
}

impl Default for SeparateConfig {
    fn default() -> Self {
        Self {
            sample_rate_mode: ValueMode::Single,
            sample_rate: default_sample_rate(),
            sample_rates: HashMap::new(),
            parallel_jobs: None,
        }
    }
}

impl SeparateConfig {
    pub fn sample_rate_for(&self, file: &str) -> u32 {
        resolve_override(self.sample_rate_mode, &self.sample_rates, self.sample_rate, file)
    }
}

impl OperationConfig for SeparateConfig {
    fn validate(&self) -> ReelcutResult<()> {
        require_positive("sample_rate", self.sample_rate as f64)?;
        validate_overrides("sample_rates", &self.sample_rates)?;
        require_workers(self.parallel_jobs)
    }

    fn parallel_jobs(&self) -> Option<usize> {
        self.parallel_jobs
    }

    fn start_settings(&self) -> Map<String, Value> {
        settings(json!({
            "sample_rate_mode": self.sample_rate_mode,
            "default_sample_rate": self.sample_rate,
        }))
    }
}

/// Animated loop generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GifConfig {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default = "default_loop_fps")]
    pub frame_rate: f64,
    #[serde(default = "default_speed")]
    pub speed_multiplier: f64,
    #[serde(default)]
    pub loop_count: u32,
    #[serde(default)]
    pub dither_method: DitherMethod,
    #[serde(default = "default_color_count")]
    pub color_count: u32,
    #[serde(default)]
    pub trim_start: f64,
    #[serde(default)]
    pub trim_end: Option<f64>,
    #[serde(default)]
    pub cut_segments: Vec<CutRequest>,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::Original,
            frame_rate: default_loop_fps(),
            speed_multiplier: default_speed(),
            loop_count: 0,
            dither_method: DitherMethod::FloydSteinberg,
            color_count: default_color_count(),
            trim_start: 0.0,
            trim_end: None,
            cut_segments: Vec::new(),
        }
    }
}

impl GifConfig {
    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            resolution: self.resolution.clone(),
            frame_rate: self.frame_rate,
            speed_multiplier: self.speed_multiplier,
            loop_count: self.loop_count,
            dither: self.dither_method,
            color_count: self.color_count,
        }
    }
}

impl OperationConfig for GifConfig {
    fn validate(&self) -> ReelcutResult<()> {
        validate_resolution(&self.resolution)?;
        require_positive("frame_rate", self.frame_rate)?;
        require_positive("speed_multiplier", self.speed_multiplier)?;
        if !(2..=256).contains(&self.color_count) {
            return Err(ReelcutError::config(format!(
                "color_count must be between 2 and 256, got {}",
                self.color_count
            )));
        }
        validate_timeline(self.trim_start, self.trim_end, &self.cut_segments)
    }

    /// Files and their stages run one at a time
    fn parallel_jobs(&self) -> Option<usize> {
        Some(1)
    }

    fn start_settings(&self) -> Map<String, Value> {
        settings(json!({
            "frame_rate": self.frame_rate,
            "speed_multiplier": self.speed_multiplier,
            "cut_count": self.cut_segments.len(),
        }))
    }
}

/// Derived clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipConfig {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub frame_rate: Option<f64>,
    #[serde(default = "default_speed")]
    pub speed_multiplier: f64,
    #[serde(default)]
    pub trim_start: f64,
    #[serde(default)]
    pub trim_end: Option<f64>,
    #[serde(default)]
    pub cut_segments: Vec<CutRequest>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::Original,
            frame_rate: None,
            speed_multiplier: default_speed(),
            trim_start: 0.0,
            trim_end: None,
            cut_segments: Vec::new(),
        }
    }
}

impl ClipConfig {
    pub fn clip_settings(&self) -> ClipSettings {
        ClipSettings {
            resolution: self.resolution.clone(),
            frame_rate: self.frame_rate,
            speed_multiplier: self.speed_multiplier,
        }
    }
}

impl OperationConfig for ClipConfig {
    fn validate(&self) -> ReelcutResult<()> {
        validate_resolution(&self.resolution)?;
        if let Some(fps) = self.frame_rate {
            require_positive("frame_rate", fps)?;
        }
        require_positive("speed_multiplier", self.speed_multiplier)?;
        validate_timeline(self.trim_start, self.trim_end, &self.cut_segments)
    }

    /// Files and their stages run one at a time
    fn parallel_jobs(&self) -> Option<usize> {
        Some(1)
    }

    fn start_settings(&self) -> Map<String, Value> {
        settings(json!({
            "frame_rate": self.frame_rate,
            "speed_multiplier": self.speed_multiplier,
            "cut_count": self.cut_segments.len(),
        }))
    }
}

/// Largest accepted `scalePercent`
pub const MAX_SCALE_PERCENT: f64 = 1000.0;

fn validate_resolution(resolution: &Resolution) -> ReelcutResult<()> {
    match resolution {
        Resolution::Original => Ok(()),
        Resolution::Scale { scale_percent } => {
            require_positive("resolution.scalePercent", *scale_percent)?;
            if *scale_percent > MAX_SCALE_PERCENT {
                return Err(ReelcutError::config(format!(
                    "resolution.scalePercent must be at most {}, got {}",
                    MAX_SCALE_PERCENT, scale_percent
                )));
            }
            Ok(())
        }
        Resolution::Width { width } => require_positive("resolution.width", *width as f64),
        Resolution::Custom { width, height } => {
            require_positive("resolution.width", *width as f64)?;
            require_positive("resolution.height", *height as f64)
        }
    }
}
