//! Pipeline strategy planning
//!
//! Turns keep segments and a desired output into the ordered list of tool
//! invocations for one file. Nothing here touches the file system.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::model::{DitherMethod, Resolution, Stage};
use crate::ports::EncodeRequest;

pub mod filters;
pub mod jobs;
pub mod strategy;

pub use strategy::PipelineBuilder;

/// Pipeline strategy, chosen by the number of keep segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStrategy {
    /// One keep segment: trim inside the filter graph
    Direct,
    /// Several keep segments: encode each, join, then filter
    ExtractAndJoin,
}

/// Animated loop output parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSettings {
    pub resolution: Resolution,
    pub frame_rate: f64,
    pub speed_multiplier: f64,
    pub loop_count: u32,
    pub dither: DitherMethod,
    pub color_count: u32,
}

/// Derived clip output parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSettings {
    pub resolution: Resolution,
    /// `None` keeps the source frame rate
    pub frame_rate: Option<f64>,
    pub speed_multiplier: f64,
}

/// What the final stage produces
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSpec {
    AnimatedLoop(LoopSettings),
    Clip(ClipSettings),
}

impl OutputSpec {
    pub fn resolution(&self) -> &Resolution {
        match self {
            OutputSpec::AnimatedLoop(s) => &s.resolution,
            OutputSpec::Clip(s) => &s.resolution,
        }
    }

    pub fn frame_rate(&self) -> Option<f64> {
        match self {
            OutputSpec::AnimatedLoop(s) => Some(s.frame_rate),
            OutputSpec::Clip(s) => s.frame_rate,
        }
    }

    pub fn speed_multiplier(&self) -> f64 {
        match self {
            OutputSpec::AnimatedLoop(s) => s.speed_multiplier,
            OutputSpec::Clip(s) => s.speed_multiplier,
        }
    }
}

/// Concat demuxer manifest written before the join step
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatManifest {
    pub path: PathBuf,
    pub entries: Vec<PathBuf>,
}

impl ConcatManifest {
    /// Manifest text, one `file '<path>'` line per entry
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let escaped = entry.to_string_lossy().replace('\'', "'\\''");
                format!("file '{}'\n", escaped)
            })
            .collect()
    }
}

/// One tool invocation tagged with its stage
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    pub stage: Stage,
    pub request: EncodeRequest,
}

/// Ordered invocations for one file
#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePlan {
    pub strategy: PipelineStrategy,
    pub steps: Vec<PipelineStep>,
    pub manifest: Option<ConcatManifest>,
    pub output: PathBuf,
}

impl PipelinePlan {
    pub fn count(&self, stage: Stage) -> usize {
        self.steps.iter().filter(|step| step.stage == stage).count()
    }
}
