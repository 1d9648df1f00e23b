// Domain models - Core types and data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Half-open time interval `[start, end)` in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeInterval {
    start: f64,
    end: f64,
}

/// An interval of the source that survives trimming and cutting
pub type KeepSegment = TimeInterval;

impl TimeInterval {
    /// Create a new interval; `start` must be non-negative and before `end`
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::BadArgs("Interval bounds must be finite".to_string()));
        }
        if start < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Interval start cannot be negative: {}",
                start
            )));
        }
        if start >= end {
            return Err(DomainError::BadArgs(format!(
                "Interval start ({}) must be less than end ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when the two intervals share any instant
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s, {:.3}s)", self.start, self.end)
    }
}

/// An interior range the caller wants removed, as given in the input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CutRequest {
    pub start: f64,
    pub end: f64,
}

impl CutRequest {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Audio stream properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u32,
    pub codec: String,
}

/// Probed properties of a source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub frame_rate: f64,
    pub bit_rate: u64,
    pub codec: String,
    pub audio: Option<AudioInfo>,
}

impl MediaInfo {
    /// Create media info with validation
    pub fn new(
        width: u32,
        height: u32,
        duration: f64,
        frame_rate: f64,
        bit_rate: u64,
        codec: String,
    ) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::ProbeFail(
                "Video dimensions cannot be zero".to_string(),
            ));
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(DomainError::ProbeFail(format!(
                "Invalid media duration: {}",
                duration
            )));
        }
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(DomainError::ProbeFail(format!(
                "Invalid frame rate: {}",
                frame_rate
            )));
        }

        Ok(Self {
            width,
            height,
            duration,
            frame_rate,
            bit_rate,
            codec,
            audio: None,
        })
    }

    pub fn with_audio(mut self, audio: AudioInfo) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Named stage of a per-file pipeline, used to tag failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Probe,
    ExtractSegment,
    Concat,
    PaletteGen,
    RenderLoop,
    EncodeClip,
    SplitSegment,
    ExtractVideo,
    ExtractAudio,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Probe => "Probe",
            Stage::ExtractSegment => "Segment extraction",
            Stage::Concat => "Concat",
            Stage::PaletteGen => "Palette generation",
            Stage::RenderLoop => "GIF creation",
            Stage::EncodeClip => "Clip encoding",
            Stage::SplitSegment => "Segment encoding",
            Stage::ExtractVideo => "Video extraction",
            Stage::ExtractAudio => "Audio extraction",
        };
        f.write_str(name)
    }
}

/// Elementary stream kind produced by stream separation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => f.write_str("video"),
            StreamKind::Audio => f.write_str("audio"),
        }
    }
}

/// How a file is divided into fixed segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// `split_value` is the length of each segment in seconds
    Duration,
    /// `split_value` is the number of equal segments
    Segments,
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitMethod::Duration => f.write_str("duration"),
            SplitMethod::Segments => f.write_str("segments"),
        }
    }
}

fn default_scale_percent() -> f64 {
    50.0
}

fn default_fixed_width() -> u32 {
    480
}

fn default_custom_width() -> u32 {
    640
}

fn default_custom_height() -> u32 {
    480
}

/// Output resolution policy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Resolution {
    /// Keep the source dimensions
    #[default]
    Original,
    /// Scale both dimensions by a percentage, rounded up to even numbers
    Scale {
        #[serde(rename = "scalePercent", default = "default_scale_percent")]
        scale_percent: f64,
    },
    /// Fixed width, height derived from the aspect ratio
    Width {
        #[serde(default = "default_fixed_width")]
        width: u32,
    },
    /// Fixed width and height
    Custom {
        #[serde(default = "default_custom_width")]
        width: u32,
        #[serde(default = "default_custom_height")]
        height: u32,
    },
}

/// Dithering applied when mapping frames onto the generated palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DitherMethod {
    #[default]
    FloydSteinberg,
    Bayer,
    #[serde(rename = "sierra2_4a")]
    Sierra2_4a,
    None,
}

impl DitherMethod {
    /// Name understood by the palette filter
    pub fn filter_name(&self) -> &'static str {
        match self {
            DitherMethod::FloydSteinberg => "floyd_steinberg",
            DitherMethod::Bayer => "bayer",
            DitherMethod::Sierra2_4a => "sierra2_4a",
            DitherMethod::None => "none",
        }
    }
}
