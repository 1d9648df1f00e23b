// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::output::events::Event;

/// Port for the external probing/encoding tool
///
/// Core logic only ever sees typed requests; the adapter owns the
/// invocation syntax.
#[async_trait]
pub trait EncoderGateway: Send + Sync {
    /// Probe media file and return its properties
    async fn probe(&self, path: &Path) -> Result<MediaInfo, DomainError>;

    /// Run one encode invocation to completion
    async fn encode(&self, request: &EncodeRequest) -> Result<(), DomainError>;

    /// Whether the hardware H.264 encoder is usable
    async fn hardware_encoder_available(&self) -> bool;

    /// Location of the encoding tool, reported in the `start` record
    fn tool_path(&self) -> String;
}

/// Port for event records consumed by the host process
///
/// Implementations must make each record visible before returning.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &Event);
}

/// Name of the hardware H.264 encoder
pub const HARDWARE_H264: &str = "h264_videotoolbox";

/// Name of the software H.264 encoder
pub const SOFTWARE_H264: &str = "libx264";

/// How the tool should interpret an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Let the tool detect the container
    Auto,
    /// Concat demuxer manifest
    Concat,
    /// Force the MP4 demuxer
    Mp4,
}

/// One input of an encode invocation
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeInput {
    pub path: PathBuf,
    pub format: InputFormat,
    /// Enlarge the analysis budget for streams with late headers
    pub deep_probe: bool,
}

impl EncodeInput {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: InputFormat::Auto,
            deep_probe: false,
        }
    }

    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn deep_probe(mut self) -> Self {
        self.deep_probe = true;
        self
    }
}

/// Filter graph applied to the inputs
#[derive(Debug, Clone, PartialEq)]
pub enum FilterGraph {
    None,
    /// Single-input chain (`-vf`)
    Chain(String),
    /// Multi-input graph (`-filter_complex`)
    Complex(String),
}

/// Rate control for an H.264 encode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateControl {
    Crf(u8),
    Bitrate(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct H264Params {
    pub encoder: String,
    pub rate: Option<RateControl>,
    pub preset: Option<String>,
    pub frame_rate: Option<f64>,
}

impl H264Params {
    /// Software encoder with a preset and constant quality
    pub fn software(preset: &str, crf: u8) -> Self {
        Self {
            encoder: SOFTWARE_H264.to_string(),
            rate: Some(RateControl::Crf(crf)),
            preset: Some(preset.to_string()),
            frame_rate: None,
        }
    }

    /// Hardware encoder when available, else the software one with the
    /// `medium` preset; both target the given bitrate and frame rate.
    pub fn for_target(hardware: bool, bit_rate: u64, frame_rate: f64) -> Self {
        let (encoder, preset) = if hardware {
            (HARDWARE_H264, None)
        } else {
            (SOFTWARE_H264, Some("medium".to_string()))
        };
        Self {
            encoder: encoder.to_string(),
            rate: Some(RateControl::Bitrate(bit_rate)),
            preset,
            frame_rate: Some(frame_rate),
        }
    }
}

/// Video handling for an encode
#[derive(Debug, Clone, PartialEq)]
pub enum VideoCodec {
    /// Tool default for the output container
    Default,
    /// Drop video
    Disabled,
    Copy,
    H264(H264Params),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmFormat {
    S16le,
    F32le,
}

impl PcmFormat {
    pub fn codec_name(&self) -> &'static str {
        match self {
            PcmFormat::S16le => "pcm_s16le",
            PcmFormat::F32le => "pcm_f32le",
        }
    }
}

/// Audio handling for an encode
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCodec {
    Default,
    Disabled,
    Copy,
    Aac,
    Pcm { format: PcmFormat, sample_rate: u32 },
}

/// Timestamp fix-ups applied to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPolicy {
    Keep,
    /// Shift so the first timestamp is zero
    MakeZero,
    /// Shift only negative timestamps
    MakeNonNegative,
}

/// One invocation of the encoding tool
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub inputs: Vec<EncodeInput>,
    pub output: PathBuf,
    /// Output-side seek: decoded frames are discarded until `start`
    pub window: Option<TimeInterval>,
    pub filter: FilterGraph,
    pub video: VideoCodec,
    pub audio: AudioCodec,
    pub timestamps: TimestampPolicy,
    pub loop_count: Option<u32>,
    /// Forced output muxer
    pub output_format: Option<String>,
}

impl EncodeRequest {
    pub fn new(input: EncodeInput, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs: vec![input],
            output: output.into(),
            window: None,
            filter: FilterGraph::None,
            video: VideoCodec::Default,
            audio: AudioCodec::Default,
            timestamps: TimestampPolicy::Keep,
            loop_count: None,
            output_format: None,
        }
    }

    pub fn add_input(mut self, input: EncodeInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn window(mut self, window: TimeInterval) -> Self {
        self.window = Some(window);
        self
    }

    pub fn filter(mut self, filter: FilterGraph) -> Self {
        self.filter = filter;
        self
    }

    pub fn video(mut self, video: VideoCodec) -> Self {
        self.video = video;
        self
    }

    pub fn audio(mut self, audio: AudioCodec) -> Self {
        self.audio = audio;
        self
    }

    pub fn timestamps(mut self, timestamps: TimestampPolicy) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn loop_count(mut self, loop_count: u32) -> Self {
        self.loop_count = Some(loop_count);
        self
    }

    pub fn output_format(mut self, format: &str) -> Self {
        self.output_format = Some(format.to_string());
        self
    }

    /// Primary input path
    pub fn source(&self) -> Option<&Path> {
        self.inputs.first().map(|input| input.path.as_path())
    }
}
