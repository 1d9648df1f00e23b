//! FFmpeg execution adapter
//!
//! Implements `EncoderGateway` by running the ffmpeg and ffprobe binaries
//! as child processes. `build_args` is the only place that knows ffmpeg's
//! command-line syntax.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::probe_ffprobe::FfprobeAdapter;
use crate::adapters::process::ToolCommand;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::format_seconds;

/// Install locations checked before falling back to `PATH`
const COMMON_FFMPEG_PATHS: &[&str] = &[
    "/usr/local/bin/ffmpeg",
    "/opt/homebrew/bin/ffmpeg",
    "/usr/bin/ffmpeg",
];

/// Probe budget for inputs whose stream headers arrive late
const DEEP_PROBE_BUDGET: &str = "100M";

/// FFmpeg-based gateway
#[derive(Debug, Clone)]
pub struct FfmpegGateway {
    ffmpeg: PathBuf,
    prober: FfprobeAdapter,
    timeout: Option<Duration>,
}

impl FfmpegGateway {
    pub fn new(ffmpeg: PathBuf, ffprobe: PathBuf, timeout: Option<Duration>) -> Self {
        info!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), ?timeout, "Using encoding tools");
        Self {
            ffmpeg,
            prober: FfprobeAdapter::new(ffprobe, timeout),
            timeout,
        }
    }
}

#[async_trait]
impl EncoderGateway for FfmpegGateway {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, DomainError> {
        self.prober.probe(path).await
    }

    async fn encode(&self, request: &EncodeRequest) -> Result<(), DomainError> {
        ToolCommand::new(&self.ffmpeg)
            .args(build_args(request))
            .timeout(self.timeout)
            .execute()
            .await
            .map(|_| ())
    }

    async fn hardware_encoder_available(&self) -> bool {
        let result = ToolCommand::new(&self.ffmpeg)
            .args(["-hide_banner", "-encoders"])
            .timeout(self.timeout)
            .execute()
            .await;
        let available = matches!(&result, Ok(output) if output.stdout.contains(HARDWARE_H264));
        debug!(available, "Hardware encoder check");
        available
    }

    fn tool_path(&self) -> String {
        self.ffmpeg.to_string_lossy().to_string()
    }
}

/// Translate a typed request into ffmpeg arguments
pub fn build_args(request: &EncodeRequest) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-hide_banner", "-loglevel", "error"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    for input in &request.inputs {
        if input.deep_probe {
            push(&mut args, &["-analyzeduration", DEEP_PROBE_BUDGET, "-probesize", DEEP_PROBE_BUDGET]);
        }
        match input.format {
            InputFormat::Auto => {}
            InputFormat::Concat => push(&mut args, &["-f", "concat", "-safe", "0"]),
            InputFormat::Mp4 => push(&mut args, &["-f", "mp4"]),
        }
        push(&mut args, &["-i", &input.path.to_string_lossy()]);
    }

    // after the inputs, so seeking is frame accurate
    if let Some(window) = &request.window {
        push(&mut args, &[
            "-ss",
            &format_seconds(window.start()),
            "-t",
            &format_seconds(window.duration()),
        ]);
    }

    match &request.filter {
        FilterGraph::None => {}
        FilterGraph::Chain(chain) => push(&mut args, &["-vf", chain]),
        FilterGraph::Complex(graph) => push(&mut args, &["-filter_complex", graph]),
    }

    match &request.video {
        VideoCodec::Default => {}
        VideoCodec::Disabled => push(&mut args, &["-vn"]),
        VideoCodec::Copy => push(&mut args, &["-c:v", "copy"]),
        VideoCodec::H264(params) => {
            push(&mut args, &["-c:v", &params.encoder]);
            if let Some(fps) = params.frame_rate {
                push(&mut args, &["-r", &fps.to_string()]);
            }
            match params.rate {
                Some(RateControl::Crf(crf)) => push(&mut args, &["-crf", &crf.to_string()]),
                Some(RateControl::Bitrate(rate)) => push(&mut args, &["-b:v", &rate.to_string()]),
                None => {}
            }
            if let Some(preset) = &params.preset {
                push(&mut args, &["-preset", preset]);
            }
        }
    }

    match &request.audio {
        AudioCodec::Default => {}
        AudioCodec::Disabled => push(&mut args, &["-an"]),
        AudioCodec::Copy => push(&mut args, &["-c:a", "copy"]),
        AudioCodec::Aac => push(&mut args, &["-c:a", "aac"]),
        AudioCodec::Pcm {
            format,
            sample_rate,
        } => push(&mut args, &["-c:a", format.codec_name(), "-ar", &sample_rate.to_string()]),
    }

    match request.timestamps {
        TimestampPolicy::Keep => {}
        TimestampPolicy::MakeZero => push(&mut args, &["-avoid_negative_ts", "make_zero"]),
        TimestampPolicy::MakeNonNegative => push(&mut args, &["-avoid_negative_ts", "1"]),
    }

    if let Some(count) = request.loop_count {
        push(&mut args, &["-loop", &count.to_string()]);
    }
    if let Some(format) = &request.output_format {
        push(&mut args, &["-f", format]);
    }

    push(&mut args, &[&request.output.to_string_lossy()]);
    args
}

fn push(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| s.to_string()));
}

/// Locate ffmpeg: well-known install locations first, then `PATH`
pub fn discover_ffmpeg() -> PathBuf {
    COMMON_FFMPEG_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .or_else(|| search_path("ffmpeg"))
        .unwrap_or_else(|| PathBuf::from("ffmpeg"))
}

/// ffprobe installed alongside the given ffmpeg
pub fn ffprobe_beside(ffmpeg: &Path) -> PathBuf {
    match ffmpeg.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join("ffprobe"),
        _ => PathBuf::from("ffprobe"),
    }
}

fn search_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
