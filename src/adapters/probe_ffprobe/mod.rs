//! FFprobe adapter for media file probing

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::adapters::process::ToolCommand;
use crate::domain::errors::*;
use crate::domain::model::*;

const DEFAULT_FRAME_RATE: f64 = 30.0;
const DEFAULT_BIT_RATE: u64 = 2_000_000;
const DEFAULT_SAMPLE_RATE: u32 = 48_000;
const DEFAULT_CHANNELS: u32 = 2;

/// FFprobe-based probe adapter
#[derive(Debug, Clone)]
pub struct FfprobeAdapter {
    ffprobe: PathBuf,
    timeout: Option<Duration>,
}

impl FfprobeAdapter {
    pub fn new(ffprobe: PathBuf, timeout: Option<Duration>) -> Self {
        Self { ffprobe, timeout }
    }

    pub async fn probe(&self, path: &Path) -> Result<MediaInfo, DomainError> {
        let output = ToolCommand::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .args([path.to_string_lossy().to_string()])
            .timeout(self.timeout)
            .execute()
            .await
            .map_err(|e| DomainError::ProbeFail(e.diagnostic()))?;

        let info = parse_probe_output(&output.stdout)?;
        debug!(file = %path.display(), ?info, "Probed media");
        Ok(info)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    bit_rate: Option<String>,
    duration: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
}

/// Build media info from `ffprobe -print_format json` output
pub fn parse_probe_output(json: &str) -> Result<MediaInfo, DomainError> {
    let probe: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| DomainError::ProbeFail(format!("unreadable probe output: {}", e)))?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| DomainError::ProbeFail("no video stream".to_string()))?;
    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) => (w, h),
        _ => return Err(DomainError::ProbeFail("missing video dimensions".to_string())),
    };

    let frame_rate = video
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .unwrap_or(DEFAULT_FRAME_RATE);

    let format = probe.format.as_ref();
    let bit_rate = parse_number::<u64>(video.bit_rate.as_deref())
        .or_else(|| parse_number(format.and_then(|f| f.bit_rate.as_deref())))
        .unwrap_or(DEFAULT_BIT_RATE);

    let duration = parse_number::<f64>(format.and_then(|f| f.duration.as_deref()))
        .or_else(|| parse_number(video.duration.as_deref()))
        .ok_or_else(|| DomainError::ProbeFail("unknown duration".to_string()))?;

    let codec = video
        .codec_name
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    let info = MediaInfo::new(width, height, duration, frame_rate, bit_rate, codec)?;
    Ok(match audio {
        Some(stream) => info.with_audio(AudioInfo {
            sample_rate: parse_number(stream.sample_rate.as_deref()).unwrap_or(DEFAULT_SAMPLE_RATE),
            channels: stream.channels.unwrap_or(DEFAULT_CHANNELS),
            codec: stream
                .codec_name
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }),
        None => info,
    })
}

/// `"30000/1001"` or `"25"`; a zero denominator falls back to the default
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080,
             "avg_frame_rate": "30000/1001", "bit_rate": "5000000", "duration": "12.5"},
            {"index": 1, "codec_type": "audio", "codec_name": "aac", "sample_rate": "44100", "channels": 2}
        ],
        "format": {"duration": "12.512000", "bit_rate": "5200000", "format_name": "mov,mp4"}
    }"#;

    #[test]
    fn test_parse_full_probe() {
        let info = parse_probe_output(SAMPLE).unwrap();
        assert_eq!((info.width, info.height), (1920, 1080));
        assert!((info.frame_rate - 29.97).abs() < 0.01);
        assert_eq!(info.bit_rate, 5_000_000);
        assert_eq!(info.duration, 12.512);
        assert_eq!(info.codec, "h264");
        let audio = info.audio.unwrap();
        assert_eq!(audio.sample_rate, 44_100);
        assert_eq!(audio.codec, "aac");
    }

    #[test]
    fn test_fallbacks() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 480, "avg_frame_rate": "0/0"}],
            "format": {"duration": "3.0"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.frame_rate, 30.0);
        assert_eq!(info.bit_rate, 2_000_000);
        assert_eq!(info.codec, "unknown");
        assert!(info.audio.is_none());
    }

    #[test]
    fn test_format_bitrate_used_when_stream_has_none() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 480, "avg_frame_rate": "25"},
                        {"codec_type": "audio"}],
            "format": {"duration": "3.0", "bit_rate": "900000"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.bit_rate, 900_000);
        assert_eq!(info.frame_rate, 25.0);
        let audio = info.audio.unwrap();
        assert_eq!((audio.sample_rate, audio.channels), (48_000, 2));
    }

    #[test]
    fn test_audio_only_is_a_probe_failure() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "3.0"}}"#;
        assert!(matches!(parse_probe_output(json), Err(DomainError::ProbeFail(_))));
        assert!(matches!(parse_probe_output("not json"), Err(DomainError::ProbeFail(_))));
    }
}
