//! Encode requests for the fixed-segment and stream-separation operations

use std::path::Path;

use crate::domain::model::{MediaInfo, Resolution, TimeInterval};
use crate::domain::rules::ScaleRule;
use crate::ports::{
    AudioCodec, EncodeInput, EncodeRequest, FilterGraph, H264Params, InputFormat, PcmFormat,
    TimestampPolicy, VideoCodec,
};

/// One split segment: output-side seek, source size, audio copied
pub fn split_segment(
    source: &Path,
    output: &Path,
    segment: TimeInterval,
    info: &MediaInfo,
    frame_rate: f64,
    hardware: bool,
) -> EncodeRequest {
    EncodeRequest::new(EncodeInput::file(source), output)
        .window(segment)
        .filter(FilterGraph::Chain(ScaleRule::filter(
            &Resolution::Original,
            info.width,
            info.height,
        )))
        .video(VideoCodec::H264(H264Params::for_target(
            hardware,
            info.bit_rate,
            frame_rate,
        )))
        .audio(AudioCodec::Copy)
        .timestamps(TimestampPolicy::MakeNonNegative)
}

/// Video-only copy of the source at its own frame rate and bitrate
pub fn video_stream(source: &Path, output: &Path, info: &MediaInfo, hardware: bool) -> EncodeRequest {
    EncodeRequest::new(EncodeInput::file(source), output)
        .video(VideoCodec::H264(H264Params::for_target(
            hardware,
            info.bit_rate,
            info.frame_rate,
        )))
        .audio(AudioCodec::Disabled)
}

/// WAV conversions tried in order until one yields a usable file
pub fn audio_attempts(source: &Path, output: &Path, sample_rate: u32) -> Vec<EncodeRequest> {
    vec![
        EncodeRequest::new(EncodeInput::file(source).deep_probe(), output)
            .video(VideoCodec::Disabled)
            .audio(AudioCodec::Pcm {
                format: PcmFormat::S16le,
                sample_rate,
            }),
        EncodeRequest::new(EncodeInput::file(source), output)
            .video(VideoCodec::Disabled)
            .audio(AudioCodec::Pcm {
                format: PcmFormat::F32le,
                sample_rate,
            }),
        EncodeRequest::new(
            EncodeInput::file(source).with_format(InputFormat::Mp4),
            output,
        )
        .video(VideoCodec::Disabled)
        .output_format("wav"),
    ]
}

/// Last resort: copy the audio stream as-is
pub fn audio_raw_copy(source: &Path, output: &Path) -> EncodeRequest {
    EncodeRequest::new(EncodeInput::file(source), output)
        .video(VideoCodec::Disabled)
        .audio(AudioCodec::Copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{RateControl, HARDWARE_H264, SOFTWARE_H264};

    fn info() -> MediaInfo {
        MediaInfo::new(1920, 1080, 95.0, 29.97, 6_000_000, "h264".into()).unwrap()
    }

    #[test]
    fn test_split_segment_request() {
        let segment = TimeInterval::new(30.0, 60.0).unwrap();
        let request = split_segment(
            Path::new("in.mov"),
            Path::new("in_parts/in_part002.mov"),
            segment,
            &info(),
            24.0,
            false,
        );
        assert_eq!(request.window, Some(segment));
        assert_eq!(request.audio, AudioCodec::Copy);
        assert_eq!(request.timestamps, TimestampPolicy::MakeNonNegative);
        assert_eq!(request.filter, FilterGraph::Chain("scale=1920:1080".into()));
        match &request.video {
            VideoCodec::H264(params) => {
                assert_eq!(params.encoder, SOFTWARE_H264);
                assert_eq!(params.preset.as_deref(), Some("medium"));
                assert_eq!(params.frame_rate, Some(24.0));
                assert_eq!(params.rate, Some(RateControl::Bitrate(6_000_000)));
            }
            other => panic!("unexpected codec {:?}", other),
        }
    }

    #[test]
    fn test_hardware_encoder_has_no_preset() {
        let request = video_stream(Path::new("in.mov"), Path::new("out.mp4"), &info(), true);
        assert_eq!(request.audio, AudioCodec::Disabled);
        match &request.video {
            VideoCodec::H264(params) => {
                assert_eq!(params.encoder, HARDWARE_H264);
                assert!(params.preset.is_none());
                assert_eq!(params.frame_rate, Some(29.97));
            }
            other => panic!("unexpected codec {:?}", other),
        }
    }

    #[test]
    fn test_audio_attempt_order() {
        let attempts = audio_attempts(Path::new("in.mov"), Path::new("a.wav"), 44_100);
        assert_eq!(attempts.len(), 3);
        assert!(attempts[0].inputs[0].deep_probe);
        assert_eq!(
            attempts[1].audio,
            AudioCodec::Pcm {
                format: PcmFormat::F32le,
                sample_rate: 44_100
            }
        );
        assert_eq!(attempts[2].inputs[0].format, InputFormat::Mp4);
        assert_eq!(attempts[2].output_format.as_deref(), Some("wav"));
    }
}
