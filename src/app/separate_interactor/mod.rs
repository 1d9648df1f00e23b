// Separate interactor - Video-only and WAV audio extraction per file

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::app::batch::{FileOperation, FilePolicy, RunContext, SourceFile};
use crate::config::SeparateConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{MediaInfo, Stage, StreamKind};
use crate::output::events::*;
use crate::planner::jobs;
use crate::ports::EncoderGateway;
use crate::utils::OutputLayout;

/// Smallest audio file accepted as a successful conversion
pub const MIN_AUDIO_BYTES: u64 = 1000;

pub const AAC_FALLBACK_WARNING: &str = "Could not convert to WAV, saved as AAC";
pub const AUDIO_FAILED: &str = "All audio extraction methods failed";
pub const NO_AUDIO: &str = "No audio stream";

/// Interactor for the stream separation operation
pub struct SeparateInteractor {
    gateway: Arc<dyn EncoderGateway>,
}

impl SeparateInteractor {
    pub fn new(gateway: Arc<dyn EncoderGateway>) -> Self {
        Self { gateway }
    }

    async fn extract_video(
        &self,
        source: &Path,
        layout: &OutputLayout,
        info: &MediaInfo,
        hardware: bool,
    ) -> StreamReport {
        let output = layout.video_stream_path();
        let request = jobs::video_stream(source, &output, info, hardware);
        match self.gateway.encode(&request).await {
            Ok(()) => StreamReport::written(output.to_string_lossy().to_string()),
            Err(e) => StreamReport::failed(e.at_stage(Stage::ExtractVideo).to_string()),
        }
    }

    /// WAV conversions in order, then a raw AAC copy as the last resort
    async fn extract_audio(
        &self,
        source: &Path,
        layout: &OutputLayout,
        info: &MediaInfo,
        sample_rate: u32,
    ) -> StreamReport {
        if !info.has_audio() {
            return StreamReport::skipped(NO_AUDIO);
        }

        let output = layout.audio_stream_path();
        let attempts = jobs::audio_attempts(source, &output, sample_rate);
        for (attempt, request) in attempts.iter().enumerate() {
            match self.gateway.encode(request).await {
                Ok(()) if usable_audio(&output).await => {
                    debug!(attempt = attempt + 1, "Audio converted to WAV");
                    return StreamReport::written(output.to_string_lossy().to_string());
                }
                Ok(()) => debug!(attempt = attempt + 1, "WAV output too small"),
                Err(e) => debug!(attempt = attempt + 1, "WAV conversion failed: {}", e),
            }
        }

        let fallback = layout.audio_fallback_path();
        match self.gateway.encode(&jobs::audio_raw_copy(source, &fallback)).await {
            Ok(()) if usable_audio(&fallback).await => {
                warn!(source = %source.display(), "{}", AAC_FALLBACK_WARNING);
                StreamReport::written(fallback.to_string_lossy().to_string())
                    .with_warning(AAC_FALLBACK_WARNING)
            }
            Ok(()) => {
                warn!(source = %source.display(), "AAC copy too small");
                StreamReport::failed(AUDIO_FAILED.to_string())
            }
            Err(e) => {
                warn!(source = %source.display(), "Audio extraction failed: {}", e);
                StreamReport::failed(AUDIO_FAILED.to_string())
            }
        }
    }

    async fn separate(
        &self,
        file: &SourceFile,
        config: &SeparateConfig,
        hardware: bool,
    ) -> Result<(String, StreamReport, StreamReport), DomainError> {
        let info = self.gateway.probe(&file.path).await?;
        let layout = OutputLayout::for_source(&file.path);
        let output_dir = layout.separated_dir();
        tokio::fs::create_dir_all(&output_dir).await?;

        let sample_rate = config.sample_rate_for(&file.name);
        info!(file = %file.name, sample_rate, "Separating streams");

        let video = self.extract_video(&file.path, &layout, &info, hardware).await;
        let audio = self.extract_audio(&file.path, &layout, &info, sample_rate).await;
        Ok((output_dir.to_string_lossy().to_string(), video, audio))
    }
}

async fn usable_audio(path: &Path) -> bool {
    matches!(tokio::fs::metadata(path).await, Ok(meta) if meta.len() > MIN_AUDIO_BYTES)
}

/// First stream failure, used as the file's error message
fn stream_error(video: &StreamReport, audio: &StreamReport) -> String {
    [video, audio]
        .into_iter()
        .find(|report| !report.success)
        .and_then(|report| report.error.clone())
        .unwrap_or_default()
}

#[async_trait]
impl FileOperation for SeparateInteractor {
    type Config = SeparateConfig;

    fn operation(&self) -> Operation {
        Operation::Separate
    }

    fn policy(&self) -> FilePolicy {
        FilePolicy::Parallel
    }

    async fn process(&self, file: &SourceFile, config: &SeparateConfig, ctx: &RunContext) -> FileReport {
        let (output_dir, video, audio) = match self.separate(file, config, ctx.hardware).await {
            Ok(streams) => streams,
            Err(e) => return FileReport::failed(&file.name, e.to_string()),
        };

        if video.success && audio.success {
            FileReport {
                file: file.name.clone(),
                success: true,
                outcome: FileOutcome::Separated {
                    output_dir,
                    video,
                    audio,
                },
            }
        } else {
            FileReport {
                file: file.name.clone(),
                success: false,
                outcome: FileOutcome::Failed {
                    error: stream_error(&video, &audio),
                    video: Some(video),
                    audio: Some(audio),
                },
            }
        }
    }

    fn announce(&self, ctx: &RunContext, report: &FileReport, completed: usize, total: usize) {
        let streams = match &report.outcome {
            FileOutcome::Separated { video, audio, .. } => Some((video, audio)),
            FileOutcome::Failed {
                video: Some(video),
                audio: Some(audio),
                ..
            } => Some((video, audio)),
            _ => None,
        };

        if let Some((video, audio)) = streams {
            for (stream, result) in [(StreamKind::Video, video), (StreamKind::Audio, audio)] {
                if let (true, Some(output)) = (result.success, &result.output) {
                    ctx.emitter.emit(Event::StreamComplete {
                        file: report.file.clone(),
                        stream,
                        output: output.clone(),
                    });
                }
            }
        }

        ctx.emitter.progress(completed, total, &report.file);

        match &report.outcome {
            FileOutcome::Separated {
                output_dir,
                video,
                audio,
            } => ctx.emitter.file_complete(FileCompletion {
                file: report.file.clone(),
                success: true,
                detail: CompletionDetail::Separated {
                    output_dir: output_dir.clone(),
                    video: video.clone(),
                    audio: audio.clone(),
                },
            }),
            FileOutcome::Failed { error, video, audio } => {
                let mut failure = FileFailure::new(&report.file, error.clone());
                if let (Some(video), Some(audio)) = (video, audio) {
                    failure = failure.streams(video.clone(), audio.clone());
                }
                ctx.emitter.file_error(failure);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_names_first_failure() {
        let video = StreamReport::written("v.mp4".into());
        let audio = StreamReport::failed(AUDIO_FAILED.into());
        assert_eq!(stream_error(&video, &audio), AUDIO_FAILED);

        let video = StreamReport::failed("Video extraction failed: bad codec".into());
        assert_eq!(stream_error(&video, &audio), "Video extraction failed: bad codec");
    }

    #[tokio::test]
    async fn test_usable_audio_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small.wav");
        let large = dir.path().join("large.wav");
        std::fs::write(&small, vec![0u8; 1000]).unwrap();
        std::fs::write(&large, vec![0u8; 1001]).unwrap();

        assert!(!usable_audio(&small).await);
        assert!(usable_audio(&large).await);
        assert!(!usable_audio(&dir.path().join("missing.wav")).await);
    }
}
