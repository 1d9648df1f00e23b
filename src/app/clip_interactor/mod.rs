// Clip interactor - Trimmed and cut H.264 clip per file

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::batch::{FileOperation, FilePolicy, RunContext, SourceFile};
use crate::app::render::{RenderJob, Renderer};
use crate::config::ClipConfig;
use crate::output::events::{FileReport, Operation};
use crate::planner::OutputSpec;
use crate::ports::EncoderGateway;
use crate::utils::OutputLayout;

/// Interactor for the derived clip operation
///
/// Keep segments snap to the configured frame rate, or to the source rate
/// when none is configured.
pub struct ClipInteractor {
    renderer: Renderer,
}

impl ClipInteractor {
    /// Create new clip interactor with the injected gateway
    pub fn new(gateway: Arc<dyn EncoderGateway>) -> Self {
        Self {
            renderer: Renderer::new(gateway),
        }
    }
}

#[async_trait]
impl FileOperation for ClipInteractor {
    type Config = ClipConfig;

    fn operation(&self) -> Operation {
        Operation::Clip
    }

    fn policy(&self) -> FilePolicy {
        FilePolicy::Serial
    }

    async fn process(&self, file: &SourceFile, config: &ClipConfig, ctx: &RunContext) -> FileReport {
        let job = RenderJob {
            trim_start: config.trim_start,
            trim_end: config.trim_end,
            cuts: &config.cut_segments,
            spec: OutputSpec::Clip(config.clip_settings()),
            output: OutputLayout::for_source(&file.path).clip_path(),
        };
        self.renderer.render(file, job, ctx).await
    }
}
