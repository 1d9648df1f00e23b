// Gif interactor - Animated loop per file

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::batch::{FileOperation, FilePolicy, RunContext, SourceFile};
use crate::app::render::{RenderJob, Renderer};
use crate::config::GifConfig;
use crate::output::events::{FileReport, Operation};
use crate::planner::OutputSpec;
use crate::ports::EncoderGateway;
use crate::utils::OutputLayout;

/// Interactor for the animated loop operation
pub struct GifInteractor {
    renderer: Renderer,
}

impl GifInteractor {
    pub fn new(gateway: Arc<dyn EncoderGateway>) -> Self {
        Self {
            renderer: Renderer::new(gateway),
        }
    }
}

#[async_trait]
impl FileOperation for GifInteractor {
    type Config = GifConfig;

    fn operation(&self) -> Operation {
        Operation::Gif
    }

    fn policy(&self) -> FilePolicy {
        FilePolicy::Serial
    }

    async fn process(&self, file: &SourceFile, config: &GifConfig, ctx: &RunContext) -> FileReport {
        let job = RenderJob {
            trim_start: config.trim_start,
            trim_end: config.trim_end,
            cuts: &config.cut_segments,
            spec: OutputSpec::AnimatedLoop(config.loop_settings()),
            output: OutputLayout::for_source(&file.path).gif_path(),
        };
        self.renderer.render(file, job, ctx).await
    }
}
