// Render path shared by the loop and clip operations

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::batch::{RunContext, SourceFile};
use crate::domain::errors::DomainError;
use crate::domain::model::CutRequest;
use crate::domain::rules::IntervalCalculator;
use crate::engine::PipelineExecutor;
use crate::output::events::*;
use crate::planner::{OutputSpec, PipelineBuilder};
use crate::ports::EncoderGateway;
use crate::utils::Utils;

/// What to cut out of a source and what to produce from the rest
#[derive(Debug, Clone)]
pub struct RenderJob<'a> {
    pub trim_start: f64,
    pub trim_end: Option<f64>,
    pub cuts: &'a [CutRequest],
    pub spec: OutputSpec,
    pub output: PathBuf,
}

/// Probe, compute keep segments, then run the file's pipeline
pub struct Renderer {
    gateway: Arc<dyn EncoderGateway>,
    executor: PipelineExecutor,
}

impl Renderer {
    pub fn new(gateway: Arc<dyn EncoderGateway>) -> Self {
        let executor = PipelineExecutor::new(Arc::clone(&gateway));
        Self { gateway, executor }
    }

    pub async fn render(&self, file: &SourceFile, job: RenderJob<'_>, ctx: &RunContext) -> FileReport {
        match self.run(file, &job).await {
            Ok(size) => {
                let output = job.output.to_string_lossy().to_string();
                info!(file = %file.name, output = %output, size = %size, "Render complete");
                ctx.emitter.file_complete(FileCompletion {
                    file: file.name.clone(),
                    success: true,
                    detail: CompletionDetail::Rendered {
                        output: output.clone(),
                        size: size.clone(),
                    },
                });
                FileReport {
                    file: file.name.clone(),
                    success: true,
                    outcome: FileOutcome::Rendered { output, size },
                }
            }
            Err(e) => {
                warn!(file = %file.name, "Render failed: {}", e);
                ctx.emitter.file_error(FileFailure::new(&file.name, e.to_string()));
                FileReport::failed(&file.name, e.to_string())
            }
        }
    }

    /// Returns the human-readable size of the written output
    async fn run(&self, file: &SourceFile, job: &RenderJob<'_>) -> Result<String, DomainError> {
        let info = self.gateway.probe(&file.path).await?;
        let snap_rate = job.spec.frame_rate().unwrap_or(info.frame_rate);
        let keep = IntervalCalculator::compute(
            info.duration,
            job.trim_start,
            job.trim_end,
            job.cuts,
            Some(snap_rate),
        );
        if keep.is_empty() {
            return Err(DomainError::EmptyTimeline);
        }

        let plan = self
            .executor
            .run_scoped(|workdir| {
                PipelineBuilder::new(&file.path, &info, workdir, &job.output).build(&keep, &job.spec)
            })
            .await?;

        let size = tokio::fs::metadata(&plan.output).await?.len();
        Ok(Utils::format_file_size(size))
    }
}
