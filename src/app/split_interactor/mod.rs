// Split interactor - Fixed segments of each file encoded in parallel

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::batch::{FileOperation, FilePolicy, RunContext, SourceFile};
use crate::config::SplitConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::Stage;
use crate::domain::rules::SegmentPlanner;
use crate::engine::{Job, JobIdentity, WorkerPool};
use crate::output::events::*;
use crate::planner::jobs;
use crate::ports::{EncodeRequest, EncoderGateway};
use crate::utils::OutputLayout;

/// Interactor for the split operation
pub struct SplitInteractor {
    gateway: Arc<dyn EncoderGateway>,
}

impl SplitInteractor {
    pub fn new(gateway: Arc<dyn EncoderGateway>) -> Self {
        Self { gateway }
    }

    /// Probe, plan and create the output directory
    async fn prepare(
        &self,
        file: &SourceFile,
        config: &SplitConfig,
        hardware: bool,
    ) -> Result<(PathBuf, Vec<Job<EncodeRequest>>), DomainError> {
        let info = self.gateway.probe(&file.path).await?;
        let frame_rate = config.frame_rate_for(&file.name);
        let plan = SegmentPlanner::plan(info.duration, config.split_method, config.split_value)?;

        let layout = OutputLayout::for_source(&file.path);
        let output_dir = layout.parts_dir();
        tokio::fs::create_dir_all(&output_dir).await?;

        info!(
            file = %file.name,
            segments = plan.len(),
            fps = frame_rate,
            "Splitting"
        );

        let units = plan
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                let number = index + 1;
                let request = jobs::split_segment(
                    &file.path,
                    &layout.part_path(number),
                    segment,
                    &info,
                    frame_rate,
                    hardware,
                );
                Job::new(JobIdentity::unit(&file.name, number), request)
            })
            .collect();

        Ok((output_dir, units))
    }
}

#[async_trait]
impl FileOperation for SplitInteractor {
    type Config = SplitConfig;

    fn operation(&self) -> Operation {
        Operation::Split
    }

    fn policy(&self) -> FilePolicy {
        FilePolicy::Serial
    }

    async fn process(&self, file: &SourceFile, config: &SplitConfig, ctx: &RunContext) -> FileReport {
        let (output_dir, jobs) = match self.prepare(file, config, ctx.hardware).await {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(file = %file.name, "Split preparation failed: {}", e);
                ctx.emitter.file_error(FileFailure::new(&file.name, e.to_string()));
                return FileReport::failed(&file.name, e.to_string());
            }
        };

        let total = jobs.len();
        let gateway = Arc::clone(&self.gateway);
        let work = move |request: EncodeRequest| {
            let gateway = Arc::clone(&gateway);
            async move {
                gateway
                    .encode(&request)
                    .await
                    .map(|_| request.output)
                    .map_err(|e| e.at_stage(Stage::SplitSegment))
            }
        };

        let results = WorkerPool::for_units(ctx.workers, total)
            .run(jobs, work, |result| {
                let segment = result.identity.unit.unwrap_or_default();
                match &result.outcome {
                    Ok(output) => ctx.emitter.emit(Event::SegmentComplete {
                        file: file.name.clone(),
                        segment,
                        total,
                        output: output.to_string_lossy().to_string(),
                    }),
                    Err(e) => ctx
                        .emitter
                        .file_error(FileFailure::new(&file.name, e.to_string()).segment(segment)),
                }
            })
            .await;

        let mut segments = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result.outcome {
                Ok(output) => segments.push(output.to_string_lossy().to_string()),
                Err(e) => errors.push(format!(
                    "Segment {}: {}",
                    result.identity.unit.unwrap_or_default(),
                    e
                )),
            }
        }

        let success = errors.is_empty();
        let output_dir = output_dir.to_string_lossy().to_string();
        ctx.emitter.file_complete(FileCompletion {
            file: file.name.clone(),
            success,
            detail: CompletionDetail::Split {
                segments_completed: segments.len(),
                segments_total: total,
                output_dir: output_dir.clone(),
            },
        });

        FileReport {
            file: file.name.clone(),
            success,
            outcome: FileOutcome::Split {
                output_dir,
                segments,
                errors,
            },
        }
    }
}
