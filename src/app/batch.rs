// Batch orchestrator - File validation, scheduling and aggregation

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{BatchInput, OperationConfig};
use crate::domain::errors::DomainError;
use crate::engine::{Job, JobIdentity, WorkerPool};
use crate::error::{ReelcutError, ReelcutResult};
use crate::output::events::{FileFailure, FileReport, Operation, RunStart};
use crate::output::EventEmitter;
use crate::ports::EncoderGateway;
use crate::utils::path::file_id;

/// How the files of one run are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePolicy {
    /// One file at a time; work inside a file may still fan out
    Serial,
    /// Whole files run concurrently, bounded by the worker count
    Parallel,
}

/// A validated input file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Stable identity: the last path component
    pub name: String,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let name = file_id(&path);
        Self { path, name }
    }
}

/// Run-wide values handed to each file's processing
#[derive(Clone)]
pub struct RunContext {
    pub emitter: EventEmitter,
    pub hardware: bool,
    pub workers: usize,
}

/// One batch operation, processed file by file
#[async_trait]
pub trait FileOperation: Send + Sync + 'static {
    type Config: OperationConfig;

    fn operation(&self) -> Operation;

    fn policy(&self) -> FilePolicy;

    /// Process one file. Never fails: problems become a failed report.
    async fn process(&self, file: &SourceFile, config: &Self::Config, ctx: &RunContext) -> FileReport;

    /// Records announcing a finished file under the parallel policy,
    /// `completed` counting files finished so far
    fn announce(&self, ctx: &RunContext, report: &FileReport, completed: usize, total: usize) {
        ctx.emitter.progress(completed, total, &report.file);
    }
}

/// Drives one operation over a batch of files
pub struct BatchOrchestrator {
    gateway: Arc<dyn EncoderGateway>,
    emitter: EventEmitter,
    default_workers: usize,
}

impl BatchOrchestrator {
    pub fn new(gateway: Arc<dyn EncoderGateway>, emitter: EventEmitter, default_workers: usize) -> Self {
        Self {
            gateway,
            emitter,
            default_workers: default_workers.max(1),
        }
    }

    /// Keep the listed files that exist, reporting the others
    pub fn validate_files(&self, files: &[PathBuf]) -> ReelcutResult<Vec<SourceFile>> {
        let mut valid = Vec::with_capacity(files.len());
        for path in files {
            if path.is_file() {
                valid.push(SourceFile::new(path.clone()));
            } else {
                warn!(path = %path.display(), "Input file not found");
                self.emitter.error(format!("File not found: {}", path.display()));
            }
        }
        if valid.is_empty() {
            return Err(ReelcutError::NoValidFiles);
        }
        Ok(valid)
    }

    /// Run the whole batch and emit the terminal `complete` record.
    ///
    /// Only setup failures are returned as errors; per-file failures are
    /// part of the returned reports.
    pub async fn run<O: FileOperation>(
        &self,
        operation: Arc<O>,
        input: BatchInput<O::Config>,
    ) -> ReelcutResult<Vec<FileReport>> {
        let files = self.validate_files(&input.files)?;
        let config = Arc::new(input.config);

        let hardware = self.gateway.hardware_encoder_available().await;
        let workers = config.parallel_jobs().unwrap_or(self.default_workers);
        let ctx = RunContext {
            emitter: self.emitter.clone(),
            hardware,
            workers,
        };

        info!(
            operation = ?operation.operation(),
            files = files.len(),
            workers,
            hardware,
            "Starting batch"
        );
        self.emitter.start(RunStart {
            total_files: files.len(),
            operation: operation.operation(),
            parallel_jobs: workers,
            hardware_acceleration: hardware,
            ffmpeg_path: self.gateway.tool_path(),
            settings: config.start_settings(),
        });

        let reports = match operation.policy() {
            FilePolicy::Serial => Self::run_serial(&operation, &files, &config, &ctx).await,
            FilePolicy::Parallel => Self::run_parallel(&operation, files, &config, &ctx).await,
        };

        let successful = reports.iter().filter(|r| r.success).count();
        info!(successful, failed = reports.len() - successful, "Batch finished");
        self.emitter.complete(reports.clone());
        Ok(reports)
    }

    async fn run_serial<O: FileOperation>(
        operation: &Arc<O>,
        files: &[SourceFile],
        config: &Arc<O::Config>,
        ctx: &RunContext,
    ) -> Vec<FileReport> {
        let mut reports = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            ctx.emitter.progress(index + 1, files.len(), &file.name);
            ctx.emitter.file_start(&file.name, &file.path.to_string_lossy());
            reports.push(operation.process(file, config, ctx).await);
        }
        reports
    }

    async fn run_parallel<O: FileOperation>(
        operation: &Arc<O>,
        files: Vec<SourceFile>,
        config: &Arc<O::Config>,
        ctx: &RunContext,
    ) -> Vec<FileReport> {
        let total = files.len();
        let jobs = files
            .into_iter()
            .map(|file| Job::new(JobIdentity::file(&file.name), file))
            .collect();

        let work = {
            let (operation, config, ctx) = (Arc::clone(operation), Arc::clone(config), ctx.clone());
            move |file: SourceFile| {
                let (operation, config, ctx) = (Arc::clone(&operation), Arc::clone(&config), ctx.clone());
                async move { Ok::<_, DomainError>(operation.process(&file, &config, &ctx).await) }
            }
        };

        let mut completed = 0;
        let results = WorkerPool::for_units(ctx.workers, total)
            .run(jobs, work, |result| {
                completed += 1;
                match &result.outcome {
                    Ok(report) => operation.announce(ctx, report, completed, total),
                    Err(e) => {
                        ctx.emitter.progress(completed, total, &result.identity.file);
                        ctx.emitter.file_error(FileFailure::new(&result.identity.file, e.to_string()));
                    }
                }
            })
            .await;

        results
            .into_iter()
            .map(|result| match result.outcome {
                Ok(report) => report,
                Err(e) => FileReport::failed(&result.identity.file, e.to_string()),
            })
            .collect()
    }
}
