//! Execution engine: bounded worker pool and per-file pipeline runner

pub mod pipeline;
pub mod pool;

pub use pipeline::PipelineExecutor;
pub use pool::{Job, JobIdentity, JobResult, WorkerPool};
