// Domain errors - Contained failures for one file or one job

use std::fmt;

use crate::domain::model::Stage;

/// Maximum number of characters of tool diagnostics carried in an error.
pub const DIAGNOSTIC_LIMIT: usize = 500;

/// Domain-specific error types
///
/// None of these stop a batch run; they are reported as `file_error` records
/// or failed results and the run moves on to the next unit of work.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Media metadata could not be obtained
    ProbeFail(String),
    /// Trimming and cutting removed every frame
    EmptyTimeline,
    /// A pipeline stage failed; remaining stages were skipped
    StageFail { stage: Stage, diagnostic: String },
    /// The external tool rejected an invocation
    ToolFail(String),
    /// The external tool did not finish within the configured limit
    Timeout { seconds: u64 },
    /// Local file system problem (intermediates, output directories)
    FsFail(String),
}

impl DomainError {
    /// Build a tool failure, keeping only the head of the diagnostic text
    pub fn tool(diagnostic: &str) -> Self {
        DomainError::ToolFail(crate::utils::truncate_diagnostic(diagnostic, DIAGNOSTIC_LIMIT))
    }

    /// Tag an error with the pipeline stage it surfaced in
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            DomainError::StageFail { .. } => self,
            other => DomainError::StageFail {
                stage,
                diagnostic: other.diagnostic(),
            },
        }
    }

    /// Message without the category prefix
    pub fn diagnostic(&self) -> String {
        match self {
            DomainError::BadArgs(msg)
            | DomainError::ProbeFail(msg)
            | DomainError::ToolFail(msg)
            | DomainError::FsFail(msg) => msg.clone(),
            DomainError::EmptyTimeline => "No video content remaining after cuts".to_string(),
            DomainError::StageFail { diagnostic, .. } => diagnostic.clone(),
            DomainError::Timeout { seconds } => format!("timed out after {} s", seconds),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::ProbeFail(msg) => write!(f, "Failed to probe video: {}", msg),
            DomainError::EmptyTimeline => write!(f, "No video content remaining after cuts"),
            DomainError::StageFail { stage, diagnostic } => {
                write!(f, "{} failed: {}", stage, diagnostic)
            }
            DomainError::ToolFail(msg) => write!(f, "{}", msg),
            DomainError::Timeout { seconds } => write!(f, "Tool timed out after {} s", seconds),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::FsFail(err.to_string())
    }
}
