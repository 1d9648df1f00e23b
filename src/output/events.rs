//! Event record schema
//!
//! Each record is one JSON object with an `event` field naming its kind.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::model::StreamKind;

/// Batch operation name reported in the `start` record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Split,
    Separate,
    Gif,
    Clip,
}

/// Run-wide parameters announced before any per-file record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStart {
    pub total_files: usize,
    pub operation: Operation,
    pub parallel_jobs: usize,
    pub hardware_acceleration: bool,
    pub ffmpeg_path: String,
    /// Operation-specific settings
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// Result of one elementary stream extraction
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StreamReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StreamReport {
    pub fn written(output: String) -> Self {
        Self {
            success: true,
            output: Some(output),
            ..Self::default()
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn skipped(reason: &str) -> Self {
        Self {
            success: true,
            skipped: true,
            reason: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn with_warning(mut self, warning: &str) -> Self {
        self.warning = Some(warning.to_string());
        self
    }
}

/// Per-file aggregate announced as the file finishes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCompletion {
    pub file: String,
    pub success: bool,
    #[serde(flatten)]
    pub detail: CompletionDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompletionDetail {
    Split {
        segments_completed: usize,
        segments_total: usize,
        output_dir: String,
    },
    Separated {
        output_dir: String,
        video: StreamReport,
        audio: StreamReport,
    },
    Rendered {
        output: String,
        size: String,
    },
}

/// Per-file entry of the final result list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub success: bool,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Split {
        output_dir: String,
        segments: Vec<String>,
        errors: Vec<String>,
    },
    Separated {
        output_dir: String,
        video: StreamReport,
        audio: StreamReport,
    },
    Rendered {
        output: String,
        size: String,
    },
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        video: Option<StreamReport>,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<StreamReport>,
    },
}

impl FileReport {
    /// Failure with nothing produced
    pub fn failed(file: &str, error: String) -> Self {
        Self {
            file: file.to_string(),
            success: false,
            outcome: FileOutcome::Failed {
                error,
                video: None,
                audio: None,
            },
        }
    }
}

/// Per-file or per-unit failure
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FileFailure {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<usize>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<StreamReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<StreamReport>,
}

impl FileFailure {
    pub fn new(file: &str, error: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            error: error.into(),
            ..Self::default()
        }
    }

    pub fn segment(mut self, segment: usize) -> Self {
        self.segment = Some(segment);
        self
    }

    pub fn streams(mut self, video: StreamReport, audio: StreamReport) -> Self {
        self.video = Some(video);
        self.audio = Some(audio);
        self
    }
}

/// One line of the event stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Start(RunStart),
    Progress {
        current_file: usize,
        total_files: usize,
        filename: String,
    },
    FileStart {
        file: String,
        path: String,
    },
    SegmentComplete {
        file: String,
        segment: usize,
        total: usize,
        output: String,
    },
    StreamComplete {
        file: String,
        stream: StreamKind,
        output: String,
    },
    FileComplete(FileCompletion),
    FileError(FileFailure),
    Complete {
        total_files: usize,
        successful: usize,
        failed: usize,
        results: Vec<FileReport>,
    },
    Error {
        message: String,
    },
}

impl Event {
    /// Kind name as written in the `event` field
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start(_) => "start",
            Event::Progress { .. } => "progress",
            Event::FileStart { .. } => "file_start",
            Event::SegmentComplete { .. } => "segment_complete",
            Event::StreamComplete { .. } => "stream_complete",
            Event::FileComplete(_) => "file_complete",
            Event::FileError(_) => "file_error",
            Event::Complete { .. } => "complete",
            Event::Error { .. } => "error",
        }
    }
}
