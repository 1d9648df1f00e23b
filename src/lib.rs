//! reelcut - batch video tools
//!
//! Splits videos into fixed segments, separates video and audio streams,
//! and renders animated GIFs or H.264 clips from trimmed and cut timelines.
//! Each run takes one JSON input object and reports progress as JSON lines.
//!
//! # Architecture
//!
//! - `domain`: interval algebra, segment planning and scaling rules
//! - `planner`: per-file pipeline strategy (direct or extract-and-join)
//! - `engine`: bounded worker pool and pipeline executor
//! - `app`: batch orchestration and one interactor per operation
//! - `ports` / `adapters`: the encoder gateway and event sink seams and
//!   their ffmpeg, JSON lines and in-memory implementations

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{KeepSegment, MediaInfo, TimeInterval};
pub use error::{ReelcutError, ReelcutResult};
