// Adapters - External system implementations

pub mod event_sink;
pub mod exec_ffmpeg;
pub mod probe_ffprobe;
pub mod process;
pub mod toml_config;

// Re-export adapters
pub use event_sink::{JsonLinesSink, MemorySink};
pub use exec_ffmpeg::FfmpegGateway;
pub use probe_ffprobe::FfprobeAdapter;
pub use process::ToolCommand;
pub use toml_config::TomlSettingsAdapter;
