//! Shared fixtures: a scripted encoder gateway and wiring helpers

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use reelcut::adapters::MemorySink;
use reelcut::app::container::DefaultAppContainer;
use reelcut::domain::model::{AudioInfo, MediaInfo};
use reelcut::ports::{EncodeRequest, EncoderGateway};
use reelcut::DomainError;

type Predicate = Box<dyn Fn(&EncodeRequest) -> bool + Send + Sync>;

/// Gateway that writes placeholder outputs instead of running ffmpeg
pub struct MockGateway {
    default_info: MediaInfo,
    info_by_file: HashMap<String, MediaInfo>,
    probe_failures: HashSet<String>,
    failures: Vec<Predicate>,
    tiny_wav: bool,
    tiny_aac: bool,
    calls: Mutex<Vec<EncodeRequest>>,
}

impl MockGateway {
    pub fn new(default_info: MediaInfo) -> Self {
        Self {
            default_info,
            info_by_file: HashMap::new(),
            probe_failures: HashSet::new(),
            failures: Vec::new(),
            tiny_wav: false,
            tiny_aac: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_info(mut self, file: &str, info: MediaInfo) -> Self {
        self.info_by_file.insert(file.to_string(), info);
        self
    }

    pub fn probe_fails(mut self, file: &str) -> Self {
        self.probe_failures.insert(file.to_string());
        self
    }

    /// Fail every encode whose request matches
    pub fn fail_if(mut self, predicate: impl Fn(&EncodeRequest) -> bool + Send + Sync + 'static) -> Self {
        self.failures.push(Box::new(predicate));
        self
    }

    /// WAV conversions succeed but produce files below the size threshold
    pub fn tiny_wav(mut self) -> Self {
        self.tiny_wav = true;
        self
    }

    /// The raw AAC copy succeeds but is below the size threshold
    pub fn tiny_aac(mut self) -> Self {
        self.tiny_aac = true;
        self
    }

    pub fn calls(&self) -> Vec<EncodeRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EncoderGateway for MockGateway {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, DomainError> {
        let name = file_name(path);
        if self.probe_failures.contains(&name) {
            return Err(DomainError::ProbeFail("moov atom not found".into()));
        }
        Ok(self
            .info_by_file
            .get(&name)
            .cloned()
            .unwrap_or_else(|| self.default_info.clone()))
    }

    async fn encode(&self, request: &EncodeRequest) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(request.clone());
        if self.failures.iter().any(|fail| fail(request)) {
            return Err(DomainError::tool("Conversion failed!"));
        }
        let name = file_name(&request.output);
        let size = if (self.tiny_wav && name.ends_with(".wav")) || (self.tiny_aac && name.ends_with(".aac")) {
            10
        } else {
            2048
        };
        std::fs::write(&request.output, vec![0u8; size])?;
        Ok(())
    }

    async fn hardware_encoder_available(&self) -> bool {
        false
    }

    fn tool_path(&self) -> String {
        "/usr/local/bin/ffmpeg".into()
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn video_info(duration: f64) -> MediaInfo {
    MediaInfo::new(1280, 720, duration, 30.0, 2_000_000, "h264".into())
        .unwrap()
        .with_audio(AudioInfo {
            sample_rate: 48_000,
            channels: 2,
            codec: "aac".into(),
        })
}

pub fn silent_info(duration: f64) -> MediaInfo {
    MediaInfo::new(1280, 720, duration, 30.0, 2_000_000, "h264".into()).unwrap()
}

/// Source files with placeholder content inside a fresh directory
pub fn sources(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let paths = names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            std::fs::write(&path, b"not really a video").unwrap();
            path
        })
        .collect();
    (dir, paths)
}

/// Container wired to the mock gateway and an in-memory sink
pub fn container(gateway: Arc<MockGateway>, workers: usize) -> (DefaultAppContainer, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let container = DefaultAppContainer::with_parts(gateway, sink.clone(), workers);
    (container, sink)
}
