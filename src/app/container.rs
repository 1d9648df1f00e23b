use std::sync::Arc;

use crate::adapters::{FfmpegGateway, JsonLinesSink};
use crate::app::{
    BatchOrchestrator, ClipInteractor, GifInteractor, SeparateInteractor, SplitInteractor,
};
use crate::config_initialization::ToolSettings;
use crate::output::EventEmitter;
use crate::ports::{EncoderGateway, EventSink};

pub trait AppContainer: Send + Sync {
    fn orchestrator(&self) -> BatchOrchestrator;
    fn split_interactor(&self) -> Arc<SplitInteractor>;
    fn separate_interactor(&self) -> Arc<SeparateInteractor>;
    fn gif_interactor(&self) -> Arc<GifInteractor>;
    fn clip_interactor(&self) -> Arc<ClipInteractor>;
}

/// Wires the gateway and event sink into the interactors
pub struct DefaultAppContainer {
    gateway: Arc<dyn EncoderGateway>,
    emitter: EventEmitter,
    default_workers: usize,
}

impl DefaultAppContainer {
    /// Production wiring: ffmpeg subprocesses and JSON lines on stdout
    pub fn new(settings: &ToolSettings) -> Self {
        let gateway = Arc::new(FfmpegGateway::new(
            settings.ffmpeg.clone(),
            settings.ffprobe.clone(),
            settings.timeout(),
        ));
        Self::with_parts(gateway, Arc::new(JsonLinesSink::stdout()), settings.default_workers)
    }

    pub fn with_parts(
        gateway: Arc<dyn EncoderGateway>,
        sink: Arc<dyn EventSink>,
        default_workers: usize,
    ) -> Self {
        Self {
            gateway,
            emitter: EventEmitter::new(sink),
            default_workers,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn orchestrator(&self) -> BatchOrchestrator {
        BatchOrchestrator::new(
            Arc::clone(&self.gateway),
            self.emitter.clone(),
            self.default_workers,
        )
    }

    fn split_interactor(&self) -> Arc<SplitInteractor> {
        Arc::new(SplitInteractor::new(Arc::clone(&self.gateway)))
    }

    fn separate_interactor(&self) -> Arc<SeparateInteractor> {
        Arc::new(SeparateInteractor::new(Arc::clone(&self.gateway)))
    }

    fn gif_interactor(&self) -> Arc<GifInteractor> {
        Arc::new(GifInteractor::new(Arc::clone(&self.gateway)))
    }

    fn clip_interactor(&self) -> Arc<ClipInteractor> {
        Arc::new(ClipInteractor::new(Arc::clone(&self.gateway)))
    }
}
