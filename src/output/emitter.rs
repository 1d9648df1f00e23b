//! Ordered emission of event records

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::output::events::*;
use crate::ports::EventSink;

/// Cloneable handle that is the only writer of the event stream
///
/// Records after the terminal `complete` record are dropped.
#[derive(Clone)]
pub struct EventEmitter {
    sink: Arc<dyn EventSink>,
    finished: Arc<AtomicBool>,
}

impl EventEmitter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn emit(&self, event: Event) {
        if self.finished.load(Ordering::SeqCst) {
            warn!(kind = event.kind(), "Event after completion dropped");
            return;
        }
        if matches!(event, Event::Complete { .. }) {
            self.finished.store(true, Ordering::SeqCst);
        }
        self.sink.emit(&event);
    }

    pub fn start(&self, start: RunStart) {
        self.emit(Event::Start(start));
    }

    pub fn progress(&self, current_file: usize, total_files: usize, filename: &str) {
        self.emit(Event::Progress {
            current_file,
            total_files,
            filename: filename.to_string(),
        });
    }

    pub fn file_start(&self, file: &str, path: &str) {
        self.emit(Event::FileStart {
            file: file.to_string(),
            path: path.to_string(),
        });
    }

    pub fn file_complete(&self, completion: FileCompletion) {
        self.emit(Event::FileComplete(completion));
    }

    pub fn file_error(&self, failure: FileFailure) {
        self.emit(Event::FileError(failure));
    }

    /// Terminal summary; counts are derived from the result list
    pub fn complete(&self, results: Vec<FileReport>) {
        let successful = results.iter().filter(|r| r.success).count();
        self.emit(Event::Complete {
            total_files: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        });
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Event::Error {
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::event_sink::MemorySink;

    #[test]
    fn test_complete_is_terminal() {
        let sink = Arc::new(MemorySink::new());
        let emitter = EventEmitter::new(sink.clone());
        emitter.error("File not found: missing.mp4");
        emitter.complete(vec![FileReport::failed("a.mp4", "boom".into())]);
        emitter.progress(1, 1, "late.mp4");

        assert_eq!(sink.kinds(), vec!["error", "complete"]);
        let complete = &sink.events()[1];
        assert_eq!(complete["successful"], 0);
        assert_eq!(complete["failed"], 1);
    }
}
