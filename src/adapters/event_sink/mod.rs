//! Event sinks: JSON lines to a writer, or an in-memory record list

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::error;

use crate::output::events::Event;
use crate::ports::EventSink;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_json_line<T: serde::Serialize>(writer: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, value)
        .map_err(|e| io::Error::other(format!("serialize event: {}", e)))?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// One JSON object per line, flushed after every record
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn emit(&self, event: &Event) {
        let mut guard = lock(&self.writer);
        if let Err(e) = write_json_line(&mut *guard, event) {
            error!(kind = event.kind(), "Failed to write event: {}", e);
        }
    }
}

/// Keeps every record as a JSON value
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<Value>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Value> {
        lock(&self.events).clone()
    }

    /// The `event` field of every record, in order
    pub fn kinds(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .map(|e| e["event"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn of_kind(&self, kind: &str) -> Vec<Value> {
        lock(&self.events)
            .iter()
            .filter(|e| e["event"] == kind)
            .cloned()
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &Event) {
        match serde_json::to_value(event) {
            Ok(value) => lock(&self.events).push(value),
            Err(e) => error!(kind = event.kind(), "Failed to record event: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_lines_are_newline_delimited() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(&Event::Error {
            message: "No valid files to process".into(),
        });
        sink.emit(&Event::Progress {
            current_file: 1,
            total_files: 2,
            filename: "a.mp4".into(),
        });

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"event":"error","message":"No valid files to process"}"#);
        let progress: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(progress["current_file"], 1);
        assert!(text.ends_with('\n'));
    }
}
