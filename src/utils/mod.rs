//! Common utilities and helpers

pub mod logging;
pub mod path;
pub mod time;

pub use path::OutputLayout;
pub use time::format_seconds;

/// Utility functions for reelcut
pub struct Utils;

impl Utils {
    /// Format file size for display, one decimal place, base 1024
    pub fn format_file_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Keep the first `limit` characters of tool output
pub fn truncate_diagnostic(text: &str, limit: usize) -> String {
    text.trim().chars().take(limit).collect()
}
