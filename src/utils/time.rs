//! Time formatting for tool arguments

/// Format seconds with microsecond precision for tool arguments
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.6}", seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "0.000000");
        assert_eq!(format_seconds(5.0), "5.000000");
        assert_eq!(format_seconds(1.0 / 3.0), "0.333333");
        assert_eq!(format_seconds(12.3456789), "12.345679");
    }
}
