//! Size report for a simplification run.

use std::fmt;

use serde::Serialize;

use super::SimplifyOptions;

/// Byte-size comparison between an input artifact and its simplified output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeReport {
    pub original_size: u64,
    pub new_size: u64,
    /// Negative when the output grew
    pub saved_bytes: i64,
    /// `new_size / original_size`, or 0 for an empty input
    pub size_ratio: f64,
    pub precision: u32,
    pub tolerance: f64,
}

impl SizeReport {
    pub fn new(original_size: u64, new_size: u64, options: &SimplifyOptions) -> Self {
        let size_ratio = if original_size == 0 {
            0.0
        } else {
            new_size as f64 / original_size as f64
        };
        Self {
            original_size,
            new_size,
            saved_bytes: original_size as i64 - new_size as i64,
            size_ratio,
            precision: options.precision,
            tolerance: options.tolerance,
        }
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Size reduced from {} bytes to {} bytes ({:.2}% of original, saved {} bytes)",
            self.original_size,
            self.new_size,
            self.size_ratio * 100.0,
            self.saved_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_values() {
        let options = SimplifyOptions::new(3, 0.0005).unwrap();
        let report = SizeReport::new(1000, 250, &options);

        assert_eq!(report.saved_bytes, 750);
        assert_eq!(report.size_ratio, 0.25);
        assert_eq!(report.precision, 3);
        assert_eq!(report.tolerance, 0.0005);
    }

    #[test]
    fn test_report_for_empty_input() {
        let report = SizeReport::new(0, 10, &SimplifyOptions::default());
        assert_eq!(report.size_ratio, 0.0);
        assert_eq!(report.saved_bytes, -10);
    }

    #[test]
    fn test_report_display() {
        let report = SizeReport::new(2000, 500, &SimplifyOptions::default());
        assert_eq!(
            report.to_string(),
            "Size reduced from 2000 bytes to 500 bytes (25.00% of original, saved 1500 bytes)"
        );
    }

    #[test]
    fn test_report_serializes_all_fields() {
        let report = SizeReport::new(100, 50, &SimplifyOptions::default());
        let value = serde_json::to_value(report).unwrap();
        for field in [
            "original_size",
            "new_size",
            "saved_bytes",
            "size_ratio",
            "precision",
            "tolerance",
        ] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
    }
}
