use super::{Formatter, TrialReport};

/// One JSON object per trial; unavailable values are `null`
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, report: &TrialReport) -> String {
        serde_json::to_string(report).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}
