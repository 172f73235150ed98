use super::{Formatter, TrialReport};

/// One row per scalar; per-cycle values are separated by `;`
pub struct CsvFormatter;

fn value(v: f64) -> String {
    if v.is_nan() { String::new() } else { format!("{:.4}", v) }
}

impl Formatter for CsvFormatter {
    fn format(&self, report: &TrialReport) -> String {
        report
            .scalars
            .iter()
            .map(|(name, scalar)| {
                let per_cycle: Vec<String> = scalar.per_cycle.iter().map(|&v| value(v)).collect();
                format!(
                    "{},{},{},{},{:.4},{},{},{}",
                    report.ts,
                    report.trial,
                    report.leg,
                    report.cycles,
                    report.locomotion.speed(),
                    name,
                    value(scalar.mean),
                    per_cycle.join(";")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,trial,leg,cycles,treadmill_speed,scalar,mean,per_cycle")
    }
}
