use super::{Formatter, TrialReport};
use crate::gait::Locomotion;
use crate::gait::scalars::lookup;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

fn value(v: f64) -> String {
    if v.is_nan() { "n/a".to_string() } else { format!("{:.3}", v) }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &TrialReport) -> String {
        let locomotion = match report.locomotion {
            Locomotion::Overground => "overground".to_string(),
            Locomotion::Treadmill { belt_speed } => format!("treadmill {:.3} m/s", belt_speed),
        };
        let mut lines = vec![format!(
            "Trial {}: {} leg, {} cycle(s), {}",
            report.trial, report.leg, report.cycles, locomotion
        )];

        for (name, scalar) in &report.scalars {
            let unit = lookup(name).map_or("", |c| c.unit);
            let mut line = format!("  {:<16} {:>8} {}", name, value(scalar.mean), unit);
            if self.verbose {
                let per_cycle: Vec<String> = scalar.per_cycle.iter().map(|&v| value(v)).collect();
                line.push_str(&format!("  [{}]", per_cycle.join(", ")));
            }
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }
}
