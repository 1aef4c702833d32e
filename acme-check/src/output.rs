//! Rendering of scan results for the terminal.
//!
//! Plain mode prints one line per problem; `--pretty` adds details and a
//! summary. Uses only the `console` crate for colors.

use acme_check_lib::{Evaluation, Problem, Severity, ValidationMethod};
use console::style;
use serde::Serialize;

/// Everything the CLI prints about one scan.
#[derive(Debug, Serialize)]
pub struct Report {
    pub domain: String,
    pub method: String,
    pub problems: Vec<Problem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    pub fn new(domain: &str, method: &ValidationMethod, evaluation: Evaluation) -> Self {
        let error = evaluation.error().map(|e| e.to_string());
        Self {
            domain: domain.to_string(),
            method: method.to_string(),
            problems: evaluation.problems,
            error,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self, pretty: bool) -> String {
        let mut lines = Vec::new();

        if self.problems.is_empty() && self.error.is_none() {
            lines.push(format!(
                "{} {} looks ready for {}",
                style("✓").green().bold(),
                style(&self.domain).bold(),
                self.method
            ));
            return lines.join("\n");
        }

        for problem in &self.problems {
            lines.push(format!(
                "{} {}: {}",
                severity_label(problem.severity),
                style(&problem.name).bold(),
                problem.explanation
            ));
            if pretty && !problem.detail.is_empty() {
                lines.push(format!("    {}", style(&problem.detail).dim()));
            }
        }

        if pretty {
            let fatal = self.problems.iter().filter(|p| p.is_fatal()).count();
            lines.push(String::new());
            lines.push(
                style(format!(
                    "Summary: {} problem{} for {} ({}), {} fatal",
                    self.problems.len(),
                    if self.problems.len() == 1 { "" } else { "s" },
                    self.domain,
                    self.method,
                    fatal
                ))
                .dim()
                .to_string(),
            );
        }

        lines.join("\n")
    }
}

fn severity_label(severity: Severity) -> String {
    let label = format!("{:<7}", severity.to_string().to_uppercase());
    match severity {
        Severity::Fatal => style(label).red().bold().to_string(),
        Severity::Error => style(label).red().to_string(),
        Severity::Warning => style(label).yellow().to_string(),
        Severity::Debug => style(label).dim().to_string(),
    }
}
