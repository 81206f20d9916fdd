//! Batch render reporting.
//!
//! A render over a group runs one handler per component; this module
//! collects the per-component outcomes and prints them as a table, so one
//! failing component never hides the results of the others.

use colored::Colorize;

use crate::registry::RenderResult;

/// One rendered (or attempted) scope in a batch.
struct Row {
    target: String,
    outcome: Outcome,
}

enum Outcome {
    Rendered,
    NotImplemented,
    Failed(String),
}

/// Accumulates render outcomes and prints a summary table.
#[derive(Default)]
pub struct RenderReport {
    rows: Vec<Row>,
}

impl RenderReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one render attempt.
    ///
    /// `Err` means the handler could not even attempt the render
    /// (configuration problem); it is reported like a tool failure and the
    /// batch continues.
    pub fn push(&mut self, target: String, result: anyhow::Result<RenderResult>) {
        let outcome = match result {
            Ok(RenderResult::Success) => Outcome::Rendered,
            Ok(RenderResult::NotImplemented) => Outcome::NotImplemented,
            Ok(RenderResult::ExternalToolFailure { code, stderr }) => {
                let detail = match code {
                    Some(code) if stderr.is_empty() => format!("exit code {}", code),
                    Some(code) => format!("exit code {}: {}", code, first_line(&stderr)),
                    None => first_line(&stderr).to_string(),
                };
                Outcome::Failed(detail)
            }
            Err(e) => Outcome::Failed(format!("{:#}", e)),
        };
        self.rows.push(Row { target, outcome });
    }

    /// Number of failed rows.
    pub fn failures(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed(_)))
            .count()
    }

    /// Prints the per-target table and a totals line.
    pub fn print(&self) {
        let width = self
            .rows
            .iter()
            .map(|r| r.target.chars().count())
            .max()
            .unwrap_or(6)
            .max(6);

        println!("{:<w$}  {}", "TARGET".bold(), "STATUS".bold(), w = width);
        for row in &self.rows {
            let target = format!("{:<w$}", row.target, w = width);
            match &row.outcome {
                Outcome::Rendered => println!("{}  {}", target.cyan(), "rendered".green()),
                Outcome::NotImplemented => {
                    println!("{}  {}", target.cyan(), "not implemented".dimmed())
                }
                Outcome::Failed(detail) => {
                    println!("{}  {} {}", target.cyan(), "failed:".red().bold(), detail)
                }
            }
        }

        let rendered = self
            .rows
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Rendered))
            .count();
        println!();
        println!(
            "{} {} rendered, {} failed, {} total",
            "summary:".dimmed(),
            rendered,
            self.failures(),
            self.rows.len()
        );
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_failures_without_aborting() {
        let mut report = RenderReport::new();
        report.push("mat".into(), Ok(RenderResult::Success));
        report.push(
            "mrk".into(),
            Ok(RenderResult::ExternalToolFailure {
                code: Some(1),
                stderr: "! Emergency stop.".into(),
            }),
        );
        report.push("luk".into(), Ok(RenderResult::NotImplemented));
        report.push("jhn".into(), Err(anyhow::anyhow!("missing setting")));
        assert_eq!(report.failures(), 2);
        assert_eq!(report.rows.len(), 4);
    }
}
