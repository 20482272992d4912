//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use dossier_pipeline::bios::BirthYear;
use dossier_pipeline::boards::{Evaluation, EVALUATION_LABELS};
use serde::Serialize;
use serde_json::Value;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a flat report (run counts, token statistics) as key/value rows.
    pub fn format_report<T: Serialize>(&self, title: &str, report: &T) -> Result<String> {
        let value = serde_json::to_value(report)?;
        if let OutputFormat::Json = self.format {
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut builder = Builder::default();
        builder.push_record([title, ""]);
        if let Value::Object(map) = &value {
            for (key, v) in map {
                builder.push_record([key.replace('_', " "), display_value(v)]);
            }
        }
        Ok(self.render(builder))
    }

    /// Format confusion matrices and the agreement score.
    pub fn format_evaluation(&self, evaluation: &Evaluation) -> Result<String> {
        if let OutputFormat::Json = self.format {
            return Ok(serde_json::to_string_pretty(evaluation)?);
        }
        if evaluation.rows == 0 {
            return Ok(self.colorize("No rows to compare.", "yellow"));
        }

        let mut sections = Vec::with_capacity(evaluation.matrices.len() + 1);
        for matrix in &evaluation.matrices {
            let mut builder = Builder::default();
            let mut header = vec![format!("{} (true \\ pred)", matrix.field)];
            header.extend(EVALUATION_LABELS.iter().map(|l| l.to_string()));
            builder.push_record(header);
            for (label, counts) in EVALUATION_LABELS.iter().zip(matrix.counts.iter()) {
                let mut row = vec![label.to_string()];
                row.extend(counts.iter().map(|c| c.to_string()));
                builder.push_record(row);
            }
            sections.push(self.render(builder));
        }

        let cells = evaluation.rows * evaluation.matrices.len();
        sections.push(self.info(&format!(
            "Agreement: {} of {} answers across {} documents",
            evaluation.agreement, cells, evaluation.rows
        )));
        Ok(sections.join("\n"))
    }

    /// Format birth-year answers.
    pub fn format_birth_years(&self, answers: &[BirthYear]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(answers)?),
            OutputFormat::Table => {
                if answers.is_empty() {
                    return Ok(self.colorize("No birth years found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Candid", "Birth Year"]);
                for answer in answers {
                    builder.push_record([answer.candid.as_str(), answer.answer.as_str()]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{:.2}", f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
