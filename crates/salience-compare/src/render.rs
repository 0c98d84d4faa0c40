//! Presentation adapter
//!
//! Renders a [`ComparisonTable`] as an aligned text grid, a Markdown table,
//! or a JSON array of records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::ComparisonTable;

/// Shown instead of an empty grid
pub const NO_ENTITIES_MESSAGE: &str = "No entities found or no text provided.";

/// Output formats supported by [`render`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Markdown,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "unknown output format '{s}' (expected table, markdown or json)"
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Render a table in the requested format
pub fn render(table: &ComparisonTable, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => render_text(table),
        OutputFormat::Markdown => render_markdown(table),
        OutputFormat::Json => render_json(table),
    }
}

/// Render a table, or [`NO_ENTITIES_MESSAGE`] when it has no rows
pub fn render_or_message(table: &ComparisonTable, format: OutputFormat) -> String {
    if table.is_empty() {
        NO_ENTITIES_MESSAGE.to_string()
    } else {
        render(table, format)
    }
}

fn grid(table: &ComparisonTable) -> Vec<Vec<String>> {
    let mut lines = vec![table.headers()];
    for row in &table.rows {
        let mut line = vec![row.entity.clone(), row.entity_type.to_string()];
        line.extend(row.cells.iter().cloned());
        lines.push(line);
    }
    lines
}

fn render_text(table: &ComparisonTable) -> String {
    let lines = grid(table);
    let columns = lines[0].len();

    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            lines
                .iter()
                .map(|line| line[i].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |line: &[String]| {
        line.iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");

    let mut out = vec![format_line(lines[0].as_slice()), separator];
    out.extend(lines[1..].iter().map(|line| format_line(line.as_slice())));
    out.join("\n")
}

fn render_markdown(table: &ComparisonTable) -> String {
    let lines = grid(table);
    let columns = lines[0].len();

    let format_line = |line: &[String]| {
        let cells: Vec<String> = line.iter().map(|c| c.replace('|', "\\|")).collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut out = vec![
        format_line(lines[0].as_slice()),
        format!("|{}", " --- |".repeat(columns)),
    ];
    out.extend(lines[1..].iter().map(|line| format_line(line.as_slice())));
    out.join("\n")
}

fn render_json(table: &ComparisonTable) -> String {
    let records = Value::Array(
        table
            .to_records()
            .into_iter()
            .map(Value::Object)
            .collect(),
    );
    format!("{records:#}")
}
