//! Terminal output utilities
//!
//! Status lines, plain-text tables and JSON output for the `workorder`
//! command.

use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde::Serialize;
use workorder_api_client::models::{WorkOrder, WorkOrderPriority, WorkOrderStatus};

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Left-aligned plain-text table
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Table with the given column headers
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty, extra cells are dropped
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).take(self.headers.len()).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render with two spaces between columns and a rule under the header
    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|i| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(self.headers[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(&self.headers)];
        out.push(widths.iter().map(|w| "─".repeat(*w)).collect::<Vec<_>>().join("  "));
        out.extend(self.rows.iter().map(|row| line(row)));
        out.join("\n")
    }
}

/// Table of work orders as shown by `orders list`
pub fn work_order_table(orders: &[WorkOrder]) -> Table {
    let mut table = Table::new(["ID", "TITLE", "STATUS", "PRIORITY", "LOCATION"]);
    for order in orders {
        table.add_row([
            order.id.clone(),
            truncate(&order.title, 40),
            order.status.to_string(),
            order.priority.to_string(),
            order.location.as_ref().map(|l| l.name.clone()).unwrap_or_default(),
        ]);
    }
    table
}

/// Status label in its theme color
pub fn colorize_status(status: WorkOrderStatus) -> String {
    let label = status.as_str();
    match status {
        WorkOrderStatus::Open => label.blue().to_string(),
        WorkOrderStatus::InProgress | WorkOrderStatus::OnHold => label.yellow().to_string(),
        WorkOrderStatus::Completed => label.green().to_string(),
        WorkOrderStatus::Cancelled => label.red().to_string(),
    }
}

/// Priority label in its theme color
pub fn colorize_priority(priority: WorkOrderPriority) -> String {
    let label = priority.as_str();
    match priority {
        WorkOrderPriority::Low => label.blue().to_string(),
        WorkOrderPriority::Medium => label.yellow().to_string(),
        WorkOrderPriority::High => label.red().bold().to_string(),
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
