//! Output rendering for azmon (table, json, csv)

use azmon_core::{
    CompositeHealth, FrameData, MetricFindValue, QueryResponse, QueryType, ResultFrame,
};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table (default)
    #[default]
    Table,
    /// One JSON document per emission
    Json,
    /// Comma-separated rows
    Csv,
}

/// Where and how results are printed
pub struct Output {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Informational line, suppressed in quiet mode and for machine formats
    pub fn info(&self, msg: &str) {
        if !self.quiet && self.format == OutputFormat::Table {
            println!("{}", msg.dimmed());
        }
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print one emission of a query run
    pub fn response(&self, emission: usize, response: &QueryResponse) {
        match self.format {
            OutputFormat::Json => print_json(response),
            _ => {
                let rows: Vec<FrameRow> = response.data.iter().map(FrameRow::from).collect();
                if self.format == OutputFormat::Table && !self.quiet {
                    let key = response.key.as_deref().unwrap_or("-");
                    println!("{}", format!("Emission #{} (key {})", emission, key).bold());
                }
                self.rows(&rows);
            }
        }
    }

    pub fn health(&self, health: &CompositeHealth) {
        match self.format {
            OutputFormat::Json => print_json(health),
            OutputFormat::Csv => self.rows(&[HealthRow::from(health)]),
            OutputFormat::Table => {
                let title = if health.status.is_success() {
                    health.title.green()
                } else {
                    health.title.red()
                };
                println!("{}: {}", title.bold(), health.message.trim_end());
            }
        }
    }

    pub fn values(&self, values: &[MetricFindValue]) {
        match self.format {
            OutputFormat::Json => print_json(values),
            _ => {
                let rows: Vec<ValueRow> = values.iter().map(ValueRow::from).collect();
                self.rows(&rows);
            }
        }
    }

    pub fn backends(&self, rows: &[BackendRow]) {
        match self.format {
            OutputFormat::Json => print_json(rows),
            _ => self.rows(rows),
        }
    }

    fn rows<T: Tabled + Serialize>(&self, rows: &[T]) {
        match self.format {
            OutputFormat::Csv => print_csv(rows),
            _ if rows.is_empty() => {
                if !self.quiet {
                    println!("No data");
                }
            }
            _ => println!("{}", Table::new(rows)),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{}", format!("Failed to encode output: {}", e).red()),
    }
}

/// CSV with a header taken from the first row's field names
fn print_csv<T: Serialize>(rows: &[T]) {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = rows
        .iter()
        .filter_map(|r| match serde_json::to_value(r) {
            Ok(serde_json::Value::Object(map)) => Some(map),
            _ => None,
        })
        .collect();
    let Some(first) = records.first() else {
        return;
    };

    let header: Vec<&String> = first.keys().collect();
    println!(
        "{}",
        header.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(",")
    );
    for record in &records {
        let line: Vec<String> = header
            .iter()
            .map(|h| match record.get(*h) {
                Some(serde_json::Value::String(s)) => csv_field(s),
                Some(other) => csv_field(&other.to_string()),
                None => String::new(),
            })
            .collect();
        println!("{}", line.join(","));
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Row types
// =============================================================================

/// One result frame
#[derive(Debug, Tabled, Serialize)]
pub struct FrameRow {
    #[tabled(rename = "Ref")]
    pub ref_id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Size")]
    pub size: usize,
    #[tabled(rename = "Last")]
    pub last: String,
}

impl From<&ResultFrame> for FrameRow {
    fn from(frame: &ResultFrame) -> Self {
        let (kind, size, last) = match &frame.data {
            FrameData::TimeSeries { datapoints } => (
                "series",
                datapoints.len(),
                datapoints
                    .last()
                    .map(|(value, ts)| match value {
                        Some(v) => format!("{} @ {}", v, ts),
                        None => format!("null @ {}", ts),
                    })
                    .unwrap_or_default(),
            ),
            FrameData::Table { columns, rows } => (
                "table",
                rows.len(),
                columns
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" | "),
            ),
        };
        Self {
            ref_id: frame.ref_id.clone(),
            name: frame.name.clone(),
            kind: kind.to_string(),
            size,
            last,
        }
    }
}

/// Composite health, for csv output
#[derive(Debug, Tabled, Serialize)]
pub struct HealthRow {
    pub status: String,
    pub title: String,
    pub message: String,
}

impl From<&CompositeHealth> for HealthRow {
    fn from(health: &CompositeHealth) -> Self {
        Self {
            status: health.status.to_string(),
            title: health.title.clone(),
            message: health.message.clone(),
        }
    }
}

/// One metadata value
#[derive(Debug, Tabled, Serialize)]
pub struct ValueRow {
    #[tabled(rename = "Text")]
    pub text: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl From<&MetricFindValue> for ValueRow {
    fn from(value: &MetricFindValue) -> Self {
        Self {
            text: value.text.clone(),
            value: value.value.clone().unwrap_or_default(),
        }
    }
}

/// One registered backend
#[derive(Debug, Tabled, Serialize)]
pub struct BackendRow {
    #[tabled(rename = "Query type")]
    pub query_type: String,
    #[tabled(rename = "Configured")]
    pub configured: bool,
}

impl BackendRow {
    pub fn new(query_type: QueryType, configured: bool) -> Self {
        Self {
            query_type: query_type.to_string(),
            configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azmon_core::TableColumn;
    use pretty_assertions::assert_eq;

    #[test]
    fn series_row_shows_last_point() {
        let frame = ResultFrame::time_series("A", "cpu", vec![(Some(1.0), 1000), (None, 2000)]);
        let row = FrameRow::from(&frame);
        assert_eq!(row.kind, "series");
        assert_eq!(row.size, 2);
        assert_eq!(row.last, "null @ 2000");
    }

    #[test]
    fn table_row_lists_columns() {
        let frame = ResultFrame::table(
            "B",
            "PrimaryResult",
            vec![TableColumn::new("Computer", "string"), TableColumn::new("Count", "long")],
            vec![vec![serde_json::json!("vm-1"), serde_json::json!(3)]],
        );
        let row = FrameRow::from(&frame);
        assert_eq!(row.kind, "table");
        assert_eq!(row.size, 1);
        assert_eq!(row.last, "Computer | Count");
    }

    #[test]
    fn csv_fields_are_quoted_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
