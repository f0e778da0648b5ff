//! Availability command implementation.
//!
//! This module implements the `availability` command, which derives
//! per-day availability for a variant over a window and prints it with
//! window totals in various formats (table, JSON, CSV, TSV).

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, resolve_org, resolve_window, GlobalOptions};
use allot::config::OutputFormat as ConfigFormat;
use allot::output::ReportFormat;
use allot::{
    AvailabilityDay, AvailabilityQuery, AvailabilityStats, StatsAggregator, SupplierId, VariantId,
};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use std::io::Write;

/// Column headers for CSV/TSV output.
const COLUMN_HEADERS: [&str; 10] = [
    "date",
    "inventory",
    "available",
    "booked",
    "held",
    "utilization_percentage",
    "sellability",
    "closed",
    "unbounded",
    "buckets",
];

/// Show per-day availability and totals.
#[derive(Args)]
pub struct AvailabilityCommand {
    /// Variant to report on
    #[arg(long)]
    pub variant: VariantId,

    /// Single date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// First date of the window
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last date of the window (inclusive)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Only count this supplier's buckets
    #[arg(long)]
    pub supplier: Option<SupplierId>,

    /// Output format (defaults to output_format from config, then table)
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,

    /// Low-availability threshold in percent
    #[arg(long, value_name = "PERCENT")]
    pub threshold: Option<f64>,
}

/// Output format for the availability command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned table with a totals block
    Table,
    /// JSON object with `days` and `totals`
    Json,
    /// CSV format
    Csv,
    /// TSV format (tab-separated values)
    Tsv,
}

impl From<ConfigFormat> for OutputFormat {
    fn from(format: ConfigFormat) -> Self {
        match format {
            ConfigFormat::Table => OutputFormat::Table,
            ConfigFormat::Json => OutputFormat::Json,
            ConfigFormat::Csv => OutputFormat::Csv,
            ConfigFormat::Tsv => OutputFormat::Tsv,
        }
    }
}

impl AvailabilityCommand {
    /// Execute the availability command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        // 1. Load configuration
        let config = load_configuration(global)?;
        let org = resolve_org(&config)?;
        let window = resolve_window(self.date, self.from, self.to)?;

        let threshold = self.threshold.unwrap_or_else(|| config.low_threshold_percent());
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(CliError::InvalidArguments(format!(
                "--threshold must be between 0 and 100, got {threshold}"
            )));
        }
        let format = self
            .format
            .or_else(|| config.output_format.map(OutputFormat::from))
            .unwrap_or(OutputFormat::Table);

        // 2. Open database (reads only)
        let db = open_database(global, &config)?;

        // 3. Derive the days and their totals
        let days = AvailabilityQuery::new(org, self.variant, window)
            .with_supplier(self.supplier)
            .with_threshold(threshold)
            .generate(db.connection())
            .collect::<allot::Result<Vec<_>>>()?;
        let stats = StatsAggregator::new(threshold).aggregate(&days);

        // 4. Format and output to stdout
        match format {
            OutputFormat::Table => format_as_table(&days, &stats)?,
            OutputFormat::Json => format_as_json(&days, &stats)?,
            OutputFormat::Csv => format_as_delimited(&days, b',')?,
            OutputFormat::Tsv => format_as_delimited(&days, b'\t')?,
        }

        Ok(())
    }
}

fn format_as_table(days: &[AvailabilityDay], stats: &AvailabilityStats) -> Result<(), CliError> {
    let formatter = ReportFormat::Human.create_formatter();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    write!(handle, "{}", formatter.format_days(days)?)?;
    writeln!(handle)?;
    write!(handle, "{}", formatter.format_stats(stats)?)?;

    Ok(())
}

fn format_as_json(days: &[AvailabilityDay], stats: &AvailabilityStats) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    let report = serde_json::json!({
        "days": days,
        "totals": stats,
    });
    serde_json::to_writer_pretty(&mut handle, &report)?;
    writeln!(handle)?;

    Ok(())
}

/// Format days as delimited output (CSV or TSV).
fn format_as_delimited(days: &[AvailabilityDay], delimiter: u8) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(handle);

    writer.write_record(COLUMN_HEADERS)?;

    for day in days {
        writer.write_record(&[
            day.date.to_string(),
            day.total_inventory.to_string(),
            day.total_available.to_string(),
            day.total_booked.to_string(),
            day.total_held.to_string(),
            format!("{:.1}", day.utilization_percentage),
            day.sellability.map(|s| s.to_string()).unwrap_or_default(),
            day.closed.to_string(),
            day.unbounded.to_string(),
            day.buckets.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
