//! Output formatter implementations.

use std::fmt::Write as _;

use serde::Serialize;

use crate::operations::{AvailabilityDay, AvailabilityStats, SelectionResult};
use crate::{Error, Result};

use super::OutputFormatter;

const DAY_HEADERS: [&str; 8] = [
    "DATE",
    "INVENTORY",
    "AVAILABLE",
    "BOOKED",
    "HELD",
    "UTIL%",
    "STATUS",
    "BUCKETS",
];

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Validation {
        field: "json_output".to_string(),
        message: format!("failed to serialize to JSON: {e}"),
    })
}

/// Formatter for JSON output.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_days(&self, days: &[AvailabilityDay]) -> Result<String> {
        to_json(days)
    }

    fn format_stats(&self, stats: &AvailabilityStats) -> Result<String> {
        to_json(stats)
    }

    fn format_selection(&self, selection: &SelectionResult) -> Result<String> {
        to_json(selection)
    }
}

/// Formatter for human-readable output.
pub struct HumanFormatter;

/// Display cells for one day; unbounded days show `unbounded` in place of counts.
fn day_cells(day: &AvailabilityDay) -> [String; 8] {
    let (inventory, available) = if day.unbounded {
        ("unbounded".to_string(), "unbounded".to_string())
    } else {
        (day.total_inventory.to_string(), day.total_available.to_string())
    };
    [
        day.date.to_string(),
        inventory,
        available,
        day.total_booked.to_string(),
        day.total_held.to_string(),
        format!("{:.1}", day.utilization_percentage),
        day.sellability
            .map_or_else(|| "-".to_string(), |s| s.to_string()),
        day.buckets.to_string(),
    ]
}

impl OutputFormatter for HumanFormatter {
    fn format_days(&self, days: &[AvailabilityDay]) -> Result<String> {
        if days.is_empty() {
            return Ok("No days in range.".to_string());
        }

        let rows: Vec<[String; 8]> = days.iter().map(day_cells).collect();
        let mut widths = DAY_HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = DAY_HEADERS
            .iter()
            .zip(widths)
            .map(|(h, w)| format!("{h:<w$}"))
            .collect();
        out.push_str(header.join("  ").trim_end());
        for row in rows {
            let line: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, w)| format!("{cell:<w$}"))
                .collect();
            out.push('\n');
            out.push_str(line.join("  ").trim_end());
        }
        Ok(out)
    }

    fn format_stats(&self, stats: &AvailabilityStats) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "Days:              {}", stats.days);
        let _ = writeln!(out, "Inventory:         {}", stats.total_inventory);
        let _ = writeln!(out, "Available:         {}", stats.total_available);
        let _ = writeln!(out, "Booked:            {}", stats.total_booked);
        let _ = writeln!(out, "Held:              {}", stats.total_held);
        let _ = writeln!(out, "Utilization:       {:.1}%", stats.utilization_percentage);
        let _ = writeln!(out, "Sold out days:     {}", stats.sold_out_days);
        let _ = writeln!(out, "Low days:          {}", stats.low_availability_days);
        let _ = writeln!(out, "Closed days:       {}", stats.closed_days);
        let _ = write!(out, "Unbounded days:    {}", stats.unbounded_days);
        Ok(out)
    }

    fn format_selection(&self, selection: &SelectionResult) -> Result<String> {
        let mut out = format!(
            "Sell price {} {} per unit, total margin {} {}",
            selection.sell_price, selection.currency, selection.total_margin, selection.currency
        );
        for part in &selection.supplier_breakdown {
            let _ = write!(
                out,
                "\n  supplier {}: {} x {} (bucket {}, reservation {}, margin {})",
                part.supplier_id,
                part.quantity,
                part.unit_cost,
                part.bucket,
                part.reservation,
                part.margin
            );
        }
        Ok(out)
    }
}
