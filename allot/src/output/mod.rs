//! Output formatting for availability reports and supplier selections.
//!
//! Delimited formats (CSV/TSV) are written by the command-line front end;
//! this module covers the structured and human-readable renderings.

mod formatters;

use crate::operations::{AvailabilityDay, AvailabilityStats, SelectionResult};
use crate::Result;

pub use formatters::{HumanFormatter, JsonFormatter};

/// Renders engine results as text.
pub trait OutputFormatter {
    /// Format one record per day.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_days(&self, days: &[AvailabilityDay]) -> Result<String>;

    /// Format a stats roll-up.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_stats(&self, stats: &AvailabilityStats) -> Result<String>;

    /// Format the outcome of a supplier selection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_selection(&self, selection: &SelectionResult) -> Result<String>;
}

/// Report styles supported by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Pretty-printed JSON.
    Json,
    /// Aligned columns for a terminal.
    Human,
}

impl ReportFormat {
    /// Create a formatter for this output format.
    #[must_use]
    pub fn create_formatter(self) -> Box<dyn OutputFormatter> {
        match self {
            Self::Json => Box::new(JsonFormatter),
            Self::Human => Box::new(HumanFormatter),
        }
    }
}
