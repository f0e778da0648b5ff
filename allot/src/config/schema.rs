//! Configuration schema definitions.
//!
//! Every field is optional so partial files can be layered; the accessor
//! methods on [`Config`] apply the built-in defaults.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bucket::AllocationType;
use crate::money::Currency;
use crate::operations::{DEFAULT_BATCH_SIZE, DEFAULT_LOW_THRESHOLD_PERCENT};

/// Default lock wait in seconds.
pub const DEFAULT_LOCK_WAIT_SECONDS: u64 = 5;

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use allot::config::{BulkConfig, Config};
///
/// let config = Config {
///     org: Some("acme".to_string()),
///     bulk: Some(BulkConfig {
///         floor_at_zero: Some(false),
///     }),
///     ..Default::default()
/// };
/// assert!(!config.floor_at_zero());
/// assert_eq!(config.batch_size(), 100);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Tenant used when none is given on the command line.
    pub org: Option<String>,

    /// Actions per transaction for bulk operations.
    pub batch_size: Option<usize>,

    /// Threshold in percent below which a day is low on availability.
    pub low_availability_threshold_percent: Option<f64>,

    /// Defaults for availability generation.
    pub generation: Option<GenerationConfig>,

    /// Bulk update settings.
    pub bulk: Option<BulkConfig>,

    /// Disable automatic database initialization.
    pub disable_autoinit: Option<bool>,

    /// Maximum time to wait for database lock acquisition (seconds).
    pub maximum_lock_wait_seconds: Option<u64>,

    /// Output format for availability listings.
    pub output_format: Option<OutputFormat>,
}

impl Config {
    /// Batch size, defaulting to 100.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    /// Low-availability threshold, defaulting to 10%.
    #[must_use]
    pub fn low_threshold_percent(&self) -> f64 {
        self.low_availability_threshold_percent
            .unwrap_or(DEFAULT_LOW_THRESHOLD_PERCENT)
    }

    /// Whether negative adjustments clamp at zero, defaulting to true.
    #[must_use]
    pub fn floor_at_zero(&self) -> bool {
        self.bulk
            .as_ref()
            .and_then(|b| b.floor_at_zero)
            .unwrap_or(true)
    }

    /// Lock wait in seconds, defaulting to 5.
    #[must_use]
    pub fn lock_wait_seconds(&self) -> u64 {
        self.maximum_lock_wait_seconds
            .unwrap_or(DEFAULT_LOCK_WAIT_SECONDS)
    }
}

/// Defaults for availability generation.
///
/// # Examples
///
/// ```
/// use allot::config::GenerationConfig;
///
/// let config: GenerationConfig =
///     serde_yaml::from_str("default_quantity: 12\ncurrency: GBP\n").unwrap();
/// assert_eq!(config.default_quantity, Some(12));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Per-day quantity.
    pub default_quantity: Option<u32>,

    /// Commitment model of generated buckets.
    pub allocation_type: Option<AllocationType>,

    /// Cost currency.
    pub currency: Option<Currency>,

    /// Cost per unit.
    pub unit_cost: Option<Decimal>,

    /// Hold release period in hours.
    pub release_period_hours: Option<u32>,
}

/// Bulk update settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BulkConfig {
    /// Clamp negative adjustments at zero instead of failing the date.
    pub floor_at_zero: Option<bool>,
}

/// Output format for availability listings.
///
/// # Examples
///
/// ```
/// use allot::config::OutputFormat;
///
/// let format = OutputFormat::Json;
/// assert_eq!(format.to_string(), "json");
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output format.
    Json,
    /// CSV output format.
    Csv,
    /// TSV output format.
    Tsv,
    /// Human-readable table format.
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
            Self::Table => write!(f, "table"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}
