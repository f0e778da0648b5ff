//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including data directory resolution, configuration loading, database
//! management, and date window parsing.

use crate::error::CliError;
use allot::database::{self, DATABASE_FILE_NAME};
use allot::operations::ItemStatus;
use allot::{
    Config, ConfigBuilder, Database, DatabaseConfig, DateRange, ExecutionResult, OrgId,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;
use std::time::Duration;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds).
    pub busy_timeout: Option<u32>,

    /// Tenant to act for.
    pub org: Option<String>,

    /// Disable automatic database initialization.
    pub disable_autoinit: bool,
}

/// Resolve the data directory: `--data-dir`, then `ALLOT_DATA_DIR`, then `~/.allot`.
pub fn resolve_data_dir(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    match global.data_dir {
        Some(ref dir) => Ok(dir.clone()),
        None => database::resolve_data_dir()
            .map_err(|_| CliError::Config("Could not determine home directory".to_string())),
    }
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Global options (highest priority)
/// 2. Environment variables
/// 3. Configuration files
/// 4. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let data_dir = resolve_data_dir(global)?;
    let mut builder = ConfigBuilder::new().with_data_dir(&data_dir);

    if global.org.is_some() {
        builder = builder.with_config(Config {
            org: global.org.clone(),
            ..Config::default()
        });
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

/// The tenant every command acts for.
pub fn resolve_org(config: &Config) -> Result<OrgId, CliError> {
    let raw = config.org.as_deref().ok_or_else(|| {
        CliError::InvalidArguments(
            "no organization given (use --org, ALLOT_ORG, or `org` in a config file)".to_string(),
        )
    })?;
    OrgId::new(raw).map_err(|e| CliError::InvalidArguments(e.to_string()))
}

/// Open database with configuration.
///
/// # Errors
///
/// Returns `NoDataDirectory` if the database doesn't exist and auto-init is disabled.
pub fn open_database(global: &GlobalOptions, config: &Config) -> Result<Database, CliError> {
    let db_path = resolve_data_dir(global)?.join(DATABASE_FILE_NAME);

    let autoinit_disabled = global.disable_autoinit || config.disable_autoinit == Some(true);
    if !db_path.exists() && autoinit_disabled {
        return Err(CliError::NoDataDirectory);
    }

    let timeout_seconds = global
        .busy_timeout
        .map_or_else(|| config.lock_wait_seconds(), u64::from);
    let db_config =
        DatabaseConfig::new(db_path).with_busy_timeout(Duration::from_secs(timeout_seconds));

    Database::open(db_config).map_err(CliError::from)
}

/// Build the date window of a command from `--date` or `--from`/`--to`.
///
/// A lone `--from` covers a single day.
pub fn resolve_window(
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<DateRange, CliError> {
    match (date, from, to) {
        (Some(day), None, None) => Ok(DateRange::single(day)),
        (None, Some(start), end) => {
            DateRange::new(start, end.unwrap_or(start)).map_err(|e| {
                CliError::InvalidArguments(e.to_string())
            })
        }
        (Some(_), _, _) => Err(CliError::InvalidArguments(
            "use either --date or --from/--to, not both".to_string(),
        )),
        (None, None, Some(_)) => Err(CliError::InvalidArguments(
            "--to requires --from".to_string(),
        )),
        (None, None, None) => Err(CliError::InvalidArguments(
            "a date (--date) or window (--from/--to) is required".to_string(),
        )),
    }
}

/// Print the result of a plan execution.
///
/// Failures always reach stderr; applied and skipped items only when
/// `verbose`. The one-line summary goes to stdout.
pub fn report_execution(result: &ExecutionResult, global: &GlobalOptions) {
    for outcome in &result.outcomes {
        let failed = matches!(outcome.status, ItemStatus::Failed(_));
        if failed || global.verbose {
            let reason = outcome
                .status
                .reason()
                .map(|r| format!(": {r}"))
                .unwrap_or_default();
            eprintln!(
                "  {} {} {}{}",
                outcome.variant,
                outcome.date,
                outcome.status.label(),
                reason
            );
        }
    }

    if !global.quiet {
        for warning in &result.warnings {
            eprintln!("Warning: {warning}");
        }
    }

    let prefix = if result.dry_run { "Dry run: " } else { "" };
    println!(
        "{prefix}{} applied, {} skipped, {} failed",
        result.applied(),
        result.skipped(),
        result.failed()
    );
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_format_timestamp() {
        let ts = DateTime::from_timestamp(1_705_323_045, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-15 12:50:45");
    }

    #[test]
    fn test_window_from_single_date() {
        let window = resolve_window(Some(day(4)), None, None).unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window.start(), day(4));
    }

    #[test]
    fn test_window_from_range() {
        let window = resolve_window(None, Some(day(1)), Some(day(10))).unwrap();
        assert_eq!(window.len(), 10);
    }

    #[test]
    fn test_lone_from_is_one_day() {
        let window = resolve_window(None, Some(day(2)), None).unwrap();
        assert_eq!(window.end(), day(2));
    }

    #[test]
    fn test_window_rejects_bad_combinations() {
        assert!(resolve_window(None, None, None).is_err());
        assert!(resolve_window(Some(day(1)), Some(day(1)), None).is_err());
        assert!(resolve_window(None, None, Some(day(1))).is_err());
        assert!(resolve_window(None, Some(day(5)), Some(day(1))).is_err());
    }

    #[test]
    fn test_resolve_org_requires_value() {
        let config = Config::default();
        assert!(matches!(
            resolve_org(&config),
            Err(CliError::InvalidArguments(_))
        ));

        let config = Config {
            org: Some("acme".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_org(&config).unwrap().as_str(), "acme");
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let global = GlobalOptions {
            data_dir: Some(PathBuf::from("/tmp/allot-explicit")),
            ..GlobalOptions::default()
        };
        assert_eq!(
            resolve_data_dir(&global).unwrap(),
            PathBuf::from("/tmp/allot-explicit")
        );
    }
}
