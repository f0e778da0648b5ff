//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with temporary directories
//! - Command builder helpers for common patterns
//! - Fixtures for suppliers, buckets and rate plans

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Tenant every fixture acts for.
pub const ORG: &str = "acme";

/// Variables that would leak the host environment into a test run.
const ISOLATED_VARS: [&str; 12] = [
    "ALLOT_DATA_DIR",
    "ALLOT_BUSY_TIMEOUT",
    "ALLOT_ORG",
    "ALLOT_DISABLE_AUTOINIT",
    "ALLOT_LOG_MODE",
    "ALLOT_BATCH_SIZE",
    "ALLOT_LOW_AVAILABILITY_THRESHOLD",
    "ALLOT_MAXIMUM_LOCK_WAIT_SECONDS",
    "ALLOT_OUTPUT_FORMAT",
    "ALLOT_FLOOR_AT_ZERO",
    "ALLOT_DEFAULT_QUANTITY",
    "ALLOT_CURRENCY",
];

/// Test environment with isolated data directory.
///
/// This struct provides an isolated test environment with:
/// - A temporary directory used as working directory and home
/// - A separate data directory for the allot database
/// - Helper methods for common CLI operations
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
    /// Path to the allot data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    ///
    /// The data directory is not created; allot creates it on first use.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        let data_dir = temp_path.join("allot-data");

        Self {
            temp_dir,
            temp_path,
            data_dir,
        }
    }

    /// Get a bare command builder without pre-configured flags.
    ///
    /// The environment is scrubbed and the working directory is the
    /// temporary directory, so no host configuration is picked up.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("allot").expect("Failed to find allot binary");
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOME", &self.temp_path);
        cmd.current_dir(&self.temp_path);
        cmd
    }

    /// Get a command builder with the data directory and org pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir")
            .arg(&self.data_dir)
            .arg("--org")
            .arg(ORG);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file under the temporary directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Run a command that must succeed and return its stdout.
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.command().args(args).output().expect("Failed to run allot");
        assert!(
            output.status.success(),
            "allot {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("Invalid UTF-8")
    }

    /// Run a command that prints a single id and return it.
    pub fn run_for_id(&self, args: &[&str]) -> i64 {
        let stdout = self.run(args);
        stdout
            .lines()
            .next()
            .and_then(|line| line.trim().parse().ok())
            .unwrap_or_else(|| panic!("expected an id from {args:?}, got {stdout:?}"))
    }

    /// Initialize the data directory.
    pub fn init(&self) {
        self.command_bare()
            .arg("--data-dir")
            .arg(&self.data_dir)
            .arg("init")
            .assert()
            .success();
    }

    /// Register a supplier and return its id.
    pub fn add_supplier(&self, name: &str, priority: i32) -> i64 {
        self.run_for_id(&["supplier", "add", name, "--priority", &priority.to_string()])
    }

    /// Load a master plan for `dbl` selling at `price` through 2025.
    pub fn load_master_plan(&self, price: u32) {
        let yaml = format!(
            "plans:
  - variant: dbl
    kind: {{ type: master }}
    currency: EUR
    validity: {{ start: 2025-01-01, end: 2025-12-31 }}
    inventory_model: freesale
    preferred: true
    occupancies:
      - {{ min_occupancy: 1, max_occupancy: 4, pricing_model: fixed, base_amount: '{price}' }}
"
        );
        let file = self.write_file("master.yaml", &yaml);
        self.run(&["rate-plan", "load", file.to_str().unwrap()]);
    }

    /// Register a supplier with a cost plan and `quantity` units of `dbl` on `date`.
    pub fn supplier_with_stock(
        &self,
        name: &str,
        priority: i32,
        cost: u32,
        quantity: u32,
        date: &str,
    ) -> i64 {
        let supplier = self.add_supplier(name, priority);
        let yaml = format!(
            "plans:
  - variant: dbl
    kind: {{ type: supplier, supplier_id: {supplier} }}
    currency: EUR
    validity: {{ start: 2025-01-01, end: 2025-12-31 }}
    inventory_model: committed
    occupancies:
      - {{ min_occupancy: 1, max_occupancy: 4, pricing_model: fixed, base_amount: '{cost}' }}
"
        );
        let file = self.write_file(&format!("supplier-{supplier}.yaml"), &yaml);
        self.run(&["rate-plan", "load", file.to_str().unwrap()]);
        self.run(&[
            "allocate",
            "--variant",
            "dbl",
            "--date",
            date,
            "--supplier",
            &supplier.to_string(),
            "--quantity",
            &quantity.to_string(),
            "--unit-cost",
            &cost.to_string(),
            "--currency",
            "EUR",
        ]);
        supplier
    }

    /// Allocate house buckets of `dbl` over a window.
    pub fn allocate(&self, from: &str, to: &str, quantity: u32) {
        self.run(&[
            "allocate",
            "--variant",
            "dbl",
            "--from",
            from,
            "--to",
            to,
            "--quantity",
            &quantity.to_string(),
            "--currency",
            "EUR",
        ]);
    }

    /// Bucket ids of `dbl` on `date`, read straight from the database.
    pub fn bucket_ids_on(&self, date: &str) -> Vec<i64> {
        let conn = rusqlite::Connection::open(self.data_dir.join("allot.db"))
            .expect("Failed to open database");
        let mut stmt = conn
            .prepare(
                "SELECT id FROM allocation_buckets \
                 WHERE org = ?1 AND variant = 'dbl' AND start_date = ?2 ORDER BY id",
            )
            .expect("Failed to prepare query");
        stmt.query_map(rusqlite::params![ORG, date], |row| row.get(0))
            .expect("Failed to query buckets")
            .collect::<rusqlite::Result<Vec<i64>>>()
            .expect("Failed to read bucket ids")
    }
}
