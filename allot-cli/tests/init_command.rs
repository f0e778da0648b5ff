//! Integration tests for the `init` command.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_init_fresh_initialization() {
    let env = TestEnv::new();
    assert!(!env.data_dir.exists());

    env.command_bare()
        .arg("init")
        .arg("--data-dir")
        .arg(&env.data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized allot"))
        .stdout(predicate::str::contains("Created data directory"))
        .stdout(predicate::str::contains("Created database"))
        .stderr(predicate::str::contains("no organization configured"));

    assert!(env.data_dir.join("allot.db").exists());
}

#[test]
fn test_init_with_org_skips_hint() {
    let env = TestEnv::new();

    env.command()
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("no organization configured").not());
}

#[test]
fn test_init_respects_global_data_dir() {
    let env = TestEnv::new();

    env.init();

    assert!(env.data_dir.join("allot.db").exists());
}

#[test]
fn test_init_existing_database_fails_without_overwrite() {
    let env = TestEnv::new();
    env.init();

    env.command_bare()
        .arg("--data-dir")
        .arg(&env.data_dir)
        .arg("init")
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("--overwrite"));
}

#[test]
fn test_init_overwrite_recreates_database() {
    let env = TestEnv::new();
    env.init();
    env.add_supplier("Alpha", 1);

    env.command_bare()
        .arg("--data-dir")
        .arg(&env.data_dir)
        .arg("init")
        .arg("--overwrite")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recreated database"));

    // The supplier went with the old database
    let listing = env.run(&["supplier", "list"]);
    assert!(!listing.contains("Alpha"), "{listing}");
}

#[test]
fn test_init_with_config_writes_template_once() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("--data-dir")
        .arg(&env.data_dir)
        .arg("init")
        .arg("--with-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created default configuration file"));

    let config_path = env.data_dir.join("config.yaml");
    fs::write(&config_path, "org: kept\n").unwrap();

    env.command_bare()
        .arg("--data-dir")
        .arg(&env.data_dir)
        .arg("init")
        .arg("--overwrite")
        .arg("--with-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(config_path).unwrap(), "org: kept\n");
}

#[test]
fn test_init_dry_run_creates_nothing() {
    let env = TestEnv::new();

    env.command_bare()
        .arg("--data-dir")
        .arg(&env.data_dir)
        .arg("init")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry-run mode"))
        .stdout(predicate::str::contains("Create database"));

    assert!(!env.data_dir.exists());
}
