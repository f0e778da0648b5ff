use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_cmd::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::TempDir;

static CLI_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn allot(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("allot").expect("failed to locate allot binary");
    cmd.env_remove("ALLOT_ORG")
        .args(["--data-dir", data_dir.path().to_str().unwrap(), "--org", "bench"]);
    cmd
}

fn initialize_data_dir(data_dir: &TempDir) {
    let status = allot(data_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .args(["--quiet", "init"])
        .status()
        .expect("failed to execute allot init");
    assert!(status.success(), "allot init command failed");
}

fn allocate_window(data_dir: &TempDir, variant: &str, from: &str, to: &str) {
    let status = allot(data_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .args([
            "allocate",
            "--variant",
            variant,
            "--from",
            from,
            "--to",
            to,
            "--quantity",
            "20",
            "--currency",
            "EUR",
        ])
        .status()
        .expect("failed to execute allot allocate");
    assert!(status.success(), "allot allocate command failed");
}

fn bench_cli_startup(c: &mut Criterion) {
    c.bench_function("cli_startup_version", |b| {
        b.iter(|| {
            let mut cmd = Command::cargo_bin("allot").expect("failed to locate allot binary");
            let output = cmd.arg("--version").output().expect("failed to run allot");
            black_box(output);
        });
    });
}

fn bench_cli_allocate(c: &mut Criterion) {
    c.bench_function("cli_allocate_month", |b| {
        b.iter_batched(
            || {
                let data_dir = TempDir::new().expect("failed to create temp dir");
                initialize_data_dir(&data_dir);
                data_dir
            },
            |data_dir| {
                let counter = CLI_COUNTER.fetch_add(1, Ordering::Relaxed);
                let variant = format!("bench-{counter}");
                allocate_window(&data_dir, &variant, "2025-01-01", "2025-01-31");
                black_box(data_dir);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_cli_availability(c: &mut Criterion) {
    c.bench_function("cli_availability_quarter_json", |b| {
        b.iter_batched(
            || {
                let data_dir = TempDir::new().expect("failed to create temp dir");
                initialize_data_dir(&data_dir);
                allocate_window(&data_dir, "dbl", "2025-01-01", "2025-03-31");
                data_dir
            },
            |data_dir| {
                let output = allot(&data_dir)
                    .args([
                        "availability",
                        "--variant",
                        "dbl",
                        "--from",
                        "2025-01-01",
                        "--to",
                        "2025-03-31",
                        "--format",
                        "json",
                    ])
                    .output()
                    .expect("failed to execute allot availability");

                black_box(output);
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    cli_benches,
    bench_cli_startup,
    bench_cli_allocate,
    bench_cli_availability
);
criterion_main!(cli_benches);
