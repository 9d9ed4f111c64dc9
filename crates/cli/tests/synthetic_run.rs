use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run_scraper(workdir: &Path, args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_paideia-scraper"))
		.current_dir(workdir)
		.args(args)
		.env_remove("PAIDEIA_USER")
		.env_remove("PAIDEIA_PASSWORD")
		.env_remove("PAIDEIA_PORTAL_URL")
		.env_remove("RUST_LOG")
		.output()
		.expect("failed to execute paideia-scraper")
}

#[test]
fn synthetic_run_writes_workbook() {
	let dir = TempDir::new().expect("tempdir");
	let output = run_scraper(dir.path(), &["--synthetic", "all", "-o", "directory.xlsx"]);
	let stdout = String::from_utf8_lossy(&output.stdout);

	assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
	assert!(stdout.contains("Classes: 3 ok, 0 failed"));
	assert!(stdout.contains("Students: 7, parents: 12"));

	let bytes = std::fs::read(dir.path().join("directory.xlsx")).expect("workbook written");
	assert!(bytes.starts_with(b"PK"));
}

#[test]
fn unknown_synthetic_class_exits_partial() {
	let dir = TempDir::new().expect("tempdir");
	let output = run_scraper(dir.path(), &["--synthetic", "all", "3rd Grade"]);
	let stdout = String::from_utf8_lossy(&output.stdout);

	assert_eq!(output.status.code(), Some(2));
	assert!(stdout.contains("No data retrieved"));
	assert!(!dir.path().join("students.xlsx").exists());
}

#[test]
fn live_run_without_credentials_is_fatal() {
	let dir = TempDir::new().expect("tempdir");
	let output = run_scraper(dir.path(), &["-c", "missing.json", "Kindergarten"]);
	let stderr = String::from_utf8_lossy(&output.stderr);

	assert_eq!(output.status.code(), Some(1));
	assert!(stderr.contains("PAIDEIA_USER"));
}

#[test]
fn classes_are_required_for_live_runs() {
	let dir = TempDir::new().expect("tempdir");
	let output = run_scraper(dir.path(), &[]);
	let stderr = String::from_utf8_lossy(&output.stderr);

	assert!(!output.status.success());
	assert!(stderr.contains("<CLASSES>"));
}
