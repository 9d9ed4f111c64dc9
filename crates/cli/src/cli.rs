use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use paideia::{DEFAULT_FIELD_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, Fidelity, Timeouts};

#[derive(Parser, Debug)]
#[command(name = "paideia-scraper")]
#[command(about = "Export the Paideia parent-portal student directory to a spreadsheet")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v debug, -vv trace)
	#[arg(short, long, action = ArgAction::Count)]
	pub verbose: u8,

	/// Same as -v
	#[arg(long)]
	pub debug: bool,

	/// Log in, confirm the student directory loads, and exit
	#[arg(long)]
	pub login_only: bool,

	/// Which passes use synthetic data: live, contacts, parents or all
	#[arg(long, value_name = "MODE", default_value = "live")]
	pub synthetic: Fidelity,

	/// Workbook to write
	#[arg(short, long, value_name = "PATH", default_value = "students.xlsx")]
	pub output: PathBuf,

	/// JSON file with paideia_user / paideia_password
	#[arg(short, long, value_name = "PATH", default_value = "secrets/config.json")]
	pub config: PathBuf,

	/// Connect to a running WebDriver server instead of spawning chromedriver
	#[arg(long, value_name = "URL")]
	pub webdriver: Option<String>,

	/// Show the browser window
	#[arg(long)]
	pub headed: bool,

	/// Page-level wait in seconds
	#[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
	pub timeout: u64,

	/// Per-record field wait in seconds
	#[arg(long, value_name = "SECS", default_value_t = DEFAULT_FIELD_TIMEOUT_SECS)]
	pub field_timeout: u64,

	/// Class names exactly as listed in the directory's class filter
	#[arg(value_name = "CLASSES")]
	pub classes: Vec<String>,
}

impl Cli {
	/// Log verbosity after folding in `--debug`.
	pub fn verbosity(&self) -> u8 {
		if self.debug { self.verbose.max(1) } else { self.verbose }
	}

	pub fn timeouts(&self) -> Timeouts {
		Timeouts {
			page: Duration::from_secs(self.timeout),
			field: Duration::from_secs(self.field_timeout),
			..Timeouts::default()
		}
	}

	/// Whether the invocation can run without naming any class.
	pub fn classes_optional(&self) -> bool {
		self.login_only || self.synthetic == Fidelity::Synthetic
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_classes_and_defaults() {
		let cli = Cli::try_parse_from(["paideia-scraper", "Kindergarten", "1st Grade"]).unwrap();
		assert_eq!(cli.classes, vec!["Kindergarten", "1st Grade"]);
		assert_eq!(cli.output, PathBuf::from("students.xlsx"));
		assert_eq!(cli.config, PathBuf::from("secrets/config.json"));
		assert_eq!(cli.synthetic, Fidelity::Live);
		assert_eq!(cli.timeouts().page, Duration::from_secs(60));
		assert_eq!(cli.timeouts().field, Duration::from_secs(10));
		assert!(!cli.headed);
		assert!(!cli.classes_optional());
	}

	#[test]
	fn parse_flags() {
		let cli = Cli::try_parse_from([
			"paideia-scraper",
			"-vv",
			"--synthetic",
			"contacts",
			"-o",
			"/tmp/out.xlsx",
			"--webdriver",
			"http://localhost:4444",
			"--timeout",
			"5",
			"2nd Grade",
		])
		.unwrap();
		assert_eq!(cli.verbosity(), 2);
		assert_eq!(cli.synthetic, Fidelity::SyntheticContacts);
		assert_eq!(cli.output, PathBuf::from("/tmp/out.xlsx"));
		assert_eq!(cli.webdriver.as_deref(), Some("http://localhost:4444"));
		assert_eq!(cli.timeouts().page, Duration::from_secs(5));
		assert_eq!(cli.classes, vec!["2nd Grade"]);
	}

	#[test]
	fn debug_flag_raises_verbosity() {
		let cli = Cli::try_parse_from(["paideia-scraper", "--debug", "--login-only"]).unwrap();
		assert_eq!(cli.verbosity(), 1);
		assert!(cli.classes_optional());
	}

	#[test]
	fn synthetic_all_needs_no_classes() {
		let cli = Cli::try_parse_from(["paideia-scraper", "--synthetic", "all"]).unwrap();
		assert!(cli.classes.is_empty());
		assert!(cli.classes_optional());
	}

	#[test]
	fn rejects_unknown_synthetic_mode() {
		assert!(Cli::try_parse_from(["paideia-scraper", "--synthetic", "most"]).is_err());
	}
}
