//! Top-level run: acquire a session, scrape each class, export.

use std::fmt;
use std::path::PathBuf;

use paideia::auth::login;
use paideia::{
	BrowserOptions, ClassReport, Dataset, ExportSink, Fidelity, RunContext, Session, WebDriverPortal, XlsxSink, scrape_class,
	synthetic,
};
use paideia_protocol::Selectors;
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;

pub const EXIT_OK: u8 = 0;

/// Exit code for a run that finished with failed classes or no data.
pub const EXIT_PARTIAL: u8 = 2;

/// Exit code for a run aborted by a fatal error.
pub const EXIT_FATAL: u8 = 1;

/// What a completed run did, for the closing report.
#[derive(Debug, Default)]
pub struct Summary {
	pub login_only: bool,
	pub classes_ok: Vec<String>,
	pub classes_failed: Vec<(String, String)>,
	pub students: usize,
	pub parents: usize,
	pub skipped_records: usize,
	pub output: Option<PathBuf>,
}

impl Summary {
	fn record(&mut self, class_name: &str, outcome: paideia::Result<ClassReport>, dataset: &mut Dataset) -> paideia::Result<()> {
		match outcome {
			Ok(report) => {
				self.skipped_records += report.failures.len();
				self.classes_ok.push(report.class_name);
				dataset.extend(report.students);
				Ok(())
			}
			Err(err) if err.is_fatal() => Err(err),
			Err(err) => {
				error!(target = "paideia.run", class = class_name, error = %err, "class failed");
				self.classes_failed.push((class_name.to_string(), err.to_string()));
				Ok(())
			}
		}
	}

	pub fn exit_code(&self) -> u8 {
		if self.login_only {
			return EXIT_OK;
		}
		if !self.classes_failed.is_empty() || self.output.is_none() {
			return EXIT_PARTIAL;
		}
		EXIT_OK
	}
}

impl fmt::Display for Summary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.login_only {
			return write!(f, "Login successful; student directory reachable");
		}

		writeln!(f, "Classes: {} ok, {} failed", self.classes_ok.len(), self.classes_failed.len())?;
		for (class, reason) in &self.classes_failed {
			writeln!(f, "  failed: {class}: {reason}")?;
		}
		writeln!(f, "Students: {}, parents: {}", self.students, self.parents)?;
		if self.skipped_records > 0 {
			writeln!(f, "Skipped records: {}", self.skipped_records)?;
		}
		match &self.output {
			Some(path) => write!(f, "Wrote {}", path.display()),
			None => write!(f, "No data retrieved"),
		}
	}
}

/// Runs the command line to completion.
///
/// `Err` is reserved for fatal errors: configuration, authentication,
/// browser acquisition and export.
pub async fn run(cli: &Cli) -> Result<Summary> {
	let ctx = RunContext::new(cli.timeouts(), cli.synthetic);
	info!(target = "paideia.run", fidelity = %ctx.fidelity, classes = cli.classes.len(), "starting run");

	let mut summary = Summary {
		login_only: cli.login_only,
		..Summary::default()
	};
	let mut dataset = Dataset::new();

	if cli.synthetic == Fidelity::Synthetic && !cli.login_only {
		if cli.classes.is_empty() {
			dataset.extend(synthetic::students());
			summary.classes_ok = dataset.classes().into_iter().map(str::to_string).collect();
		} else {
			for class in &cli.classes {
				let outcome = synthetic::class(class).map(|students| ClassReport {
					class_name: class.clone(),
					students,
					..ClassReport::default()
				});
				summary.record(class, outcome, &mut dataset)?;
			}
		}
		return finish(cli, summary, dataset);
	}

	let config = Config::load(&cli.config)?;
	let options = BrowserOptions {
		webdriver_url: cli.webdriver.clone(),
		headless: !cli.headed,
		..BrowserOptions::default()
	};
	let portal = WebDriverPortal::launch(&options, Selectors::default()).await?;
	let session = login(portal, &config.portal_url, &config.credentials(), &ctx.timeouts).await?;

	if cli.login_only {
		info!(target = "paideia.run", directory = session.directory_url(), "login verified");
		session.close().await?;
		return Ok(summary);
	}

	let classes = cli.classes.clone();
	let (summary, dataset) = session
		.scoped(move |session| Box::pin(async move { scrape_all(session, &ctx, &classes, summary, dataset).await }))
		.await?;
	finish(cli, summary, dataset)
}

async fn scrape_all(
	session: &Session<WebDriverPortal>,
	ctx: &RunContext,
	classes: &[String],
	mut summary: Summary,
	mut dataset: Dataset,
) -> paideia::Result<(Summary, Dataset)> {
	for class in classes {
		let outcome = scrape_class(session, ctx, class).await;
		summary.record(class, outcome, &mut dataset)?;
	}
	Ok((summary, dataset))
}

fn finish(cli: &Cli, mut summary: Summary, dataset: Dataset) -> Result<Summary> {
	summary.students = dataset.student_count();
	summary.parents = dataset.parent_count();

	if dataset.is_empty() {
		warn!(target = "paideia.run", "no data retrieved; nothing exported");
		return Ok(summary);
	}

	XlsxSink::new(&cli.output).export(&dataset)?;
	summary.output = Some(cli.output.clone());
	Ok(summary)
}
