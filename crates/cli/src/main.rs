use std::process::ExitCode;

use clap::{CommandFactory, Parser, error::ErrorKind};
use paideia_cli::cli::Cli;
use paideia_cli::logging;
use paideia_cli::run::{EXIT_FATAL, run};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
	let cli = Cli::parse();
	if cli.classes.is_empty() && !cli.classes_optional() {
		Cli::command()
			.error(
				ErrorKind::MissingRequiredArgument,
				"at least one of <CLASSES> is required unless --login-only or --synthetic all is given",
			)
			.exit();
	}

	logging::init_logging(cli.verbosity());

	match run(&cli).await {
		Ok(summary) => {
			println!("{summary}");
			ExitCode::from(summary.exit_code())
		}
		Err(err) => {
			error!(target = "paideia.run", error = %err, "run failed");
			eprintln!("error: {err}");
			ExitCode::from(EXIT_FATAL)
		}
	}
}
