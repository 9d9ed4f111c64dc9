use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error(
		"no portal credentials: set paideia_user and paideia_password in {}, or PAIDEIA_USER and PAIDEIA_PASSWORD in the environment",
		path.display()
	)]
	Missing { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Scrape(#[from] paideia::Error),
}
