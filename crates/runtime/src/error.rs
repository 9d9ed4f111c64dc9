use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
	#[error("could not find a chromedriver executable; install chromedriver or set CHROMEDRIVER")]
	DriverNotFound,

	#[error("failed to launch {path}: {source}")]
	Launch {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("chromedriver exited before accepting connections (status: {status})")]
	ExitedEarly { status: String },

	#[error("chromedriver did not accept connections on port {port} within {timeout:?}")]
	StartupTimeout { port: u16, timeout: Duration },

	#[error("no free local port: {0}")]
	NoFreePort(#[source] std::io::Error),
}
