//! Spawned chromedriver handle.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Result, RuntimeError};
use crate::finder::find_chromedriver;
use crate::port::{free_port, port_accepting};

const STARTUP_POLL: Duration = Duration::from_millis(100);

/// How to start the driver.
#[derive(Debug, Clone)]
pub struct DriverOptions {
	/// Explicit binary; discovered when `None`.
	pub executable: Option<PathBuf>,
	/// Fixed port; a free one is picked when `None`.
	pub port: Option<u16>,
	pub startup_timeout: Duration,
}

impl Default for DriverOptions {
	fn default() -> Self {
		Self {
			executable: None,
			port: None,
			startup_timeout: Duration::from_secs(20),
		}
	}
}

/// A running chromedriver child process.
///
/// The child is killed when this handle is dropped, so holding it for the
/// lifetime of a browser session is enough to guarantee cleanup on every
/// exit path, including errors and panics that unwind.
#[derive(Debug)]
pub struct WebDriverProcess {
	child: Option<Child>,
	port: u16,
}

impl WebDriverProcess {
	/// Starts chromedriver and waits until it accepts connections.
	pub async fn spawn(options: &DriverOptions) -> Result<Self> {
		let executable = match &options.executable {
			Some(path) => path.clone(),
			None => find_chromedriver().ok_or(RuntimeError::DriverNotFound)?,
		};
		let port = match options.port {
			Some(port) => port,
			None => free_port()?,
		};

		debug!(target = "paideia.runtime", path = %executable.display(), port, "launching chromedriver");

		let mut cmd = Command::new(&executable);
		cmd.arg(format!("--port={port}")).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

		#[cfg(unix)]
		std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

		let child = cmd.spawn().map_err(|source| RuntimeError::Launch {
			path: executable.display().to_string(),
			source,
		})?;

		let mut process = Self { child: Some(child), port };
		process.wait_until_ready(options.startup_timeout).await?;

		info!(target = "paideia.runtime", port, pid = ?process.pid(), "chromedriver ready");
		Ok(process)
	}

	async fn wait_until_ready(&mut self, timeout: Duration) -> Result<()> {
		let started = tokio::time::Instant::now();
		loop {
			if let Some(child) = self.child.as_mut() {
				if let Ok(Some(status)) = child.try_wait() {
					self.child = None;
					return Err(RuntimeError::ExitedEarly { status: status.to_string() });
				}
			}

			if port_accepting(self.port).await {
				return Ok(());
			}

			if started.elapsed() >= timeout {
				return Err(RuntimeError::StartupTimeout { port: self.port, timeout });
			}

			tokio::time::sleep(STARTUP_POLL).await;
		}
	}

	/// WebDriver endpoint URL for clients.
	pub fn url(&self) -> String {
		format!("http://127.0.0.1:{}", self.port)
	}

	pub fn pid(&self) -> Option<u32> {
		self.child.as_ref().map(Child::id)
	}

	fn terminate(&mut self) {
		let Some(mut child) = self.child.take() else {
			return;
		};
		if let Err(err) = child.kill() {
			warn!(target = "paideia.runtime", pid = child.id(), error = %err, "failed to kill chromedriver");
			return;
		}
		let _ = child.wait();
		debug!(target = "paideia.runtime", port = self.port, "chromedriver stopped");
	}
}

impl Drop for WebDriverProcess {
	fn drop(&mut self) {
		self.terminate();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn missing_executable_fails_to_launch() {
		let options = DriverOptions {
			executable: Some(PathBuf::from("/nonexistent/chromedriver-for-tests")),
			..Default::default()
		};
		let err = WebDriverProcess::spawn(&options).await.unwrap_err();
		assert!(matches!(err, RuntimeError::Launch { .. }));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn early_exit_is_reported() {
		let options = DriverOptions {
			executable: Some(PathBuf::from("/bin/false")),
			startup_timeout: Duration::from_secs(5),
			..Default::default()
		};
		let err = WebDriverProcess::spawn(&options).await.unwrap_err();
		assert!(matches!(err, RuntimeError::ExitedEarly { .. }), "unexpected: {err}");
	}

	#[test]
	fn url_uses_loopback_port() {
		let process = WebDriverProcess { child: None, port: 9515 };
		assert_eq!(process.url(), "http://127.0.0.1:9515");
		assert_eq!(process.pid(), None);
	}
}
