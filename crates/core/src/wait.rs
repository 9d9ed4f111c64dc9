//! Bounded polling on asynchronous page state.
//!
//! Every wait on the remote UI goes through [`Wait`]: poll a check until it
//! yields a value or the deadline passes. Transient check errors (elements
//! detached mid-render) count as "not yet"; anything else ends the wait.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::error::{Error, Result};

/// Default polling interval between checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A bounded wait: timeout plus poll interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
	timeout: Duration,
	poll_interval: Duration,
}

impl Wait {
	pub fn new(timeout: Duration) -> Self {
		Self {
			timeout,
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}

	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Polls `check` until it returns `Some`, yielding that value.
	///
	/// The check always runs at least once, even with a zero timeout.
	/// Fails with [`Error::Timeout`] naming `condition` once the deadline passes.
	pub async fn until<T, F, Fut>(&self, condition: &str, mut check: F) -> Result<T>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<Option<T>>>,
	{
		let start = Instant::now();
		let mut attempts = 0u32;

		loop {
			attempts += 1;
			match check().await {
				Ok(Some(value)) => return Ok(value),
				Ok(None) => {}
				Err(err) if err.is_transient() => {
					trace!(target = "paideia.wait", %condition, error = %err, "transient check error");
				}
				Err(err) => return Err(err),
			}

			if start.elapsed() >= self.timeout {
				trace!(target = "paideia.wait", %condition, attempts, "wait expired");
				return Err(Error::Timeout {
					condition: condition.to_string(),
					timeout: self.timeout,
				});
			}

			tokio::time::sleep(self.poll_interval).await;
		}
	}

	/// Polls a boolean check until it reports `true`.
	pub async fn until_true<F, Fut>(&self, condition: &str, mut check: F) -> Result<()>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<bool>>,
	{
		self.until(condition, || {
			let fut = check();
			async move { fut.await.map(|ok| ok.then_some(())) }
		})
		.await
	}
}
