//! Authenticated portal session with guaranteed release.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::context::Timeouts;
use crate::error::Result;
use crate::portal::Portal;

/// Boxed future borrowed from a [`Session`] for the duration of [`Session::scoped`].
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Portal login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	pub user: String,
	pub password: String,
}

impl Credentials {
	pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			user: user.into(),
			password: password.into(),
		}
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("user", &self.user)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// A logged-in portal positioned at the student directory.
///
/// Created by [`crate::auth::login`]. The browser is released by
/// [`Session::close`]; [`Session::scoped`] runs a body and closes afterwards
/// whatever the body returned.
pub struct Session<P: Portal> {
	portal: P,
	base_url: String,
	directory_url: String,
}

impl<P: Portal> Session<P> {
	pub fn new(portal: P, base_url: impl Into<String>, directory_url: impl Into<String>) -> Self {
		Self {
			portal,
			base_url: base_url.into(),
			directory_url: directory_url.into(),
		}
	}

	/// Shorthand for [`crate::auth::login`].
	pub async fn login(portal: P, base_url: &str, credentials: &Credentials, timeouts: &Timeouts) -> Result<Self> {
		crate::auth::login(portal, base_url, credentials, timeouts).await
	}

	pub fn portal(&self) -> &P {
		&self.portal
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn directory_url(&self) -> &str {
		&self.directory_url
	}

	/// Navigates back to the student directory, dropping any filter state.
	pub async fn return_to_directory(&self) -> Result<()> {
		self.portal.goto(&self.directory_url).await
	}

	/// Ends the browser session.
	pub async fn close(self) -> Result<()> {
		debug!(target = "paideia.session", "closing session");
		self.portal.quit().await
	}

	/// Runs `body` against this session, then closes it.
	///
	/// The session is closed on success and on failure. A close failure is
	/// only reported when the body itself succeeded.
	pub async fn scoped<T, F>(self, body: F) -> Result<T>
	where
		F: for<'s> FnOnce(&'s Session<P>) -> BoxFut<'s, Result<T>>,
	{
		let outcome = body(&self).await;
		match (outcome, self.close().await) {
			(Ok(value), Ok(())) => Ok(value),
			(Ok(_), Err(err)) => Err(err),
			(Err(err), close) => {
				if let Err(close_err) = close {
					warn!(target = "paideia.session", error = %close_err, "failed to close session after error");
				}
				Err(err)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use crate::portal::fake::{FakeDirectory, FakePortal};

	fn session() -> (Session<FakePortal>, FakePortal) {
		let dir = FakeDirectory::new("https://portal.test/");
		let directory_url = dir.directory_url.clone();
		let portal = FakePortal::new(dir);
		(Session::new(portal.clone(), "https://portal.test/", directory_url), portal)
	}

	#[test]
	fn debug_redacts_password() {
		let creds = Credentials::new("parent", "hunter2");
		let shown = format!("{creds:?}");
		assert!(shown.contains("parent"));
		assert!(!shown.contains("hunter2"));
	}

	#[tokio::test]
	async fn scoped_closes_after_success() {
		let (session, handle) = session();
		let value = session
			.scoped(|s| {
				Box::pin(async move {
					s.return_to_directory().await?;
					Ok(7)
				})
			})
			.await
			.unwrap();
		assert_eq!(value, 7);
		assert!(handle.is_quit());
		assert_eq!(handle.events().first().map(String::as_str), Some("goto:https://portal.test/student-directory"));
	}

	#[tokio::test]
	async fn scoped_closes_after_failure() {
		let (session, handle) = session();
		let err = session
			.scoped(|s| {
				Box::pin(async move {
					s.portal().goto("https://portal.test/elsewhere").await?;
					Err::<(), _>(Error::ParentNotFound { name: "x".into() })
				})
			})
			.await
			.unwrap_err();
		assert!(matches!(err, Error::ParentNotFound { .. }));
		assert_eq!(handle.events().last().map(String::as_str), Some("quit"));
	}
}
