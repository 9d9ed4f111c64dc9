//! Portal login and navigation to the student directory.

use tracing::{info, instrument, warn};

use crate::context::Timeouts;
use crate::error::{Error, Result};
use crate::portal::Portal;
use crate::session::{Credentials, Session};

/// Logs into the portal at `base_url` and opens the student directory.
///
/// Every failure along the way (login form missing, credentials rejected,
/// directory link absent, directory never loading) is reported as
/// [`Error::Authentication`] and the browser is shut down before returning.
#[instrument(target = "paideia.auth", skip_all, fields(user = %credentials.user))]
pub async fn login<P: Portal>(portal: P, base_url: &str, credentials: &Credentials, timeouts: &Timeouts) -> Result<Session<P>> {
	match establish(&portal, base_url, credentials, timeouts).await {
		Ok(directory_url) => {
			info!(target = "paideia.auth", %directory_url, "logged in");
			Ok(Session::new(portal, base_url, directory_url))
		}
		Err(err) => {
			if let Err(quit_err) = portal.quit().await {
				warn!(target = "paideia.auth", error = %quit_err, "failed to close browser after login failure");
			}
			Err(err)
		}
	}
}

async fn establish<P: Portal>(portal: &P, base_url: &str, credentials: &Credentials, timeouts: &Timeouts) -> Result<String> {
	portal.goto(base_url).await.map_err(auth_failure("portal did not load"))?;

	timeouts
		.page_wait()
		.until_true("login form", || portal.login_form_present())
		.await
		.map_err(auth_failure("login form not found"))?;

	portal
		.submit_login(&credentials.user, &credentials.password)
		.await
		.map_err(auth_failure("could not submit login form"))?;

	let directory_url = timeouts
		.page_wait()
		.until("student directory link", || portal.directory_link())
		.await
		.map_err(auth_failure("login was not accepted"))?;

	portal
		.goto(&directory_url)
		.await
		.map_err(auth_failure("student directory did not load"))?;

	timeouts
		.page_wait()
		.until_true("class filter", || portal.class_filter_present())
		.await
		.map_err(auth_failure("student directory did not load"))?;

	Ok(directory_url)
}

fn auth_failure(what: &'static str) -> impl Fn(Error) -> Error {
	move |err| Error::Authentication {
		reason: format!("{what}: {err}"),
	}
}
