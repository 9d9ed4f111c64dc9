//! Error taxonomy for directory scraping.

use std::time::Duration;

use fantoccini::error::{CmdError, ErrorStatus};
use thiserror::Error;

use crate::navigator::DialogState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Login could not be completed; aborts the run.
	#[error("authentication failed: {reason}")]
	Authentication { reason: String },

	/// Requested class is not one of the filter's options.
	#[error("class '{requested}' not found; available: {}", available.join(", "))]
	ClassNotFound { requested: String, available: Vec<String> },

	/// A bounded wait expired.
	#[error("timed out after {timeout:?} waiting for {condition}")]
	Timeout { condition: String, timeout: Duration },

	#[error("parent '{name}' not found in relationship panel")]
	ParentNotFound { name: String },

	#[error("student record {reference} is no longer on the page")]
	StudentNotFound { reference: String },

	/// A dialog transition was attempted from the wrong state.
	#[error("dialog transition requires {expected:?}, but dialog is {actual:?}")]
	InvalidDialogState { expected: DialogState, actual: DialogState },

	/// An element handle outlived the page it came from.
	#[error("stale element: {0}")]
	StaleElement(String),

	#[error("webdriver command failed: {0}")]
	WebDriver(Box<CmdError>),

	#[error("failed to start browser session: {0}")]
	Connect(#[from] fantoccini::error::NewSessionError),

	#[error(transparent)]
	Runtime(#[from] paideia_runtime::RuntimeError),

	#[error("export failed: {0}")]
	Export(#[from] rust_xlsxwriter::XlsxError),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl From<CmdError> for Error {
	fn from(err: CmdError) -> Self {
		match err {
			CmdError::Standard(ref wd) if wd.error == ErrorStatus::StaleElementReference => Error::StaleElement(err.to_string()),
			err => Error::WebDriver(Box::new(err)),
		}
	}
}

impl Error {
	/// Errors a poll loop may swallow: the page is mid-render.
	pub fn is_transient(&self) -> bool {
		matches!(self, Error::StaleElement(_))
	}

	/// Errors that must abort the whole run rather than one class or record.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Error::Authentication { .. } | Error::Connect(_) | Error::Runtime(_))
	}
}
