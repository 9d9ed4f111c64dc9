//! Student → parent → contact dialog state machine.
//!
//! The portal nests two modal levels: a student dialog listing linked
//! parents (the relationship panel), and a parent dialog showing contact
//! fields (the contact panel). Opening a parent replaces the student dialog
//! on screen, and closing it discards both, so every parent visit starts from
//! a fresh `open_student`.
//!
//! ```text
//!   Closed --open_student--> StudentOpen --open_parent--> ParentOpen
//!     ^                          |                            |
//!     +------close_student-------+                            |
//!     +---------------------close_parent----------------------+
//! ```
//!
//! Each transition checks its starting state and fails with
//! [`Error::InvalidDialogState`] otherwise. Nothing here retries; a wait that
//! expires is an [`Error::Timeout`] for the caller to handle.

use paideia_protocol::mobile_phone_from_lines;
use tracing::{debug, warn};

use crate::context::Timeouts;
use crate::error::{Error, Result};
use crate::portal::Portal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
	Closed,
	StudentOpen,
	ParentOpen,
}

/// Contact fields read from an open parent dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
	pub email: Option<String>,
	pub phone: Option<String>,
}

pub struct Navigator<'a, P: Portal> {
	portal: &'a P,
	timeouts: Timeouts,
	state: DialogState,
}

impl<'a, P: Portal> Navigator<'a, P> {
	pub fn new(portal: &'a P, timeouts: Timeouts) -> Self {
		Self {
			portal,
			timeouts,
			state: DialogState::Closed,
		}
	}

	pub fn state(&self) -> DialogState {
		self.state
	}

	pub fn portal(&self) -> &'a P {
		self.portal
	}

	fn expect(&self, expected: DialogState) -> Result<()> {
		if self.state == expected {
			Ok(())
		} else {
			Err(Error::InvalidDialogState {
				expected,
				actual: self.state,
			})
		}
	}

	/// Opens the student dialog for `card` and waits for its relationship panel.
	pub async fn open_student(&mut self, card: &P::Element) -> Result<()> {
		self.expect(DialogState::Closed)?;
		self.portal.open_student(card).await?;

		let portal = self.portal;
		self.timeouts
			.page_wait()
			.until_true("relationship panel", || portal.relationship_panel_present())
			.await?;

		self.state = DialogState::StudentOpen;
		Ok(())
	}

	/// Names of the linked parents, in display order.
	pub async fn enumerate_parents(&self) -> Result<Vec<String>> {
		self.expect(DialogState::StudentOpen)?;
		let mut names = Vec::new();
		for link in self.portal.parent_links().await? {
			let name = self.portal.link_text(&link).await?;
			if !name.is_empty() {
				names.push(name);
			}
		}
		Ok(names)
	}

	/// Opens the parent dialog whose link text is exactly `name`.
	pub async fn open_parent(&mut self, name: &str) -> Result<()> {
		self.expect(DialogState::StudentOpen)?;

		let mut target = None;
		for link in self.portal.parent_links().await? {
			if self.portal.link_text(&link).await? == name {
				target = Some(link);
				break;
			}
		}
		let link = target.ok_or_else(|| Error::ParentNotFound { name: name.to_string() })?;

		self.portal.click_link(&link).await?;
		let portal = self.portal;
		self.timeouts
			.page_wait()
			.until_true("contact panel", || portal.contact_panel_present())
			.await?;

		self.state = DialogState::ParentOpen;
		Ok(())
	}

	/// Reads email and mobile phone from the open parent dialog.
	///
	/// A field the portal does not show comes back as `None`.
	pub async fn extract_contact(&self) -> Result<Contact> {
		self.expect(DialogState::ParentOpen)?;
		let email = self.portal.contact_email().await?;
		let phone = mobile_phone_from_lines(&self.portal.contact_phone_lines().await?);
		Ok(Contact { email, phone })
	}

	/// Closes the parent dialog. The student dialog beneath goes with it.
	pub async fn close_parent(&mut self) -> Result<()> {
		self.expect(DialogState::ParentOpen)?;
		self.portal.close_dialog().await?;

		let portal = self.portal;
		self.timeouts
			.page_wait()
			.until_true("contact panel to close", || async move { Ok::<_, Error>(!portal.contact_panel_present().await?) })
			.await?;

		self.state = DialogState::Closed;
		Ok(())
	}

	pub async fn close_student(&mut self) -> Result<()> {
		self.expect(DialogState::StudentOpen)?;
		self.portal.close_dialog().await?;

		let portal = self.portal;
		self.timeouts
			.page_wait()
			.until_true("relationship panel to close", || async move { Ok::<_, Error>(!portal.relationship_panel_present().await?) })
			.await?;

		self.state = DialogState::Closed;
		Ok(())
	}

	/// Best-effort return to [`DialogState::Closed`] after a failed visit.
	///
	/// Clicks close while any dialog is showing (at most twice, one per
	/// nesting level), then forces the state to `Closed` regardless.
	pub async fn reset(&mut self) {
		let portal = self.portal;
		for _ in 0..2 {
			match portal.dialog_open().await {
				Ok(false) => break,
				Ok(true) => {
					if let Err(err) = portal.close_dialog().await {
						warn!(target = "paideia.navigator", error = %err, "close during reset failed");
						break;
					}
				}
				Err(err) => {
					debug!(target = "paideia.navigator", error = %err, "dialog check during reset failed");
					break;
				}
			}
		}

		let settled = self
			.timeouts
			.field_wait()
			.until_true("dialogs to close", || async move { Ok::<_, Error>(!portal.dialog_open().await?) })
			.await;
		if let Err(err) = settled {
			warn!(target = "paideia.navigator", error = %err, "dialogs still open after reset");
		}
		self.state = DialogState::Closed;
	}
}
