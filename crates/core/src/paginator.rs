//! Roster extraction and page advance.

use paideia_protocol::class_from_location;
use tracing::{debug, warn};

use crate::context::Timeouts;
use crate::error::{Error, Result};
use crate::model::{StudentRecord, StudentRef};
use crate::portal::Portal;

/// Walks the paginated roster of the currently selected class.
///
/// The portal exposes no "page loaded" signal. A page turn is confirmed by
/// watching the first record's name change away from what it was before the
/// click.
pub struct Paginator<'a, P: Portal> {
	portal: &'a P,
	timeouts: Timeouts,
}

impl<'a, P: Portal> Paginator<'a, P> {
	pub fn new(portal: &'a P, timeouts: Timeouts) -> Self {
		Self { portal, timeouts }
	}

	/// Reads every visible record on the current page.
	///
	/// Records whose name is still empty after the field wait are treated as
	/// not rendered and skipped. Other per-record failures are logged and
	/// skipped too; only failing to list the records at all is an error.
	pub async fn extract_page(&self) -> Result<Vec<StudentRecord>> {
		let cards = self.portal.student_cards().await?;
		let mut records = Vec::with_capacity(cards.len());

		for (index, card) in cards.iter().enumerate() {
			match self.extract_record(index, card).await {
				Ok(Some(record)) => {
					debug!(target = "paideia.paginator", student = %record.name, class = %record.class_name, "found student");
					records.push(record);
				}
				Ok(None) => {
					debug!(target = "paideia.paginator", index, "record name never rendered; skipping");
				}
				Err(err) => {
					warn!(target = "paideia.paginator", index, error = %err, "failed to read record; skipping");
				}
			}
		}

		Ok(records)
	}

	async fn extract_record(&self, index: usize, card: &P::Element) -> Result<Option<StudentRecord>> {
		let portal = self.portal;
		let name = self
			.timeouts
			.field_wait()
			.until("student name", || async move {
				let name = portal.student_name(card).await?;
				Ok::<_, Error>((!name.is_empty()).then_some(name))
			})
			.await;

		let name = match name {
			Ok(name) => name,
			Err(Error::Timeout { .. }) => return Ok(None),
			Err(err) => return Err(err),
		};

		let location = self.portal.student_location(card).await?;
		let reference = match self.portal.student_reference(card).await? {
			Some(id) => StudentRef::Attribute(id),
			None => StudentRef::Position(index),
		};

		Ok(Some(StudentRecord::new(name, class_from_location(&location)).with_reference(reference)))
	}

	/// Advances to the next page.
	///
	/// Returns `Ok(false)` only when there is no next-page control, which is
	/// the end of the roster. Every other failure is an error.
	pub async fn next_page(&self) -> Result<bool> {
		if !self.portal.next_page_available().await? {
			debug!(target = "paideia.paginator", "no next page");
			return Ok(false);
		}

		let before = self.portal.first_student_name().await?;
		self.portal.click_next_page().await?;

		let portal = self.portal;
		let wait = self.timeouts.page_wait();
		match before {
			Some(before) => {
				let before = before.as_str();
				wait.until_true("first record to change", || async move {
					Ok::<_, Error>(portal.first_student_name().await?.is_some_and(|name| name != before))
				})
				.await?;
			}
			None => {
				wait.until_true("first record to appear", || async move { Ok::<_, Error>(portal.first_student_name().await?.is_some()) })
					.await?;
			}
		}

		debug!(target = "paideia.paginator", "advanced to next page");
		Ok(true)
	}

	/// Extracts each page in turn, hands its records to `visit`, then advances.
	///
	/// `visit` finishes before the next page is requested. Returns the number
	/// of pages processed.
	pub async fn for_each_page<F>(&self, mut visit: F) -> Result<usize>
	where
		F: AsyncFnMut(Vec<StudentRecord>) -> Result<()>,
	{
		let mut pages = 0;
		loop {
			let records = self.extract_page().await?;
			pages += 1;
			debug!(target = "paideia.paginator", page = pages, records = records.len(), "extracted page");
			visit(records).await?;

			if !self.next_page().await? {
				return Ok(pages);
			}
		}
	}
}
