//! Per-class orchestration: roster, parent-name and contact passes.
//!
//! Each roster page is processed completely before the paginator advances:
//!
//! 1. roster pass: the page's records (name, class, reference);
//! 2. name pass: per student, `open_student -> enumerate_parents -> close_student`;
//! 3. contact pass: per parent, `open_student -> open_parent -> extract_contact -> close_parent`.
//!
//! A failure for one student or one parent is logged, recorded in the
//! [`ClassReport`], and followed by [`Navigator::reset`]; the pass then moves
//! on. Data already extracted is kept. Which passes read the live portal is
//! decided by [`Fidelity`]; the rest are filled from [`crate::synthetic`].

use tracing::{debug, info, instrument, warn};

use crate::class_select::select_class;
use crate::context::{Fidelity, RunContext};
use crate::error::{Error, Result};
use crate::model::{ParentRecord, StudentRecord, StudentRef};
use crate::navigator::{Contact, Navigator};
use crate::paginator::Paginator;
use crate::portal::Portal;
use crate::session::Session;
use crate::synthetic;

/// A student or parent that could not be visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
	pub student: String,
	/// Set when the failure was in the contact pass.
	pub parent: Option<String>,
	pub error: String,
}

/// Outcome of scraping one class.
#[derive(Debug, Clone, Default)]
pub struct ClassReport {
	pub class_name: String,
	/// `None` when the class was not read from the portal.
	pub group_id: Option<String>,
	pub pages: usize,
	pub students: Vec<StudentRecord>,
	pub failures: Vec<RecordFailure>,
}

impl ClassReport {
	fn new(class_name: &str) -> Self {
		Self {
			class_name: class_name.to_string(),
			..Default::default()
		}
	}

	pub fn parent_count(&self) -> usize {
		self.students.iter().map(|s| s.parents.len()).sum()
	}
}

/// Scrapes every page of `class_name`.
///
/// Errors returned here fail the whole class: the class is missing from the
/// filter, the filter never applies, or a page turn never lands. Per-record
/// problems end up in [`ClassReport::failures`] instead.
#[instrument(target = "paideia.passes", skip_all, fields(class = class_name))]
pub async fn scrape_class<P: Portal>(session: &Session<P>, ctx: &RunContext, class_name: &str) -> Result<ClassReport> {
	if !ctx.fidelity.needs_portal() {
		return synthetic_class(class_name);
	}

	let portal = session.portal();
	session.return_to_directory().await?;
	ctx.timeouts
		.page_wait()
		.until_true("class filter", || portal.class_filter_present())
		.await?;

	let group = select_class(portal, class_name, &ctx.timeouts).await?;

	let mut scrape = ClassScrape {
		nav: Navigator::new(portal, ctx.timeouts),
		ctx,
		report: ClassReport::new(class_name),
	};
	scrape.report.group_id = Some(group.group_id);

	let pages = Paginator::new(portal, ctx.timeouts)
		.for_each_page(async |records| {
			scrape.process_page(records).await;
			Ok(())
		})
		.await?;

	let mut report = scrape.report;
	report.pages = pages;
	info!(
		target = "paideia.passes",
		pages,
		students = report.students.len(),
		parents = report.parent_count(),
		failures = report.failures.len(),
		"class complete"
	);
	Ok(report)
}

fn synthetic_class(class_name: &str) -> Result<ClassReport> {
	let students = synthetic::class(class_name)?;
	debug!(target = "paideia.passes", students = students.len(), "using synthetic class");
	Ok(ClassReport {
		class_name: class_name.to_string(),
		group_id: None,
		pages: 1,
		students,
		failures: Vec::new(),
	})
}

struct ClassScrape<'a, P: Portal> {
	nav: Navigator<'a, P>,
	ctx: &'a RunContext,
	report: ClassReport,
}

impl<'a, P: Portal> ClassScrape<'a, P> {
	async fn process_page(&mut self, mut records: Vec<StudentRecord>) {
		self.name_pass(&mut records).await;
		self.contact_pass(&mut records).await;
		self.report.students.extend(records);
	}

	async fn name_pass(&mut self, records: &mut [StudentRecord]) {
		if !self.ctx.fidelity.live_parent_names() {
			for record in records.iter_mut() {
				record.parents = synthetic::parents_for(&record.name);
			}
			return;
		}

		for record in records.iter_mut() {
			match self.parent_names(record).await {
				Ok(names) => {
					debug!(target = "paideia.passes", student = %record.name, parents = names.len(), "found parents");
					record.parents = names.into_iter().map(ParentRecord::named).collect();
				}
				Err(err) => self.failed(&record.name, None, err).await,
			}
		}
	}

	async fn contact_pass(&mut self, records: &mut [StudentRecord]) {
		for record in records.iter_mut() {
			if self.ctx.fidelity != Fidelity::Live {
				for parent in &mut record.parents {
					*parent = synthetic::contact_for(parent);
				}
				continue;
			}

			for index in 0..record.parents.len() {
				let parent_name = record.parents[index].name.clone();
				match self.contact(record, &parent_name).await {
					Ok(contact) => {
						debug!(target = "paideia.passes", student = %record.name, parent = %parent_name, "read contact");
						let parent = &mut record.parents[index];
						parent.email = contact.email;
						parent.phone = contact.phone;
					}
					Err(err) => self.failed(&record.name, Some(&parent_name), err).await,
				}
			}
		}
	}

	async fn parent_names(&mut self, record: &StudentRecord) -> Result<Vec<String>> {
		let card = self.locate(record).await?;
		self.nav.open_student(&card).await?;
		let names = self.nav.enumerate_parents().await?;
		self.nav.close_student().await?;
		Ok(names)
	}

	async fn contact(&mut self, record: &StudentRecord, parent: &str) -> Result<Contact> {
		let card = self.locate(record).await?;
		self.nav.open_student(&card).await?;
		self.nav.open_parent(parent).await?;
		let contact = self.nav.extract_contact().await?;
		self.nav.close_parent().await?;
		Ok(contact)
	}

	/// Finds the record's element again on the current page.
	async fn locate(&self, record: &StudentRecord) -> Result<P::Element> {
		let Some(reference) = record.reference.as_ref() else {
			return Err(Error::StudentNotFound {
				reference: record.name.clone(),
			});
		};

		let portal = self.nav.portal();
		self.ctx
			.timeouts
			.field_wait()
			.until("student record", || portal.find_student(reference))
			.await
			.map_err(|err| match err {
				Error::Timeout { .. } => Error::StudentNotFound {
					reference: reference_label(reference, &record.name),
				},
				other => other,
			})
	}

	async fn failed(&mut self, student: &str, parent: Option<&str>, err: Error) {
		match parent {
			Some(parent) => warn!(target = "paideia.passes", %student, %parent, error = %err, "skipping parent"),
			None => warn!(target = "paideia.passes", %student, error = %err, "skipping student"),
		}
		self.report.failures.push(RecordFailure {
			student: student.to_string(),
			parent: parent.map(str::to_string),
			error: err.to_string(),
		});
		self.nav.reset().await;
	}
}

fn reference_label(reference: &StudentRef, name: &str) -> String {
	format!("{reference} ({name})")
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use crate::context::Timeouts;
	use crate::portal::fake::{FakeClass, FakeDirectory, FakeParent, FakePortal, FakeStudent};

	fn ctx(fidelity: Fidelity) -> RunContext {
		RunContext::new(
			Timeouts {
				page: Duration::from_millis(60),
				field: Duration::from_millis(30),
				poll_interval: Duration::from_millis(2),
			},
			fidelity,
		)
	}

	fn session(dir: FakeDirectory) -> Session<FakePortal> {
		let directory_url = dir.directory_url.clone();
		let base = dir.base_url.clone();
		let portal = FakePortal::new(dir);
		Session::new(portal, base, directory_url)
	}

	async fn logged_in(dir: FakeDirectory) -> Session<FakePortal> {
		let session = session(dir);
		let portal = session.portal();
		portal.goto(session.base_url()).await.unwrap();
		portal.submit_login("parent", "secret").await.unwrap();
		session
	}

	fn kindergarten() -> FakeDirectory {
		FakeDirectory::new("https://portal.test/").with_class(
			FakeClass::new("Kindergarten", "101")
				.with_page(vec![
					FakeStudent::new("Alice Johnson", "Kindergarten, Main")
						.with_id("a1")
						.with_parent(FakeParent::new("John Johnson").email("john@example.com").mobile("555-0101"))
						.with_parent(FakeParent::new("Mary Johnson").broken()),
				])
				.with_page(vec![
					FakeStudent::new("Bob Smith", "Kindergarten")
						.with_parent(FakeParent::new("Tom Smith").mobile("555-0201")),
				]),
		)
	}

	#[tokio::test]
	async fn live_passes_cover_every_page() {
		let session = logged_in(kindergarten()).await;
		let report = scrape_class(&session, &ctx(Fidelity::Live), "Kindergarten").await.unwrap();

		assert_eq!(report.group_id.as_deref(), Some("101"));
		assert_eq!(report.pages, 2);
		let names: Vec<_> = report.students.iter().map(|s| s.name.as_str()).collect();
		assert_eq!(names, ["Alice Johnson", "Bob Smith"]);

		let alice = &report.students[0].parents;
		assert_eq!(alice[0].email.as_deref(), Some("john@example.com"));
		assert_eq!(alice[1].name, "Mary Johnson");
		assert_eq!(alice[1].email, None);
		assert_eq!(report.students[1].parents[0].phone.as_deref(), Some("555-0201"));

		assert_eq!(report.failures.len(), 1);
		assert_eq!(report.failures[0].parent.as_deref(), Some("Mary Johnson"));
	}

	#[tokio::test]
	async fn synthetic_contacts_keep_live_names() {
		let session = logged_in(kindergarten()).await;
		let report = scrape_class(&session, &ctx(Fidelity::SyntheticContacts), "Kindergarten").await.unwrap();

		let mary = &report.students[0].parents[1];
		assert_eq!(mary.name, "Mary Johnson");
		assert_eq!(mary.email.as_deref(), Some("mary.johnson@example.com"));
		assert!(report.failures.is_empty());
		assert!(!session.portal().events().iter().any(|e| e.starts_with("open_parent:")));
	}

	#[tokio::test]
	async fn synthetic_parents_never_open_dialogs() {
		let session = logged_in(kindergarten()).await;
		let report = scrape_class(&session, &ctx(Fidelity::SyntheticParents), "Kindergarten").await.unwrap();

		assert_eq!(report.students[1].parents[0].name, "Parent One Smith");
		assert!(!session.portal().events().iter().any(|e| e.starts_with("open_student:")));
	}

	#[tokio::test]
	async fn fully_synthetic_class_skips_portal() {
		let session = session(FakeDirectory::new("https://portal.test/"));
		let report = scrape_class(&session, &ctx(Fidelity::Synthetic), "2nd Grade").await.unwrap();
		assert_eq!(report.students.len(), 1);
		assert_eq!(report.parent_count(), 3);
		assert!(session.portal().events().is_empty());

		let err = scrape_class(&session, &ctx(Fidelity::Synthetic), "3rd Grade").await.unwrap_err();
		assert!(matches!(err, Error::ClassNotFound { ref available, .. } if available.len() == 3));
	}
}
