//! In-memory directory for exercising navigation without a browser.
//!
//! [`FakePortal`] behaves like the live portal as far as the [`Portal`]
//! contract is concerned: the class filter lags behind a submit, names render
//! late, element handles go stale when the page changes, and opening a parent
//! dialog hides the student dialog beneath it. Every interaction is recorded
//! so tests can assert on ordering.
//!
//! # Example
//!
//! ```ignore
//! let dir = FakeDirectory::new("https://portal.test/")
//!     .with_class(FakeClass::new("Kindergarten", "101").with_page(vec![
//!         FakeStudent::new("Alice Johnson", "Kindergarten, Main").with_parent(FakeParent::new("John Johnson")),
//!     ]));
//! let portal = FakePortal::new(dir);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ClassOption, Portal};
use crate::error::{Error, Result};
use crate::model::StudentRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeParent {
	pub name: String,
	pub email: Option<String>,
	pub phone_lines: Vec<String>,
	/// Clicking this parent's link never brings up the contact panel.
	pub contact_never_renders: bool,
}

impl FakeParent {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			email: None,
			phone_lines: Vec::new(),
			contact_never_renders: false,
		}
	}

	pub fn email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self
	}

	/// Renders the region the way the portal does: label line, then number.
	pub fn mobile(mut self, number: impl Into<String>) -> Self {
		self.phone_lines = vec!["Mobile Phone".to_string(), number.into()];
		self
	}

	pub fn broken(mut self) -> Self {
		self.contact_never_renders = true;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeStudent {
	pub id: Option<String>,
	pub name: String,
	pub location: String,
	pub parents: Vec<FakeParent>,
	/// Reads of the name that come back empty before it renders.
	pub name_delay_reads: u32,
}

impl FakeStudent {
	pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
		Self {
			id: None,
			name: name.into(),
			location: location.into(),
			parents: Vec::new(),
			name_delay_reads: 0,
		}
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn with_parent(mut self, parent: FakeParent) -> Self {
		self.parents.push(parent);
		self
	}

	pub fn name_renders_after(mut self, reads: u32) -> Self {
		self.name_delay_reads = reads;
		self
	}

	/// The name never renders.
	pub fn unnamed(self) -> Self {
		self.name_renders_after(u32::MAX)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeClass {
	pub label: String,
	pub group_id: String,
	pub pages: Vec<Vec<FakeStudent>>,
}

impl FakeClass {
	pub fn new(label: impl Into<String>, group_id: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			group_id: group_id.into(),
			pages: Vec::new(),
		}
	}

	pub fn with_page(mut self, students: Vec<FakeStudent>) -> Self {
		self.pages.push(students);
		self
	}
}

/// Static shape of the simulated portal.
#[derive(Debug, Clone)]
pub struct FakeDirectory {
	pub base_url: String,
	pub directory_url: String,
	pub user: String,
	pub password: String,
	pub classes: Vec<FakeClass>,
	/// Group-id reads that still show the previous search after a submit.
	pub stale_group_reads: u32,
	/// First-record reads that still show the previous page after a click.
	pub page_turn_lag: u32,
	pub login_form: bool,
	pub directory_link_shown: bool,
}

impl FakeDirectory {
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url = base_url.into();
		let directory_url = format!("{}student-directory", base_url);
		Self {
			base_url,
			directory_url,
			user: "parent".to_string(),
			password: "secret".to_string(),
			classes: Vec::new(),
			stale_group_reads: 0,
			page_turn_lag: 0,
			login_form: true,
			directory_link_shown: true,
		}
	}

	pub fn with_class(mut self, class: FakeClass) -> Self {
		self.classes.push(class);
		self
	}

	pub fn with_stale_group_reads(mut self, reads: u32) -> Self {
		self.stale_group_reads = reads;
		self
	}

	pub fn with_page_turn_lag(mut self, reads: u32) -> Self {
		self.page_turn_lag = reads;
		self
	}
}

/// Handle to a simulated element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
	Card { generation: u64, index: usize },
	ParentLink { student: usize, index: usize },
}

#[derive(Debug, Default)]
struct State {
	url: String,
	logged_in: bool,
	chosen: Option<usize>,
	shown_class: Option<usize>,
	pending_class: Option<usize>,
	stale_reads_left: u32,
	page: usize,
	pending_page: Option<usize>,
	page_lag_left: u32,
	generation: u64,
	name_reads: HashMap<(usize, usize, usize), u32>,
	student_open: Option<usize>,
	parent_open: Option<usize>,
	events: Vec<String>,
	quit: bool,
}

impl State {
	fn navigated(&mut self) {
		self.generation += 1;
		self.student_open = None;
		self.parent_open = None;
	}
}

/// Clones share one simulated browser, so a test can keep a handle after
/// handing the portal to a session.
#[derive(Clone)]
pub struct FakePortal {
	dir: Arc<FakeDirectory>,
	state: Arc<Mutex<State>>,
}

impl FakePortal {
	pub fn new(dir: FakeDirectory) -> Self {
		Self {
			dir: Arc::new(dir),
			state: Arc::new(Mutex::new(State::default())),
		}
	}

	/// Interactions so far, in order.
	pub fn events(&self) -> Vec<String> {
		self.state.lock().events.clone()
	}

	pub fn is_quit(&self) -> bool {
		self.state.lock().quit
	}

	fn record(state: &mut State, event: String) {
		state.events.push(event);
	}

	fn page_students<'a>(&'a self, state: &State) -> &'a [FakeStudent] {
		state
			.shown_class
			.and_then(|class| self.dir.classes.get(class))
			.and_then(|class| class.pages.get(state.page))
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	fn card<'a>(&'a self, state: &State, element: &FakeElement) -> Result<(usize, &'a FakeStudent)> {
		match element {
			FakeElement::Card { generation, index } if *generation == state.generation => self
				.page_students(state)
				.get(*index)
				.map(|student| (*index, student))
				.ok_or_else(|| Error::StaleElement(format!("card {index} not on page"))),
			FakeElement::Card { index, .. } => Err(Error::StaleElement(format!("card {index} from a previous page"))),
			FakeElement::ParentLink { .. } => Err(Error::StaleElement("expected a student card".to_string())),
		}
	}

	fn open_student_record<'a>(&'a self, state: &State) -> Option<&'a FakeStudent> {
		state.student_open.and_then(|index| self.page_students(state).get(index))
	}

	fn open_parent_record<'a>(&'a self, state: &State) -> Option<&'a FakeParent> {
		let student = self.open_student_record(state)?;
		state.parent_open.and_then(|index| student.parents.get(index))
	}

	fn contact_visible(&self, state: &State) -> bool {
		self.open_parent_record(state).is_some_and(|parent| !parent.contact_never_renders)
	}

	fn settle_page(state: &mut State) {
		let Some(next) = state.pending_page else {
			return;
		};
		if state.page_lag_left > 0 {
			state.page_lag_left -= 1;
			return;
		}
		state.page = next;
		state.pending_page = None;
		state.navigated();
	}
}

#[async_trait]
impl Portal for FakePortal {
	type Element = FakeElement;

	async fn goto(&self, url: &str) -> Result<()> {
		let mut state = self.state.lock();
		state.url = url.to_string();
		state.navigated();
		Self::record(&mut state, format!("goto:{url}"));
		Ok(())
	}

	async fn login_form_present(&self) -> Result<bool> {
		let state = self.state.lock();
		Ok(self.dir.login_form && state.url == self.dir.base_url && !state.logged_in)
	}

	async fn submit_login(&self, user: &str, password: &str) -> Result<()> {
		let mut state = self.state.lock();
		if !self.dir.login_form || state.url != self.dir.base_url {
			return Err(Error::StaleElement("login form not on page".to_string()));
		}
		state.logged_in = user == self.dir.user && password == self.dir.password;
		Self::record(&mut state, format!("login:{user}"));
		Ok(())
	}

	async fn directory_link(&self) -> Result<Option<String>> {
		let state = self.state.lock();
		let shown = state.logged_in && self.dir.directory_link_shown && state.url == self.dir.base_url;
		Ok(shown.then(|| self.dir.directory_url.clone()))
	}

	async fn class_filter_present(&self) -> Result<bool> {
		let state = self.state.lock();
		Ok(state.logged_in && state.url == self.dir.directory_url)
	}

	async fn class_options(&self) -> Result<Vec<ClassOption>> {
		Ok(self
			.dir
			.classes
			.iter()
			.map(|class| ClassOption {
				label: class.label.clone(),
				value: class.group_id.clone(),
			})
			.collect())
	}

	async fn choose_class(&self, label: &str) -> Result<String> {
		let mut state = self.state.lock();
		let Some(index) = self.dir.classes.iter().position(|class| class.label == label) else {
			return Err(Error::ClassNotFound {
				requested: label.to_string(),
				available: self.dir.classes.iter().map(|c| c.label.clone()).collect(),
			});
		};
		state.chosen = Some(index);
		Self::record(&mut state, format!("choose_class:{label}"));
		Ok(self.dir.classes[index].group_id.clone())
	}

	async fn submit_class_filter(&self) -> Result<()> {
		let mut state = self.state.lock();
		state.pending_class = state.chosen;
		state.stale_reads_left = self.dir.stale_group_reads;
		Self::record(&mut state, "submit_class_filter".to_string());
		Ok(())
	}

	async fn current_group_id(&self) -> Result<Option<String>> {
		let mut state = self.state.lock();
		if let Some(pending) = state.pending_class {
			if state.stale_reads_left > 0 {
				state.stale_reads_left -= 1;
			} else {
				state.shown_class = Some(pending);
				state.pending_class = None;
				state.page = 0;
				state.pending_page = None;
				state.navigated();
			}
		}
		Ok(state
			.shown_class
			.and_then(|class| self.dir.classes.get(class))
			.map(|class| class.group_id.clone()))
	}

	async fn student_cards(&self) -> Result<Vec<FakeElement>> {
		let state = self.state.lock();
		let generation = state.generation;
		Ok((0..self.page_students(&state).len())
			.map(|index| FakeElement::Card { generation, index })
			.collect())
	}

	async fn student_name(&self, card: &FakeElement) -> Result<String> {
		let mut state = self.state.lock();
		let (index, student) = self.card(&state, card)?;
		let key = (state.shown_class.unwrap_or_default(), state.page, index);
		let reads = state.name_reads.entry(key).or_insert(0);
		if *reads < student.name_delay_reads {
			*reads += 1;
			return Ok(String::new());
		}
		Ok(student.name.clone())
	}

	async fn student_location(&self, card: &FakeElement) -> Result<String> {
		let state = self.state.lock();
		Ok(self.card(&state, card)?.1.location.clone())
	}

	async fn student_reference(&self, card: &FakeElement) -> Result<Option<String>> {
		let state = self.state.lock();
		Ok(self.card(&state, card)?.1.id.clone())
	}

	async fn find_student(&self, reference: &StudentRef) -> Result<Option<FakeElement>> {
		let state = self.state.lock();
		let students = self.page_students(&state);
		let index = match reference {
			StudentRef::Attribute(id) => students.iter().position(|s| s.id.as_deref() == Some(id.as_str())),
			StudentRef::Position(index) => (*index < students.len()).then_some(*index),
		};
		Ok(index.map(|index| FakeElement::Card {
			generation: state.generation,
			index,
		}))
	}

	async fn first_student_name(&self) -> Result<Option<String>> {
		let mut state = self.state.lock();
		Self::settle_page(&mut state);
		Ok(self.page_students(&state).first().map(|s| s.name.clone()))
	}

	async fn next_page_available(&self) -> Result<bool> {
		let state = self.state.lock();
		let pages = state
			.shown_class
			.and_then(|class| self.dir.classes.get(class))
			.map_or(0, |class| class.pages.len());
		Ok(state.pending_page.is_none() && state.page + 1 < pages)
	}

	async fn click_next_page(&self) -> Result<()> {
		let mut state = self.state.lock();
		let next = state.page + 1;
		state.pending_page = Some(next);
		state.page_lag_left = self.dir.page_turn_lag;
		Self::record(&mut state, format!("next_page:{next}"));
		Ok(())
	}

	async fn open_student(&self, card: &FakeElement) -> Result<()> {
		let mut state = self.state.lock();
		let (index, student) = self.card(&state, card)?;
		let name = student.name.clone();
		state.student_open = Some(index);
		state.parent_open = None;
		Self::record(&mut state, format!("open_student:{name}"));
		Ok(())
	}

	async fn relationship_panel_present(&self) -> Result<bool> {
		let state = self.state.lock();
		Ok(state.student_open.is_some() && state.parent_open.is_none())
	}

	async fn parent_links(&self) -> Result<Vec<FakeElement>> {
		let state = self.state.lock();
		if state.parent_open.is_some() {
			return Ok(Vec::new());
		}
		let (Some(student), Some(record)) = (state.student_open, self.open_student_record(&state)) else {
			return Ok(Vec::new());
		};
		Ok((0..record.parents.len())
			.map(|index| FakeElement::ParentLink { student, index })
			.collect())
	}

	async fn link_text(&self, link: &FakeElement) -> Result<String> {
		let state = self.state.lock();
		match link {
			FakeElement::ParentLink { student, index } if state.student_open == Some(*student) && state.parent_open.is_none() => self
				.open_student_record(&state)
				.and_then(|record| record.parents.get(*index))
				.map(|parent| parent.name.clone())
				.ok_or_else(|| Error::StaleElement(format!("parent link {index}"))),
			_ => Err(Error::StaleElement("parent link no longer visible".to_string())),
		}
	}

	async fn click_link(&self, link: &FakeElement) -> Result<()> {
		let mut state = self.state.lock();
		let FakeElement::ParentLink { student, index } = link else {
			return Err(Error::StaleElement("expected a parent link".to_string()));
		};
		if state.student_open != Some(*student) || state.parent_open.is_some() {
			return Err(Error::StaleElement("parent link no longer visible".to_string()));
		}
		let name = self
			.open_student_record(&state)
			.and_then(|record| record.parents.get(*index))
			.map(|parent| parent.name.clone())
			.unwrap_or_default();
		state.parent_open = Some(*index);
		Self::record(&mut state, format!("open_parent:{name}"));
		Ok(())
	}

	async fn contact_panel_present(&self) -> Result<bool> {
		let state = self.state.lock();
		Ok(self.contact_visible(&state))
	}

	async fn contact_email(&self) -> Result<Option<String>> {
		let state = self.state.lock();
		if !self.contact_visible(&state) {
			return Ok(None);
		}
		Ok(self.open_parent_record(&state).and_then(|parent| parent.email.clone()))
	}

	async fn contact_phone_lines(&self) -> Result<Vec<String>> {
		let state = self.state.lock();
		if !self.contact_visible(&state) {
			return Ok(Vec::new());
		}
		Ok(self
			.open_parent_record(&state)
			.map(|parent| parent.phone_lines.clone())
			.unwrap_or_default())
	}

	async fn dialog_open(&self) -> Result<bool> {
		let state = self.state.lock();
		Ok(state.student_open.is_some() || state.parent_open.is_some())
	}

	async fn close_dialog(&self) -> Result<()> {
		let mut state = self.state.lock();
		if state.parent_open.is_some() {
			// The portal tears down the student dialog together with the parent one.
			state.parent_open = None;
			state.student_open = None;
			Self::record(&mut state, "close_parent".to_string());
		} else if state.student_open.is_some() {
			state.student_open = None;
			Self::record(&mut state, "close_student".to_string());
		}
		Ok(())
	}

	async fn quit(&self) -> Result<()> {
		let mut state = self.state.lock();
		state.quit = true;
		Self::record(&mut state, "quit".to_string());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn portal() -> FakePortal {
		FakePortal::new(
			FakeDirectory::new("https://portal.test/").with_class(
				FakeClass::new("Kindergarten", "101")
					.with_page(vec![FakeStudent::new("Alice", "Kindergarten, Main").with_parent(FakeParent::new("John"))])
					.with_page(vec![FakeStudent::new("Bob", "Kindergarten, Main")]),
			),
		)
	}

	#[tokio::test]
	async fn cards_go_stale_after_page_turn() {
		let portal = portal();
		portal.choose_class("Kindergarten").await.unwrap();
		portal.submit_class_filter().await.unwrap();
		portal.current_group_id().await.unwrap();

		let cards = portal.student_cards().await.unwrap();
		portal.click_next_page().await.unwrap();
		assert_eq!(portal.first_student_name().await.unwrap().as_deref(), Some("Bob"));
		assert!(matches!(portal.student_name(&cards[0]).await, Err(Error::StaleElement(_))));
	}

	#[tokio::test]
	async fn parent_dialog_hides_relationship_panel() {
		let portal = portal();
		portal.choose_class("Kindergarten").await.unwrap();
		portal.submit_class_filter().await.unwrap();
		portal.current_group_id().await.unwrap();

		let cards = portal.student_cards().await.unwrap();
		portal.open_student(&cards[0]).await.unwrap();
		let links = portal.parent_links().await.unwrap();
		portal.click_link(&links[0]).await.unwrap();
		assert!(!portal.relationship_panel_present().await.unwrap());
		assert!(portal.contact_panel_present().await.unwrap());

		portal.close_dialog().await.unwrap();
		assert!(!portal.contact_panel_present().await.unwrap());
		assert!(!portal.relationship_panel_present().await.unwrap());
	}
}
