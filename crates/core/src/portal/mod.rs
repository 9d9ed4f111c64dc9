//! Typed adapter over the remote directory UI.
//!
//! One method per thing the scraper needs to see or do on the page. The
//! adapter performs single, immediate interactions only: "is the panel there
//! right now", "click this". Waiting for the page to catch up is the caller's
//! job (see [`crate::wait::Wait`]).

pub mod fake;
pub mod webdriver;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::StudentRef;

/// One entry of the class filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOption {
	pub label: String,
	pub value: String,
}

#[async_trait]
pub trait Portal: Send + Sync {
	/// Handle to an element on the current page. Invalidated by navigation.
	type Element: Clone + Send + Sync + std::fmt::Debug;

	async fn goto(&self, url: &str) -> Result<()>;

	// Login page.

	/// Both the username and password fields are on the page.
	async fn login_form_present(&self) -> Result<bool>;
	async fn submit_login(&self, user: &str, password: &str) -> Result<()>;
	/// Href of the post-login student directory link, if shown.
	async fn directory_link(&self) -> Result<Option<String>>;

	// Class filter.

	async fn class_filter_present(&self) -> Result<bool>;
	async fn class_options(&self) -> Result<Vec<ClassOption>>;
	/// Selects the option with exactly this label and returns its value.
	async fn choose_class(&self, label: &str) -> Result<String>;
	async fn submit_class_filter(&self) -> Result<()>;
	/// Group id of the search the page is currently showing.
	async fn current_group_id(&self) -> Result<Option<String>>;

	// Roster.

	async fn student_cards(&self) -> Result<Vec<Self::Element>>;
	async fn student_name(&self, card: &Self::Element) -> Result<String>;
	async fn student_location(&self, card: &Self::Element) -> Result<String>;
	async fn student_reference(&self, card: &Self::Element) -> Result<Option<String>>;
	async fn find_student(&self, reference: &StudentRef) -> Result<Option<Self::Element>>;
	async fn first_student_name(&self) -> Result<Option<String>>;
	async fn next_page_available(&self) -> Result<bool>;
	async fn click_next_page(&self) -> Result<()>;

	// Dialogs.

	async fn open_student(&self, card: &Self::Element) -> Result<()>;
	async fn relationship_panel_present(&self) -> Result<bool>;
	async fn parent_links(&self) -> Result<Vec<Self::Element>>;
	async fn link_text(&self, link: &Self::Element) -> Result<String>;
	async fn click_link(&self, link: &Self::Element) -> Result<()>;
	async fn contact_panel_present(&self) -> Result<bool>;
	async fn contact_email(&self) -> Result<Option<String>>;
	/// Text lines of the mobile-phone region, top to bottom.
	async fn contact_phone_lines(&self) -> Result<Vec<String>>;
	/// Any dialog is on screen, whatever its content.
	async fn dialog_open(&self) -> Result<bool>;
	/// Clicks the topmost dialog's close control.
	async fn close_dialog(&self) -> Result<()>;

	/// Ends the browser session.
	async fn quit(&self) -> Result<()>;
}
