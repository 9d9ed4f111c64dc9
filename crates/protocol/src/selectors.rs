//! CSS selectors for every portal control the scraper touches.

use serde::{Deserialize, Serialize};

/// Name attribute of the class ("location") filter `<select>`.
pub const CLASS_FILTER_NAME: &str = "const_search_location";

/// Path fragment of the post-login link to the student directory.
pub const DIRECTORY_PATH: &str = "/pythons/parent-portal/student-directory";

/// Attribute on the pagination element that carries the active search as JSON.
pub const SEARCH_PARAMS_ATTR: &str = "data-searchparams";

/// Selector set for the student directory.
///
/// Defaults match the live portal. Everything is overridable so a markup
/// change can be absorbed without touching navigation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
	pub username_field: String,
	pub password_field: String,
	pub directory_link: String,
	pub class_filter: String,
	pub pagination: String,
	pub next_page: String,
	pub student_card: String,
	pub student_name: String,
	pub student_location: String,
	pub student_link: String,
	/// Attribute on the card holding a stable per-record reference.
	pub student_reference_attr: String,
	pub relationship_panel: String,
	pub parent_link: String,
	pub contact_panel: String,
	pub contact_email: String,
	pub contact_mobile_lines: String,
	pub dialog_close: String,
}

impl Default for Selectors {
	fn default() -> Self {
		Self {
			username_field: "input[name='username']".into(),
			password_field: "input[name='password']".into(),
			directory_link: format!("a[href*='{DIRECTORY_PATH}']"),
			class_filter: format!("select[name='{CLASS_FILTER_NAME}']"),
			pagination: ".fsElementPagination".into(),
			next_page: ".fsElementPagination .fsNextPageLink".into(),
			student_card: ".fsConstituentItem".into(),
			student_name: ".fsFullName".into(),
			student_location: ".fsLocation".into(),
			student_link: ".fsConstituentProfileLink".into(),
			student_reference_attr: "data-constituent-id".into(),
			relationship_panel: ".fsConstituentRelationships".into(),
			parent_link: ".fsConstituentRelationships .fsRelationshipLink".into(),
			contact_panel: ".fsConstituentContactInfo".into(),
			contact_email: ".fsHomeEmail a".into(),
			contact_mobile_lines: ".fsMobilePhone div".into(),
			dialog_close: ".fsDialogCloseButton".into(),
		}
	}
}

impl Selectors {
	/// Selector matching the card whose reference attribute equals `reference`.
	pub fn student_card_by_reference(&self, reference: &str) -> String {
		let escaped = reference.replace('\\', "\\\\").replace('"', "\\\"");
		format!("{}[{}=\"{}\"]", self.student_card, self.student_reference_attr, escaped)
	}
}
