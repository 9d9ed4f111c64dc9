//! [`Portal`] over a WebDriver browser session.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use paideia_protocol::{SEARCH_PARAMS_ATTR, Selectors, current_group_id, non_blank};
use paideia_runtime::{DriverOptions, WebDriverProcess};
use serde_json::json;
use tracing::debug;

use super::{ClassOption, Portal};
use crate::error::{Error, Result};
use crate::model::StudentRef;

const SUBMIT_FORM_JS: &str = r#"
const el = arguments[0];
if (el.form) {
	if (typeof el.form.requestSubmit === "function") { el.form.requestSubmit(); } else { el.form.submit(); }
} else {
	el.dispatchEvent(new Event("change", { bubbles: true }));
}
"#;

/// How to reach a browser.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
	/// Existing WebDriver server; chromedriver is spawned when `None`.
	pub webdriver_url: Option<String>,
	pub headless: bool,
	pub driver: DriverOptions,
}

impl Default for BrowserOptions {
	fn default() -> Self {
		Self {
			webdriver_url: None,
			headless: true,
			driver: DriverOptions::default(),
		}
	}
}

impl BrowserOptions {
	fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
		let mut args = vec!["--no-sandbox", "--disable-dev-shm-usage"];
		if self.headless {
			args.push("--headless=new");
			args.push("--disable-gpu");
		}

		let mut caps = serde_json::Map::new();
		caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
		caps
	}
}

/// Live portal adapter backed by a `fantoccini` client.
pub struct WebDriverPortal {
	client: Client,
	selectors: Selectors,
	// Dropped after the client; kills the spawned chromedriver.
	_driver: Option<WebDriverProcess>,
}

impl WebDriverPortal {
	/// Starts (or connects to) a WebDriver server and opens a browser session.
	pub async fn launch(options: &BrowserOptions, selectors: Selectors) -> Result<Self> {
		let (url, driver) = match &options.webdriver_url {
			Some(url) => (url.clone(), None),
			None => {
				let process = WebDriverProcess::spawn(&options.driver).await?;
				(process.url(), Some(process))
			}
		};

		debug!(target = "paideia.portal", %url, headless = options.headless, "connecting to webdriver");
		let client = ClientBuilder::rustls().capabilities(options.capabilities()).connect(&url).await?;

		Ok(Self {
			client,
			selectors,
			_driver: driver,
		})
	}

	async fn all(&self, selector: &str) -> Result<Vec<Element>> {
		Ok(self.client.find_all(Locator::Css(selector)).await?)
	}

	async fn first(&self, selector: &str) -> Result<Option<Element>> {
		Ok(self.all(selector).await?.into_iter().next())
	}

	async fn any_displayed(&self, selector: &str) -> Result<bool> {
		for element in self.all(selector).await? {
			if element.is_displayed().await? {
				return Ok(true);
			}
		}
		Ok(false)
	}

	async fn child_text(&self, parent: &Element, selector: &str) -> Result<String> {
		let children = parent.find_all(Locator::Css(selector)).await?;
		match children.first() {
			Some(child) => Ok(child.text().await?.trim().to_string()),
			None => Ok(String::new()),
		}
	}

	async fn submit_enclosing_form(&self, element: &Element) -> Result<()> {
		let arg = serde_json::to_value(element)?;
		self.client.execute(SUBMIT_FORM_JS, vec![arg]).await?;
		Ok(())
	}

	async fn class_filter(&self) -> Result<Element> {
		Ok(self.client.find(Locator::Css(&self.selectors.class_filter)).await?)
	}
}

#[async_trait]
impl Portal for WebDriverPortal {
	type Element = Element;

	async fn goto(&self, url: &str) -> Result<()> {
		Ok(self.client.goto(url).await?)
	}

	async fn login_form_present(&self) -> Result<bool> {
		let user = self.first(&self.selectors.username_field).await?;
		let password = self.first(&self.selectors.password_field).await?;
		Ok(user.is_some() && password.is_some())
	}

	async fn submit_login(&self, user: &str, password: &str) -> Result<()> {
		let user_field = self.client.find(Locator::Css(&self.selectors.username_field)).await?;
		user_field.send_keys(user).await?;

		let password_field = self.client.find(Locator::Css(&self.selectors.password_field)).await?;
		password_field.send_keys(password).await?;
		self.submit_enclosing_form(&password_field).await
	}

	async fn directory_link(&self) -> Result<Option<String>> {
		match self.first(&self.selectors.directory_link).await? {
			Some(link) => Ok(non_blank(link.attr("href").await?)),
			None => Ok(None),
		}
	}

	async fn class_filter_present(&self) -> Result<bool> {
		Ok(self.first(&self.selectors.class_filter).await?.is_some())
	}

	async fn class_options(&self) -> Result<Vec<ClassOption>> {
		let select = self.class_filter().await?;
		let mut options = Vec::new();
		for option in select.find_all(Locator::Css("option")).await? {
			let label = option.text().await?.trim().to_string();
			let value = option.attr("value").await?.unwrap_or_default();
			options.push(ClassOption { label, value });
		}
		Ok(options)
	}

	async fn choose_class(&self, label: &str) -> Result<String> {
		let select = self.class_filter().await?;
		for option in select.find_all(Locator::Css("option")).await? {
			if option.text().await?.trim() == label {
				option.click().await?;
				return Ok(option.attr("value").await?.unwrap_or_default());
			}
		}
		Err(Error::ClassNotFound {
			requested: label.to_string(),
			available: Vec::new(),
		})
	}

	async fn submit_class_filter(&self) -> Result<()> {
		let select = self.class_filter().await?;
		self.submit_enclosing_form(&select).await
	}

	async fn current_group_id(&self) -> Result<Option<String>> {
		let Some(pagination) = self.first(&self.selectors.pagination).await? else {
			return Ok(None);
		};
		Ok(pagination.attr(SEARCH_PARAMS_ATTR).await?.as_deref().and_then(current_group_id))
	}

	async fn student_cards(&self) -> Result<Vec<Element>> {
		self.all(&self.selectors.student_card).await
	}

	async fn student_name(&self, card: &Element) -> Result<String> {
		self.child_text(card, &self.selectors.student_name).await
	}

	async fn student_location(&self, card: &Element) -> Result<String> {
		self.child_text(card, &self.selectors.student_location).await
	}

	async fn student_reference(&self, card: &Element) -> Result<Option<String>> {
		Ok(non_blank(card.attr(&self.selectors.student_reference_attr).await?))
	}

	async fn find_student(&self, reference: &StudentRef) -> Result<Option<Element>> {
		match reference {
			StudentRef::Attribute(id) => self.first(&self.selectors.student_card_by_reference(id)).await,
			StudentRef::Position(index) => Ok(self.student_cards().await?.into_iter().nth(*index)),
		}
	}

	async fn first_student_name(&self) -> Result<Option<String>> {
		match self.first(&self.selectors.student_card).await? {
			Some(card) => Ok(non_blank(Some(self.student_name(&card).await?))),
			None => Ok(None),
		}
	}

	async fn next_page_available(&self) -> Result<bool> {
		Ok(self.first(&self.selectors.next_page).await?.is_some())
	}

	async fn click_next_page(&self) -> Result<()> {
		let next = self.client.find(Locator::Css(&self.selectors.next_page)).await?;
		Ok(next.click().await?)
	}

	async fn open_student(&self, card: &Element) -> Result<()> {
		let links = card.find_all(Locator::Css(&self.selectors.student_link)).await?;
		match links.into_iter().next() {
			Some(link) => link.click().await?,
			None => card.click().await?,
		}
		Ok(())
	}

	async fn relationship_panel_present(&self) -> Result<bool> {
		self.any_displayed(&self.selectors.relationship_panel).await
	}

	async fn parent_links(&self) -> Result<Vec<Element>> {
		self.all(&self.selectors.parent_link).await
	}

	async fn link_text(&self, link: &Element) -> Result<String> {
		Ok(link.text().await?.trim().to_string())
	}

	async fn click_link(&self, link: &Element) -> Result<()> {
		Ok(link.click().await?)
	}

	async fn contact_panel_present(&self) -> Result<bool> {
		self.any_displayed(&self.selectors.contact_panel).await
	}

	async fn contact_email(&self) -> Result<Option<String>> {
		match self.first(&self.selectors.contact_email).await? {
			Some(email) => Ok(non_blank(Some(email.text().await?))),
			None => Ok(None),
		}
	}

	async fn contact_phone_lines(&self) -> Result<Vec<String>> {
		let mut lines = Vec::new();
		for line in self.all(&self.selectors.contact_mobile_lines).await? {
			lines.push(line.text().await?);
		}
		Ok(lines)
	}

	async fn dialog_open(&self) -> Result<bool> {
		self.any_displayed(&self.selectors.dialog_close).await
	}

	async fn close_dialog(&self) -> Result<()> {
		// Nested dialogs each render a close control; the last one is topmost.
		let closes = self.all(&self.selectors.dialog_close).await?;
		let mut topmost = None;
		for close in closes {
			if close.is_displayed().await? {
				topmost = Some(close);
			}
		}
		match topmost {
			Some(close) => Ok(close.click().await?),
			None => Ok(()),
		}
	}

	async fn quit(&self) -> Result<()> {
		debug!(target = "paideia.portal", "closing browser session");
		Ok(self.client.clone().close().await?)
	}
}
