//! Per-run settings passed down to every component.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::wait::{DEFAULT_POLL_INTERVAL, Wait};
use crate::{DEFAULT_FIELD_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};

/// Bounded-wait budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
	/// Page loads, dialogs, filter changes, pagination.
	pub page: Duration,
	/// A single record's fields populating.
	pub field: Duration,
	pub poll_interval: Duration,
}

impl Default for Timeouts {
	fn default() -> Self {
		Self {
			page: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
			field: Duration::from_secs(DEFAULT_FIELD_TIMEOUT_SECS),
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}
}

impl Timeouts {
	pub fn page_wait(&self) -> Wait {
		Wait::new(self.page).with_poll_interval(self.poll_interval)
	}

	pub fn field_wait(&self) -> Wait {
		Wait::new(self.field).with_poll_interval(self.poll_interval)
	}
}

/// Which extraction passes read the live portal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fidelity {
	/// Roster, parent names and contacts all come from the portal.
	#[default]
	Live,
	/// Live roster and parent names; contacts are synthetic.
	SyntheticContacts,
	/// Live roster; parent names and contacts are synthetic.
	SyntheticParents,
	/// Nothing touches the portal; the fixed synthetic dataset is used.
	Synthetic,
}

impl Fidelity {
	pub fn needs_portal(self) -> bool {
		self != Fidelity::Synthetic
	}

	pub fn live_parent_names(self) -> bool {
		matches!(self, Fidelity::Live | Fidelity::SyntheticContacts)
	}

	pub fn live_contacts(self) -> bool {
		self == Fidelity::Live
	}
}

impl fmt::Display for Fidelity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Fidelity::Live => "live",
			Fidelity::SyntheticContacts => "synthetic-contacts",
			Fidelity::SyntheticParents => "synthetic-parents",
			Fidelity::Synthetic => "synthetic",
		};
		f.write_str(name)
	}
}

impl FromStr for Fidelity {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"live" | "none" => Ok(Fidelity::Live),
			"contacts" | "synthetic-contacts" => Ok(Fidelity::SyntheticContacts),
			"parents" | "synthetic-parents" => Ok(Fidelity::SyntheticParents),
			"all" | "synthetic" => Ok(Fidelity::Synthetic),
			other => Err(format!("unknown fidelity '{other}' (expected live, contacts, parents or all)")),
		}
	}
}

/// Settings shared by one scraping run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
	pub timeouts: Timeouts,
	pub fidelity: Fidelity,
}

impl RunContext {
	pub fn new(timeouts: Timeouts, fidelity: Fidelity) -> Self {
		Self { timeouts, fidelity }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_timeouts() {
		let timeouts = Timeouts::default();
		assert_eq!(timeouts.page, Duration::from_secs(60));
		assert_eq!(timeouts.field, Duration::from_secs(10));
		assert_eq!(timeouts.page_wait().timeout(), Duration::from_secs(60));
	}

	#[test]
	fn fidelity_pass_selection() {
		assert!(Fidelity::Live.live_contacts());
		assert!(Fidelity::SyntheticContacts.live_parent_names());
		assert!(!Fidelity::SyntheticContacts.live_contacts());
		assert!(!Fidelity::SyntheticParents.live_parent_names());
		assert!(!Fidelity::Synthetic.needs_portal());
	}

	#[test]
	fn fidelity_parses_short_names() {
		assert_eq!("all".parse::<Fidelity>().unwrap(), Fidelity::Synthetic);
		assert_eq!("Contacts".parse::<Fidelity>().unwrap(), Fidelity::SyntheticContacts);
		assert!("everything".parse::<Fidelity>().is_err());
	}
}
