//! Records extracted from the directory.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A class filter that has taken effect on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGroup {
	/// Display label of the filter option.
	pub name: String,
	/// Opaque id the portal assigned to the filter.
	pub group_id: String,
}

/// How to find a roster record again after dialogs have come and gone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentRef {
	/// Value of the card's reference attribute.
	Attribute(String),
	/// Position on the current page, when the card carries no reference.
	Position(usize),
}

impl fmt::Display for StudentRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StudentRef::Attribute(id) => write!(f, "#{id}"),
			StudentRef::Position(index) => write!(f, "position {index}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRecord {
	pub name: String,
	pub email: Option<String>,
	pub phone: Option<String>,
}

impl ParentRecord {
	/// A parent known only by name; contact fields are filled later, if at all.
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			email: None,
			phone: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
	pub name: String,
	#[serde(rename = "class")]
	pub class_name: String,
	/// Portal display order; never re-sorted.
	pub parents: Vec<ParentRecord>,
	#[serde(skip)]
	pub reference: Option<StudentRef>,
}

impl StudentRecord {
	pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			class_name: class_name.into(),
			parents: Vec::new(),
			reference: None,
		}
	}

	pub fn with_reference(mut self, reference: StudentRef) -> Self {
		self.reference = Some(reference);
		self
	}

	pub fn with_parents(mut self, parents: Vec<ParentRecord>) -> Self {
		self.parents = parents;
		self
	}
}
