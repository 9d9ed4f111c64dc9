//! Deterministic stand-in data for dry runs and partial scrapes.
//!
//! [`students`] is a fixed directory that exercises every export shape:
//! uneven parent counts per class and absent emails and phones.
//! [`parents_for`] and [`contact_for`] fill in whichever passes a
//! [`crate::Fidelity`] leaves synthetic, derived only from their input so
//! repeated runs export identical workbooks.

use crate::error::{Error, Result};
use crate::model::{ParentRecord, StudentRecord};

fn parent(name: &str, email: Option<&str>, phone: Option<&str>) -> ParentRecord {
	ParentRecord {
		name: name.to_string(),
		email: email.map(str::to_string),
		phone: phone.map(str::to_string),
	}
}

/// The fixed synthetic directory, in roster order.
pub fn students() -> Vec<StudentRecord> {
	vec![
		StudentRecord::new("Alice Johnson", "Kindergarten").with_parents(vec![
			parent("John Johnson", Some("john.johnson@email.com"), Some("555-0101")),
			parent("Mary Johnson", Some("mary.johnson@email.com"), None),
		]),
		StudentRecord::new("Bob Smith", "Kindergarten").with_parents(vec![parent("Tom Smith", None, Some("555-0201"))]),
		StudentRecord::new("Charlie Brown", "Kindergarten").with_parents(vec![
			parent("Frank Brown", Some("frank.brown@email.com"), Some("555-0301")),
			parent("Sally Brown", Some("sally.brown@email.com"), Some("555-0302")),
		]),
		StudentRecord::new("Diana Prince", "1st Grade").with_parents(vec![parent(
			"Steve Trevor",
			Some("steve.trevor@email.com"),
			Some("555-0401"),
		)]),
		StudentRecord::new("Eve Wilson", "1st Grade").with_parents(vec![parent("Bruce Wayne", None, None)]),
		StudentRecord::new("Frank Miller", "1st Grade").with_parents(vec![
			parent("Clark Kent", Some("clark.kent@email.com"), Some("555-0601")),
			parent("Lois Lane", Some("lois.lane@email.com"), Some("555-0602")),
		]),
		StudentRecord::new("Grace Hopper", "2nd Grade").with_parents(vec![
			parent("Walter Hopper", Some("walter.hopper@email.com"), Some("555-0701")),
			parent("Mary Hopper", None, Some("555-0702")),
			parent("Vincent Hopper", Some("vincent.hopper@email.com"), None),
		]),
	]
}

/// The synthetic students of one class.
///
/// Fails with [`Error::ClassNotFound`] listing the synthetic classes when
/// `class_name` is not one of them.
pub fn class(class_name: &str) -> Result<Vec<StudentRecord>> {
	let all = students();
	let members: Vec<_> = all.iter().filter(|s| s.class_name == class_name).cloned().collect();
	if !members.is_empty() {
		return Ok(members);
	}

	let mut available: Vec<String> = Vec::new();
	for student in all {
		if !available.contains(&student.class_name) {
			available.push(student.class_name);
		}
	}
	Err(Error::ClassNotFound {
		requested: class_name.to_string(),
		available,
	})
}

/// Two name-only parents sharing the student's surname.
pub fn parents_for(student: &str) -> Vec<ParentRecord> {
	let surname = student.split_whitespace().last().unwrap_or("Student");
	vec![
		ParentRecord::named(format!("Parent One {surname}")),
		ParentRecord::named(format!("Parent Two {surname}")),
	]
}

/// Fills in a plausible email and mobile number for `parent`.
pub fn contact_for(parent: &ParentRecord) -> ParentRecord {
	let local: String = parent
		.name
		.split_whitespace()
		.map(|part| part.chars().filter(char::is_ascii_alphanumeric).collect::<String>().to_ascii_lowercase())
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join(".");
	let local = if local.is_empty() { "parent".to_string() } else { local };

	let line = parent.name.bytes().fold(0u32, |acc, b| (acc * 31 + u32::from(b)) % 10_000);

	ParentRecord {
		name: parent.name.clone(),
		email: Some(format!("{local}@example.com")),
		phone: Some(format!("555-{line:04}")),
	}
}
