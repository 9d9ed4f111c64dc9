//! Accumulated records across classes.

use crate::model::StudentRecord;

/// Every student scraped in a run, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
	records: Vec<StudentRecord>,
}

impl Dataset {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, record: StudentRecord) {
		self.records.push(record);
	}

	/// Appends one class's worth of records.
	pub fn extend(&mut self, records: impl IntoIterator<Item = StudentRecord>) {
		self.records.extend(records);
	}

	pub fn records(&self) -> &[StudentRecord] {
		&self.records
	}

	/// Distinct class names, first-seen order.
	pub fn classes(&self) -> Vec<&str> {
		let mut classes: Vec<&str> = Vec::new();
		for record in &self.records {
			if !classes.contains(&record.class_name.as_str()) {
				classes.push(&record.class_name);
			}
		}
		classes
	}

	/// Records grouped by class, groups in first-seen order and records in
	/// insertion order within each group.
	pub fn by_class(&self) -> Vec<(&str, Vec<&StudentRecord>)> {
		self.classes()
			.into_iter()
			.map(|class| {
				let members = self.records.iter().filter(|r| r.class_name == class).collect();
				(class, members)
			})
			.collect()
	}

	pub fn student_count(&self) -> usize {
		self.records.len()
	}

	pub fn parent_count(&self) -> usize {
		self.records.iter().map(|r| r.parents.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

impl FromIterator<StudentRecord> for Dataset {
	fn from_iter<I: IntoIterator<Item = StudentRecord>>(iter: I) -> Self {
		Self {
			records: iter.into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::synthetic;

	#[test]
	fn groups_in_first_seen_order() {
		let mut dataset = Dataset::new();
		dataset.add(StudentRecord::new("Zed", "2nd Grade"));
		dataset.extend(synthetic::students());

		let groups = dataset.by_class();
		let names: Vec<_> = groups.iter().map(|(class, _)| *class).collect();
		assert_eq!(names, ["2nd Grade", "Kindergarten", "1st Grade"]);
		assert_eq!(groups[0].1.len(), 2);
		assert_eq!(groups[0].1[0].name, "Zed");
		assert_eq!(dataset.student_count(), 8);
		assert_eq!(dataset.parent_count(), 12);
	}

	#[test]
	fn empty_dataset() {
		let dataset: Dataset = Vec::new().into_iter().collect();
		assert!(dataset.is_empty());
		assert!(dataset.classes().is_empty());
	}
}
