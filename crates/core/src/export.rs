//! Spreadsheet export, one worksheet per class.
//!
//! Rows are shaped by [`layout`] independently of the writer: each sheet gets
//! `Student`, `Class`, then a `Parent N Name` / `Parent N Email` /
//! `Parent N Phone` triple for every N up to the largest parent count in that
//! class. Students with fewer parents get empty cells in the trailing triples.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::Result;

/// Excel's sheet-name length limit.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

const RESERVED_SHEET_NAME: &str = "history";

/// Destination for a finished [`Dataset`].
pub trait ExportSink {
	fn export(&mut self, dataset: &Dataset) -> Result<()>;
}

/// Rows and formatting for one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
	/// Sanitized worksheet name.
	pub name: String,
	pub class_name: String,
	pub headers: Vec<String>,
	/// One row per student; `None` is an empty cell.
	pub rows: Vec<Vec<Option<String>>>,
	pub column_widths: Vec<f64>,
}

impl SheetLayout {
	pub fn parent_slots(&self) -> usize {
		(self.headers.len() - 2) / 3
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
	Student,
	Class,
	Name,
	Email,
	Phone,
}

impl ColumnKind {
	fn of(header: &str) -> Self {
		if header.contains("Student") {
			ColumnKind::Student
		} else if header.contains("Class") {
			ColumnKind::Class
		} else if header.contains("Email") {
			ColumnKind::Email
		} else if header.contains("Phone") {
			ColumnKind::Phone
		} else {
			ColumnKind::Name
		}
	}

	fn bounds(self) -> (usize, usize) {
		match self {
			ColumnKind::Student => (15, 40),
			ColumnKind::Class => (20, 30),
			ColumnKind::Name => (20, 40),
			ColumnKind::Email => (30, 50),
			ColumnKind::Phone => (15, 20),
		}
	}
}

fn column_width(header: &str, cells: impl Iterator<Item = usize>) -> f64 {
	let (min, max) = ColumnKind::of(header).bounds();
	let fitted = cells.map(|len| len + 2).fold(header.chars().count(), usize::max);
	fitted.clamp(min, max) as f64
}

/// Makes `raw` a valid worksheet name not already in `taken`.
///
/// Forbidden characters become `_`, surrounding apostrophes are dropped, the
/// result is cut to [`MAX_SHEET_NAME_LEN`] characters, and a ` (n)` suffix is
/// added when the name collides case-insensitively with an earlier sheet or
/// with Excel's reserved `History` sheet.
pub fn sanitize_sheet_name(raw: &str, taken: &[String]) -> String {
	let cleaned: String = raw
		.chars()
		.map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
		.collect();
	let base = fit(cleaned.trim(), MAX_SHEET_NAME_LEN);
	let base = if base.is_empty() { "Sheet".to_string() } else { base };

	let clashes = |name: &str| {
		let folded = name.to_lowercase();
		folded == RESERVED_SHEET_NAME || taken.iter().any(|t| t.to_lowercase() == folded)
	};
	if !clashes(&base) {
		return base;
	}

	let mut n = 2;
	loop {
		let suffix = format!(" ({n})");
		let candidate = format!("{}{suffix}", fit(&base, MAX_SHEET_NAME_LEN - suffix.len()));
		if !clashes(&candidate) {
			return candidate;
		}
		n += 1;
	}
}

// Sheet names may not start or end with an apostrophe, and cutting can expose one.
fn fit(s: &str, max_chars: usize) -> String {
	let cut: String = s.trim_matches('\'').chars().take(max_chars).collect();
	cut.trim_end_matches('\'').to_string()
}

/// Shapes `dataset` into worksheets, one per class in first-seen order.
pub fn layout(dataset: &Dataset) -> Vec<SheetLayout> {
	let mut sheets: Vec<SheetLayout> = Vec::new();

	for (class_name, students) in dataset.by_class() {
		let slots = students.iter().map(|s| s.parents.len()).max().unwrap_or(0);

		let mut headers = vec!["Student".to_string(), "Class".to_string()];
		for n in 1..=slots {
			headers.push(format!("Parent {n} Name"));
			headers.push(format!("Parent {n} Email"));
			headers.push(format!("Parent {n} Phone"));
		}

		let rows: Vec<Vec<Option<String>>> = students
			.iter()
			.map(|student| {
				let mut row = Vec::with_capacity(headers.len());
				row.push(Some(student.name.clone()));
				row.push(Some(class_name.to_string()));
				for parent in &student.parents {
					row.push(Some(parent.name.clone()));
					row.push(parent.email.clone());
					row.push(parent.phone.clone());
				}
				row.resize(headers.len(), None);
				row
			})
			.collect();

		let column_widths = headers
			.iter()
			.enumerate()
			.map(|(col, header)| {
				let lengths = rows.iter().filter_map(|row| row[col].as_deref()).map(|cell| cell.chars().count());
				column_width(header, lengths)
			})
			.collect();

		let taken: Vec<String> = sheets.iter().map(|s| s.name.clone()).collect();
		sheets.push(SheetLayout {
			name: sanitize_sheet_name(class_name, &taken),
			class_name: class_name.to_string(),
			headers,
			rows,
			column_widths,
		});
	}

	sheets
}

/// Writes an `.xlsx` workbook, replacing any existing file.
#[derive(Debug, Clone)]
pub struct XlsxSink {
	path: PathBuf,
}

impl XlsxSink {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn workbook(dataset: &Dataset) -> Result<Workbook> {
		let mut workbook = Workbook::new();
		let bold = Format::new().set_bold();

		for sheet in layout(dataset) {
			debug!(
				target = "paideia.export",
				sheet = %sheet.name,
				students = sheet.rows.len(),
				parent_slots = sheet.parent_slots(),
				"writing sheet"
			);
			let worksheet = workbook.add_worksheet();
			worksheet.set_name(&sheet.name)?;

			for (col, header) in sheet.headers.iter().enumerate() {
				worksheet.write_string_with_format(0, col as u16, header, &bold)?;
			}
			for (row, cells) in sheet.rows.iter().enumerate() {
				for (col, cell) in cells.iter().enumerate() {
					if let Some(value) = cell {
						worksheet.write_string(row as u32 + 1, col as u16, value)?;
					}
				}
			}
			for (col, width) in sheet.column_widths.iter().enumerate() {
				worksheet.set_column_width(col as u16, *width)?;
			}
		}

		Ok(workbook)
	}
}

impl ExportSink for XlsxSink {
	fn export(&mut self, dataset: &Dataset) -> Result<()> {
		let mut workbook = Self::workbook(dataset)?;
		workbook.save(&self.path)?;
		info!(
			target = "paideia.export",
			path = %self.path.display(),
			students = dataset.student_count(),
			"wrote workbook"
		);
		Ok(())
	}
}
