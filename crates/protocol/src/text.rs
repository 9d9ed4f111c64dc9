//! Text shapes of directory fields.

/// Derives the class name from a record's freeform location text.
///
/// The portal renders locations as `"<class>, <building>"`; only the part
/// before the first comma names the class.
pub fn class_from_location(location: &str) -> String {
	location.split(',').next().unwrap_or_default().trim().to_string()
}

/// Picks the phone number out of the mobile-phone region.
///
/// The region stacks a label line over the number, so the number is the
/// second non-empty line. A lone line is taken as the number itself.
pub fn mobile_phone_from_lines<S: AsRef<str>>(lines: &[S]) -> Option<String> {
	let lines: Vec<&str> = lines.iter().map(|l| l.as_ref().trim()).filter(|l| !l.is_empty()).collect();
	match lines.as_slice() {
		[] => None,
		[only] => Some((*only).to_string()),
		[_, number, ..] => Some((*number).to_string()),
	}
}

/// Normalizes an optional field read from the page: blank becomes absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn class_is_text_before_first_comma() {
		assert_eq!(class_from_location("1st Grade, Main Building"), "1st Grade");
		assert_eq!(class_from_location("Kindergarten"), "Kindergarten");
		assert_eq!(class_from_location("  2nd Grade ,A, B"), "2nd Grade");
		assert_eq!(class_from_location(""), "");
	}

	#[test]
	fn phone_is_second_stacked_line() {
		assert_eq!(mobile_phone_from_lines(&["Mobile Phone", "555-0101"]), Some("555-0101".to_string()));
		assert_eq!(mobile_phone_from_lines(&["555-0101"]), Some("555-0101".to_string()));
		assert_eq!(mobile_phone_from_lines(&["  ", ""]), None);
		assert_eq!(mobile_phone_from_lines::<&str>(&[]), None);
	}

	#[test]
	fn blank_fields_are_absent() {
		assert_eq!(non_blank(Some("  ".into())), None);
		assert_eq!(non_blank(Some(" a@b.c ".into())), Some("a@b.c".to_string()));
		assert_eq!(non_blank(None), None);
	}
}
