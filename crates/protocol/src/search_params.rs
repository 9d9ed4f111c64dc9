//! The `data-searchparams` payload embedded in the pagination element.

use serde::Deserialize;
use serde_json::Value;

/// Active directory search, as echoed back by the portal after a filter submit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchParams {
	#[serde(rename = "const_search_location", default, deserialize_with = "group_id_from_any")]
	pub group_id: Option<String>,
	#[serde(flatten)]
	pub extra: serde_json::Map<String, Value>,
}

impl SearchParams {
	/// Parses the raw attribute value.
	pub fn parse(raw: &str) -> serde_json::Result<Self> {
		serde_json::from_str(raw)
	}
}

// The portal has been seen emitting the group id both as a string and as a number.
fn group_id_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;
	Ok(match value {
		Some(Value::String(s)) if !s.is_empty() => Some(s),
		Some(Value::Number(n)) => Some(n.to_string()),
		_ => None,
	})
}

/// Extracts the current group id from a raw `data-searchparams` value.
///
/// Returns `None` for malformed JSON or a missing key; the caller polls again.
pub fn current_group_id(raw: &str) -> Option<String> {
	SearchParams::parse(raw).ok().and_then(|p| p.group_id)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_string_group_id() {
		let raw = r#"{"const_search_location":"4321","const_search_keyword":""}"#;
		assert_eq!(current_group_id(raw), Some("4321".to_string()));
	}

	#[test]
	fn reads_numeric_group_id() {
		assert_eq!(current_group_id(r#"{"const_search_location":17}"#), Some("17".to_string()));
	}

	#[test]
	fn missing_or_empty_is_none() {
		assert_eq!(current_group_id(r#"{"const_search_keyword":"x"}"#), None);
		assert_eq!(current_group_id(r#"{"const_search_location":""}"#), None);
		assert_eq!(current_group_id("not json"), None);
	}

	#[test]
	fn keeps_unknown_keys() {
		let params = SearchParams::parse(r#"{"const_search_location":"1","page":2}"#).unwrap();
		assert_eq!(params.extra.get("page"), Some(&Value::from(2)));
	}
}
