//! Element values
//!
//! A bound control yields one of three shapes: the text of a single control,
//! the ordered values of several checked members of a group, or nothing at
//! all when a checkable group has no checked member.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mapping from element name to its current value, in declaration order.
pub type FormValues = IndexMap<String, FieldValue>;

/// Current value of a form element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	/// Single value (text control, or exactly one checked member)
	Text(String),
	/// Values of every checked member, in document order
	List(Vec<String>),
	/// Checkable group with no checked member
	Absent,
}

impl FieldValue {
	/// Empty text value, the value of an element without a bound control.
	pub fn empty() -> Self {
		Self::Text(String::new())
	}

	/// Returns `true` for empty text, an empty list or an absent value.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Text(text) => text.is_empty(),
			Self::List(values) => values.is_empty(),
			Self::Absent => true,
		}
	}

	/// Flattens the value to the text a control would display.
	///
	/// Lists are joined with commas, an absent value is the empty string.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_core::FieldValue;
	///
	/// assert_eq!(FieldValue::from("a").to_text(), "a");
	/// assert_eq!(FieldValue::List(vec!["a".into(), "b".into()]).to_text(), "a,b");
	/// assert_eq!(FieldValue::Absent.to_text(), "");
	/// ```
	pub fn to_text(&self) -> String {
		match self {
			Self::Text(text) => text.clone(),
			Self::List(values) => values.join(","),
			Self::Absent => String::new(),
		}
	}

	/// Every individual value carried, used to match checkable members.
	pub fn members(&self) -> Vec<String> {
		match self {
			Self::Text(text) => vec![text.clone()],
			Self::List(values) => values.clone(),
			Self::Absent => Vec::new(),
		}
	}

	/// Converts a JSON value from a model record.
	///
	/// Strings are kept verbatim, numbers and booleans use their JSON text,
	/// `null` becomes the empty string and arrays become lists.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_core::FieldValue;
	/// use serde_json::json;
	///
	/// assert_eq!(FieldValue::from_json(&json!(42)), FieldValue::from("42"));
	/// assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::empty());
	/// assert_eq!(
	///     FieldValue::from_json(&json!(["a", 1])),
	///     FieldValue::List(vec!["a".into(), "1".into()])
	/// );
	/// ```
	pub fn from_json(value: &Value) -> Self {
		match value {
			Value::Array(items) => Self::List(items.iter().map(scalar_text).collect()),
			other => Self::Text(scalar_text(other)),
		}
	}

	/// Converts to JSON: text to a string, lists to arrays, absent to `null`.
	pub fn to_json(&self) -> Value {
		match self {
			Self::Text(text) => Value::String(text.clone()),
			Self::List(values) => Value::Array(values.iter().cloned().map(Value::String).collect()),
			Self::Absent => Value::Null,
		}
	}
}

fn scalar_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		Value::Null => String::new(),
		other => other.to_string(),
	}
}

impl Default for FieldValue {
	fn default() -> Self {
		Self::empty()
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<Vec<String>> for FieldValue {
	fn from(values: Vec<String>) -> Self {
		Self::List(values)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(FieldValue::from(""), true)]
	#[case(FieldValue::from("x"), false)]
	#[case(FieldValue::List(vec![]), true)]
	#[case(FieldValue::List(vec!["a".to_string()]), false)]
	#[case(FieldValue::Absent, true)]
	fn test_is_empty(#[case] value: FieldValue, #[case] expected: bool) {
		assert_eq!(value.is_empty(), expected);
	}

	#[rstest]
	fn test_serializes_untagged() {
		let values: FormValues = [
			("name".to_string(), FieldValue::from("john")),
			(
				"tags".to_string(),
				FieldValue::List(vec!["a".to_string(), "b".to_string()]),
			),
			("agree".to_string(), FieldValue::Absent),
		]
		.into_iter()
		.collect();

		let json = serde_json::to_value(&values).unwrap();
		assert_eq!(json, json!({"name": "john", "tags": ["a", "b"], "agree": null}));
	}

	#[rstest]
	fn test_deserializes_null_as_absent() {
		let value: FieldValue = serde_json::from_value(json!(null)).unwrap();
		assert_eq!(value, FieldValue::Absent);
	}

	#[rstest]
	fn test_from_json_bool_and_object() {
		assert_eq!(FieldValue::from_json(&json!(true)), FieldValue::from("true"));
		assert_eq!(
			FieldValue::from_json(&json!({"a": 1})),
			FieldValue::from("{\"a\":1}")
		);
	}

	#[rstest]
	fn test_to_json_round_shapes() {
		assert_eq!(FieldValue::from("x").to_json(), json!("x"));
		assert_eq!(FieldValue::Absent.to_json(), json!(null));
		assert_eq!(
			FieldValue::List(vec!["1".to_string()]).to_json(),
			json!(["1"])
		);
	}
}
