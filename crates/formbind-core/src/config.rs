//! Declarative form parameters
//!
//! [`FormParams`] is the construction input of a [`Form`]. It deserializes from
//! the JSON description produced by the server-side renderer:
//!
//! ```json
//! {
//!   "form": {
//!     "elements": {
//!       "email": {
//!         "filters": [{"name": "stringTrim"}],
//!         "validators": [{"name": "emailAddress", "options": {}}],
//!         "renderMessages": true
//!       }
//!     }
//!   },
//!   "stopOnFirstError": false,
//!   "element": {"renderMessages": true}
//! }
//! ```
//!
//! Per-form [`ElementDefaults`] are merged with each [`ElementSpec`] into a
//! fresh [`ElementOptions`]; the defaults themselves are never mutated.
//!
//! [`Form`]: crate::form::Form

use crate::error::FormResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One pipeline entry: a registered name plus its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEntry {
	pub name: String,
	#[serde(default)]
	pub options: Value,
}

impl PipelineEntry {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			options: Value::Null,
		}
	}

	pub fn with_options(name: impl Into<String>, options: Value) -> Self {
		Self {
			name: name.into(),
			options,
		}
	}
}

/// Per-element specification as declared in the form description.
///
/// Fields left as `None` fall back to the form's [`ElementDefaults`].
/// Any other keys (rendering attributes, labels) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
	/// Control name; defaults to the key the spec is declared under
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filters: Option<Vec<PipelineEntry>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub validators: Option<Vec<PipelineEntry>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub render_messages: Option<bool>,
}

impl ElementSpec {
	pub fn new() -> Self {
		Self::default()
	}

	/// Bind to a control whose name differs from the declaration key.
	pub fn named(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Append a filter entry.
	pub fn filter(mut self, name: impl Into<String>, options: Value) -> Self {
		self.filters
			.get_or_insert_with(Vec::new)
			.push(PipelineEntry::with_options(name, options));
		self
	}

	/// Append a validator entry.
	pub fn validator(mut self, name: impl Into<String>, options: Value) -> Self {
		self.validators
			.get_or_insert_with(Vec::new)
			.push(PipelineEntry::with_options(name, options));
		self
	}

	pub fn render_messages(mut self, render: bool) -> Self {
		self.render_messages = Some(render);
		self
	}
}

/// Defaults applied to every element of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementDefaults {
	pub render_messages: bool,
	pub filters: Vec<PipelineEntry>,
	pub validators: Vec<PipelineEntry>,
}

impl Default for ElementDefaults {
	fn default() -> Self {
		Self {
			render_messages: true,
			filters: Vec::new(),
			validators: Vec::new(),
		}
	}
}

impl ElementDefaults {
	/// Merge these defaults with an element's overrides.
	///
	/// Overrides replace defaults key by key; pipeline lists are replaced, not
	/// concatenated.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_core::config::{ElementDefaults, ElementSpec};
	///
	/// let defaults = ElementDefaults::default();
	/// let options = defaults.merge("email", &ElementSpec::new().render_messages(false));
	///
	/// assert_eq!(options.name, "email");
	/// assert!(!options.render_messages);
	/// assert!(defaults.render_messages);
	/// ```
	pub fn merge(&self, key: &str, spec: &ElementSpec) -> ElementOptions {
		ElementOptions {
			name: spec.name.clone().unwrap_or_else(|| key.to_string()),
			filters: spec.filters.clone().unwrap_or_else(|| self.filters.clone()),
			validators: spec
				.validators
				.clone()
				.unwrap_or_else(|| self.validators.clone()),
			render_messages: spec.render_messages.unwrap_or(self.render_messages),
		}
	}
}

/// Fully resolved, immutable options of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementOptions {
	pub name: String,
	pub filters: Vec<PipelineEntry>,
	pub validators: Vec<PipelineEntry>,
	pub render_messages: bool,
}

impl ElementOptions {
	/// Options for a standalone element with default settings.
	pub fn new(name: impl Into<String>) -> Self {
		ElementDefaults::default().merge(&name.into(), &ElementSpec::default())
	}
}

/// The `form` section: attributes and the element declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSpec {
	#[serde(default)]
	pub attributes: Map<String, Value>,
	#[serde(default)]
	pub elements: IndexMap<String, ElementSpec>,
}

/// Construction input of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormParams {
	#[serde(default)]
	pub form: FormSpec,
	/// Policy flag; every element is still validated on every call
	#[serde(default)]
	pub stop_on_first_error: bool,
	#[serde(default)]
	pub element: ElementDefaults,
}

impl FormParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse parameters from a JSON string.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_core::FormParams;
	///
	/// let params = FormParams::from_json_str(
	///     r#"{"form": {"elements": {"name": {"validators": [{"name": "notEmpty"}]}}}}"#,
	/// ).unwrap();
	/// assert_eq!(params.form.elements.len(), 1);
	/// assert!(params.element.render_messages);
	/// ```
	pub fn from_json_str(json: &str) -> FormResult<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Parse parameters from an already decoded JSON value.
	pub fn from_value(value: Value) -> FormResult<Self> {
		Ok(serde_json::from_value(value)?)
	}

	/// Declare an element. Re-declaring a name replaces the earlier spec in place.
	pub fn element(mut self, key: impl Into<String>, spec: ElementSpec) -> Self {
		self.form.elements.insert(key.into(), spec);
		self
	}

	pub fn stop_on_first_error(mut self, stop: bool) -> Self {
		self.stop_on_first_error = stop;
		self
	}

	pub fn defaults(mut self, defaults: ElementDefaults) -> Self {
		self.element = defaults;
		self
	}

	/// Resolved options for every declared element, in declaration order.
	pub fn element_options(&self) -> impl Iterator<Item = (&str, ElementOptions)> + '_ {
		self.form
			.elements
			.iter()
			.map(|(key, spec)| (key.as_str(), self.element.merge(key, spec)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_parse_construction_input() {
		let params = FormParams::from_value(json!({
			"form": {
				"attributes": {"method": "post"},
				"elements": {
					"zeta": {"filters": [{"name": "int"}]},
					"alpha": {
						"validators": [{"name": "stringLength", "options": {"min": 3}}],
						"renderMessages": false,
						"label": "Alpha",
						"required": true
					}
				}
			},
			"stopOnFirstError": true,
			"element": {"renderMessages": true}
		}))
		.unwrap();

		assert!(params.stop_on_first_error);
		let keys: Vec<_> = params.form.elements.keys().cloned().collect();
		assert_eq!(keys, vec!["zeta", "alpha"]);

		let alpha = &params.form.elements["alpha"];
		assert_eq!(alpha.render_messages, Some(false));
		assert_eq!(
			alpha.validators.as_ref().unwrap()[0].options,
			json!({"min": 3})
		);
	}

	#[rstest]
	fn test_missing_sections_use_defaults() {
		let params = FormParams::from_json_str("{}").unwrap();
		assert!(!params.stop_on_first_error);
		assert!(params.element.render_messages);
		assert!(params.form.elements.is_empty());
	}

	#[rstest]
	fn test_malformed_input_is_config_error() {
		let result = FormParams::from_json_str(r#"{"form": {"elements": []}}"#);
		assert!(matches!(result, Err(crate::FormError::Config(_))));
	}

	#[rstest]
	fn test_merge_does_not_leak_between_elements() {
		let defaults = ElementDefaults {
			render_messages: true,
			filters: vec![PipelineEntry::new("stringTrim")],
			validators: Vec::new(),
		};
		let params = FormParams::new()
			.defaults(defaults.clone())
			.element("first", ElementSpec::new().render_messages(false).filter("int", json!({})))
			.element("second", ElementSpec::new());

		let options: Vec<_> = params.element_options().map(|(_, o)| o).collect();

		assert!(!options[0].render_messages);
		assert_eq!(options[0].filters, vec![PipelineEntry::with_options("int", json!({}))]);
		assert!(options[1].render_messages);
		assert_eq!(options[1].filters, vec![PipelineEntry::new("stringTrim")]);
		assert_eq!(params.element, defaults);
	}

	#[rstest]
	fn test_explicit_name_overrides_key() {
		let options = ElementDefaults::default().merge("street", &ElementSpec::new().named("address[street]"));
		assert_eq!(options.name, "address[street]");
	}
}
