//! Form definitions and input-filter specifications
//!
//! A [`FormDefinition`] is the server's view of a form: attributes plus a tree
//! of elements and nested fieldsets. An [`InputFilterSpec`] carries the
//! constraints (required flag, filters, validators) for named inputs.
//! Both deserialize from JSON so definitions can live in configuration.

use formbind_core::PipelineEntry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A form: its attributes and its top-level children, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub attributes: Map<String, Value>,
	#[serde(default)]
	pub children: Vec<FormNode>,
}

impl FormDefinition {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	pub fn element(mut self, element: ElementDefinition) -> Self {
		self.children.push(FormNode::Element(element));
		self
	}

	pub fn fieldset(mut self, fieldset: FieldsetDefinition) -> Self {
		self.children.push(FormNode::Fieldset(fieldset));
		self
	}
}

/// A child of a form or fieldset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormNode {
	Element(ElementDefinition),
	Fieldset(FieldsetDefinition),
}

impl FormNode {
	pub fn name(&self) -> &str {
		match self {
			Self::Element(element) => &element.name,
			Self::Fieldset(fieldset) => &fieldset.name,
		}
	}
}

/// A group of elements, possibly nested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldsetDefinition {
	pub name: String,
	#[serde(default)]
	pub children: Vec<FormNode>,
}

impl FieldsetDefinition {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			children: Vec::new(),
		}
	}

	pub fn element(mut self, element: ElementDefinition) -> Self {
		self.children.push(FormNode::Element(element));
		self
	}

	pub fn fieldset(mut self, fieldset: FieldsetDefinition) -> Self {
		self.children.push(FormNode::Fieldset(fieldset));
		self
	}
}

/// A single control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
	pub name: String,
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub element_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	/// Choices of select, radio and checkbox groups (value -> label)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value_options: Option<IndexMap<String, String>>,
	#[serde(default)]
	pub attributes: Map<String, Value>,
}

impl ElementDefinition {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn with_type(mut self, element_type: impl Into<String>) -> Self {
		self.element_type = Some(element_type.into());
		self
	}

	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn value(mut self, value: impl Into<Value>) -> Self {
		self.value = Some(value.into());
		self
	}

	pub fn value_option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
		self.value_options
			.get_or_insert_with(IndexMap::new)
			.insert(value.into(), label.into());
		self
	}

	pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	/// Rendering data of the element.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_render::ElementDefinition;
	/// use serde_json::json;
	///
	/// let email = ElementDefinition::new("email")
	///     .with_type("email")
	///     .label("Email")
	///     .attribute("placeholder", "you@example.org");
	///
	/// assert_eq!(
	///     serde_json::Value::Object(email.render()),
	///     json!({
	///         "name": "email",
	///         "type": "email",
	///         "label": "Email",
	///         "attributes": {"placeholder": "you@example.org"}
	///     })
	/// );
	/// ```
	pub fn render(&self) -> Map<String, Value> {
		let mut data = Map::new();
		data.insert("name".to_string(), Value::String(self.name.clone()));
		if let Some(element_type) = &self.element_type {
			data.insert("type".to_string(), Value::String(element_type.clone()));
		}
		if let Some(label) = &self.label {
			data.insert("label".to_string(), Value::String(label.clone()));
		}
		if let Some(value) = &self.value {
			data.insert("value".to_string(), value.clone());
		}
		if let Some(options) = &self.value_options {
			let options = options
				.iter()
				.map(|(value, label)| (value.clone(), Value::String(label.clone())))
				.collect();
			data.insert("options".to_string(), Value::Object(options));
		}
		if !self.attributes.is_empty() {
			data.insert("attributes".to_string(), Value::Object(self.attributes.clone()));
		}
		data
	}
}

/// Constraints for one named input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
	#[serde(default)]
	pub required: bool,
	#[serde(default)]
	pub filters: Vec<PipelineEntry>,
	#[serde(default)]
	pub validators: Vec<PipelineEntry>,
	/// Any further keys, passed through as they are
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl InputSpec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	pub fn filter(mut self, name: impl Into<String>, options: Value) -> Self {
		self.filters.push(PipelineEntry::with_options(name, options));
		self
	}

	pub fn validator(mut self, name: impl Into<String>, options: Value) -> Self {
		self.validators
			.push(PipelineEntry::with_options(name, options));
		self
	}

	/// Rendering data of the spec: `required`, `filters`, `validators` and
	/// the extra keys.
	pub fn render(&self) -> Map<String, Value> {
		let mut data = self.extra.clone();
		data.insert("required".to_string(), Value::Bool(self.required));
		data.insert("filters".to_string(), entries_value(&self.filters));
		data.insert("validators".to_string(), entries_value(&self.validators));
		data
	}
}

fn entries_value(entries: &[PipelineEntry]) -> Value {
	Value::Array(
		entries
			.iter()
			.map(|entry| {
				let mut object = Map::new();
				object.insert("name".to_string(), Value::String(entry.name.clone()));
				object.insert("options".to_string(), entry.options.clone());
				Value::Object(object)
			})
			.collect(),
	)
}

/// Input specs keyed by input name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputFilterSpec {
	pub inputs: IndexMap<String, InputSpec>,
}

impl InputFilterSpec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn input(mut self, name: impl Into<String>, spec: InputSpec) -> Self {
		self.inputs.insert(name.into(), spec);
		self
	}

	pub fn get(&self, name: &str) -> Option<&InputSpec> {
		self.inputs.get(name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_definition_from_json() {
		let form: FormDefinition = serde_json::from_value(json!({
			"name": "profile",
			"attributes": {"method": "post"},
			"children": [
				{"kind": "element", "name": "email", "type": "email"},
				{"kind": "fieldset", "name": "address", "children": [
					{"kind": "element", "name": "street"}
				]}
			]
		}))
		.unwrap();

		assert_eq!(form.children.len(), 2);
		assert_eq!(form.children[1].name(), "address");
		assert_eq!(
			form.children[0],
			FormNode::Element(ElementDefinition::new("email").with_type("email"))
		);
	}

	#[rstest]
	fn test_element_render_skips_unset_parts() {
		let rendered = ElementDefinition::new("plain").render();
		assert_eq!(Value::Object(rendered), json!({"name": "plain"}));
	}

	#[rstest]
	fn test_element_render_options_in_order() {
		let color = ElementDefinition::new("color")
			.with_type("radio")
			.value("g")
			.value_option("r", "Red")
			.value_option("g", "Green");

		let rendered = color.render();

		assert_eq!(rendered["value"], json!("g"));
		assert_eq!(rendered["options"], json!({"r": "Red", "g": "Green"}));
	}

	#[rstest]
	fn test_input_spec_render_keeps_extra_keys() {
		let spec: InputSpec = serde_json::from_value(json!({
			"required": true,
			"validators": [{"name": "stringLength", "options": {"max": 5}}],
			"allowEmpty": false
		}))
		.unwrap();

		let rendered = Value::Object(spec.render());

		assert_eq!(
			rendered,
			json!({
				"required": true,
				"filters": [],
				"validators": [{"name": "stringLength", "options": {"max": 5}}],
				"allowEmpty": false
			})
		);
	}
}
