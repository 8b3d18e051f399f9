//! JSON form renderer
//!
//! Turns a [`FormDefinition`] and an optional [`InputFilterSpec`] into the
//! description a client form is constructed from:
//!
//! ```text
//! { "form": { "attributes": {...}, "elements": { "<name>": {...}, ... } } }
//! ```
//!
//! ## Flattening
//!
//! Fieldsets are flattened depth-first, so elements appear in the order they
//! are discovered. An element whose name was already seen replaces the
//! earlier entry in place.
//!
//! ## Input filter merge
//!
//! Specs are looked up for the form's top-level children only, in form order.
//! A matching spec is merged over the rendered element (spec keys win); a
//! top-level fieldset with a spec gets an entry of its own holding the spec.
//! Specs for names that are not top-level children are not rendered.

use crate::definition::{ElementDefinition, FormDefinition, FormNode, InputFilterSpec};
use crate::error::{RenderError, RenderResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rendered form: attributes and flattened elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedForm {
	pub attributes: Map<String, Value>,
	pub elements: IndexMap<String, Map<String, Value>>,
}

/// Top-level description, `{ "form": ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDescription {
	pub form: RenderedForm,
}

impl FormDescription {
	pub fn to_value(&self) -> RenderResult<Value> {
		Ok(serde_json::to_value(self)?)
	}

	pub fn to_json_string(&self) -> RenderResult<String> {
		Ok(serde_json::to_string(self)?)
	}
}

/// Renders form definitions to JSON descriptions.
///
/// # Examples
///
/// ```
/// use formbind_render::{ElementDefinition, FieldsetDefinition, FormDefinition, JsonFormRenderer};
///
/// let form = FormDefinition::new("order")
///     .element(ElementDefinition::new("customer"))
///     .fieldset(
///         FieldsetDefinition::new("shipping")
///             .element(ElementDefinition::new("street"))
///             .element(ElementDefinition::new("city")),
///     );
///
/// let description = JsonFormRenderer::new().render(&form, None).unwrap();
/// let names: Vec<_> = description.form.elements.keys().cloned().collect();
/// assert_eq!(names, vec!["customer", "street", "city"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormRenderer;

impl JsonFormRenderer {
	pub fn new() -> Self {
		Self
	}

	/// Render the full description.
	pub fn render(
		&self,
		form: &FormDefinition,
		input_filter: Option<&InputFilterSpec>,
	) -> RenderResult<FormDescription> {
		let mut elements = self.render_elements(&form.name, &form.children)?;

		if let Some(input_filter) = input_filter {
			for (name, spec) in self.render_input_filter(form, input_filter) {
				elements.entry(name).or_default().extend(spec);
			}
		}

		tracing::debug!(form = %form.name, elements = elements.len(), "rendered form description");
		Ok(FormDescription {
			form: RenderedForm {
				attributes: form.attributes.clone(),
				elements,
			},
		})
	}

	/// Flatten `children` depth-first into rendered elements keyed by name.
	pub fn render_elements(
		&self,
		parent: &str,
		children: &[FormNode],
	) -> RenderResult<IndexMap<String, Map<String, Value>>> {
		let mut data = IndexMap::new();
		for (position, child) in children.iter().enumerate() {
			match child {
				FormNode::Fieldset(fieldset) => {
					data.extend(self.render_elements(&fieldset.name, &fieldset.children)?);
				}
				FormNode::Element(element) => {
					if element.name.is_empty() {
						return Err(RenderError::UnnamedElement {
							parent: parent.to_string(),
							position,
						});
					}
					data.insert(element.name.clone(), self.render_element(element));
				}
			}
		}
		Ok(data)
	}

	pub fn render_element(&self, element: &ElementDefinition) -> Map<String, Value> {
		element.render()
	}

	/// Rendered specs of the form's top-level children that have one, in
	/// form order.
	pub fn render_input_filter(
		&self,
		form: &FormDefinition,
		input_filter: &InputFilterSpec,
	) -> IndexMap<String, Map<String, Value>> {
		let data: IndexMap<_, _> = form
			.children
			.iter()
			.filter_map(|child| {
				input_filter
					.get(child.name())
					.map(|spec| (child.name().to_string(), spec.render()))
			})
			.collect();

		let skipped = input_filter.inputs.len().saturating_sub(data.len());
		if skipped > 0 {
			tracing::debug!(form = %form.name, skipped, "input specs without a top-level child were not rendered");
		}
		data
	}
}

/// Render straight to a JSON value.
pub fn render_value(
	form: &FormDefinition,
	input_filter: Option<&InputFilterSpec>,
) -> RenderResult<Value> {
	JsonFormRenderer::new().render(form, input_filter)?.to_value()
}

/// Render straight to a JSON string.
pub fn render_to_string(
	form: &FormDefinition,
	input_filter: Option<&InputFilterSpec>,
) -> RenderResult<String> {
	JsonFormRenderer::new()
		.render(form, input_filter)?
		.to_json_string()
}
