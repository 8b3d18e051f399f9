//! Templates for repeated fieldsets
//!
//! Collection builders render one copy of a fieldset template per item. The
//! form only needs [`TemplateRenderer`]; [`Interpolator`] implements the
//! `__expr__` syntax used by server-rendered templates, where `expr` is a
//! dotted path into the render context.

use crate::error::{FormError, FormResult};
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static INTERPOLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"__(.+?)__").expect("INTERPOLATE_REGEX: invalid regex pattern")
});

/// Marker elided from templates before rendering.
pub const REMOVE_MARKER: &str = "[__remove__]";

/// Renders a template against a JSON context.
pub trait TemplateRenderer {
	fn render(&self, template: &str, context: &Value) -> FormResult<String>;
}

/// `__path__` interpolation.
///
/// Paths that do not resolve, and `null`, render as the empty string. Strings
/// render verbatim, other values as JSON.
///
/// # Examples
///
/// ```
/// use formbind_core::template::{Interpolator, TemplateRenderer};
/// use serde_json::json;
///
/// let html = Interpolator
///     .render(
///         r#"<input name="items[__index__][name]" value="__model.name__">"#,
///         &json!({"index": 2, "model": {"name": "Bolt"}}),
///     )
///     .unwrap();
/// assert_eq!(html, r#"<input name="items[2][name]" value="Bolt">"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolator;

impl Interpolator {
	fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
		path.split('.')
			.try_fold(context, |current, segment| match current {
				Value::Object(map) => map.get(segment.trim()),
				Value::Array(items) => segment.trim().parse::<usize>().ok().and_then(|i| items.get(i)),
				_ => None,
			})
	}
}

impl TemplateRenderer for Interpolator {
	fn render(&self, template: &str, context: &Value) -> FormResult<String> {
		if !context.is_object() {
			return Err(FormError::Template {
				reason: "render context must be a JSON object".to_string(),
			});
		}

		let rendered = INTERPOLATE_REGEX.replace_all(template, |caps: &Captures<'_>| {
			match Self::lookup(context, &caps[1]) {
				None | Some(Value::Null) => String::new(),
				Some(Value::String(text)) => text.clone(),
				Some(other) => other.to_string(),
			}
		});
		Ok(rendered.into_owned())
	}
}

/// Drop every [`REMOVE_MARKER`] from a template.
pub fn strip_remove_markers(template: &str) -> String {
	template.replace(REMOVE_MARKER, "")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("__index__", "3")]
	#[case("__model.tags.1__", "b")]
	#[case("__model.missing__", "")]
	#[case("__model.empty__", "")]
	#[case("__model.tags__", r#"["a","b"]"#)]
	#[case("plain text", "plain text")]
	fn test_interpolation(#[case] template: &str, #[case] expected: &str) {
		let context = json!({"index": 3, "model": {"tags": ["a", "b"], "empty": null}});
		assert_eq!(Interpolator.render(template, &context).unwrap(), expected);
	}

	#[rstest]
	fn test_non_object_context() {
		let result = Interpolator.render("__index__", &json!([1]));
		assert!(matches!(result, Err(FormError::Template { .. })));
	}

	#[rstest]
	fn test_strip_remove_markers() {
		assert_eq!(
			strip_remove_markers("items[__remove__][__index__][__remove__]"),
			"items[__index__]"
		);
	}
}
