//! Validator contract and built-in validators
//!
//! A validator is a predicate over an element's current value. It may look at
//! other elements through the [`FormContext`] it is handed, and it carries the
//! message an element collects when the predicate fails.
//!
//! Built-in validators read their configuration from JSON options and accept a
//! `message` option overriding the default message. Messages may contain
//! `%value%` and the validator's own option placeholders (`%min%`, `%max%`,
//! `%pattern%`, `%token%`).

use crate::error::{FormError, FormResult};
use crate::value::FieldValue;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// Loose address shape; real verification is server-side.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX: invalid regex pattern")
});

/// Read access to the form an element belongs to.
pub trait FormContext {
	/// Current value of the named element, `None` if there is no such element.
	fn value_of(&self, name: &str) -> Option<FieldValue>;
}

/// Context for elements that do not belong to a form.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedContext;

impl FormContext for DetachedContext {
	fn value_of(&self, _name: &str) -> Option<FieldValue> {
		None
	}
}

/// Predicate over an element value.
///
/// Validators must not panic; a panicking validator is a broken collaborator,
/// not something the element recovers from.
pub trait Validator {
	/// Returns `true` when the value is acceptable.
	fn is_valid(&self, value: &FieldValue, form: &dyn FormContext) -> bool;

	/// Message describing a failure for `value`, if this validator has one.
	fn message(&self, value: &FieldValue) -> Option<String>;
}

/// Validator built from a closure and a fixed message.
///
/// # Examples
///
/// ```
/// use formbind_core::validator::{DetachedContext, FnValidator, Validator};
/// use formbind_core::FieldValue;
///
/// let even = FnValidator::new("Must be even", |value, _form| {
///     value.to_text().parse::<i64>().map(|n| n % 2 == 0).unwrap_or(false)
/// });
/// assert!(even.is_valid(&FieldValue::from("4"), &DetachedContext));
/// assert!(!even.is_valid(&FieldValue::from("3"), &DetachedContext));
/// ```
pub struct FnValidator<F> {
	message: Option<String>,
	predicate: F,
}

impl<F> FnValidator<F>
where
	F: Fn(&FieldValue, &dyn FormContext) -> bool,
{
	pub fn new(message: impl Into<String>, predicate: F) -> Self {
		Self {
			message: Some(message.into()),
			predicate,
		}
	}

	/// A validator that contributes no message when it fails.
	pub fn silent(predicate: F) -> Self {
		Self {
			message: None,
			predicate,
		}
	}
}

impl<F> Validator for FnValidator<F>
where
	F: Fn(&FieldValue, &dyn FormContext) -> bool,
{
	fn is_valid(&self, value: &FieldValue, form: &dyn FormContext) -> bool {
		(self.predicate)(value, form)
	}

	fn message(&self, _value: &FieldValue) -> Option<String> {
		self.message.clone()
	}
}

fn message_option(options: &Value) -> Option<String> {
	options
		.get("message")
		.and_then(Value::as_str)
		.map(str::to_string)
}

fn usize_option(name: &str, options: &Value, key: &str) -> FormResult<Option<usize>> {
	match options.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(value) => value
			.as_u64()
			.map(|n| Some(n as usize))
			.ok_or_else(|| FormError::InvalidOptions {
				name: name.to_string(),
				reason: format!("'{key}' must be a non-negative integer"),
			}),
	}
}

fn str_option<'a>(name: &str, options: &'a Value, key: &str) -> FormResult<&'a str> {
	options
		.get(key)
		.and_then(Value::as_str)
		.ok_or_else(|| FormError::InvalidOptions {
			name: name.to_string(),
			reason: format!("'{key}' is required"),
		})
}

/// Rejects empty text, empty lists and absent values. Whitespace-only text
/// counts as empty.
#[derive(Debug, Clone)]
pub struct NotEmpty {
	message: String,
}

impl NotEmpty {
	pub const DEFAULT_MESSAGE: &'static str = "Value is required and can't be empty";

	pub fn new() -> Self {
		Self {
			message: Self::DEFAULT_MESSAGE.to_string(),
		}
	}

	pub fn from_options(options: &Value) -> FormResult<Self> {
		Ok(Self {
			message: message_option(options).unwrap_or_else(|| Self::DEFAULT_MESSAGE.to_string()),
		})
	}
}

impl Default for NotEmpty {
	fn default() -> Self {
		Self::new()
	}
}

impl Validator for NotEmpty {
	fn is_valid(&self, value: &FieldValue, _form: &dyn FormContext) -> bool {
		match value {
			FieldValue::Text(text) => !text.trim().is_empty(),
			other => !other.is_empty(),
		}
	}

	fn message(&self, value: &FieldValue) -> Option<String> {
		Some(self.message.replace("%value%", &value.to_text()))
	}
}

/// Bounds the number of characters in the value.
///
/// Options: `min` (default 0), `max` (unbounded when absent).
#[derive(Debug, Clone)]
pub struct StringLength {
	min: usize,
	max: Option<usize>,
	message: Option<String>,
}

impl StringLength {
	pub const TOO_SHORT: &'static str = "The input is less than %min% characters long";
	pub const TOO_LONG: &'static str = "The input is more than %max% characters long";

	pub fn new(min: usize, max: Option<usize>) -> Self {
		Self {
			min,
			max,
			message: None,
		}
	}

	pub fn from_options(options: &Value) -> FormResult<Self> {
		let min = usize_option("stringLength", options, "min")?.unwrap_or(0);
		let max = usize_option("stringLength", options, "max")?;
		if let Some(max) = max
			&& max < min
		{
			return Err(FormError::InvalidOptions {
				name: "stringLength".to_string(),
				reason: format!("'max' ({max}) is less than 'min' ({min})"),
			});
		}

		Ok(Self {
			min,
			max,
			message: message_option(options),
		})
	}

	fn length(value: &FieldValue) -> usize {
		value.to_text().chars().count()
	}
}

impl Validator for StringLength {
	fn is_valid(&self, value: &FieldValue, _form: &dyn FormContext) -> bool {
		let length = Self::length(value);
		length >= self.min && self.max.is_none_or(|max| length <= max)
	}

	fn message(&self, value: &FieldValue) -> Option<String> {
		let template = match &self.message {
			Some(message) => message.as_str(),
			None if Self::length(value) < self.min => Self::TOO_SHORT,
			None => Self::TOO_LONG,
		};
		let max = self.max.map(|max| max.to_string()).unwrap_or_default();

		Some(
			template
				.replace("%min%", &self.min.to_string())
				.replace("%max%", &max)
				.replace("%value%", &value.to_text()),
		)
	}
}

/// Requires the value to match a regular expression.
///
/// Options: `pattern` (required).
#[derive(Debug, Clone)]
pub struct RegexValidator {
	pattern: Regex,
	message: String,
}

impl RegexValidator {
	pub const DEFAULT_MESSAGE: &'static str = "The input does not match against pattern '%pattern%'";

	pub fn new(pattern: &str) -> FormResult<Self> {
		let pattern = Regex::new(pattern).map_err(|e| FormError::InvalidOptions {
			name: "regex".to_string(),
			reason: e.to_string(),
		})?;

		Ok(Self {
			pattern,
			message: Self::DEFAULT_MESSAGE.to_string(),
		})
	}

	pub fn from_options(options: &Value) -> FormResult<Self> {
		let mut validator = Self::new(str_option("regex", options, "pattern")?)?;
		if let Some(message) = message_option(options) {
			validator.message = message;
		}
		Ok(validator)
	}
}

impl Validator for RegexValidator {
	fn is_valid(&self, value: &FieldValue, _form: &dyn FormContext) -> bool {
		self.pattern.is_match(&value.to_text())
	}

	fn message(&self, value: &FieldValue) -> Option<String> {
		Some(
			self.message
				.replace("%pattern%", self.pattern.as_str())
				.replace("%value%", &value.to_text()),
		)
	}
}

/// Requires a plausible email address.
#[derive(Debug, Clone)]
pub struct EmailAddress {
	message: String,
}

impl EmailAddress {
	pub const DEFAULT_MESSAGE: &'static str = "The input is not a valid email address";

	pub fn new() -> Self {
		Self {
			message: Self::DEFAULT_MESSAGE.to_string(),
		}
	}

	pub fn from_options(options: &Value) -> FormResult<Self> {
		Ok(Self {
			message: message_option(options).unwrap_or_else(|| Self::DEFAULT_MESSAGE.to_string()),
		})
	}
}

impl Default for EmailAddress {
	fn default() -> Self {
		Self::new()
	}
}

impl Validator for EmailAddress {
	fn is_valid(&self, value: &FieldValue, _form: &dyn FormContext) -> bool {
		EMAIL_REGEX.is_match(&value.to_text())
	}

	fn message(&self, value: &FieldValue) -> Option<String> {
		Some(self.message.replace("%value%", &value.to_text()))
	}
}

/// Requires the value to equal another element's current value.
///
/// Options: `token` (required), the name of the element to compare with.
/// A token naming no element never matches.
#[derive(Debug, Clone)]
pub struct Identical {
	token: String,
	message: String,
}

impl Identical {
	pub const DEFAULT_MESSAGE: &'static str = "The two given tokens do not match";

	pub fn new(token: impl Into<String>) -> Self {
		Self {
			token: token.into(),
			message: Self::DEFAULT_MESSAGE.to_string(),
		}
	}

	pub fn from_options(options: &Value) -> FormResult<Self> {
		let mut validator = Self::new(str_option("identical", options, "token")?);
		if let Some(message) = message_option(options) {
			validator.message = message;
		}
		Ok(validator)
	}
}

impl Validator for Identical {
	fn is_valid(&self, value: &FieldValue, form: &dyn FormContext) -> bool {
		form.value_of(&self.token)
			.is_some_and(|other| &other == value)
	}

	fn message(&self, value: &FieldValue) -> Option<String> {
		Some(
			self.message
				.replace("%token%", &self.token)
				.replace("%value%", &value.to_text()),
		)
	}
}
