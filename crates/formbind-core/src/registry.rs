//! Name-keyed registry of filter and validator factories
//!
//! Pipelines are declared as data (`{name, options}`) and realized here.
//! A registry is an ordinary value handed to the form at construction; there is
//! no process-wide instance.
//!
//! ## Example
//!
//! ```
//! use formbind_core::{FieldValue, PipelineEntry, Registry};
//! use formbind_core::validator::DetachedContext;
//! use serde_json::json;
//!
//! let mut registry = Registry::with_defaults();
//! registry.register_filter("slug", |_options| {
//!     Ok(Box::new(|value: &str| value.trim().to_lowercase().replace(' ', "-")))
//! });
//!
//! let slug = registry.resolve_filter(&PipelineEntry::new("slug")).unwrap();
//! assert_eq!(slug.filter(" Hello World "), "hello-world");
//!
//! let length = registry
//!     .resolve_validator(&PipelineEntry::with_options("stringLength", json!({"min": 2})))
//!     .unwrap();
//! assert!(!length.is_valid(&FieldValue::from("a"), &DetachedContext));
//! ```

use crate::config::PipelineEntry;
use crate::error::{FormError, FormResult};
use crate::filter::{Filter, IntFilter, StringToLower, StringToUpper, StringTrim};
use crate::validator::{EmailAddress, Identical, NotEmpty, RegexValidator, StringLength, Validator};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Builds a filter from its options.
pub type FilterFactory = Rc<dyn Fn(&Value) -> FormResult<Box<dyn Filter>>>;

/// Builds a validator from its options.
pub type ValidatorFactory = Rc<dyn Fn(&Value) -> FormResult<Box<dyn Validator>>>;

/// Registry of named filter and validator factories.
#[derive(Clone, Default)]
pub struct Registry {
	filters: HashMap<String, FilterFactory>,
	validators: HashMap<String, ValidatorFactory>,
}

impl Registry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a registry with the built-in filters and validators.
	///
	/// Filters: `int`, `stringToUpper`, `stringToLower`, `stringTrim`.
	/// Validators: `notEmpty`, `stringLength`, `regex`, `emailAddress`, `identical`.
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();

		registry.register_filter("int", |_| Ok(Box::new(IntFilter)));
		registry.register_filter("stringToUpper", |_| Ok(Box::new(StringToUpper)));
		registry.register_filter("stringToLower", |_| Ok(Box::new(StringToLower)));
		registry.register_filter("stringTrim", |_| Ok(Box::new(StringTrim)));

		registry.register_validator("notEmpty", |options| {
			Ok(Box::new(NotEmpty::from_options(options)?))
		});
		registry.register_validator("stringLength", |options| {
			Ok(Box::new(StringLength::from_options(options)?))
		});
		registry.register_validator("regex", |options| {
			Ok(Box::new(RegexValidator::from_options(options)?))
		});
		registry.register_validator("emailAddress", |options| {
			Ok(Box::new(EmailAddress::from_options(options)?))
		});
		registry.register_validator("identical", |options| {
			Ok(Box::new(Identical::from_options(options)?))
		});

		registry
	}

	/// Register a filter factory, replacing any factory of the same name.
	pub fn register_filter<F>(&mut self, name: impl Into<String>, factory: F)
	where
		F: Fn(&Value) -> FormResult<Box<dyn Filter>> + 'static,
	{
		self.filters.insert(name.into(), Rc::new(factory));
	}

	/// Register a validator factory, replacing any factory of the same name.
	pub fn register_validator<F>(&mut self, name: impl Into<String>, factory: F)
	where
		F: Fn(&Value) -> FormResult<Box<dyn Validator>> + 'static,
	{
		self.validators.insert(name.into(), Rc::new(factory));
	}

	pub fn has_filter(&self, name: &str) -> bool {
		self.filters.contains_key(name)
	}

	pub fn has_validator(&self, name: &str) -> bool {
		self.validators.contains_key(name)
	}

	/// Instantiate the filter an entry names.
	pub fn resolve_filter(&self, entry: &PipelineEntry) -> FormResult<Box<dyn Filter>> {
		let factory = self
			.filters
			.get(&entry.name)
			.ok_or_else(|| FormError::UnknownFilter {
				name: entry.name.clone(),
			})?;
		factory(&entry.options)
	}

	/// Instantiate the validator an entry names.
	pub fn resolve_validator(&self, entry: &PipelineEntry) -> FormResult<Box<dyn Validator>> {
		let factory = self
			.validators
			.get(&entry.name)
			.ok_or_else(|| FormError::UnknownValidator {
				name: entry.name.clone(),
			})?;
		factory(&entry.options)
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut filters: Vec<_> = self.filters.keys().collect();
		let mut validators: Vec<_> = self.validators.keys().collect();
		filters.sort();
		validators.sort();
		f.debug_struct("Registry")
			.field("filters", &filters)
			.field("validators", &validators)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::filter::StringTrim;
	use crate::validator::{DetachedContext, FnValidator, FormContext};
	use crate::value::FieldValue;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_defaults_registered() {
		let registry = Registry::with_defaults();

		for name in ["int", "stringToUpper", "stringToLower", "stringTrim"] {
			assert!(registry.has_filter(name), "missing filter {name}");
		}
		for name in ["notEmpty", "stringLength", "regex", "emailAddress", "identical"] {
			assert!(registry.has_validator(name), "missing validator {name}");
		}
	}

	#[rstest]
	fn test_unknown_names() {
		let registry = Registry::new();

		assert!(matches!(
			registry.resolve_filter(&PipelineEntry::new("int")),
			Err(FormError::UnknownFilter { name }) if name == "int"
		));
		assert!(matches!(
			registry.resolve_validator(&PipelineEntry::new("notEmpty")),
			Err(FormError::UnknownValidator { name }) if name == "notEmpty"
		));
	}

	#[rstest]
	fn test_factory_rejects_options() {
		let registry = Registry::with_defaults();
		let result = registry.resolve_validator(&PipelineEntry::with_options("regex", json!({})));
		assert!(matches!(result, Err(FormError::InvalidOptions { .. })));
	}

	#[rstest]
	fn test_register_replaces_existing() {
		let mut registry = Registry::with_defaults();
		registry.register_validator("notEmpty", |_| {
			Ok(Box::new(FnValidator::silent(
				|_: &FieldValue, _: &dyn FormContext| true,
			)))
		});

		let validator = registry
			.resolve_validator(&PipelineEntry::new("notEmpty"))
			.unwrap();
		assert!(validator.is_valid(&FieldValue::empty(), &DetachedContext));
	}

	#[rstest]
	fn test_debug_lists_names() {
		let mut registry = Registry::new();
		registry.register_filter("b", |_| Ok(Box::new(StringTrim)));
		registry.register_filter("a", |_| Ok(Box::new(StringTrim)));

		assert_eq!(
			format!("{registry:?}"),
			r#"Registry { filters: ["a", "b"], validators: [] }"#
		);
	}
}
