//! Error types for form construction
//!
//! Only construction-time work can fail: deserializing the declarative
//! parameters and resolving pipeline entries through the [`Registry`].
//! Once a [`Form`] exists, every operation degrades silently instead of
//! returning an error.
//!
//! [`Registry`]: crate::registry::Registry
//! [`Form`]: crate::form::Form

/// Errors raised while building forms and their pipelines.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
	/// The declarative form parameters could not be deserialized.
	#[error("Invalid form configuration: {0}")]
	Config(#[from] serde_json::Error),
	/// No filter is registered under the requested name.
	#[error("Unknown filter: {name}")]
	UnknownFilter { name: String },
	/// No validator is registered under the requested name.
	#[error("Unknown validator: {name}")]
	UnknownValidator { name: String },
	/// A registered factory rejected the options it was given.
	#[error("Invalid options for {name}: {reason}")]
	InvalidOptions { name: String, reason: String },
	/// A template could not be rendered.
	#[error("Template error: {reason}")]
	Template { reason: String },
}

pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_error_messages() {
		let err = FormError::UnknownFilter {
			name: "rot13".to_string(),
		};
		assert_eq!(err.to_string(), "Unknown filter: rot13");

		let err = FormError::InvalidOptions {
			name: "regex".to_string(),
			reason: "missing 'pattern'".to_string(),
		};
		assert_eq!(err.to_string(), "Invalid options for regex: missing 'pattern'");
	}

	#[rstest]
	fn test_config_error_from_serde() {
		let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
		let err: FormError = parse_error.into();
		assert!(matches!(err, FormError::Config(_)));
	}
}
