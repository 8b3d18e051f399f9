//! Render errors

/// Errors raised while rendering a form description.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	/// An element without a name cannot be keyed in the description.
	#[error("Element at position {position} of '{parent}' has no name")]
	UnnamedElement { parent: String, position: usize },
	/// The description could not be serialized.
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
