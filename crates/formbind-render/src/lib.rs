//! Server-side rendering of form descriptions
//!
//! This crate turns a form definition and an optional input-filter
//! specification into the JSON description client forms are built from:
//! - Depth-first flattening of nested fieldsets into one element map
//! - Merging of input constraints (required flag, filters, validators) into the matching elements
//! - Output as typed [`FormDescription`], JSON value or JSON string
//!
//! Filter and validator entries use the same `{name, options}` shape as the
//! client construction input, so a rendered description deserializes
//! directly into `formbind_core::FormParams`.

pub mod definition;
pub mod error;
pub mod renderer;

pub use definition::{
	ElementDefinition, FieldsetDefinition, FormDefinition, FormNode, InputFilterSpec, InputSpec,
};
pub use error::{RenderError, RenderResult};
pub use renderer::{FormDescription, JsonFormRenderer, RenderedForm, render_to_string, render_value};
