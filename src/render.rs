//! Server-side form description module.
//!
//! Renders form definitions and input-filter specifications into the JSON
//! description [`FormParams`](crate::FormParams) is built from.

pub use formbind_render::*;
