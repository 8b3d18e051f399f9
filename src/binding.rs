//! Client-side form binding module.
//!
//! This module provides access to elements, forms, pipelines, the document
//! capability and model binding.
//!
//! # Examples
//!
//! ```rust,no_run
//! use formbind::binding::dom::MemoryDocument;
//! use formbind::binding::registry::Registry;
//! ```

pub use formbind_core::*;
