//! # formbind
//!
//! Declarative form binding for Rust.
//!
//! A form is described as data: which controls it has, which filters rewrite
//! their values and which validators check them. The server renders that
//! description from a form definition, and the client binds it to a
//! document, keeps it in sync with a data model and owns the submit
//! lifecycle.
//!
//! ## Feature Flags
//!
//! - `full` (default) - Binding plus the server-side renderer
//! - `render` - The server-side renderer
//!
//! Client-side binding alone needs `default-features = false`.
//!
//! ## Architecture
//!
//! ```text
//! FormDefinition + InputFilterSpec
//!         │  render (formbind-render)
//!         ▼
//! { form: { attributes, elements } }  ──▶  FormParams
//!                                             │  Form::new (formbind-core)
//!                                             ▼
//!                         Form ── FormElement ── FormDom
//!                           │
//!                           └── Model (populate / save)
//! ```
//!
//! ## Example
//!
//! ```
//! # #[cfg(feature = "render")]
//! # {
//! use formbind::binding::dom::{FormDom, MemoryDocument};
//! use formbind::render::{ElementDefinition, FormDefinition, InputFilterSpec, InputSpec};
//! use formbind::{Form, FormParams, Registry};
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! let definition = FormDefinition::new("signup")
//!     .element(ElementDefinition::new("email").with_type("email"));
//! let input_filter = InputFilterSpec::new().input(
//!     "email",
//!     InputSpec::new().filter("stringTrim", json!({})).validator("emailAddress", json!({})),
//! );
//! let description = formbind::render::render_value(&definition, Some(&input_filter)).unwrap();
//!
//! let doc = Rc::new(MemoryDocument::new());
//! let wrapper = doc.add_wrapper(doc.root());
//! let email = doc.add_input(wrapper, "email", "email", "");
//! let form = Form::new(doc.clone(), FormParams::from_value(description).unwrap(), &Registry::with_defaults());
//!
//! doc.change(email, " someone@example.org ");
//! assert!(form.validate());
//! # }
//! ```

pub mod binding;
#[cfg(feature = "render")]
pub mod render;

pub use formbind_core::{
	FieldValue, Form, FormElement, FormError, FormEvent, FormParams, FormResult, FormValues, Model,
	Registry,
};

#[cfg(feature = "render")]
pub use formbind_render::{FormDefinition, InputFilterSpec, JsonFormRenderer, RenderError};
