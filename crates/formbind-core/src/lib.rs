//! Client-side form binding for formbind
//!
//! This crate binds declaratively described forms to a document:
//! - Filter pipelines that rewrite a control's displayed value on change and on programmatic set
//! - Validator pipelines with per-element message lists and invalid markers
//! - Form-level aggregation of validity, event relaying and the submit lifecycle
//! - Two-way synchronization with a bound data model
//! - Repeated fieldsets rendered from a collection through a template
//!
//! Filters and validators are declared as data (`{name, options}`) and realized
//! through a [`Registry`]. The document itself is reached only through the
//! [`FormDom`](dom::FormDom) trait; [`MemoryDocument`](dom::MemoryDocument)
//! implements it in memory.
//!
//! ## Example
//!
//! ```
//! use formbind_core::dom::{FormDom, MemoryDocument};
//! use formbind_core::{FieldValue, Form, FormParams, Registry};
//! use std::rc::Rc;
//!
//! let doc = Rc::new(MemoryDocument::new());
//! let wrapper = doc.add_wrapper(doc.root());
//! let email = doc.add_input(wrapper, "email", "text", "");
//!
//! let params = FormParams::from_json_str(r#"{
//!     "form": {"elements": {"email": {
//!         "filters": [{"name": "stringTrim"}, {"name": "stringToLower"}],
//!         "validators": [{"name": "notEmpty"}]
//!     }}}
//! }"#).unwrap();
//! let form = Form::new(doc.clone(), params, &Registry::with_defaults());
//!
//! doc.change(email, "  A@B.com ");
//! assert_eq!(form.get_values()["email"], FieldValue::from("a@b.com"));
//! assert!(form.is_valid());
//! ```

pub mod config;
pub mod dom;
pub mod element;
pub mod error;
pub mod event;
pub mod filter;
pub mod form;
pub mod model;
pub mod notice;
pub mod registry;
pub mod template;
pub mod validator;
pub mod value;

pub use config::{ElementDefaults, ElementOptions, ElementSpec, FormParams, PipelineEntry};
pub use element::{ElementState, FormElement};
pub use error::{FormError, FormResult};
pub use event::{ElementEvent, EventBus, EventKind, FormEvent, Subscription};
pub use filter::Filter;
pub use form::{Form, FormState};
pub use model::{Model, SaveFailure};
pub use notice::{NoticeKind, Notifier};
pub use registry::Registry;
pub use template::TemplateRenderer;
pub use validator::{FormContext, Validator};
pub use value::{FieldValue, FormValues};
