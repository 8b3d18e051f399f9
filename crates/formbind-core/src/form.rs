//! Form aggregation, submission and model binding
//!
//! A [`Form`] owns one [`FormElement`] per declared element, relays their
//! events, aggregates their validity and drives the submit lifecycle.
//!
//! ## Architecture
//!
//! ```text
//!  control events            element bus              form bus
//! ┌─────────────┐  change   ┌─────────────┐  relay   ┌──────────────────┐
//! │ FormDom     │ ────────▶ │ FormElement │ ───────▶ │ element:change   │
//! │             │           │ filter()    │          │ change:<name>    │
//! │             │  submit   │ validate()  │          │ before:submit    │
//! │             │ ────────────────────────────────▶  │ submit ──▶ Model │
//! └─────────────┘                                    └──────────────────┘
//! ```
//!
//! Elements hold a weak reference to the form so validators can read other
//! elements through [`FormContext`]; relay listeners hold weak references in
//! both directions, so dropping the last [`Form`] handle frees everything.
//!
//! ## States
//!
//! `Uninitialized -> Ready -> Submitting -> Ready`, and `Detached` once
//! [`Form::detach`] ran. While a bound model is saving the form stays
//! `Submitting`; further submits are not blocked, and each one starts its own
//! save.

use crate::config::FormParams;
use crate::dom::{DomEvent, FormDom, ListenerId, NodeId, RegionPlacement};
use crate::element::{FormElement, INVALID_CLASS};
use crate::error::FormResult;
use crate::event::{ElementEvent, EventBus, FormEvent, Subscription};
use crate::model::{Model, SaveFailure};
use crate::notice::{NoticeKind, Notifier, SUCCESS_NOTICE_SECS, TracingNotifier};
use crate::registry::Registry;
use crate::template::{Interpolator, TemplateRenderer, strip_remove_markers};
use crate::validator::FormContext;
use crate::value::{FieldValue, FormValues};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Lifecycle state of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
	Uninitialized,
	Ready,
	Submitting,
	Detached,
}

struct ModelBinding {
	model: Rc<dyn Model>,
	change: Subscription,
	submit: Subscription,
}

struct FormInner {
	dom: Rc<dyn FormDom>,
	params: FormParams,
	elements: IndexMap<String, FormElement>,
	messages: RefCell<Vec<String>>,
	state: Cell<FormState>,
	pending_saves: Cell<usize>,
	events: EventBus<FormEvent>,
	notifier: RefCell<Rc<dyn Notifier>>,
	templates: RefCell<Rc<dyn TemplateRenderer>>,
	binding: RefCell<Option<ModelBinding>>,
	submit_listener: Cell<Option<ListenerId>>,
}

impl FormInner {
	fn release_submit_listener(&self) {
		if let Some(listener) = self.submit_listener.take() {
			self.dom.unlisten(listener);
		}
	}
}

impl Drop for FormInner {
	fn drop(&mut self) {
		self.release_submit_listener();
	}
}

impl FormContext for FormInner {
	fn value_of(&self, name: &str) -> Option<FieldValue> {
		self.elements.get(name).map(FormElement::get_value)
	}
}

/// A bound form.
///
/// Cloning is cheap and yields a handle to the same form.
///
/// # Examples
///
/// ```
/// use formbind_core::dom::{FormDom, MemoryDocument};
/// use formbind_core::{Form, FormParams, Registry};
/// use std::rc::Rc;
///
/// let doc = Rc::new(MemoryDocument::new());
/// let wrapper = doc.add_wrapper(doc.root());
/// doc.add_input(wrapper, "email", "text", "");
///
/// let params = FormParams::from_json_str(
///     r#"{"form": {"elements": {"email": {
///         "filters": [{"name": "stringTrim"}],
///         "validators": [{"name": "emailAddress"}]
///     }}}}"#,
/// ).unwrap();
/// let form = Form::new(doc.clone(), params, &Registry::with_defaults());
///
/// let event = doc.submit();
/// assert!(event.is_default_prevented());
/// assert!(doc.has_class(doc.root(), "invalid"));
/// ```
#[derive(Clone)]
pub struct Form {
	inner: Rc<FormInner>,
}

impl Form {
	/// Build every declared element, relay their events and bind the native
	/// submit action.
	pub fn new(dom: Rc<dyn FormDom>, params: FormParams, registry: &Registry) -> Self {
		let inner = Rc::new_cyclic(|weak: &Weak<FormInner>| {
			let context: Weak<dyn FormContext> = weak.clone();
			let elements = params
				.element_options()
				.map(|(key, options)| {
					let element =
						FormElement::with_context(options, Rc::clone(&dom), registry, context.clone());
					(key.to_string(), element)
				})
				.collect();

			FormInner {
				dom,
				params,
				elements,
				messages: RefCell::new(Vec::new()),
				state: Cell::new(FormState::Uninitialized),
				pending_saves: Cell::new(0),
				events: EventBus::new(),
				notifier: RefCell::new(Rc::new(TracingNotifier)),
				templates: RefCell::new(Rc::new(Interpolator)),
				binding: RefCell::new(None),
				submit_listener: Cell::new(None),
			}
		});

		let form = Self { inner };
		for element in form.inner.elements.values() {
			form.relay_element_events(element);
		}
		form.bind_submit();
		form.inner.state.set(FormState::Ready);

		tracing::debug!(
			elements = form.inner.elements.len(),
			stop_on_first_error = form.inner.params.stop_on_first_error,
			"form initialized"
		);
		form
	}

	fn relay_element_events(&self, element: &FormElement) {
		let weak_form = Rc::downgrade(&self.inner);
		let weak_element = element.downgrade();
		element.events().subscribe(move |event: &ElementEvent| {
			let (Some(inner), Some(element)) = (weak_form.upgrade(), weak_element.upgrade()) else {
				return;
			};
			if inner.state.get() == FormState::Detached {
				return;
			}
			let name = element.name().to_string();
			inner.events.emit(&FormEvent::Element {
				element,
				kind: event.kind,
				event: event.event.clone(),
			});
			inner.events.emit(&FormEvent::Field {
				name,
				kind: event.kind,
			});
		});
	}

	fn bind_submit(&self) {
		let weak = Rc::downgrade(&self.inner);
		let listener = self.inner.dom.on_submit(Rc::new(move |event: &DomEvent| {
			if let Some(inner) = weak.upgrade() {
				Form { inner }.submit(event);
			}
		}));
		self.inner.submit_listener.set(Some(listener));
	}

	fn transition(&self, state: FormState) {
		if self.inner.state.get() != FormState::Detached {
			self.inner.state.set(state);
		}
	}

	fn settle(&self) {
		if self.inner.pending_saves.get() == 0 {
			self.transition(FormState::Ready);
		}
	}

	/// Use `notifier` for save notices.
	pub fn set_notifier(&self, notifier: Rc<dyn Notifier>) {
		*self.inner.notifier.borrow_mut() = notifier;
	}

	/// Use `renderer` for collection templates.
	pub fn set_template_renderer(&self, renderer: Rc<dyn TemplateRenderer>) {
		*self.inner.templates.borrow_mut() = renderer;
	}

	/// Current value of every element, keyed by declaration key.
	pub fn get_values(&self) -> FormValues {
		self.inner
			.elements
			.iter()
			.map(|(key, element)| (key.clone(), element.get_value()))
			.collect()
	}

	/// Set every element whose key appears in `data`; other keys are ignored.
	pub fn populate(&self, data: &Map<String, Value>) {
		for (key, value) in data {
			if let Some(element) = self.inner.elements.get(key) {
				element.set_value(FieldValue::from_json(value));
			}
		}
	}

	/// Validate every element and return the conjunction of the results.
	///
	/// `stop_on_first_error` does not skip anything: every element is
	/// validated, and its marker and messages redrawn, on every call.
	pub fn is_valid(&self) -> bool {
		let mut valid = true;
		for element in self.inner.elements.values() {
			valid &= element.validate();
		}
		valid
	}

	/// [`is_valid`](Self::is_valid), then toggle the invalid marker on the
	/// form root.
	pub fn validate(&self) -> bool {
		let valid = self.is_valid();
		self.inner
			.dom
			.toggle_class(self.inner.dom.root(), INVALID_CLASS, !valid);
		valid
	}

	/// Restore every control to its initial value.
	pub fn reset(&self) {
		self.inner.dom.reset();
	}

	/// Run the submit lifecycle for a native submit event.
	///
	/// Clears the form messages, emits `before:submit` and validates. A valid
	/// form emits `submit` with the current values and leaves the default
	/// action to the listeners; an invalid form suppresses it.
	pub fn submit(&self, event: &DomEvent) {
		if self.inner.state.get() == FormState::Detached {
			return;
		}
		self.transition(FormState::Submitting);
		self.inner.messages.borrow_mut().clear();
		self.inner.events.emit(&FormEvent::BeforeSubmit);

		if self.validate() {
			let values = self.get_values();
			tracing::debug!(fields = values.len(), "form submitted");
			self.inner.events.emit(&FormEvent::Submit {
				event: event.clone(),
				values,
			});
		} else {
			tracing::debug!("submission blocked by validation");
			event.prevent_default();
		}

		self.settle();
	}

	/// Render the container's template once per collection item and append
	/// the markup, in collection order.
	///
	/// Each item is rendered with `{index, model}` as context after every
	/// `[__remove__]` marker has been dropped from the template. Returns the
	/// number of rendered items; a container without a template renders none.
	pub fn build_elements_from_collection(
		&self,
		container: NodeId,
		collection: &[Value],
	) -> FormResult<usize> {
		let dom = &self.inner.dom;
		let Some(template) = dom.template_of(container) else {
			tracing::warn!(?container, "container has no template");
			return Ok(0);
		};
		let template = strip_remove_markers(&template);
		let renderer = self.inner.templates.borrow().clone();

		for (index, item) in collection.iter().enumerate() {
			let context = json!({ "index": index, "model": item });
			let markup = renderer.render(&template, &context)?;
			dom.append_markup(container, &markup);
		}
		Ok(collection.len())
	}

	/// Keep the form and `model` in sync.
	///
	/// The form is populated now and on every change of the model. Every
	/// `submit` is taken over: the default action is suppressed and the
	/// values are saved to the model. Binding another model replaces this
	/// binding.
	pub fn bind_model(&self, model: Rc<dyn Model>) {
		self.unbind_model();

		let change = {
			let weak_form = Rc::downgrade(&self.inner);
			let weak_model = Rc::downgrade(&model);
			model.on_change(Box::new(move || {
				if let (Some(inner), Some(model)) = (weak_form.upgrade(), weak_model.upgrade()) {
					Form { inner }.populate(&model.to_json());
				}
			}))
		};
		self.populate(&model.to_json());

		let submit = {
			let weak_form = Rc::downgrade(&self.inner);
			let model = Rc::clone(&model);
			self.inner.events.subscribe(move |event: &FormEvent| {
				let FormEvent::Submit { event, values } = event else {
					return;
				};
				event.prevent_default();
				if let Some(inner) = weak_form.upgrade() {
					Form { inner }.save_to(&model, values);
				}
			})
		};

		*self.inner.binding.borrow_mut() = Some(ModelBinding {
			model,
			change,
			submit,
		});
	}

	/// Drop the model binding, if any.
	pub fn unbind_model(&self) {
		let binding = self.inner.binding.borrow_mut().take();
		if let Some(binding) = binding {
			binding.model.off_change(binding.change);
			self.inner.events.unsubscribe(binding.submit);
		}
	}

	pub fn model(&self) -> Option<Rc<dyn Model>> {
		self.inner
			.binding
			.borrow()
			.as_ref()
			.map(|binding| Rc::clone(&binding.model))
	}

	fn save_to(&self, model: &Rc<dyn Model>, values: &FormValues) {
		let created = model.is_new();
		let label = model.label();
		self.inner.pending_saves.set(self.inner.pending_saves.get() + 1);
		self.transition(FormState::Submitting);

		let weak = Rc::downgrade(&self.inner);
		model.save(
			values,
			Box::new(move |result| {
				if let Some(inner) = weak.upgrade() {
					Form { inner }.finish_save(created, &label, result);
				}
			}),
		);
	}

	fn finish_save(&self, created: bool, label: &str, result: Result<(), SaveFailure>) {
		let pending = self.inner.pending_saves.get().saturating_sub(1);
		self.inner.pending_saves.set(pending);
		self.settle();

		let notifier = self.inner.notifier.borrow().clone();
		match result {
			Ok(()) => {
				let verb = if created { "created" } else { "updated" };
				notifier.notice(
					NoticeKind::Success,
					&format!("Successfully {verb} {label}"),
					Some(SUCCESS_NOTICE_SECS),
				);
				if created {
					self.reset();
				}
				self.inner.events.emit(&FormEvent::Saved { created });
			}
			Err(failure) => match failure.error_message() {
				Some(message) => {
					self.add_message(message.clone());
					self.render_messages();
					self.inner.events.emit(&FormEvent::SaveFailed {
						message: Some(message),
					});
				}
				None => {
					notifier.notice(NoticeKind::Fail, &format!("Failed saving {label}"), None);
					tracing::warn!(body = %failure.body, "save failed without a structured message");
					self.inner
						.events
						.emit(&FormEvent::SaveFailed { message: None });
				}
			},
		}
	}

	pub fn add_message(&self, message: impl Into<String>) {
		self.inner.messages.borrow_mut().push(message.into());
	}

	/// Redraw the form messages in the region at the top of the form root.
	pub fn render_messages(&self) {
		let dom = &self.inner.dom;
		let region = dom.message_region(dom.root(), RegionPlacement::Prepend);
		dom.clear_children(region);
		for message in self.inner.messages.borrow().iter() {
			dom.append_paragraph(region, message);
		}
	}

	pub fn messages(&self) -> Vec<String> {
		self.inner.messages.borrow().clone()
	}

	pub fn element(&self, key: &str) -> Option<&FormElement> {
		self.inner.elements.get(key)
	}

	/// Elements in declaration order.
	pub fn elements(&self) -> impl Iterator<Item = (&str, &FormElement)> + '_ {
		self.inner
			.elements
			.iter()
			.map(|(key, element)| (key.as_str(), element))
	}

	pub fn params(&self) -> &FormParams {
		&self.inner.params
	}

	pub fn dom(&self) -> &Rc<dyn FormDom> {
		&self.inner.dom
	}

	pub fn state(&self) -> FormState {
		self.inner.state.get()
	}

	/// Number of model saves still waiting for completion.
	pub fn pending_saves(&self) -> usize {
		self.inner.pending_saves.get()
	}

	pub fn is_submitting(&self) -> bool {
		self.state() == FormState::Submitting
	}

	/// The form's event bus.
	pub fn events(&self) -> &EventBus<FormEvent> {
		&self.inner.events
	}

	/// Subscribe to events by name, e.g. `element:change` or `submit`.
	pub fn on<F>(&self, name: &str, handler: F) -> Subscription
	where
		F: Fn(&FormEvent) + 'static,
	{
		let name = name.to_string();
		self.inner.events.subscribe(move |event: &FormEvent| {
			if event.name() == name {
				handler(event);
			}
		})
	}

	/// Stop reacting to the document, detach every element, release the
	/// document listeners and drop the model binding and all subscribers.
	pub fn detach(&self) {
		self.unbind_model();
		self.inner.release_submit_listener();
		for element in self.inner.elements.values() {
			element.detach();
		}
		self.inner.state.set(FormState::Detached);
		self.inner.events.clear();
	}
}

impl fmt::Debug for Form {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Form")
			.field("state", &self.state())
			.field("elements", &self.inner.elements.keys().collect::<Vec<_>>())
			.field("messages", &self.inner.messages.borrow())
			.field("pending_saves", &self.pending_saves())
			.finish()
	}
}
