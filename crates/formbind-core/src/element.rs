//! Form element
//!
//! A [`FormElement`] binds one named control (or one group of radio/checkbox
//! members sharing a name) to its filter and validator pipelines.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──resolve pipelines, locate controls──▶ Ready
//!                                                       │  ▲
//!                           filter() / setValue() ──────┤  │
//!                                    Filtering ─────────┘  │
//!                           isValid() / validate() ────────┤
//!                                    Validating ───────────┘
//! Ready ──detach()──▶ Detached
//! ```
//!
//! Pipelines are resolved synchronously while the element is constructed, so
//! an element is only `Ready` once every resolvable entry is attached. Entries
//! the registry cannot resolve are logged and left out.
//!
//! When no control carries the element's name, the element stays unbound for
//! its whole life: [`get_value`](FormElement::get_value) yields `""`, filtering
//! and programmatic set are no-ops, and validation runs against `""`.

use crate::config::ElementOptions;
use crate::dom::{DomEvent, FormDom, ListenerId, NodeId, RegionPlacement, is_checkable};
use crate::event::{ElementEvent, EventBus, EventKind, Subscription};
use crate::filter::{Filter, apply_pipeline};
use crate::registry::Registry;
use crate::validator::{DetachedContext, FormContext, Validator};
use crate::value::FieldValue;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Class toggled on a render target whose last validation failed.
pub const INVALID_CLASS: &str = "invalid";

/// Lifecycle state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
	Uninitialized,
	Ready,
	Filtering,
	Validating,
	Detached,
}

struct ElementInner {
	options: ElementOptions,
	dom: Rc<dyn FormDom>,
	controls: Vec<NodeId>,
	filters: RefCell<Vec<Box<dyn Filter>>>,
	validators: RefCell<Vec<Box<dyn Validator>>>,
	messages: RefCell<Vec<String>>,
	valid: Cell<Option<bool>>,
	state: Cell<ElementState>,
	events: EventBus<ElementEvent>,
	dom_listeners: RefCell<Vec<ListenerId>>,
	context: Option<Weak<dyn FormContext>>,
}

impl ElementInner {
	fn release_listeners(&self) {
		let listeners = std::mem::take(&mut *self.dom_listeners.borrow_mut());
		for listener in listeners {
			self.dom.unlisten(listener);
		}
	}
}

impl Drop for ElementInner {
	fn drop(&mut self) {
		self.release_listeners();
	}
}

/// One named control and its pipelines.
///
/// Cloning is cheap and yields a handle to the same element.
#[derive(Clone)]
pub struct FormElement {
	inner: Rc<ElementInner>,
}

impl FormElement {
	/// Create a standalone element, not attached to any form.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_core::config::{ElementOptions, PipelineEntry};
	/// use formbind_core::dom::{FormDom, MemoryDocument};
	/// use formbind_core::element::FormElement;
	/// use formbind_core::Registry;
	/// use std::rc::Rc;
	///
	/// let doc = Rc::new(MemoryDocument::new());
	/// let input = doc.add_input(doc.root(), "qty", "text", "");
	///
	/// let options = ElementOptions {
	///     filters: vec![PipelineEntry::new("int")],
	///     ..ElementOptions::new("qty")
	/// };
	/// let element = FormElement::new(options, doc.clone(), &Registry::with_defaults());
	///
	/// element.set_value("12 boxes");
	/// assert_eq!(doc.value(input), "12");
	/// ```
	pub fn new(options: ElementOptions, dom: Rc<dyn FormDom>, registry: &Registry) -> Self {
		Self::build(options, dom, registry, None)
	}

	pub(crate) fn with_context(
		options: ElementOptions,
		dom: Rc<dyn FormDom>,
		registry: &Registry,
		context: Weak<dyn FormContext>,
	) -> Self {
		Self::build(options, dom, registry, Some(context))
	}

	fn build(
		options: ElementOptions,
		dom: Rc<dyn FormDom>,
		registry: &Registry,
		context: Option<Weak<dyn FormContext>>,
	) -> Self {
		let controls = if options.name.is_empty() {
			Vec::new()
		} else {
			dom.controls_named(&options.name)
		};

		let element = Self {
			inner: Rc::new(ElementInner {
				options,
				dom,
				controls,
				filters: RefCell::new(Vec::new()),
				validators: RefCell::new(Vec::new()),
				messages: RefCell::new(Vec::new()),
				valid: Cell::new(None),
				state: Cell::new(ElementState::Uninitialized),
				events: EventBus::new(),
				dom_listeners: RefCell::new(Vec::new()),
				context,
			}),
		};

		element.resolve_pipelines(registry);
		if element.is_bound() {
			element.bind_events();
		} else {
			tracing::debug!(element = %element.name(), "no control found, element stays unbound");
		}
		element.inner.state.set(ElementState::Ready);

		element
	}

	fn resolve_pipelines(&self, registry: &Registry) {
		for entry in &self.inner.options.filters {
			match registry.resolve_filter(entry) {
				Ok(filter) => self.inner.filters.borrow_mut().push(filter),
				Err(error) => {
					tracing::warn!(element = %self.name(), filter = %entry.name, %error, "skipping unresolved filter")
				}
			}
		}
		for entry in &self.inner.options.validators {
			match registry.resolve_validator(entry) {
				Ok(validator) => self.inner.validators.borrow_mut().push(validator),
				Err(error) => {
					tracing::warn!(element = %self.name(), validator = %entry.name, %error, "skipping unresolved validator")
				}
			}
		}
	}

	fn bind_events(&self) {
		// Registered before anyone else can subscribe, so filtering and
		// validation precede every relayed `change`.
		let weak = Rc::downgrade(&self.inner);
		self.inner.events.subscribe(move |event: &ElementEvent| {
			if event.kind != EventKind::Change {
				return;
			}
			if let Some(inner) = weak.upgrade() {
				let element = FormElement { inner };
				element.filter();
				element.validate();
			}
		});

		for control in &self.inner.controls {
			let weak = Rc::downgrade(&self.inner);
			let listener = self.inner.dom.listen(
				*control,
				&EventKind::CONTROL_EVENTS,
				Rc::new(move |event: &DomEvent| {
					let Some(inner) = weak.upgrade() else {
						return;
					};
					if inner.state.get() == ElementState::Detached {
						return;
					}
					if let Some(kind) = EventKind::parse(event.event_type()) {
						inner.events.emit(&ElementEvent {
							kind,
							event: event.clone(),
						});
					}
				}),
			);
			self.inner.dom_listeners.borrow_mut().push(listener);
		}
	}

	fn transition(&self, state: ElementState) {
		if self.inner.state.get() != ElementState::Detached {
			self.inner.state.set(state);
		}
	}

	fn is_checkable(&self) -> bool {
		self.inner
			.controls
			.first()
			.is_some_and(|control| is_checkable(self.inner.dom.control_type(*control).as_deref()))
	}

	/// Run the filter pipeline over the displayed value and write the result
	/// back to the control.
	///
	/// No-op for unbound elements and for radio/checkbox groups, whose option
	/// values are never rewritten.
	pub fn filter(&self) {
		let Some(first) = self.inner.controls.first().copied() else {
			return;
		};
		if self.is_checkable() {
			return;
		}

		self.transition(ElementState::Filtering);
		let dom = &self.inner.dom;
		let raw = dom.value(first);
		let filtered = apply_pipeline(&self.inner.filters.borrow(), &raw);
		for control in &self.inner.controls {
			dom.set_value(*control, &filtered);
		}
		self.transition(ElementState::Ready);

		tracing::trace!(element = %self.name(), %raw, %filtered, "filtered");
	}

	/// Run every validator against the current value.
	///
	/// The message list is replaced by the messages of the validators that
	/// failed, in pipeline order. Presentation is left untouched; see
	/// [`validate`](Self::validate).
	pub fn is_valid(&self) -> bool {
		self.inner.messages.borrow_mut().clear();
		let value = self.get_value();
		self.transition(ElementState::Validating);

		let context = self.inner.context.as_ref().and_then(Weak::upgrade);
		let form: &dyn FormContext = match &context {
			Some(form) => &**form,
			None => &DetachedContext,
		};

		let mut valid = true;
		let mut messages = Vec::new();
		for validator in self.inner.validators.borrow().iter() {
			if !validator.is_valid(&value, form) {
				valid = false;
				if let Some(message) = validator.message(&value) {
					messages.push(message);
				}
			}
		}

		*self.inner.messages.borrow_mut() = messages;
		self.inner.valid.set(Some(valid));
		self.transition(ElementState::Ready);

		valid
	}

	/// Validate, mark the render target and redraw the message list.
	pub fn validate(&self) -> bool {
		let valid = self.is_valid();
		if let Some(target) = self.render_target() {
			self.inner.dom.toggle_class(target, INVALID_CLASS, !valid);
		}
		self.render_messages();

		tracing::debug!(element = %self.name(), valid, "validated");
		valid
	}

	/// Current value of the bound control(s).
	///
	/// Radio/checkbox groups yield the single checked value, the ordered
	/// checked values when several are checked, or [`FieldValue::Absent`].
	/// Any other control reads as text, one string per control, so a
	/// `<select multiple>` yields a single value rather than a list.
	pub fn get_value(&self) -> FieldValue {
		let dom = &self.inner.dom;
		let Some(first) = self.inner.controls.first().copied() else {
			return FieldValue::empty();
		};

		if self.is_checkable() {
			let mut checked: Vec<String> = self
				.inner
				.controls
				.iter()
				.filter(|control| dom.is_checked(**control))
				.map(|control| dom.value(*control))
				.collect();
			return match checked.len() {
				0 => FieldValue::Absent,
				1 => FieldValue::Text(checked.remove(0)),
				_ => FieldValue::List(checked),
			};
		}

		FieldValue::Text(dom.value(first))
	}

	/// Write a value to the bound control(s), then filter.
	///
	/// For radio/checkbox groups the members whose value is among the given
	/// value(s) become checked and all others unchecked. Validators do not
	/// run.
	pub fn set_value(&self, value: impl Into<FieldValue>) {
		if !self.is_bound() {
			return;
		}
		let value = value.into();
		let dom = &self.inner.dom;

		if self.is_checkable() {
			let members = value.members();
			for control in &self.inner.controls {
				dom.set_checked(*control, members.contains(&dom.value(*control)));
			}
		} else {
			let text = value.to_text();
			for control in &self.inner.controls {
				dom.set_value(*control, &text);
			}
			self.filter();
		}
	}

	/// Node that receives the invalid marker and the message region.
	///
	/// The parent of the control when it is a `div.element` or a `fieldset`,
	/// the form root for unbound elements, `None` otherwise.
	pub fn render_target(&self) -> Option<NodeId> {
		match self.inner.controls.first() {
			Some(control) => self.inner.dom.render_target(*control),
			None => Some(self.inner.dom.root()),
		}
	}

	/// Redraw the message list inside the render target.
	pub fn render_messages(&self) {
		if !self.inner.options.render_messages {
			return;
		}
		let Some(target) = self.render_target() else {
			return;
		};

		let dom = &self.inner.dom;
		let region = dom.message_region(target, RegionPlacement::Append);
		dom.clear_children(region);
		for message in self.inner.messages.borrow().iter() {
			dom.append_paragraph(region, message);
		}
	}

	/// Attach a filter at the end of the pipeline.
	pub fn append_filter(&self, filter: impl Filter + 'static) {
		self.inner.filters.borrow_mut().push(Box::new(filter));
	}

	/// Attach a validator at the end of the pipeline.
	pub fn append_validator(&self, validator: impl Validator + 'static) {
		self.inner.validators.borrow_mut().push(Box::new(validator));
	}

	pub fn filter_count(&self) -> usize {
		self.inner.filters.borrow().len()
	}

	pub fn validator_count(&self) -> usize {
		self.inner.validators.borrow().len()
	}

	/// Messages collected by the last validation.
	pub fn messages(&self) -> Vec<String> {
		self.inner.messages.borrow().clone()
	}

	/// Result of the last validation, `None` before the first one.
	pub fn last_validity(&self) -> Option<bool> {
		self.inner.valid.get()
	}

	pub fn name(&self) -> &str {
		&self.inner.options.name
	}

	pub fn options(&self) -> &ElementOptions {
		&self.inner.options
	}

	/// Returns `true` when at least one control carries the element's name.
	pub fn is_bound(&self) -> bool {
		!self.inner.controls.is_empty()
	}

	pub fn controls(&self) -> &[NodeId] {
		&self.inner.controls
	}

	pub fn state(&self) -> ElementState {
		self.inner.state.get()
	}

	/// The element's event bus.
	pub fn events(&self) -> &EventBus<ElementEvent> {
		&self.inner.events
	}

	/// Subscribe to one kind of control event.
	pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
	where
		F: Fn(&ElementEvent) + 'static,
	{
		self.inner.events.subscribe(move |event: &ElementEvent| {
			if event.kind == kind {
				handler(event);
			}
		})
	}

	/// Stop reacting to control events, release the document listeners and
	/// drop every subscriber.
	pub fn detach(&self) {
		self.inner.state.set(ElementState::Detached);
		self.inner.release_listeners();
		self.inner.events.clear();
	}

	pub(crate) fn downgrade(&self) -> WeakElement {
		WeakElement(Rc::downgrade(&self.inner))
	}
}

impl fmt::Debug for FormElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormElement")
			.field("name", &self.name())
			.field("controls", &self.inner.controls)
			.field("state", &self.state())
			.field("filters", &self.filter_count())
			.field("validators", &self.validator_count())
			.field("valid", &self.last_validity())
			.finish()
	}
}

/// Non-owning element handle, held by relay listeners.
#[derive(Clone)]
pub(crate) struct WeakElement(Weak<ElementInner>);

impl WeakElement {
	pub(crate) fn upgrade(&self) -> Option<FormElement> {
		self.0.upgrade().map(|inner| FormElement { inner })
	}
}
