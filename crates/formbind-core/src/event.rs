//! Typed publish/subscribe
//!
//! Elements and forms each own an [`EventBus`] carrying their own event type.
//! A form subscribes to every element's bus and re-emits the element events
//! on its own bus with the element attached, which is where the
//! `element:<kind>` names come from.
//!
//! Emission works on a snapshot of the listener list, so a listener may
//! subscribe or unsubscribe (itself included) while being called.

use crate::dom::DomEvent;
use crate::element::FormElement;
use crate::value::FormValues;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

struct BusInner<E> {
	next_id: u64,
	listeners: Vec<(u64, Listener<E>)>,
}

/// Single-threaded event bus for one event type.
pub struct EventBus<E> {
	inner: Rc<RefCell<BusInner<E>>>,
}

impl<E> EventBus<E> {
	pub fn new() -> Self {
		Self {
			inner: Rc::new(RefCell::new(BusInner {
				next_id: 0,
				listeners: Vec::new(),
			})),
		}
	}

	/// Register a listener. Listeners run in subscription order.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&E) + 'static,
	{
		let mut inner = self.inner.borrow_mut();
		let id = inner.next_id;
		inner.next_id += 1;
		inner.listeners.push((id, Rc::new(listener)));
		Subscription(id)
	}

	/// Remove a listener. Returns `false` if it was not registered.
	pub fn unsubscribe(&self, subscription: Subscription) -> bool {
		let mut inner = self.inner.borrow_mut();
		let before = inner.listeners.len();
		inner.listeners.retain(|(id, _)| *id != subscription.0);
		inner.listeners.len() < before
	}

	/// Deliver an event to every listener registered at the time of the call.
	pub fn emit(&self, event: &E) {
		let listeners: Vec<Listener<E>> = self
			.inner
			.borrow()
			.listeners
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();

		for listener in listeners {
			listener(event);
		}
	}

	pub fn listener_count(&self) -> usize {
		self.inner.borrow().listeners.len()
	}

	/// Drop every listener.
	pub fn clear(&self) {
		self.inner.borrow_mut().listeners.clear();
	}
}

impl<E> Clone for EventBus<E> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<E> Default for EventBus<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> fmt::Debug for EventBus<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventBus")
			.field("listeners", &self.listener_count())
			.finish()
	}
}

/// Control events an element listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	Focus,
	Blur,
	Change,
	KeyDown,
	KeyUp,
	Paste,
}

impl EventKind {
	/// Every kind wired on a bound control.
	pub const CONTROL_EVENTS: [EventKind; 6] = [
		EventKind::Focus,
		EventKind::Blur,
		EventKind::Change,
		EventKind::KeyDown,
		EventKind::KeyUp,
		EventKind::Paste,
	];

	/// DOM event type name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Focus => "focus",
			Self::Blur => "blur",
			Self::Change => "change",
			Self::KeyDown => "keydown",
			Self::KeyUp => "keyup",
			Self::Paste => "paste",
		}
	}

	pub fn parse(name: &str) -> Option<Self> {
		Self::CONTROL_EVENTS
			.into_iter()
			.find(|kind| kind.as_str() == name)
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Event re-emitted by an element from its bound control.
#[derive(Debug, Clone)]
pub struct ElementEvent {
	pub kind: EventKind,
	pub event: DomEvent,
}

/// Events emitted by a form.
#[derive(Debug, Clone)]
pub enum FormEvent {
	/// An element event relayed with the element attached (`element:<kind>`)
	Element {
		element: FormElement,
		kind: EventKind,
		event: DomEvent,
	},
	/// Control event announced under the control name (`<kind>:<name>`)
	Field { name: String, kind: EventKind },
	/// Submission started, before validation (`before:submit`)
	BeforeSubmit,
	/// Validation passed (`submit`)
	Submit { event: DomEvent, values: FormValues },
	/// The bound model saved the submitted values (`save:success`)
	Saved { created: bool },
	/// The bound model rejected the submitted values (`save:error`)
	SaveFailed { message: Option<String> },
}

impl FormEvent {
	/// Event name in the `namespace:kind` convention.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_core::event::{EventKind, FormEvent};
	///
	/// assert_eq!(FormEvent::BeforeSubmit.name(), "before:submit");
	/// assert_eq!(
	///     FormEvent::Field { name: "email".into(), kind: EventKind::Change }.name(),
	///     "change:email"
	/// );
	/// ```
	pub fn name(&self) -> String {
		match self {
			Self::Element { kind, .. } => format!("element:{kind}"),
			Self::Field { name, kind } => format!("{kind}:{name}"),
			Self::BeforeSubmit => "before:submit".to_string(),
			Self::Submit { .. } => "submit".to_string(),
			Self::Saved { .. } => "save:success".to_string(),
			Self::SaveFailed { .. } => "save:error".to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	#[rstest]
	fn test_emit_in_subscription_order() {
		let bus = EventBus::<u32>::new();
		let seen = Rc::new(RefCell::new(Vec::new()));

		for tag in ["first", "second"] {
			let seen = Rc::clone(&seen);
			bus.subscribe(move |value: &u32| seen.borrow_mut().push(format!("{tag}:{value}")));
		}
		bus.emit(&7);

		assert_eq!(*seen.borrow(), vec!["first:7", "second:7"]);
	}

	#[rstest]
	fn test_unsubscribe() {
		let bus = EventBus::<()>::new();
		let calls = Rc::new(Cell::new(0));
		let subscription = {
			let calls = Rc::clone(&calls);
			bus.subscribe(move |_| calls.set(calls.get() + 1))
		};

		bus.emit(&());
		assert!(bus.unsubscribe(subscription));
		assert!(!bus.unsubscribe(subscription));
		bus.emit(&());

		assert_eq!(calls.get(), 1);
		assert_eq!(bus.listener_count(), 0);
	}

	#[rstest]
	fn test_listener_may_subscribe_during_emit() {
		let bus = EventBus::<()>::new();
		let calls = Rc::new(Cell::new(0));
		{
			let bus_handle = bus.clone();
			let calls = Rc::clone(&calls);
			bus.subscribe(move |_| {
				let calls = Rc::clone(&calls);
				bus_handle.subscribe(move |_| calls.set(calls.get() + 1));
			});
		}

		bus.emit(&());
		assert_eq!(calls.get(), 0);
		assert_eq!(bus.listener_count(), 2);

		bus.emit(&());
		assert_eq!(calls.get(), 1);
	}

	#[rstest]
	#[case(EventKind::KeyDown, "keydown")]
	#[case(EventKind::Paste, "paste")]
	fn test_event_kind_names(#[case] kind: EventKind, #[case] name: &str) {
		assert_eq!(kind.as_str(), name);
		assert_eq!(EventKind::parse(name), Some(kind));
	}

	#[rstest]
	fn test_form_event_names() {
		assert_eq!(
			FormEvent::Submit {
				event: DomEvent::new("submit"),
				values: FormValues::new()
			}
			.name(),
			"submit"
		);
		assert_eq!(FormEvent::Saved { created: true }.name(), "save:success");
		assert_eq!(FormEvent::SaveFailed { message: None }.name(), "save:error");
	}
}
