//! DOM capability
//!
//! The form engine never touches a concrete document. Everything it needs
//! (finding controls by name, reading and writing values, toggling classes,
//! drawing message lists, listening for events) goes through [`FormDom`].
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   FormDom    ┌──────────────────┐
//! │ Form       │ ───────────▶ │ MemoryDocument   │  (tests, headless use)
//! │ FormElement│              │ browser backend  │  (provided by the host)
//! └────────────┘              └──────────────────┘
//! ```
//!
//! All methods take `&self`: the document is shared by the form and every
//! element, and implementations use interior mutability. Implementations must
//! not hold internal borrows while invoking handlers, because handlers call
//! back into the document.

pub mod memory;

pub use memory::MemoryDocument;

use crate::event::EventKind;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Opaque handle to a node of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	pub fn new(raw: usize) -> Self {
		Self(raw)
	}

	pub fn raw(&self) -> usize {
		self.0
	}
}

/// Handle of a listener registered with [`FormDom::listen`] or
/// [`FormDom::on_submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
	pub fn new(raw: u64) -> Self {
		Self(raw)
	}

	pub fn raw(&self) -> u64 {
		self.0
	}
}

/// Where a message region is created when missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionPlacement {
	/// Last child of the node (element messages)
	Append,
	/// First child of the node (form messages)
	Prepend,
}

/// An event dispatched by the document.
///
/// Clones share the default-prevented flag, so preventing the default on a
/// relayed copy is visible to the dispatcher.
#[derive(Clone)]
pub struct DomEvent {
	event_type: Rc<str>,
	default_prevented: Rc<Cell<bool>>,
}

impl DomEvent {
	pub fn new(event_type: &str) -> Self {
		Self {
			event_type: Rc::from(event_type),
			default_prevented: Rc::new(Cell::new(false)),
		}
	}

	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// Suppress the document's default action for this event.
	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	pub fn is_default_prevented(&self) -> bool {
		self.default_prevented.get()
	}
}

impl fmt::Debug for DomEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DomEvent")
			.field("event_type", &self.event_type)
			.field("default_prevented", &self.is_default_prevented())
			.finish()
	}
}

/// Event handler registered with the document.
pub type DomHandler = Rc<dyn Fn(&DomEvent)>;

/// Operations the form engine needs from a document.
pub trait FormDom {
	/// The form root node.
	fn root(&self) -> NodeId;

	/// Every control under the root whose `name` attribute equals `name`,
	/// in document order.
	fn controls_named(&self, name: &str) -> Vec<NodeId>;

	/// The control's `type` attribute (`text`, `radio`, `checkbox`, ...).
	fn control_type(&self, control: NodeId) -> Option<String>;

	/// The control's current value.
	///
	/// A single string per control: multi-valued reads come from checkable
	/// groups sharing a name, not from a `<select multiple>`.
	fn value(&self, control: NodeId) -> String;

	fn set_value(&self, control: NodeId, value: &str);

	fn is_checked(&self, control: NodeId) -> bool;

	fn set_checked(&self, control: NodeId, checked: bool);

	/// The control's parent when it is a `div.element` or a `fieldset`.
	fn render_target(&self, control: NodeId) -> Option<NodeId>;

	fn toggle_class(&self, node: NodeId, class: &str, on: bool);

	fn has_class(&self, node: NodeId, class: &str) -> bool;

	/// The `.messages` child of `node`, created at `placement` if missing.
	fn message_region(&self, node: NodeId, placement: RegionPlacement) -> NodeId;

	fn clear_children(&self, node: NodeId);

	/// Append a `<p>` holding `text`.
	fn append_paragraph(&self, node: NodeId, text: &str);

	/// Call `handler` for every event of the given kinds on `node`.
	fn listen(&self, node: NodeId, kinds: &[EventKind], handler: DomHandler) -> ListenerId;

	/// Call `handler` when the form root is submitted.
	fn on_submit(&self, handler: DomHandler) -> ListenerId;

	/// Remove a listener. Returns `false` when it was already gone.
	fn unlisten(&self, listener: ListenerId) -> bool;

	/// Restore every control to its initial state.
	fn reset(&self);

	/// The `data-template` attribute of the container's template `span`.
	fn template_of(&self, container: NodeId) -> Option<String>;

	/// Append rendered markup to the container.
	fn append_markup(&self, container: NodeId, markup: &str);
}

/// Control types whose members are selected by checking.
pub fn is_checkable(control_type: Option<&str>) -> bool {
	matches!(control_type, Some("radio") | Some("checkbox"))
}
