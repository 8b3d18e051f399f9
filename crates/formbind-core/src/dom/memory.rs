//! In-memory document
//!
//! A small node tree implementing [`FormDom`], used for headless forms and in
//! tests. It records everything the engine does to it (classes, message
//! regions, appended markup) and can simulate user input and submission.
//!
//! ## Example
//!
//! ```
//! use formbind_core::dom::{FormDom, MemoryDocument};
//!
//! let doc = MemoryDocument::new();
//! let wrapper = doc.add_wrapper(doc.root());
//! let input = doc.add_input(wrapper, "email", "text", "");
//!
//! doc.change(input, "a@b.com");
//! assert_eq!(doc.value(input), "a@b.com");
//! assert_eq!(doc.render_target(input), Some(wrapper));
//! ```

use super::{DomEvent, DomHandler, FormDom, ListenerId, NodeId, RegionPlacement};
use crate::event::EventKind;
use std::cell::{Cell, RefCell};
use std::fmt;

const MARKUP_TAG: &str = "#markup";

#[derive(Debug, Clone, Default)]
struct Node {
	tag: String,
	attributes: Vec<(String, String)>,
	classes: Vec<String>,
	value: String,
	default_value: String,
	checked: bool,
	default_checked: bool,
	text: Option<String>,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

impl Node {
	fn new(tag: &str, parent: Option<NodeId>) -> Self {
		Self {
			tag: tag.to_string(),
			parent,
			..Self::default()
		}
	}

	fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	fn has_class(&self, class: &str) -> bool {
		self.classes.iter().any(|c| c == class)
	}
}

/// Node-tree document with a `form` root.
pub struct MemoryDocument {
	nodes: RefCell<Vec<Node>>,
	listeners: RefCell<Vec<(ListenerId, NodeId, EventKind, DomHandler)>>,
	submit_handlers: RefCell<Vec<(ListenerId, DomHandler)>>,
	next_listener: Cell<u64>,
	submissions: Cell<usize>,
}

impl MemoryDocument {
	/// Create a document holding an empty `form` root.
	pub fn new() -> Self {
		Self {
			nodes: RefCell::new(vec![Node::new("form", None)]),
			listeners: RefCell::new(Vec::new()),
			submit_handlers: RefCell::new(Vec::new()),
			next_listener: Cell::new(0),
			submissions: Cell::new(0),
		}
	}

	fn next_listener_id(&self) -> ListenerId {
		let id = self.next_listener.get();
		self.next_listener.set(id + 1);
		ListenerId::new(id)
	}

	fn with_node<R>(&self, id: NodeId, f: impl FnOnce(&Node) -> R) -> Option<R> {
		self.nodes.borrow().get(id.raw()).map(f)
	}

	fn with_node_mut<R>(&self, id: NodeId, f: impl FnOnce(&mut Node) -> R) -> Option<R> {
		self.nodes.borrow_mut().get_mut(id.raw()).map(f)
	}

	fn insert_child(&self, parent: NodeId, tag: &str, placement: RegionPlacement) -> NodeId {
		let mut nodes = self.nodes.borrow_mut();
		let id = NodeId::new(nodes.len());
		nodes.push(Node::new(tag, Some(parent)));
		if let Some(parent_node) = nodes.get_mut(parent.raw()) {
			match placement {
				RegionPlacement::Append => parent_node.children.push(id),
				RegionPlacement::Prepend => parent_node.children.insert(0, id),
			}
		}
		id
	}

	/// Append a new element under `parent`.
	pub fn create_element(&self, parent: NodeId, tag: &str) -> NodeId {
		self.insert_child(parent, tag, RegionPlacement::Append)
	}

	/// Set an attribute. `value` also becomes the control's current and
	/// initial value; `checked` sets the current and initial checked state.
	pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
		self.with_node_mut(node, |n| {
			match name {
				"value" => {
					n.value = value.to_string();
					n.default_value = value.to_string();
				}
				"checked" => {
					n.checked = true;
					n.default_checked = true;
				}
				"class" => {
					n.classes = value.split_whitespace().map(str::to_string).collect();
				}
				_ => {}
			}
			match n.attributes.iter_mut().find(|(key, _)| key == name) {
				Some(entry) => entry.1 = value.to_string(),
				None => n.attributes.push((name.to_string(), value.to_string())),
			}
		});
	}

	pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
		self.with_node(node, |n| n.attribute(name).map(str::to_string))
			.flatten()
	}

	pub fn add_class(&self, node: NodeId, class: &str) {
		self.toggle_class(node, class, true);
	}

	pub fn classes(&self, node: NodeId) -> Vec<String> {
		self.with_node(node, |n| n.classes.clone()).unwrap_or_default()
	}

	pub fn tag(&self, node: NodeId) -> Option<String> {
		self.with_node(node, |n| n.tag.clone())
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.with_node(node, |n| n.parent).flatten()
	}

	pub fn children(&self, node: NodeId) -> Vec<NodeId> {
		self.with_node(node, |n| n.children.clone()).unwrap_or_default()
	}

	pub fn text(&self, node: NodeId) -> Option<String> {
		self.with_node(node, |n| n.text.clone()).flatten()
	}

	/// Append a `div.element` wrapper, the usual render target of a control.
	pub fn add_wrapper(&self, parent: NodeId) -> NodeId {
		let wrapper = self.create_element(parent, "div");
		self.add_class(wrapper, "element");
		wrapper
	}

	pub fn add_fieldset(&self, parent: NodeId) -> NodeId {
		self.create_element(parent, "fieldset")
	}

	/// Append an `input` control.
	pub fn add_input(&self, parent: NodeId, name: &str, input_type: &str, value: &str) -> NodeId {
		let input = self.create_element(parent, "input");
		self.set_attribute(input, "name", name);
		self.set_attribute(input, "type", input_type);
		self.set_attribute(input, "value", value);
		input
	}

	/// Append a radio or checkbox member.
	pub fn add_checkable(
		&self,
		parent: NodeId,
		name: &str,
		input_type: &str,
		value: &str,
		checked: bool,
	) -> NodeId {
		let input = self.add_input(parent, name, input_type, value);
		if checked {
			self.set_attribute(input, "checked", "checked");
		}
		input
	}

	/// Append the `span` carrying a repeated-fieldset template.
	pub fn add_template(&self, container: NodeId, template: &str) -> NodeId {
		let span = self.create_element(container, "span");
		self.set_attribute(span, "data-template", template);
		span
	}

	/// Texts of the paragraphs in the `.messages` child of `node`.
	pub fn messages_in(&self, node: NodeId) -> Vec<String> {
		self.find_region(node)
			.map(|region| {
				self.children(region)
					.into_iter()
					.filter_map(|child| self.text(child))
					.collect()
			})
			.unwrap_or_default()
	}

	pub fn has_message_region(&self, node: NodeId) -> bool {
		self.find_region(node).is_some()
	}

	/// Markup appended to `container`, in order.
	pub fn markup_in(&self, container: NodeId) -> Vec<String> {
		self.children(container)
			.into_iter()
			.filter(|child| self.tag(*child).as_deref() == Some(MARKUP_TAG))
			.filter_map(|child| self.text(child))
			.collect()
	}

	fn find_region(&self, node: NodeId) -> Option<NodeId> {
		let nodes = self.nodes.borrow();
		nodes.get(node.raw())?.children.iter().copied().find(|child| {
			nodes
				.get(child.raw())
				.is_some_and(|c| c.has_class("messages"))
		})
	}

	fn descendants(&self, node: NodeId) -> Vec<NodeId> {
		let nodes = self.nodes.borrow();
		let mut found = Vec::new();
		let mut stack: Vec<NodeId> = nodes
			.get(node.raw())
			.map(|n| n.children.iter().rev().copied().collect())
			.unwrap_or_default();

		while let Some(current) = stack.pop() {
			found.push(current);
			if let Some(n) = nodes.get(current.raw()) {
				stack.extend(n.children.iter().rev().copied());
			}
		}
		found
	}

	/// Dispatch an event of `kind` to the listeners of `node`.
	pub fn dispatch(&self, node: NodeId, kind: EventKind) -> DomEvent {
		let handlers: Vec<DomHandler> = self
			.listeners
			.borrow()
			.iter()
			.filter(|(_, target, k, _)| *target == node && *k == kind)
			.map(|(_, _, _, handler)| handler.clone())
			.collect();

		let event = DomEvent::new(kind.as_str());
		for handler in handlers {
			handler(&event);
		}
		event
	}

	/// Type a new value into a control and fire `change`.
	pub fn change(&self, control: NodeId, value: &str) -> DomEvent {
		self.with_node_mut(control, |n| n.value = value.to_string());
		self.dispatch(control, EventKind::Change)
	}

	/// Check or uncheck a member and fire `change`.
	pub fn click_checkable(&self, control: NodeId, checked: bool) -> DomEvent {
		let is_radio = self.control_type(control).as_deref() == Some("radio");
		if is_radio && checked {
			if let Some(name) = self.attribute(control, "name") {
				for member in self.controls_named(&name) {
					self.set_checked(member, false);
				}
			}
		}
		self.set_checked(control, checked);
		self.dispatch(control, EventKind::Change)
	}

	/// Submit the form root. Submissions whose default action was not
	/// prevented are counted as native submissions.
	pub fn submit(&self) -> DomEvent {
		let handlers: Vec<DomHandler> = self
			.submit_handlers
			.borrow()
			.iter()
			.map(|(_, handler)| handler.clone())
			.collect();
		let event = DomEvent::new("submit");
		for handler in handlers {
			handler(&event);
		}
		if !event.is_default_prevented() {
			self.submissions.set(self.submissions.get() + 1);
		}
		event
	}

	/// Number of submissions that reached the default action.
	pub fn native_submissions(&self) -> usize {
		self.submissions.get()
	}

	pub fn listener_count(&self, node: NodeId) -> usize {
		self.listeners
			.borrow()
			.iter()
			.filter(|(_, target, _, _)| *target == node)
			.count()
	}

	pub fn submit_listener_count(&self) -> usize {
		self.submit_handlers.borrow().len()
	}
}

impl Default for MemoryDocument {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for MemoryDocument {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryDocument")
			.field("nodes", &self.nodes.borrow().len())
			.field("listeners", &self.listeners.borrow().len())
			.field("submissions", &self.submissions.get())
			.finish()
	}
}

impl FormDom for MemoryDocument {
	fn root(&self) -> NodeId {
		NodeId::new(0)
	}

	fn controls_named(&self, name: &str) -> Vec<NodeId> {
		self.descendants(self.root())
			.into_iter()
			.filter(|node| {
				self.with_node(*node, |n| n.attribute("name") == Some(name))
					.unwrap_or(false)
			})
			.collect()
	}

	fn control_type(&self, control: NodeId) -> Option<String> {
		self.attribute(control, "type")
	}

	fn value(&self, control: NodeId) -> String {
		self.with_node(control, |n| n.value.clone())
			.unwrap_or_default()
	}

	fn set_value(&self, control: NodeId, value: &str) {
		self.with_node_mut(control, |n| n.value = value.to_string());
	}

	fn is_checked(&self, control: NodeId) -> bool {
		self.with_node(control, |n| n.checked).unwrap_or(false)
	}

	fn set_checked(&self, control: NodeId, checked: bool) {
		self.with_node_mut(control, |n| n.checked = checked);
	}

	fn render_target(&self, control: NodeId) -> Option<NodeId> {
		let parent = self.parent(control)?;
		let is_target = self
			.with_node(parent, |n| {
				(n.tag == "div" && n.has_class("element")) || n.tag == "fieldset"
			})
			.unwrap_or(false);
		is_target.then_some(parent)
	}

	fn toggle_class(&self, node: NodeId, class: &str, on: bool) {
		self.with_node_mut(node, |n| {
			let present = n.has_class(class);
			if on && !present {
				n.classes.push(class.to_string());
			} else if !on && present {
				n.classes.retain(|c| c != class);
			}
		});
	}

	fn has_class(&self, node: NodeId, class: &str) -> bool {
		self.with_node(node, |n| n.has_class(class))
			.unwrap_or(false)
	}

	fn message_region(&self, node: NodeId, placement: RegionPlacement) -> NodeId {
		if let Some(region) = self.find_region(node) {
			return region;
		}
		let region = self.insert_child(node, "div", placement);
		self.add_class(region, "messages");
		region
	}

	fn clear_children(&self, node: NodeId) {
		let mut nodes = self.nodes.borrow_mut();
		let children = nodes
			.get_mut(node.raw())
			.map(|n| std::mem::take(&mut n.children))
			.unwrap_or_default();
		for child in children {
			if let Some(c) = nodes.get_mut(child.raw()) {
				c.parent = None;
			}
		}
	}

	fn append_paragraph(&self, node: NodeId, text: &str) {
		let paragraph = self.create_element(node, "p");
		self.with_node_mut(paragraph, |n| n.text = Some(text.to_string()));
	}

	fn listen(&self, node: NodeId, kinds: &[EventKind], handler: DomHandler) -> ListenerId {
		let id = self.next_listener_id();
		let mut listeners = self.listeners.borrow_mut();
		for kind in kinds {
			listeners.push((id, node, *kind, handler.clone()));
		}
		id
	}

	fn on_submit(&self, handler: DomHandler) -> ListenerId {
		let id = self.next_listener_id();
		self.submit_handlers.borrow_mut().push((id, handler));
		id
	}

	fn unlisten(&self, listener: ListenerId) -> bool {
		let mut listeners = self.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|(id, _, _, _)| *id != listener);
		if listeners.len() != before {
			return true;
		}
		drop(listeners);

		let mut submit_handlers = self.submit_handlers.borrow_mut();
		let before = submit_handlers.len();
		submit_handlers.retain(|(id, _)| *id != listener);
		submit_handlers.len() != before
	}

	fn reset(&self) {
		for node in self.nodes.borrow_mut().iter_mut() {
			node.value = node.default_value.clone();
			node.checked = node.default_checked;
		}
	}

	fn template_of(&self, container: NodeId) -> Option<String> {
		self.descendants(container)
			.into_iter()
			.find(|node| self.tag(*node).as_deref() == Some("span"))
			.and_then(|span| self.attribute(span, "data-template"))
	}

	fn append_markup(&self, container: NodeId, markup: &str) {
		let node = self.create_element(container, MARKUP_TAG);
		self.with_node_mut(node, |n| n.text = Some(markup.to_string()));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::rc::Rc;

	#[fixture]
	fn doc() -> MemoryDocument {
		MemoryDocument::new()
	}

	#[rstest]
	fn test_controls_named_in_document_order(doc: MemoryDocument) {
		let fieldset = doc.add_fieldset(doc.root());
		let first = doc.add_checkable(fieldset, "color", "radio", "red", false);
		let other = doc.add_input(doc.root(), "name", "text", "");
		let second = doc.add_checkable(fieldset, "color", "radio", "blue", true);

		assert_eq!(doc.controls_named("color"), vec![first, second]);
		assert_eq!(doc.controls_named("name"), vec![other]);
		assert!(doc.controls_named("missing").is_empty());
	}

	#[rstest]
	fn test_render_target_requires_wrapper(doc: MemoryDocument) {
		let wrapper = doc.add_wrapper(doc.root());
		let wrapped = doc.add_input(wrapper, "a", "text", "");
		let bare = doc.add_input(doc.root(), "b", "text", "");
		let plain_div = doc.create_element(doc.root(), "div");
		let in_div = doc.add_input(plain_div, "c", "text", "");

		assert_eq!(doc.render_target(wrapped), Some(wrapper));
		assert_eq!(doc.render_target(bare), None);
		assert_eq!(doc.render_target(in_div), None);
	}

	#[rstest]
	fn test_message_region_placement(doc: MemoryDocument) {
		let wrapper = doc.add_wrapper(doc.root());
		let input = doc.add_input(wrapper, "a", "text", "");

		let appended = doc.message_region(wrapper, RegionPlacement::Append);
		assert_eq!(doc.children(wrapper), vec![input, appended]);
		assert_eq!(doc.message_region(wrapper, RegionPlacement::Append), appended);

		let prepended = doc.message_region(doc.root(), RegionPlacement::Prepend);
		assert_eq!(doc.children(doc.root())[0], prepended);
	}

	#[rstest]
	fn test_paragraphs_and_clear(doc: MemoryDocument) {
		let region = doc.message_region(doc.root(), RegionPlacement::Prepend);
		doc.append_paragraph(region, "one");
		doc.append_paragraph(region, "two");
		assert_eq!(doc.messages_in(doc.root()), vec!["one", "two"]);

		doc.clear_children(region);
		assert!(doc.messages_in(doc.root()).is_empty());
		assert!(doc.has_message_region(doc.root()));
	}

	#[rstest]
	fn test_reset_restores_initial_state(doc: MemoryDocument) {
		let input = doc.add_input(doc.root(), "name", "text", "initial");
		let check = doc.add_checkable(doc.root(), "agree", "checkbox", "yes", true);

		doc.change(input, "changed");
		doc.click_checkable(check, false);
		doc.reset();

		assert_eq!(doc.value(input), "initial");
		assert!(doc.is_checked(check));
	}

	#[rstest]
	fn test_radio_click_unchecks_group(doc: MemoryDocument) {
		let red = doc.add_checkable(doc.root(), "color", "radio", "red", true);
		let blue = doc.add_checkable(doc.root(), "color", "radio", "blue", false);

		doc.click_checkable(blue, true);

		assert!(!doc.is_checked(red));
		assert!(doc.is_checked(blue));
	}

	#[rstest]
	fn test_dispatch_reaches_matching_listeners(doc: MemoryDocument) {
		let input = doc.add_input(doc.root(), "name", "text", "");
		let seen = Rc::new(RefCell::new(Vec::new()));
		{
			let seen = Rc::clone(&seen);
			doc.listen(
				input,
				&[EventKind::Change, EventKind::Blur],
				Rc::new(move |event: &DomEvent| seen.borrow_mut().push(event.event_type().to_string())),
			);
		}

		doc.dispatch(input, EventKind::Focus);
		doc.change(input, "x");
		doc.dispatch(input, EventKind::Blur);

		assert_eq!(*seen.borrow(), vec!["change", "blur"]);
		assert_eq!(doc.listener_count(input), 2);
	}

	#[rstest]
	fn test_submit_counts_unprevented(doc: MemoryDocument) {
		doc.submit();
		assert_eq!(doc.native_submissions(), 1);

		doc.on_submit(Rc::new(|event: &DomEvent| event.prevent_default()));
		let event = doc.submit();

		assert!(event.is_default_prevented());
		assert_eq!(doc.native_submissions(), 1);
	}

	#[rstest]
	fn test_unlisten_removes_every_kind(doc: MemoryDocument) {
		let input = doc.add_input(doc.root(), "name", "text", "");
		let kept = doc.listen(input, &[EventKind::Focus], Rc::new(|_: &DomEvent| {}));
		let removed = doc.listen(
			input,
			&[EventKind::Change, EventKind::Blur],
			Rc::new(|_: &DomEvent| {}),
		);
		let submit = doc.on_submit(Rc::new(|event: &DomEvent| event.prevent_default()));

		assert!(doc.unlisten(removed));
		assert!(doc.unlisten(submit));
		assert!(!doc.unlisten(removed));

		assert_ne!(kept, removed);
		assert_eq!(doc.listener_count(input), 1);
		assert_eq!(doc.submit_listener_count(), 0);
		assert!(!doc.submit().is_default_prevented());
	}

	#[rstest]
	fn test_template_and_markup(doc: MemoryDocument) {
		let fieldset = doc.add_fieldset(doc.root());
		doc.add_template(fieldset, "<input name=\"items[__index__]\">");

		assert_eq!(
			doc.template_of(fieldset),
			Some("<input name=\"items[__index__]\">".to_string())
		);
		assert_eq!(doc.template_of(doc.root()), doc.template_of(fieldset));

		doc.append_markup(fieldset, "<p>a</p>");
		assert_eq!(doc.markup_in(fieldset), vec!["<p>a</p>"]);
	}
}
