//! Model collaborator
//!
//! A [`Model`] is the external record a form is bound to. The form populates
//! itself from the record when binding and on every change notification, and
//! hands submitted values to [`Model::save`], whose completion arrives through
//! a callback that may run immediately or much later.

use crate::event::{EventBus, Subscription};
use crate::value::FormValues;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

/// Key of the structured message in a failed save's response body.
pub const ERROR_MESSAGE_KEY: &str = "error-message";

/// Failed save, carrying the raw response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
	pub body: String,
}

impl SaveFailure {
	pub fn new(body: impl Into<String>) -> Self {
		Self { body: body.into() }
	}

	/// The structured message of the response, if the body is a JSON object
	/// with a non-empty `error-message` string.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_core::model::SaveFailure;
	///
	/// let failure = SaveFailure::new(r#"{"error-message": "Name already taken"}"#);
	/// assert_eq!(failure.error_message().as_deref(), Some("Name already taken"));
	///
	/// assert_eq!(SaveFailure::new("<html>502</html>").error_message(), None);
	/// ```
	pub fn error_message(&self) -> Option<String> {
		let response: Value = serde_json::from_str(&self.body).ok()?;
		response
			.get(ERROR_MESSAGE_KEY)
			.and_then(Value::as_str)
			.filter(|message| !message.is_empty())
			.map(str::to_string)
	}
}

/// Completion callback of [`Model::save`].
pub type SaveCallback = Box<dyn FnOnce(Result<(), SaveFailure>)>;

/// External record a form can be bound to.
pub trait Model {
	/// Serialized state of the record.
	fn to_json(&self) -> Map<String, Value>;

	/// Returns `true` while the record has never been persisted.
	fn is_new(&self) -> bool;

	/// Persist `values`, then call `done` exactly once.
	fn save(&self, values: &FormValues, done: SaveCallback);

	/// Call `handler` whenever the record changes.
	fn on_change(&self, handler: Box<dyn Fn()>) -> Subscription;

	fn off_change(&self, _subscription: Subscription) {}

	/// Name of the record in notices.
	fn label(&self) -> String {
		"record".to_string()
	}
}

/// What [`InMemoryModel::save`] answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReply {
	/// Store the values and succeed immediately.
	Succeed,
	/// Fail immediately with the given response body.
	Fail(String),
	/// Queue the save until [`InMemoryModel::complete_next`].
	Defer,
}

/// Record held in memory, identified by an `id` key once persisted.
pub struct InMemoryModel {
	label: String,
	record: RefCell<Map<String, Value>>,
	reply: RefCell<SaveReply>,
	saved: RefCell<Vec<FormValues>>,
	pending: RefCell<VecDeque<(FormValues, SaveCallback)>>,
	next_id: Cell<u64>,
	changes: EventBus<()>,
}

impl InMemoryModel {
	pub fn new(record: Map<String, Value>) -> Self {
		Self {
			label: "record".to_string(),
			record: RefCell::new(record),
			reply: RefCell::new(SaveReply::Succeed),
			saved: RefCell::new(Vec::new()),
			pending: RefCell::new(VecDeque::new()),
			next_id: Cell::new(1),
			changes: EventBus::new(),
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	pub fn reply_with(&self, reply: SaveReply) {
		*self.reply.borrow_mut() = reply;
	}

	/// Change one attribute and notify listeners.
	pub fn set(&self, key: impl Into<String>, value: Value) {
		self.record.borrow_mut().insert(key.into(), value);
		self.changes.emit(&());
	}

	pub fn get(&self, key: &str) -> Option<Value> {
		self.record.borrow().get(key).cloned()
	}

	/// Every value set handed to `save`, in call order.
	pub fn saved(&self) -> Vec<FormValues> {
		self.saved.borrow().clone()
	}

	pub fn pending_count(&self) -> usize {
		self.pending.borrow().len()
	}

	/// Finish the oldest deferred save. Returns `false` when none is queued.
	pub fn complete_next(&self, result: Result<(), SaveFailure>) -> bool {
		let Some((values, done)) = self.pending.borrow_mut().pop_front() else {
			return false;
		};
		if result.is_ok() {
			self.store(&values);
		}
		done(result);
		true
	}

	fn store(&self, values: &FormValues) {
		let mut record = self.record.borrow_mut();
		for (key, value) in values {
			record.insert(key.clone(), value.to_json());
		}
		if !record.contains_key("id") {
			let id = self.next_id.get();
			self.next_id.set(id + 1);
			record.insert("id".to_string(), Value::from(id));
		}
	}
}

impl Model for InMemoryModel {
	fn to_json(&self) -> Map<String, Value> {
		self.record.borrow().clone()
	}

	fn is_new(&self) -> bool {
		!self.record.borrow().contains_key("id")
	}

	fn save(&self, values: &FormValues, done: SaveCallback) {
		self.saved.borrow_mut().push(values.clone());
		let reply = self.reply.borrow().clone();
		match reply {
			SaveReply::Succeed => {
				self.store(values);
				done(Ok(()));
			}
			SaveReply::Fail(body) => done(Err(SaveFailure { body })),
			SaveReply::Defer => self.pending.borrow_mut().push_back((values.clone(), done)),
		}
	}

	fn on_change(&self, handler: Box<dyn Fn()>) -> Subscription {
		self.changes.subscribe(move |_| handler())
	}

	fn off_change(&self, subscription: Subscription) {
		self.changes.unsubscribe(subscription);
	}

	fn label(&self) -> String {
		self.label.clone()
	}
}

impl fmt::Debug for InMemoryModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InMemoryModel")
			.field("label", &self.label)
			.field("record", &self.record.borrow())
			.field("pending", &self.pending_count())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::FieldValue;
	use rstest::rstest;
	use serde_json::json;
	use std::rc::Rc;

	fn record(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => Map::new(),
		}
	}

	fn values(name: &str) -> FormValues {
		FormValues::from([("name".to_string(), FieldValue::from(name))])
	}

	#[rstest]
	#[case(r#"{"error-message": "taken"}"#, Some("taken"))]
	#[case(r#"{"error-message": ""}"#, None)]
	#[case(r#"{"errors": ["x"]}"#, None)]
	#[case("not json", None)]
	fn test_error_message(#[case] body: &str, #[case] expected: Option<&str>) {
		assert_eq!(SaveFailure::new(body).error_message().as_deref(), expected);
	}

	#[rstest]
	fn test_successful_save_persists() {
		let model = InMemoryModel::new(Map::new());
		let result = Rc::new(RefCell::new(None));
		assert!(model.is_new());

		{
			let result = Rc::clone(&result);
			model.save(&values("Ada"), Box::new(move |r| *result.borrow_mut() = Some(r)));
		}

		assert_eq!(*result.borrow(), Some(Ok(())));
		assert!(!model.is_new());
		assert_eq!(model.get("name"), Some(json!("Ada")));
	}

	#[rstest]
	fn test_deferred_save_waits() {
		let model = InMemoryModel::new(record(json!({"id": 4})));
		model.reply_with(SaveReply::Defer);
		let calls = Rc::new(Cell::new(0));

		{
			let calls = Rc::clone(&calls);
			model.save(&values("Bob"), Box::new(move |_| calls.set(calls.get() + 1)));
		}
		assert_eq!(calls.get(), 0);
		assert_eq!(model.pending_count(), 1);

		assert!(model.complete_next(Err(SaveFailure::new("{}"))));
		assert_eq!(calls.get(), 1);
		assert!(!model.complete_next(Ok(())));
		assert_eq!(model.get("name"), None);
	}

	#[rstest]
	fn test_change_notification() {
		let model = InMemoryModel::new(Map::new());
		let calls = Rc::new(Cell::new(0));
		let subscription = {
			let calls = Rc::clone(&calls);
			model.on_change(Box::new(move || calls.set(calls.get() + 1)))
		};

		model.set("name", json!("x"));
		model.off_change(subscription);
		model.set("name", json!("y"));

		assert_eq!(calls.get(), 1);
	}
}
