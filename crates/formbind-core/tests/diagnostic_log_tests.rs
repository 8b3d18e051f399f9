//! Warnings emitted for recoverable configuration and save problems

use formbind_core::config::{ElementOptions, FormParams, PipelineEntry};
use formbind_core::dom::{FormDom, MemoryDocument};
use formbind_core::model::{InMemoryModel, SaveReply};
use formbind_core::notice::CollectingNotifier;
use formbind_core::{Form, FormElement, Registry};
use rstest::*;
use serde_json::Map;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// A tracing layer that captures log messages to a Vec<String>
struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		struct MessageVisitor {
			message: String,
		}

		impl tracing::field::Visit for MessageVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				}
			}
		}

		let mut visitor = MessageVisitor {
			message: String::new(),
		};
		event.record(&mut visitor);

		let mut logs = self.logs.lock().unwrap();
		logs.push(format!("[{}] {}", event.metadata().level(), visitor.message));
	}
}

fn capture_logs() -> (Arc<Mutex<Vec<String>>>, tracing::subscriber::DefaultGuard) {
	let logs = Arc::new(Mutex::new(Vec::new()));
	let capture = LogCapture { logs: logs.clone() };
	let guard = tracing_subscriber::registry().with(capture).set_default();
	(logs, guard)
}

fn has_warning(logs: &Arc<Mutex<Vec<String>>>, text: &str) -> bool {
	logs.lock()
		.unwrap()
		.iter()
		.any(|log| log.contains("WARN") && log.contains(text))
}

#[rstest]
fn test_unresolved_pipeline_entries_trigger_warning_log() {
	// Arrange
	let (logs, _guard) = capture_logs();
	let doc = Rc::new(MemoryDocument::new());
	let wrapper = doc.add_wrapper(doc.root());
	doc.add_input(wrapper, "nickname", "text", "");
	let mut options = ElementOptions::new("nickname");
	options.filters = vec![PipelineEntry::new("rot13"), PipelineEntry::new("stringTrim")];
	options.validators = vec![PipelineEntry::new("palindrome")];

	// Act
	let element = FormElement::new(options, doc, &Registry::with_defaults());

	// Assert
	assert_eq!(element.filter_count(), 1);
	assert_eq!(element.validator_count(), 0);
	assert!(
		has_warning(&logs, "skipping unresolved filter"),
		"Expected warning for unknown filter, but got: {:?}",
		*logs.lock().unwrap()
	);
	assert!(has_warning(&logs, "skipping unresolved validator"));
}

#[rstest]
fn test_save_failure_without_message_triggers_warning_log() {
	// Arrange
	let (logs, _guard) = capture_logs();
	let doc = Rc::new(MemoryDocument::new());
	let wrapper = doc.add_wrapper(doc.root());
	doc.add_input(wrapper, "title", "text", "");
	let params = FormParams::new().element("title", Default::default());
	let form = Form::new(doc.clone(), params, &Registry::with_defaults());
	let model = Rc::new(InMemoryModel::new(Map::new()).with_label("note"));
	model.reply_with(SaveReply::Fail("<html>502 Bad Gateway</html>".to_string()));
	form.set_notifier(Rc::new(CollectingNotifier::new()));
	form.bind_model(model);

	// Act
	doc.submit();

	// Assert
	assert!(
		has_warning(&logs, "save failed without a structured message"),
		"Expected warning for unstructured save failure, but got: {:?}",
		*logs.lock().unwrap()
	);
}
