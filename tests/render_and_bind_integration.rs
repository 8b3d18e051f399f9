//! End-to-end tests: server-rendered descriptions bound to a document
//!
//! A form definition is rendered to JSON, parsed back as client parameters
//! and bound to an in-memory document.

#![cfg(feature = "render")]

use formbind::binding::dom::{FormDom, MemoryDocument, NodeId};
use formbind::binding::model::InMemoryModel;
use formbind::binding::notice::CollectingNotifier;
use formbind::render::{
	ElementDefinition, FieldsetDefinition, FormDefinition, InputFilterSpec, InputSpec,
	render_to_string, render_value,
};
use formbind::{FieldValue, Form, FormParams, Registry};
use rstest::*;
use serde_json::{Map, Value, json};
use std::rc::Rc;

struct Order {
	doc: Rc<MemoryDocument>,
	form: Form,
	customer: NodeId,
	quantity: NodeId,
	street: NodeId,
}

fn definition() -> FormDefinition {
	FormDefinition::new("order")
		.attribute("method", "post")
		.element(ElementDefinition::new("customer").label("Customer"))
		.element(ElementDefinition::new("quantity").with_type("number"))
		.fieldset(FieldsetDefinition::new("shipping").element(ElementDefinition::new("street")))
}

fn input_filter() -> InputFilterSpec {
	InputFilterSpec::new()
		.input(
			"customer",
			InputSpec::new()
				.required(true)
				.filter("stringTrim", json!({}))
				.validator("notEmpty", json!({"message": "Customer is required"})),
		)
		.input(
			"quantity",
			InputSpec::new()
				.filter("int", json!({}))
				.validator("stringLength", json!({"min": 1, "max": 3})),
		)
}

#[fixture]
fn order() -> Order {
	let json = render_to_string(&definition(), Some(&input_filter())).unwrap();
	let params = FormParams::from_json_str(&json).unwrap();

	let doc = Rc::new(MemoryDocument::new());
	let customer_wrapper = doc.add_wrapper(doc.root());
	let customer = doc.add_input(customer_wrapper, "customer", "text", "");
	let quantity_wrapper = doc.add_wrapper(doc.root());
	let quantity = doc.add_input(quantity_wrapper, "quantity", "number", "");
	let shipping = doc.add_fieldset(doc.root());
	let street = doc.add_input(shipping, "street", "text", "");

	let form = Form::new(doc.clone(), params, &Registry::with_defaults());
	Order {
		doc,
		form,
		customer,
		quantity,
		street,
	}
}

#[rstest]
fn test_rendered_description_builds_every_element(order: Order) {
	let keys: Vec<_> = order.form.elements().map(|(key, _)| key).collect();

	assert_eq!(keys, vec!["customer", "quantity", "street"]);
	assert_eq!(order.form.element("customer").unwrap().validator_count(), 1);
	assert_eq!(order.form.element("street").unwrap().validator_count(), 0);
}

#[rstest]
fn test_value_path_keeps_declaration_order() {
	let definition = FormDefinition::new("survey")
		.element(ElementDefinition::new("zeta"))
		.fieldset(FieldsetDefinition::new("details").element(ElementDefinition::new("alpha")))
		.element(ElementDefinition::new("mid"));
	let description = render_value(&definition, None).unwrap();

	let params = FormParams::from_value(description).unwrap();
	let doc = Rc::new(MemoryDocument::new());
	let form = Form::new(doc, params, &Registry::with_defaults());

	let keys: Vec<_> = form.elements().map(|(key, _)| key).collect();
	let values: Vec<_> = form.get_values().keys().cloned().collect();
	assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
	assert_eq!(values, vec!["zeta", "alpha", "mid"]);
}

#[rstest]
fn test_rendered_pipelines_filter_and_validate(order: Order) {
	order.doc.change(order.customer, "  Ada  ");
	order.doc.change(order.quantity, "12 crates");
	order.doc.change(order.street, "Main St");

	let values = order.form.get_values();

	assert_eq!(values["customer"], FieldValue::from("Ada"));
	assert_eq!(values["quantity"], FieldValue::from("12"));
	assert!(order.form.validate());
}

#[rstest]
fn test_rendered_messages_reach_the_document(order: Order) {
	let event = order.doc.submit();

	assert!(event.is_default_prevented());
	let wrapper = order.doc.render_target(order.customer).unwrap();
	assert_eq!(order.doc.messages_in(wrapper), vec!["Customer is required"]);
}

#[rstest]
fn test_model_round_trip_through_rendered_form(order: Order) {
	let record: Map<String, Value> = match json!({"customer": " Grace ", "quantity": 7, "street": "Elm"}) {
		Value::Object(map) => map,
		_ => unreachable!(),
	};
	let model = Rc::new(InMemoryModel::new(record).with_label("order"));
	let notifier = Rc::new(CollectingNotifier::new());
	order.form.set_notifier(notifier.clone());
	order.form.bind_model(model.clone());

	assert_eq!(order.doc.value(order.customer), "Grace");
	assert_eq!(order.doc.value(order.quantity), "7");

	order.doc.submit();

	assert_eq!(model.saved().len(), 1);
	assert_eq!(notifier.notices()[0].text, "Successfully created order");
	assert_eq!(order.doc.value(order.street), "");
}
