use serde_json::json;

use form_spec::{
    FormSpec, ResponseSet, SchemaRegistry,
    render::{RenderStatus, build_render_payload, render_json_ui, render_text},
};

fn fixture(name: &str) -> &'static str {
    match name {
        "simple_form" => include_str!("../tests/fixtures/simple_form.json"),
        "conditional_form" => include_str!("../tests/fixtures/conditional_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn answers(value: serde_json::Value) -> ResponseSet {
    ResponseSet::from_value(value).expect("object")
}

#[test]
fn render_text_includes_next_question() {
    let spec: FormSpec = serde_json::from_str(fixture("simple_form")).expect("deserialize");
    let payload = build_render_payload(&spec, &ResponseSet::new(), &SchemaRegistry::default());

    assert_eq!(payload.status, RenderStatus::NeedInput);
    assert_eq!(payload.next_question_code.as_deref(), Some("name"));

    let text = render_text(&payload);
    assert!(text.contains("Next question: name"));
    assert!(text.contains("Visible questions"));
}

#[test]
fn render_json_ui_exposes_structure() {
    let spec: FormSpec = serde_json::from_str(fixture("conditional_form")).expect("deserialize");
    let payload = build_render_payload(
        &spec,
        &answers(json!({ "has_pet": "No" })),
        &SchemaRegistry::default(),
    );

    let ui = render_json_ui(&payload);
    assert_eq!(ui["form_id"], "pets");
    assert_eq!(ui["progress"]["total"], 2);
    assert_eq!(ui["progress"]["answered"], 1);
    assert_eq!(ui["next_question_code"], "colors");
    let questions = ui["questions"].as_array().expect("questions array");
    assert_eq!(questions.len(), 5);
    let pet_count = questions
        .iter()
        .find(|question| question["code"] == "pet_count")
        .expect("pet_count");
    assert_eq!(pet_count["visible"], false);
    assert_eq!(questions[0]["choices"], json!(["Yes", "No"]));
}

#[test]
fn yes_no_questions_expose_locale_literals() {
    let spec: FormSpec = serde_json::from_str(fixture("simple_form")).expect("deserialize");
    let payload = build_render_payload(&spec, &ResponseSet::new(), &SchemaRegistry::default());
    let newsletter = payload
        .questions
        .iter()
        .find(|question| question.code == "newsletter")
        .expect("newsletter");
    assert_eq!(newsletter.choices, vec!["Yes", "No"]);
}

#[test]
fn answered_but_invalid_form_is_flagged() {
    let spec: FormSpec = serde_json::from_str(fixture("simple_form")).expect("deserialize");
    let payload = build_render_payload(
        &spec,
        &answers(json!({ "name": "Ana", "newsletter": "Maybe" })),
        &SchemaRegistry::default(),
    );
    assert_eq!(payload.status, RenderStatus::Invalid);
    let text = render_text(&payload);
    assert!(text.contains("All visible questions are answered."));
    assert!(text.contains("! Select Yes or No"));
}

#[test]
fn complete_form_reports_complete() {
    let spec: FormSpec = serde_json::from_str(fixture("simple_form")).expect("deserialize");
    let payload = build_render_payload(
        &spec,
        &answers(json!({ "name": "Ana", "newsletter": "No" })),
        &SchemaRegistry::default(),
    );
    assert_eq!(payload.status, RenderStatus::Complete);
    assert_eq!(payload.progress.ratio, 1.0);
}
