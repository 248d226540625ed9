use serde_json::{Value, json};

use form_spec::{
    FormSpec, Locale, ResponseSet, SchemaRegistry, inspect, progress, resolve_visibility,
    response_schema, validate, visible_questions,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "simple_form" => include_str!("../tests/fixtures/simple_form.json"),
        "conditional_form" => include_str!("../tests/fixtures/conditional_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn load(name: &str) -> FormSpec {
    serde_json::from_str(fixture(name)).expect("deserialize")
}

fn responses(value: Value) -> ResponseSet {
    ResponseSet::from_value(value).expect("object")
}

fn visible_codes(spec: &FormSpec, answers: &ResponseSet) -> Vec<String> {
    visible_questions(spec, answers)
        .into_iter()
        .map(|question| question.code.clone())
        .collect()
}

fn name_only_form() -> FormSpec {
    serde_json::from_value(json!({
        "id": "name-form",
        "title": "Name",
        "order": 1,
        "created_at": "2024-01-01T00:00:00Z",
        "questions": [
            { "id": "q1", "form_id": "name-form", "title": "Name", "code": "name",
              "order": 1, "required": true, "type": "free_text" }
        ]
    }))
    .expect("form")
}

#[test]
fn required_text_reports_missing() {
    let spec = name_only_form();
    let report = validate(&spec, &ResponseSet::new());
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.error_for("name"), Some(Locale::english().required.as_str()));
}

#[test]
fn required_text_accepts_answer() {
    let spec = name_only_form();
    let report = validate(&spec, &responses(json!({ "name": "Ana" })));
    assert!(report.valid);
    assert!(report.errors.is_empty());
}

#[test]
fn hidden_required_question_is_not_validated() {
    let spec = load("conditional_form");
    let answers = responses(json!({ "has_pet": "No" }));
    assert_eq!(visible_codes(&spec, &answers), vec!["has_pet", "colors"]);
    assert!(validate(&spec, &answers).valid);

    let answers = responses(json!({ "has_pet": "Yes" }));
    assert_eq!(
        visible_codes(&spec, &answers),
        vec!["has_pet", "pet_count", "colors", "budget"]
    );
    let report = validate(&spec, &answers);
    assert_eq!(report.errors.keys().collect::<Vec<_>>(), vec!["pet_count"]);
}

#[test]
fn multiple_choice_trigger_checks_membership() {
    let spec = load("conditional_form");
    let blue = responses(json!({ "has_pet": "No", "colors": ["Blue"] }));
    assert!(!visible_codes(&spec, &blue).contains(&"why_red".to_string()));

    let red_blue = responses(json!({ "has_pet": "No", "colors": ["Red", "Blue"] }));
    let codes = visible_codes(&spec, &red_blue);
    assert!(codes.contains(&"why_red".to_string()));
    assert!(codes.contains(&"budget".to_string()));

    let scalar = responses(json!({ "has_pet": "No", "colors": "Red" }));
    assert!(!visible_codes(&spec, &scalar).contains(&"why_red".to_string()));
}

#[test]
fn two_decimal_precision() {
    let spec = load("conditional_form");
    let too_precise = responses(json!({ "has_pet": "Yes", "pet_count": 2, "budget": 3.456 }));
    assert_eq!(
        validate(&spec, &too_precise).error_for("budget"),
        Some(Locale::english().two_decimals.as_str())
    );
    let ok = responses(json!({ "has_pet": "Yes", "pet_count": 2, "budget": 3.45 }));
    assert!(validate(&spec, &ok).valid);
}

#[test]
fn wrong_type_reports_type_error_not_required() {
    let spec = load("conditional_form");
    let answers = responses(json!({ "has_pet": "Yes", "pet_count": "three" }));
    assert_eq!(
        validate(&spec, &answers).error_for("pet_count"),
        Some(Locale::english().expected_number.as_str())
    );
}

#[test]
fn validation_is_idempotent() {
    let spec = load("conditional_form");
    let answers = responses(json!({ "has_pet": "Yes", "colors": ["Red"], "budget": 1.001 }));
    assert_eq!(validate(&spec, &answers), validate(&spec, &answers));
}

#[test]
fn progress_matches_visible_answers() {
    let spec = load("conditional_form");
    let answers = responses(json!({ "has_pet": "Yes", "pet_count": 1, "colors": [] }));
    let visible = visible_questions(&spec, &answers);
    assert_eq!(visible.len(), 4);
    assert_eq!(progress(&visible, &answers), 0.5);

    let answers = responses(json!({ "has_pet": "No", "colors": ["Blue"] }));
    let visible = visible_questions(&spec, &answers);
    assert_eq!(progress(&visible, &answers), 1.0);
}

#[test]
fn schema_lists_visible_required_questions() {
    let spec = load("conditional_form");
    let answers = responses(json!({ "has_pet": "No" }));
    let visibility = resolve_visibility(&spec, &answers);
    let schema = response_schema(&spec, &visibility, &SchemaRegistry::default());
    let props = schema["properties"].as_object().expect("properties");
    assert!(props.contains_key("has_pet"));
    assert!(props.contains_key("colors"));
    assert!(!props.contains_key("pet_count"));
    assert_eq!(schema["required"], json!(["has_pet"]));
    assert_eq!(props["colors"]["type"], "array");
}

#[test]
fn fixtures_are_consistent() {
    assert!(inspect(&load("simple_form")).is_empty());
    assert!(inspect(&load("conditional_form")).is_empty());
    assert!(load("conditional_form").check_records().is_empty());
}
