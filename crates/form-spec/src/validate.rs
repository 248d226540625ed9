use std::collections::BTreeMap;

use serde_json::Value;

use crate::answers::{ResponseSet, ValidationReport, is_empty_answer};
use crate::schema::SchemaRegistry;
use crate::spec::{FormSpec, QuestionSpec};
use crate::visibility::visible_questions;

/// Validates with the built-in English registry.
pub fn validate(spec: &FormSpec, responses: &ResponseSet) -> ValidationReport {
    validate_with(spec, responses, &SchemaRegistry::default())
}

/// Validates every visible question. Hidden questions never report errors.
pub fn validate_with(
    spec: &FormSpec,
    responses: &ResponseSet,
    registry: &SchemaRegistry,
) -> ValidationReport {
    let mut errors = BTreeMap::new();

    for question in visible_questions(spec, responses) {
        if let Some(message) = check_question(question, responses, registry) {
            errors.entry(question.code.clone()).or_insert(message);
        }
    }

    ValidationReport::from_errors(errors)
}

fn check_question(
    question: &QuestionSpec,
    responses: &ResponseSet,
    registry: &SchemaRegistry,
) -> Option<String> {
    let value = responses.get(&question.code);
    if question.required && value.is_none_or(is_empty_answer) {
        return Some(registry.locale().required.clone());
    }

    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.is_empty() => None,
        // An optional empty list still reaches the type check.
        Some(value) => registry.validator_for(question.kind).check(value).err(),
    }
}
