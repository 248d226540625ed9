use log::warn;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use form_spec::{
    FormSpec, Locale, RenderPayload, ResponseSet, SchemaRegistry, build_render_payload, inspect,
    next_question, render_json_ui as form_render_json_ui, render_text as form_render_text,
    resolve_visibility, response_schema, summarize, validate_with,
    visible_questions as form_visible_questions,
};

const DEFAULT_FORM: &str = include_str!("../../form-spec/tests/fixtures/simple_form.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse form: {0}")]
    FormParse(#[source] serde_json::Error),
    #[error("form '{0}' is not available")]
    FormUnavailable(String),
    #[error("unknown locale '{0}'")]
    UnknownLocale(String),
    #[error("failed to parse responses: {0}")]
    ResponsesParse(#[source] serde_json::Error),
    #[error("responses must be a JSON object")]
    ResponsesShape,
    #[error("question '{0}' does not exist")]
    UnknownQuestion(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocaleConfig {
    Preset(String),
    Custom(Locale),
}

#[derive(Debug, Deserialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_json: Option<String>,
    #[serde(default)]
    locale: Option<LocaleConfig>,
}

/// A form plus the registry configured for it.
struct Loaded {
    spec: FormSpec,
    registry: SchemaRegistry,
}

fn load_config(config_json: &str) -> Result<ComponentConfig, ComponentError> {
    if config_json.trim().is_empty() {
        Ok(ComponentConfig::default())
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
    }
}

fn build_registry(locale: Option<LocaleConfig>) -> Result<SchemaRegistry, ComponentError> {
    let locale = match locale {
        None => Locale::default(),
        Some(LocaleConfig::Preset(tag)) => {
            Locale::preset(&tag).ok_or(ComponentError::UnknownLocale(tag))?
        }
        Some(LocaleConfig::Custom(locale)) => locale,
    };
    Ok(SchemaRegistry::new(locale))
}

fn ensure_form(form_id: &str, config_json: &str) -> Result<Loaded, ComponentError> {
    let config = load_config(config_json)?;
    let form_json = config.form_json.as_deref().unwrap_or(DEFAULT_FORM);
    let spec: FormSpec = serde_json::from_str(form_json).map_err(ComponentError::FormParse)?;
    if spec.id != form_id {
        return Err(ComponentError::FormUnavailable(form_id.to_string()));
    }
    let registry = build_registry(config.locale)?;
    Ok(Loaded { spec, registry })
}

fn parse_responses(responses_json: &str) -> Result<ResponseSet, ComponentError> {
    if responses_json.trim().is_empty() {
        return Ok(ResponseSet::new());
    }
    let value: Value =
        serde_json::from_str(responses_json).map_err(ComponentError::ResponsesParse)?;
    ResponseSet::from_value(value).ok_or(ComponentError::ResponsesShape)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn progress_value(spec: &FormSpec, responses: &ResponseSet) -> Value {
    let visible = form_visible_questions(spec, responses);
    let summary = summarize(&visible, responses);
    json!({
        "answered": summary.answered,
        "total": summary.total,
        "ratio": summary.ratio,
    })
}

pub fn describe(form_id: &str, config_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|loaded| {
        serde_json::to_value(loaded.spec).map_err(ComponentError::JsonEncode)
    }))
}

/// Structural warnings and record issues for the configured form.
pub fn check_form(form_id: &str, config_json: &str) -> String {
    respond(ensure_form(form_id, config_json).map(|loaded| {
        let warnings = inspect(&loaded.spec);
        for warning in &warnings {
            warn!("form '{}': {}", loaded.spec.id, warning);
        }
        let messages = warnings
            .iter()
            .map(|warning| Value::String(warning.to_string()))
            .collect::<Vec<_>>();
        json!({
            "warnings": warnings,
            "messages": messages,
            "record_issues": loaded.spec.check_records(),
        })
    }))
}

pub fn get_response_schema(form_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|loaded| {
        let responses = parse_responses(responses_json)?;
        let visibility = resolve_visibility(&loaded.spec, &responses);
        Ok(response_schema(&loaded.spec, &visibility, &loaded.registry))
    }))
}

pub fn visible_questions(form_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|loaded| {
        let responses = parse_responses(responses_json)?;
        let visible = form_visible_questions(&loaded.spec, &responses);
        let codes = visible
            .iter()
            .map(|question| Value::String(question.code.clone()))
            .collect::<Vec<_>>();
        let questions = serde_json::to_value(&visible).map_err(ComponentError::JsonEncode)?;
        Ok(json!({ "visible": codes, "questions": questions }))
    }))
}

pub fn validate_responses(form_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|loaded| {
        let responses = parse_responses(responses_json)?;
        let report = validate_with(&loaded.spec, &responses, &loaded.registry);
        serde_json::to_value(report).map_err(ComponentError::JsonEncode)
    }))
}

pub fn progress(form_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|loaded| {
        let responses = parse_responses(responses_json)?;
        Ok(progress_value(&loaded.spec, &responses))
    }))
}

pub fn next(form_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|loaded| {
        let responses = parse_responses(responses_json)?;
        let next_q = next_question(&loaded.spec, &responses).map(|question| question.code.clone());
        Ok(json!({
            "status": if next_q.is_some() { "need_input" } else { "complete" },
            "next_question_code": next_q,
            "progress": progress_value(&loaded.spec, &responses),
        }))
    }))
}

fn render_payload(
    form_id: &str,
    config_json: &str,
    responses_json: &str,
) -> Result<RenderPayload, ComponentError> {
    let loaded = ensure_form(form_id, config_json)?;
    let responses = parse_responses(responses_json)?;
    Ok(build_render_payload(&loaded.spec, &responses, &loaded.registry))
}

pub fn render_text(form_id: &str, config_json: &str, responses_json: &str) -> String {
    respond_string(
        render_payload(form_id, config_json, responses_json)
            .map(|payload| form_render_text(&payload)),
    )
}

pub fn render_json_ui(form_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(
        render_payload(form_id, config_json, responses_json)
            .map(|payload| form_render_json_ui(&payload)),
    )
}

/// Sets one answer and reports whether that answer is acceptable.
///
/// Errors on other questions (for instance required ones not reached yet) do
/// not block the patch; `submit_all` checks the whole form.
pub fn submit_patch(
    form_id: &str,
    config_json: &str,
    responses_json: &str,
    question_code: &str,
    value_json: &str,
) -> String {
    respond(ensure_form(form_id, config_json).and_then(|loaded| {
        if loaded.spec.question_by_code(question_code).is_none() {
            return Err(ComponentError::UnknownQuestion(question_code.to_string()));
        }
        let value: Value =
            serde_json::from_str(value_json).map_err(ComponentError::ResponsesParse)?;
        let mut responses = parse_responses(responses_json)?;
        responses.insert(question_code, value);

        let report = validate_with(&loaded.spec, &responses, &loaded.registry);
        let next_q = next_question(&loaded.spec, &responses).map(|question| question.code.clone());
        let status = if report.error_for(question_code).is_some() {
            "error"
        } else if next_q.is_some() {
            "need_input"
        } else if report.valid {
            "complete"
        } else {
            "error"
        };
        let validation = serde_json::to_value(&report).map_err(ComponentError::JsonEncode)?;

        Ok(json!({
            "status": status,
            "next_question_code": next_q,
            "progress": progress_value(&loaded.spec, &responses),
            "answers": responses.to_value(),
            "validation": validation,
        }))
    }))
}

pub fn submit_all(form_id: &str, config_json: &str, responses_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|loaded| {
        let responses = parse_responses(responses_json)?;
        let report = validate_with(&loaded.spec, &responses, &loaded.registry);
        let validation = serde_json::to_value(&report).map_err(ComponentError::JsonEncode)?;
        Ok(json!({
            "status": if report.valid { "complete" } else { "error" },
            "progress": progress_value(&loaded.spec, &responses),
            "answers": responses.to_value(),
            "validation": validation,
        }))
    }))
}
