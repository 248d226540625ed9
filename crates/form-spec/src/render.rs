use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    answers::ResponseSet,
    progress::{ProgressSummary, next_question, summarize},
    schema::{SchemaRegistry, response_schema},
    spec::{FormSpec, QuestionSpec, QuestionType},
    validate::validate_with,
    visibility::{resolve_visibility, visible_questions},
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    /// More input is required.
    NeedInput,
    /// Every visible question is answered and valid.
    Complete,
    /// Every visible question is answered but some answers fail validation.
    Invalid,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
            RenderStatus::Invalid => "invalid",
        }
    }
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone, Serialize)]
pub struct RenderQuestion {
    pub id: String,
    pub code: String,
    pub title: String,
    pub help: Option<String>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub required: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<Value>,
    /// Option texts in order; the yes/no literals for yes/no questions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub status: RenderStatus,
    pub next_question_code: Option<String>,
    pub progress: ProgressSummary,
    pub help: Option<String>,
    pub questions: Vec<RenderQuestion>,
    pub schema: Value,
}

/// Build the renderer payload from the form and the current responses.
pub fn build_render_payload(
    spec: &FormSpec,
    responses: &ResponseSet,
    registry: &SchemaRegistry,
) -> RenderPayload {
    let visibility = resolve_visibility(spec, responses);
    let visible = visible_questions(spec, responses);
    let progress = summarize(&visible, responses);
    let next_question_code = next_question(spec, responses).map(|question| question.code.clone());
    let report = validate_with(spec, responses, registry);

    let questions = spec
        .ordered_questions()
        .into_iter()
        .map(|question| {
            let visible = visibility.get(&question.code).copied().unwrap_or(false);
            RenderQuestion {
                id: question.id.clone(),
                code: question.code.clone(),
                title: question.title.clone(),
                help: question.help.clone(),
                kind: question.kind,
                required: question.required,
                visible,
                current_value: responses.get(&question.code).cloned(),
                choices: choice_texts(question, registry),
                error: report.error_for(&question.code).map(str::to_string),
            }
        })
        .collect::<Vec<_>>();

    let status = if next_question_code.is_some() {
        RenderStatus::NeedInput
    } else if report.valid {
        RenderStatus::Complete
    } else {
        RenderStatus::Invalid
    };

    RenderPayload {
        form_id: spec.id.clone(),
        form_title: spec.title.clone(),
        status,
        next_question_code,
        progress,
        help: spec.description.clone(),
        questions,
        schema: response_schema(spec, &visibility, registry),
    }
}

fn choice_texts(question: &QuestionSpec, registry: &SchemaRegistry) -> Vec<String> {
    match question.kind {
        QuestionType::YesNo => vec![registry.locale().yes.clone(), registry.locale().no.clone()],
        kind if kind.has_options() => question
            .ordered_options()
            .into_iter()
            .map(|option| option.text.clone())
            .collect(),
        _ => Vec::new(),
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "status": payload.status,
        "next_question_code": payload.next_question_code,
        "progress": payload.progress,
        "help": payload.help,
        "questions": payload.questions,
        "schema": payload.schema,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Status: {} ({}/{}, {:.0}%)",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total,
        payload.progress.ratio * 100.0
    ));
    if let Some(help) = &payload.help {
        lines.push(format!("Help: {}", help));
    }

    if let Some(next_code) = &payload.next_question_code {
        lines.push(format!("Next question: {}", next_code));
        if let Some(question) = payload
            .questions
            .iter()
            .find(|question| &question.code == next_code)
        {
            lines.push(format!("  Title: {}", question.title));
            if let Some(help) = &question.help {
                lines.push(format!("  Help: {}", help));
            }
            if question.required {
                lines.push("  Required: yes".to_string());
            }
            if !question.choices.is_empty() {
                lines.push(format!("  Choices: {}", question.choices.join(", ")));
            }
        }
    } else {
        lines.push("All visible questions are answered.".to_string());
    }

    lines.push("Visible questions:".to_string());
    for question in payload.questions.iter().filter(|question| question.visible) {
        let mut entry = format!(" - {} ({})", question.code, question.title);
        if question.required {
            entry.push_str(" [required]");
        }
        if let Some(current_value) = &question.current_value {
            entry.push_str(&format!(" = {}", value_to_display(current_value)));
        }
        if let Some(error) = &question.error {
            entry.push_str(&format!(" ! {}", error));
        }
        lines.push(entry);
    }

    lines.join("\n")
}

pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_display)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
