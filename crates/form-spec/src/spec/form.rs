use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::QuestionSpec;

const FORM_TITLE_MAX: usize = 200;
const FORM_DESCRIPTION_MAX: usize = 500;
const QUESTION_TITLE_MAX: usize = 300;
const QUESTION_CODE_MAX: usize = 100;
const QUESTION_HELP_MAX: usize = 500;
const OPTION_TEXT_MAX: usize = 200;

/// Top-level form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: u32,
    pub created_at: String,
    #[serde(default)]
    pub response_count: u32,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

/// A record-level problem found by [`FormSpec::check_records`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    /// Identifier of the offending form, question or option.
    pub entity: String,
    pub field: &'static str,
    pub message: String,
}

impl FormSpec {
    /// Questions sorted by ordinal. Equal ordinals keep declaration order.
    pub fn ordered_questions(&self) -> Vec<&QuestionSpec> {
        let mut questions: Vec<_> = self.questions.iter().collect();
        questions.sort_by_key(|question| question.order);
        questions
    }

    pub fn question_by_code(&self, code: &str) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.code == code)
    }

    pub fn question_by_id(&self, id: &str) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// Checks field-level constraints of the stored records.
    ///
    /// Editors call this before persisting; evaluation never does.
    pub fn check_records(&self) -> Vec<RecordIssue> {
        let mut issues = Vec::new();
        check_text(&mut issues, &self.id, "title", &self.title, FORM_TITLE_MAX);
        if let Some(description) = &self.description {
            check_len(
                &mut issues,
                &self.id,
                "description",
                description,
                FORM_DESCRIPTION_MAX,
            );
        }
        check_order(&mut issues, &self.id, self.order);

        for question in &self.questions {
            check_text(
                &mut issues,
                &question.id,
                "title",
                &question.title,
                QUESTION_TITLE_MAX,
            );
            check_text(
                &mut issues,
                &question.id,
                "code",
                &question.code,
                QUESTION_CODE_MAX,
            );
            if let Some(help) = &question.help {
                check_len(&mut issues, &question.id, "help", help, QUESTION_HELP_MAX);
            }
            check_order(&mut issues, &question.id, question.order);
            if question.form_id != self.id {
                issues.push(RecordIssue {
                    entity: question.id.clone(),
                    field: "form_id",
                    message: format!(
                        "belongs to form '{}', not '{}'",
                        question.form_id, self.id
                    ),
                });
            }
            for option in &question.options {
                check_text(
                    &mut issues,
                    &option.id,
                    "text",
                    &option.text,
                    OPTION_TEXT_MAX,
                );
                check_order(&mut issues, &option.id, option.order);
            }
        }

        issues
    }
}

fn check_text(
    issues: &mut Vec<RecordIssue>,
    entity: &str,
    field: &'static str,
    value: &str,
    max: usize,
) {
    if value.is_empty() {
        issues.push(RecordIssue {
            entity: entity.to_string(),
            field,
            message: "must not be empty".into(),
        });
    } else {
        check_len(issues, entity, field, value, max);
    }
}

fn check_len(
    issues: &mut Vec<RecordIssue>,
    entity: &str,
    field: &'static str,
    value: &str,
    max: usize,
) {
    if value.chars().count() > max {
        issues.push(RecordIssue {
            entity: entity.to_string(),
            field,
            message: format!("must be at most {} characters", max),
        });
    }
}

fn check_order(issues: &mut Vec<RecordIssue>, entity: &str, order: u32) {
    if order == 0 {
        issues.push(RecordIssue {
            entity: entity.to_string(),
            field: "order",
            message: "must be a positive number".into(),
        });
    }
}
