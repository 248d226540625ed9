use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::choice::{ChoiceOption, ConditionalRule};

/// Supported answer kinds.
///
/// Tags that do not match a known kind deserialize into [`QuestionType::Unknown`],
/// which the schema registry accepts without checking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    FreeText,
    YesNo,
    SingleChoice,
    MultipleChoice,
    Integer,
    TwoDecimal,
    #[serde(other)]
    Unknown,
}

impl QuestionType {
    pub const ALL: [QuestionType; 6] = [
        QuestionType::FreeText,
        QuestionType::YesNo,
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
        QuestionType::Integer,
        QuestionType::TwoDecimal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::FreeText => "free_text",
            QuestionType::YesNo => "yes_no",
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Integer => "integer",
            QuestionType::TwoDecimal => "two_decimal",
            QuestionType::Unknown => "unknown",
        }
    }

    /// Whether answers are picked from the question's options.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::MultipleChoice
        )
    }
}

/// A single prompt inside a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: String,
    pub form_id: String,
    pub title: String,
    /// Machine-safe key used in response sets.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub order: u32,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Marks a question authored as a follow-up. Carried through, never evaluated.
    #[serde(default)]
    pub sub_question: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ConditionalRule>,
}

impl QuestionSpec {
    /// Options sorted by their ordinal, ties kept in declaration order.
    pub fn ordered_options(&self) -> Vec<&ChoiceOption> {
        let mut options: Vec<_> = self.options.iter().collect();
        options.sort_by_key(|option| option.order);
        options
    }

    pub fn is_conditional(&self) -> bool {
        !self.rules.is_empty()
    }
}
