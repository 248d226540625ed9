use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One selectable value of a choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceOption {
    pub id: String,
    /// Back-reference to the owning question.
    pub question_id: String,
    /// Literal compared against submitted answers and rule targets.
    pub text: String,
    pub order: u32,
    /// Free-form elaboration flag. Stored, not enforced.
    #[serde(default)]
    pub open_answer: bool,
}

/// Shows the owning question when `option_id` is selected elsewhere in the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConditionalRule {
    pub id: String,
    pub option_id: String,
    /// Copy of the target option's owner. Checked by `inspect`, never trusted for evaluation.
    pub question_id: String,
}
