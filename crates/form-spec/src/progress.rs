use serde::{Deserialize, Serialize};

use crate::answers::ResponseSet;
use crate::spec::{FormSpec, QuestionSpec};
use crate::visibility::visible_questions;

/// Answered versus visible counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub answered: usize,
    pub total: usize,
    pub ratio: f64,
}

/// Fraction of visible questions holding a non-empty answer. Zero when none are visible.
pub fn progress(visible: &[&QuestionSpec], responses: &ResponseSet) -> f64 {
    summarize(visible, responses).ratio
}

pub fn summarize(visible: &[&QuestionSpec], responses: &ResponseSet) -> ProgressSummary {
    let total = visible.len();
    let answered = visible
        .iter()
        .filter(|question| responses.is_answered(&question.code))
        .count();
    let ratio = if total == 0 {
        0.0
    } else {
        answered as f64 / total as f64
    };
    ProgressSummary {
        answered,
        total,
        ratio,
    }
}

/// First visible question without an answer.
pub fn next_question<'a>(spec: &'a FormSpec, responses: &ResponseSet) -> Option<&'a QuestionSpec> {
    visible_questions(spec, responses)
        .into_iter()
        .find(|question| !responses.is_answered(&question.code))
}
