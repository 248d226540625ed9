use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Answers keyed by question code.
///
/// Values keep whatever JSON shape the respondent produced; validators decide
/// whether that shape fits the question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet {
    answers: Map<String, Value>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a response set from a JSON object. Any other value yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(answers) => Some(Self { answers }),
            _ => None,
        }
    }

    pub fn get(&self, code: &str) -> Option<&Value> {
        self.answers.get(code)
    }

    pub fn insert(&mut self, code: impl Into<String>, value: Value) -> Option<Value> {
        self.answers.insert(code.into(), value)
    }

    pub fn remove(&mut self, code: &str) -> Option<Value> {
        self.answers.remove(code)
    }

    pub fn with(mut self, code: impl Into<String>, value: Value) -> Self {
        self.insert(code, value);
        self
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.answers.iter()
    }

    /// True when `code` holds something other than an empty answer.
    pub fn is_answered(&self, code: &str) -> bool {
        self.get(code).is_some_and(|value| !is_empty_answer(value))
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.answers.clone())
    }
}

impl From<Map<String, Value>> for ResponseSet {
    fn from(answers: Map<String, Value>) -> Self {
        Self { answers }
    }
}

/// Null, the empty string and the empty list all mean "not answered".
pub fn is_empty_answer(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Outcome of validating a response set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// One message per failing question code.
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error_for(&self, code: &str) -> Option<&str> {
        self.errors.get(code).map(String::as_str)
    }
}

/// A stored response set for one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub form_id: String,
    pub responses: ResponseSet,
    pub submitted_at: String,
}
