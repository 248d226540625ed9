//! Value contracts per question type.
//!
//! The [`SchemaRegistry`] maps every [`QuestionType`] to one [`AnswerValidator`].
//! Types without a registration fall back to accepting any value so a single
//! malformed question cannot block submission of the rest of the form.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value, json};

use crate::locale::Locale;
use crate::spec::{FormSpec, QuestionType};
use crate::visibility::VisibilityMap;

const DECIMAL_TOLERANCE: f64 = 1e-9;

/// Shape of an accepted answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueShape {
    Text,
    /// One of two fixed literals.
    Literal { yes: String, no: String },
    Choice,
    ChoiceSet,
    Integer,
    Decimal { places: u32 },
    Any,
}

impl ValueShape {
    /// JSON Schema fragment describing the shape.
    pub fn json_schema(&self) -> Value {
        match self {
            ValueShape::Text | ValueShape::Choice => json!({ "type": "string", "minLength": 1 }),
            ValueShape::Literal { yes, no } => json!({ "type": "string", "enum": [yes, no] }),
            ValueShape::ChoiceSet => json!({
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1
            }),
            ValueShape::Integer => json!({ "type": "integer" }),
            ValueShape::Decimal { places } => {
                let step = 10f64.powi(-(*places as i32));
                json!({ "type": "number", "multipleOf": step })
            }
            ValueShape::Any => json!({}),
        }
    }
}

/// Checks one answer value.
pub trait AnswerValidator: Send + Sync {
    fn shape(&self) -> ValueShape;

    /// `Err` carries the user-facing message. Must not panic on any input shape.
    fn check(&self, value: &Value) -> Result<(), String>;
}

struct TextValidator {
    expected: String,
    empty: String,
}

impl AnswerValidator for TextValidator {
    fn shape(&self) -> ValueShape {
        ValueShape::Text
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        match value.as_str() {
            Some("") => Err(self.empty.clone()),
            Some(_) => Ok(()),
            None => Err(self.expected.clone()),
        }
    }
}

struct YesNoValidator {
    yes: String,
    no: String,
    message: String,
}

impl AnswerValidator for YesNoValidator {
    fn shape(&self) -> ValueShape {
        ValueShape::Literal {
            yes: self.yes.clone(),
            no: self.no.clone(),
        }
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        match value.as_str() {
            Some(text) if text == self.yes || text == self.no => Ok(()),
            _ => Err(self.message.clone()),
        }
    }
}

struct ChoiceValidator {
    message: String,
}

impl AnswerValidator for ChoiceValidator {
    fn shape(&self) -> ValueShape {
        ValueShape::Choice
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        match value.as_str() {
            Some(text) if !text.is_empty() => Ok(()),
            _ => Err(self.message.clone()),
        }
    }
}

struct ChoiceSetValidator {
    expected: String,
    empty: String,
}

impl AnswerValidator for ChoiceSetValidator {
    fn shape(&self) -> ValueShape {
        ValueShape::ChoiceSet
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        let Some(items) = value.as_array() else {
            return Err(self.expected.clone());
        };
        if !items.iter().all(Value::is_string) {
            return Err(self.expected.clone());
        }
        if items.is_empty() {
            return Err(self.empty.clone());
        }
        Ok(())
    }
}

struct IntegerValidator {
    expected: String,
    message: String,
}

impl AnswerValidator for IntegerValidator {
    fn shape(&self) -> ValueShape {
        ValueShape::Integer
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        let Value::Number(number) = value else {
            return Err(self.expected.clone());
        };
        if is_integral(number) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }
}

struct DecimalValidator {
    places: u32,
    expected: String,
    message: String,
}

impl AnswerValidator for DecimalValidator {
    fn shape(&self) -> ValueShape {
        ValueShape::Decimal {
            places: self.places,
        }
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        let Some(number) = value.as_f64().filter(|number| number.is_finite()) else {
            return Err(self.expected.clone());
        };
        if on_grid(number, self.places) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }
}

struct AcceptAny;

impl AnswerValidator for AcceptAny {
    fn shape(&self) -> ValueShape {
        ValueShape::Any
    }

    fn check(&self, _value: &Value) -> Result<(), String> {
        Ok(())
    }
}

fn is_integral(number: &Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return true;
    }
    number
        .as_f64()
        .is_some_and(|value| value.is_finite() && value.fract() == 0.0)
}

fn on_grid(value: f64, places: u32) -> bool {
    let scaled = value * 10f64.powi(places as i32);
    (scaled - scaled.round()).abs() <= DECIMAL_TOLERANCE * scaled.abs().max(1.0)
}

/// Lookup table from question type to validator.
pub struct SchemaRegistry {
    locale: Locale,
    validators: BTreeMap<QuestionType, Box<dyn AnswerValidator>>,
    fallback: AcceptAny,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("locale", &self.locale)
            .field(
                "kinds",
                &self
                    .validators
                    .keys()
                    .map(QuestionType::as_str)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SchemaRegistry {
    /// Registry with the built-in validator for every known type.
    pub fn new(locale: Locale) -> Self {
        let mut registry = Self {
            validators: BTreeMap::new(),
            fallback: AcceptAny,
            locale: locale.clone(),
        };
        registry.register(
            QuestionType::FreeText,
            TextValidator {
                expected: locale.expected_text.clone(),
                empty: locale.text_required.clone(),
            },
        );
        registry.register(
            QuestionType::YesNo,
            YesNoValidator {
                yes: locale.yes.clone(),
                no: locale.no.clone(),
                message: locale.yes_no.clone(),
            },
        );
        registry.register(
            QuestionType::SingleChoice,
            ChoiceValidator {
                message: locale.select_option.clone(),
            },
        );
        registry.register(
            QuestionType::MultipleChoice,
            ChoiceSetValidator {
                expected: locale.expected_list.clone(),
                empty: locale.select_at_least_one.clone(),
            },
        );
        registry.register(
            QuestionType::Integer,
            IntegerValidator {
                expected: locale.expected_number.clone(),
                message: locale.integer.clone(),
            },
        );
        registry.register(
            QuestionType::TwoDecimal,
            DecimalValidator {
                places: 2,
                expected: locale.expected_number.clone(),
                message: locale.two_decimals,
            },
        );
        registry
    }

    /// Replaces the validator for `kind`.
    pub fn register(&mut self, kind: QuestionType, validator: impl AnswerValidator + 'static) {
        self.validators.insert(kind, Box::new(validator));
    }

    pub fn validator_for(&self, kind: QuestionType) -> &dyn AnswerValidator {
        match self.validators.get(&kind) {
            Some(validator) => validator.as_ref(),
            None => &self.fallback,
        }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}

/// JSON Schema for a response set, limited to the visible questions.
pub fn response_schema(
    spec: &FormSpec,
    visibility: &VisibilityMap,
    registry: &SchemaRegistry,
) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for question in spec.ordered_questions() {
        if !visibility.get(&question.code).copied().unwrap_or(false) {
            continue;
        }
        let mut schema = registry.validator_for(question.kind).shape().json_schema();
        if let Value::Object(map) = &mut schema {
            map.insert("title".into(), Value::String(question.title.clone()));
            if let Some(help) = &question.help {
                map.insert("description".into(), Value::String(help.clone()));
            }
        }
        properties.insert(question.code.clone(), schema);
        if question.required {
            required.push(Value::String(question.code.clone()));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": spec.title,
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
