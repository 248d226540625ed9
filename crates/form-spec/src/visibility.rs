use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use crate::answers::ResponseSet;
use crate::spec::{ChoiceOption, ConditionalRule, FormSpec, QuestionSpec, QuestionType};

/// Visibility keyed by question code.
///
/// Codes are assumed unique within a form. When two questions share a code the
/// later one overwrites the earlier; `inspect` reports such forms as
/// `DuplicateCode`.
pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// An option together with the question its back-reference points at.
#[derive(Debug, Clone, Copy)]
pub struct Trigger<'a> {
    pub option: &'a ChoiceOption,
    pub owner: &'a QuestionSpec,
}

/// Id lookups over one form, built once per evaluation pass.
#[derive(Debug)]
pub struct FormIndex<'a> {
    options: HashMap<&'a str, (&'a ChoiceOption, &'a QuestionSpec)>,
    questions: HashMap<&'a str, &'a QuestionSpec>,
}

impl<'a> FormIndex<'a> {
    pub fn new(spec: &'a FormSpec) -> Self {
        let mut options = HashMap::new();
        let mut questions = HashMap::new();
        for question in &spec.questions {
            questions.entry(question.id.as_str()).or_insert(question);
            for option in &question.options {
                options
                    .entry(option.id.as_str())
                    .or_insert((option, question));
            }
        }
        Self { options, questions }
    }

    pub fn question(&self, id: &str) -> Option<&'a QuestionSpec> {
        self.questions.get(id).copied()
    }

    pub fn option(&self, id: &str) -> Option<&'a ChoiceOption> {
        self.options.get(id).map(|(option, _)| *option)
    }

    /// Question whose option list holds `option_id`.
    pub fn listed_under(&self, option_id: &str) -> Option<&'a QuestionSpec> {
        self.options.get(option_id).map(|(_, question)| *question)
    }

    /// Resolves a rule through the option's own back-reference.
    pub fn trigger(&self, rule: &ConditionalRule) -> Option<Trigger<'a>> {
        let option = self.option(&rule.option_id)?;
        let owner = self.question(&option.question_id)?;
        Some(Trigger { option, owner })
    }
}

/// Whether the rule's target option is currently selected.
pub fn rule_satisfied(
    index: &FormIndex<'_>,
    rule: &ConditionalRule,
    responses: &ResponseSet,
) -> bool {
    let Some(trigger) = index.trigger(rule) else {
        debug!(
            "conditional rule '{}' targets unresolved option '{}'",
            rule.id, rule.option_id
        );
        return false;
    };

    let expected = trigger.option.text.as_str();
    let response = responses.get(&trigger.owner.code);
    match trigger.owner.kind {
        QuestionType::MultipleChoice => response
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(expected))),
        _ => response.and_then(Value::as_str) == Some(expected),
    }
}

/// A question with no rules is always shown; otherwise any satisfied rule shows it.
pub fn is_visible(index: &FormIndex<'_>, question: &QuestionSpec, responses: &ResponseSet) -> bool {
    question.rules.is_empty()
        || question
            .rules
            .iter()
            .any(|rule| rule_satisfied(index, rule, responses))
}

/// Visible questions in ordinal order.
pub fn visible_questions<'a>(spec: &'a FormSpec, responses: &ResponseSet) -> Vec<&'a QuestionSpec> {
    let index = FormIndex::new(spec);
    spec.ordered_questions()
        .into_iter()
        .filter(|question| is_visible(&index, question, responses))
        .collect()
}

pub fn resolve_visibility(spec: &FormSpec, responses: &ResponseSet) -> VisibilityMap {
    let index = FormIndex::new(spec);
    spec.questions
        .iter()
        .map(|question| {
            (
                question.code.clone(),
                is_visible(&index, question, responses),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gated_form() -> FormSpec {
        serde_json::from_value(json!({
            "id": "f1",
            "title": "Gated",
            "order": 1,
            "created_at": "2024-01-01T00:00:00Z",
            "questions": [
                {
                    "id": "qb", "form_id": "f1", "title": "B", "code": "b", "order": 2,
                    "type": "free_text", "required": true,
                    "rules": [ { "id": "r1", "option_id": "a-yes", "question_id": "qa" } ]
                },
                {
                    "id": "qa", "form_id": "f1", "title": "A", "code": "a", "order": 1,
                    "type": "single_choice",
                    "options": [
                        { "id": "a-yes", "question_id": "qa", "text": "Yes", "order": 1 },
                        { "id": "a-no", "question_id": "qa", "text": "No", "order": 2 }
                    ]
                }
            ]
        }))
        .expect("form")
    }

    fn responses(value: Value) -> ResponseSet {
        ResponseSet::from_value(value).expect("object")
    }

    fn codes(questions: &[&QuestionSpec]) -> Vec<String> {
        questions.iter().map(|question| question.code.clone()).collect()
    }

    #[test]
    fn single_choice_rule_requires_exact_text() {
        let form = gated_form();
        assert_eq!(
            codes(&visible_questions(&form, &responses(json!({ "a": "Yes" })))),
            vec!["a", "b"]
        );
        assert_eq!(
            codes(&visible_questions(&form, &responses(json!({ "a": "No" })))),
            vec!["a"]
        );
        assert_eq!(
            codes(&visible_questions(&form, &responses(json!({ "a": "yes" })))),
            vec!["a"]
        );
        assert_eq!(
            codes(&visible_questions(&form, &responses(json!({ "a": ["Yes"] })))),
            vec!["a"]
        );
    }

    #[test]
    fn dangling_rule_hides_question() {
        let mut form = gated_form();
        form.questions[0].rules[0].option_id = "missing".into();
        let map = resolve_visibility(&form, &responses(json!({ "a": "Yes" })));
        assert_eq!(map.get("b"), Some(&false));
        assert_eq!(map.get("a"), Some(&true));
    }

    #[test]
    fn option_with_unknown_owner_never_triggers() {
        let mut form = gated_form();
        form.questions[1].options[0].question_id = "gone".into();
        let visible = visible_questions(&form, &responses(json!({ "a": "Yes" })));
        assert_eq!(codes(&visible), vec!["a"]);
    }

    #[test]
    fn any_rule_is_enough() {
        let mut form = gated_form();
        form.questions[0].rules.push(ConditionalRule {
            id: "r2".into(),
            option_id: "a-no".into(),
            question_id: "qa".into(),
        });
        for answer in ["Yes", "No"] {
            let visible = visible_questions(&form, &responses(json!({ "a": answer })));
            assert_eq!(codes(&visible), vec!["a", "b"]);
        }
        assert_eq!(
            codes(&visible_questions(&form, &ResponseSet::new())),
            vec!["a"]
        );
    }
}
