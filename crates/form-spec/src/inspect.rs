//! Structural checks over a loaded form.
//!
//! Nothing here is fatal. Evaluation already treats broken references as
//! unsatisfied rules; these warnings let collaborators report them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::spec::FormSpec;
use crate::visibility::FormIndex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralWarning {
    DanglingOption {
        rule_id: String,
        option_id: String,
    },
    MissingOwner {
        option_id: String,
        question_id: String,
    },
    MisplacedOption {
        option_id: String,
        listed_under: String,
        back_reference: String,
    },
    OwnerMismatch {
        rule_id: String,
        rule_question: String,
        option_question: String,
    },
    SelfReference {
        rule_id: String,
        question_code: String,
    },
    ForwardReference {
        rule_id: String,
        question_code: String,
        trigger_code: String,
    },
    DuplicateCode {
        code: String,
    },
    EmptyCode {
        question_id: String,
    },
}

impl fmt::Display for StructuralWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralWarning::DanglingOption { rule_id, option_id } => {
                write!(f, "rule '{}' targets unknown option '{}'", rule_id, option_id)
            }
            StructuralWarning::MissingOwner {
                option_id,
                question_id,
            } => write!(
                f,
                "option '{}' belongs to unknown question '{}'",
                option_id, question_id
            ),
            StructuralWarning::MisplacedOption {
                option_id,
                listed_under,
                back_reference,
            } => write!(
                f,
                "option '{}' is listed under '{}' but references '{}'",
                option_id, listed_under, back_reference
            ),
            StructuralWarning::OwnerMismatch {
                rule_id,
                rule_question,
                option_question,
            } => write!(
                f,
                "rule '{}' names question '{}' but its option belongs to '{}'",
                rule_id, rule_question, option_question
            ),
            StructuralWarning::SelfReference {
                rule_id,
                question_code,
            } => write!(
                f,
                "rule '{}' makes '{}' depend on its own answer",
                rule_id, question_code
            ),
            StructuralWarning::ForwardReference {
                rule_id,
                question_code,
                trigger_code,
            } => write!(
                f,
                "rule '{}' makes '{}' depend on '{}', which is not asked earlier",
                rule_id, question_code, trigger_code
            ),
            StructuralWarning::DuplicateCode { code } => {
                write!(f, "code '{}' is used by more than one question", code)
            }
            StructuralWarning::EmptyCode { question_id } => {
                write!(f, "question '{}' has an empty code", question_id)
            }
        }
    }
}

pub fn inspect(spec: &FormSpec) -> Vec<StructuralWarning> {
    let index = FormIndex::new(spec);
    let mut warnings = Vec::new();

    let mut codes: BTreeMap<&str, usize> = BTreeMap::new();
    for question in &spec.questions {
        if question.code.is_empty() {
            warnings.push(StructuralWarning::EmptyCode {
                question_id: question.id.clone(),
            });
        } else {
            *codes.entry(question.code.as_str()).or_default() += 1;
        }
    }
    warnings.extend(
        codes
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(code, _)| StructuralWarning::DuplicateCode {
                code: code.to_string(),
            }),
    );

    for question in &spec.questions {
        for option in &question.options {
            if index.question(&option.question_id).is_none() {
                warnings.push(StructuralWarning::MissingOwner {
                    option_id: option.id.clone(),
                    question_id: option.question_id.clone(),
                });
            } else if option.question_id != question.id {
                warnings.push(StructuralWarning::MisplacedOption {
                    option_id: option.id.clone(),
                    listed_under: question.id.clone(),
                    back_reference: option.question_id.clone(),
                });
            }
        }
    }

    for question in &spec.questions {
        for rule in &question.rules {
            let Some(option) = index.option(&rule.option_id) else {
                warnings.push(StructuralWarning::DanglingOption {
                    rule_id: rule.id.clone(),
                    option_id: rule.option_id.clone(),
                });
                continue;
            };
            if rule.question_id != option.question_id {
                warnings.push(StructuralWarning::OwnerMismatch {
                    rule_id: rule.id.clone(),
                    rule_question: rule.question_id.clone(),
                    option_question: option.question_id.clone(),
                });
            }
            let Some(trigger) = index.trigger(rule) else {
                continue;
            };
            if trigger.owner.id == question.id {
                warnings.push(StructuralWarning::SelfReference {
                    rule_id: rule.id.clone(),
                    question_code: question.code.clone(),
                });
            } else if trigger.owner.order >= question.order {
                warnings.push(StructuralWarning::ForwardReference {
                    rule_id: rule.id.clone(),
                    question_code: question.code.clone(),
                    trigger_code: trigger.owner.code.clone(),
                });
            }
        }
    }

    warnings
}
