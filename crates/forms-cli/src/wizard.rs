use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: question prompts only.
    Clean,
    /// Verbose output: status, visible questions, help text.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and state once the engine yields a question.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_answers_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_answers_json,
        }
    }

    pub fn show_header(&mut self, payload: &WizardPayload) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", payload.form_title);
        if self.verbosity.is_verbose()
            && let Some(help) = &payload.help
        {
            println!("Help: {}", help);
        }
        self.header_printed = true;
    }

    pub fn show_status(&self, payload: &WizardPayload) {
        if self.verbosity.is_verbose() {
            println!(
                "Status: {} ({}/{})",
                payload.status, payload.progress.answered, payload.progress.total
            );
            println!("Visible questions:");
            for question in payload.questions.iter().filter(|question| question.visible) {
                let mut entry = format!(" - {} ({})", question.code, question.title);
                if question.required {
                    entry.push_str(" [required]");
                }
                println!("{}", entry);
            }
        }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = if prompt.total > 0 {
            format!("{}/{} {}", prompt.index, prompt.total, prompt.title)
        } else {
            format!("{} {}", prompt.index, prompt.title)
        };
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if let Some(help) = &prompt.help {
            println!("{}", help);
        }
        if !prompt.choices.is_empty() {
            for (position, choice) in prompt.choices.iter().enumerate() {
                println!("  {}) {}", position + 1, choice);
            }
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_rejection(&self, code: &str, message: &str) {
        eprintln!("Rejected {}: {}", code, message);
    }

    pub fn show_completion(&self, answers: &Value) {
        println!("Done ✅");
        if self.show_answers_json {
            match serde_json::to_string_pretty(answers) {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => eprintln!("Failed to serialize answers to JSON: {}", err),
            }
        }
    }
}

/// Render payload extracted from the component output.
#[derive(Debug, Deserialize)]
pub struct WizardPayload {
    pub form_title: String,
    #[serde(default)]
    pub help: Option<String>,
    pub status: String,
    pub progress: WizardProgress,
    pub questions: Vec<WizardQuestion>,
}

impl WizardPayload {
    pub fn from_json(json: &Value) -> Result<Self, String> {
        Self::deserialize(json).map_err(|err| format!("wizard payload: {}", err))
    }

    /// First visible question that still needs an answer and was not skipped.
    pub fn next_pending(&self, skipped: &BTreeSet<String>) -> Option<&WizardQuestion> {
        self.questions.iter().find(|question| {
            question.visible
                && !skipped.contains(&question.code)
                && question
                    .current_value
                    .as_ref()
                    .is_none_or(form_spec::is_empty_answer)
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WizardProgress {
    pub answered: usize,
    pub total: usize,
}

/// Minimal view of a question used for rendering prompts.
#[derive(Debug, Deserialize)]
pub struct WizardQuestion {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(rename = "type")]
    pub kind: form_spec::QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub current_value: Option<Value>,
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub title: String,
    pub help: Option<String>,
    pub required: bool,
    pub hint: Option<String>,
    pub choices: Vec<String>,
}

impl PromptContext {
    pub fn new(question: &WizardQuestion, progress: &WizardProgress) -> Self {
        Self {
            index: (progress.answered + 1).max(1),
            total: progress.total,
            title: question.title.clone(),
            help: question.help.clone(),
            required: question.required,
            hint: hint_for(question),
            choices: question.choices.clone(),
        }
    }
}

fn hint_for(question: &WizardQuestion) -> Option<String> {
    use form_spec::QuestionType;

    match question.kind {
        QuestionType::YesNo if !question.choices.is_empty() => {
            Some(format!("({})", question.choices.join("/")))
        }
        QuestionType::SingleChoice => Some("(pick one, by number or text)".to_string()),
        QuestionType::MultipleChoice => Some("(comma-separated, by number or text)".to_string()),
        QuestionType::Integer => Some("(whole number)".to_string()),
        QuestionType::TwoDecimal => Some("(number, up to 2 decimals)".to_string()),
        _ => None,
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}
