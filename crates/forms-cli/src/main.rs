mod wizard;

use clap::{Parser, Subcommand, ValueEnum};
use component_forms::{
    render_json_ui as forms_render_json_ui, render_text as forms_render_text, submit_all,
    submit_patch,
};
use form_spec::{
    FormSpec, Locale, QuestionType, ResponseSet, SchemaRegistry, ValidationReport, inspect,
    next_question, summarize, unique_code, validate_with, visible_questions,
};
use serde_json::{Number, Value, json};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use wizard::{
    AnswerParseError, PromptContext, Verbosity, WizardPayload, WizardPresenter, WizardQuestion,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const LOCALE_ENV: &str = "FORMS_LOCALE";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Conditional forms CLI",
    long_about = "Validates responses, evaluates conditional visibility and runs a text wizard for form definitions"
)]
struct Cli {
    /// Message locale (`en`, `pt`); falls back to FORMS_LOCALE, then English.
    #[arg(long, global = true, value_name = "TAG")]
    locale: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Validate responses against a form definition.
    Validate {
        /// Path to the form JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to the responses JSON file.
        #[arg(long, value_name = "RESPONSES")]
        responses: PathBuf,
    },
    /// List the codes of the questions visible for the given responses.
    Visible {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "RESPONSES")]
        responses: Option<PathBuf>,
    },
    /// Show how many visible questions are answered and what comes next.
    Progress {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "RESPONSES")]
        responses: Option<PathBuf>,
    },
    /// Render the current form state as text or JSON.
    Render {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "RESPONSES")]
        responses: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Report broken rule references, duplicate codes and invalid records.
    Check {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Derive a question code from a title.
    Code {
        title: String,
        /// Form whose existing codes must not be reused.
        #[arg(long, value_name = "FORM")]
        form: Option<PathBuf>,
    },
    /// Fill a form interactively in the terminal.
    Fill {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Optional JSON file containing initial responses.
        #[arg(long, value_name = "RESPONSES")]
        responses: Option<PathBuf>,
        /// Show verbose output (statuses, visible questions, parse expectations).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also print the collected responses as JSON.
        #[arg(long)]
        answers_json: bool,
        /// Write the collected responses to this file.
        #[arg(long, value_name = "OUT")]
        out: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let locale = resolve_locale(cli.locale);
    match cli.command {
        Command::Validate { form, responses } => {
            run_validate(&form, &responses, locale.as_deref())
        }
        Command::Visible { form, responses } => run_visible(&form, responses.as_deref()),
        Command::Progress { form, responses } => run_progress(&form, responses.as_deref()),
        Command::Render {
            form,
            responses,
            format,
        } => run_render(&form, responses.as_deref(), format, locale.as_deref()),
        Command::Check { form } => run_check(&form),
        Command::Code { title, form } => run_code(&title, form.as_deref()),
        Command::Fill {
            form,
            responses,
            verbose,
            answers_json,
            out,
        } => run_fill(
            &form,
            responses.as_deref(),
            verbose,
            answers_json,
            out.as_deref(),
            locale.as_deref(),
        ),
    }
}

fn resolve_locale(flag: Option<String>) -> Option<String> {
    flag.or_else(|| env::var(LOCALE_ENV).ok())
        .filter(|tag| !tag.trim().is_empty())
}

fn registry_for(locale: Option<&str>) -> CliResult<SchemaRegistry> {
    let locale = match locale {
        Some(tag) => Locale::preset(tag).ok_or_else(|| format!("unknown locale '{}'", tag))?,
        None => Locale::default(),
    };
    Ok(SchemaRegistry::new(locale))
}

fn load_form(path: &Path) -> CliResult<(FormSpec, String)> {
    let contents = fs::read_to_string(path)?;
    let spec: FormSpec = serde_json::from_str(&contents)?;
    log::debug!(
        "loaded form '{}' with {} questions from {}",
        spec.id,
        spec.questions.len(),
        path.display()
    );
    Ok((spec, contents))
}

fn load_responses(path: Option<&Path>) -> CliResult<ResponseSet> {
    let Some(path) = path else {
        return Ok(ResponseSet::new());
    };
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    ResponseSet::from_value(value)
        .ok_or_else(|| format!("{} must contain a JSON object", path.display()).into())
}

fn component_config(form_json: &str, locale: Option<&str>) -> String {
    match locale {
        Some(tag) => json!({ "form_json": form_json, "locale": tag }).to_string(),
        None => json!({ "form_json": form_json }).to_string(),
    }
}

fn run_validate(form_path: &Path, responses_path: &Path, locale: Option<&str>) -> CliResult<()> {
    let (spec, _) = load_form(form_path)?;
    let responses = load_responses(Some(responses_path))?;
    let registry = registry_for(locale)?;

    let report = validate_with(&spec, &responses, &registry);
    println!(
        "Validation result: {}",
        if report.valid { "valid" } else { "invalid" }
    );
    describe_validation(&report);

    if report.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(report: &ValidationReport) {
    if !report.errors.is_empty() {
        println!("Errors:");
        for (code, message) in &report.errors {
            println!("  {} - {}", code, message);
        }
    }
}

fn run_visible(form_path: &Path, responses_path: Option<&Path>) -> CliResult<()> {
    let (spec, _) = load_form(form_path)?;
    let responses = load_responses(responses_path)?;
    for question in visible_questions(&spec, &responses) {
        println!("{}", question.code);
    }
    Ok(())
}

fn run_progress(form_path: &Path, responses_path: Option<&Path>) -> CliResult<()> {
    let (spec, _) = load_form(form_path)?;
    let responses = load_responses(responses_path)?;
    let visible = visible_questions(&spec, &responses);
    let summary = summarize(&visible, &responses);
    println!(
        "Progress: {}/{} ({:.0}%)",
        summary.answered,
        summary.total,
        summary.ratio * 100.0
    );
    match next_question(&spec, &responses) {
        Some(question) => println!("Next question: {}", question.code),
        None => println!("All visible questions are answered."),
    }
    Ok(())
}

fn run_render(
    form_path: &Path,
    responses_path: Option<&Path>,
    format: RenderMode,
    locale: Option<&str>,
) -> CliResult<()> {
    let (spec, contents) = load_form(form_path)?;
    let responses = load_responses(responses_path)?;
    let config_json = component_config(&contents, locale);
    let responses_json = responses.to_value().to_string();
    match format {
        RenderMode::Text => {
            let rendered = forms_render_text(&spec.id, &config_json, &responses_json);
            // Text output is plain unless the facade reports an error object.
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&rendered)
                && let Some(error) = map.get("error").and_then(Value::as_str)
            {
                return Err(error.into());
            }
            println!("{}", rendered);
        }
        RenderMode::Json => {
            let ui = parse_component_result(&forms_render_json_ui(
                &spec.id,
                &config_json,
                &responses_json,
            ))?;
            println!("{}", serde_json::to_string_pretty(&ui)?);
        }
    }
    Ok(())
}

fn run_check(form_path: &Path) -> CliResult<()> {
    let (spec, _) = load_form(form_path)?;
    let warnings = inspect(&spec);
    let issues = spec.check_records();

    for warning in &warnings {
        log::warn!("form '{}': {}", spec.id, warning);
        println!("warning: {}", warning);
    }
    for issue in &issues {
        println!(
            "invalid {} on '{}': {}",
            issue.field, issue.entity, issue.message
        );
    }

    if warnings.is_empty() && issues.is_empty() {
        println!("Form '{}' is consistent.", spec.id);
        Ok(())
    } else {
        Err(format!(
            "{} warning(s), {} record issue(s)",
            warnings.len(),
            issues.len()
        )
        .into())
    }
}

fn run_code(title: &str, form_path: Option<&Path>) -> CliResult<()> {
    let code = match form_path {
        Some(path) => {
            let (spec, _) = load_form(path)?;
            unique_code(title, &spec)
        }
        None => form_spec::generate_code(title),
    };
    println!("{}", code);
    Ok(())
}

fn run_fill(
    form_path: &Path,
    responses_path: Option<&Path>,
    verbose: bool,
    answers_json: bool,
    out: Option<&Path>,
    locale: Option<&str>,
) -> CliResult<()> {
    let (spec, contents) = load_form(form_path)?;
    let form_id = spec.id.as_str();
    let config_json = component_config(&contents, locale);
    let mut answers = load_responses(responses_path)?.to_value();
    let mut skipped = BTreeSet::new();
    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose), answers_json);

    loop {
        let answers_str = answers.to_string();
        let ui =
            parse_component_result(&forms_render_json_ui(form_id, &config_json, &answers_str))?;
        let payload =
            WizardPayload::from_json(&ui).map_err(|err| format!("wizard UI error: {}", err))?;
        presenter.show_header(&payload);

        let Some(question) = payload.next_pending(&skipped) else {
            let result = parse_component_result(&submit_all(form_id, &config_json, &answers_str))?;
            if result["status"] == "complete" {
                presenter.show_completion(&answers);
                break;
            }
            // Drop rejected answers so their questions are asked again.
            let errors = rejected_answers(&result);
            let mut reopened = false;
            for (code, message) in &errors {
                presenter.show_rejection(code, message);
                if let Some(map) = answers.as_object_mut() {
                    reopened |= map.remove(code).is_some();
                }
                reopened |= skipped.remove(code);
            }
            if !reopened {
                return Err("form could not be completed".into());
            }
            continue;
        };

        presenter.show_status(&payload);
        let prompt = PromptContext::new(question, &payload.progress);
        let answer = prompt_question(&prompt, question, &presenter)?;
        if answer.is_null() {
            skipped.insert(question.code.clone());
            continue;
        }

        let value_json = serde_json::to_string(&answer)?;
        let result = parse_component_result(&submit_patch(
            form_id,
            &config_json,
            &answers_str,
            &question.code,
            &value_json,
        ))?;
        if let Some(message) = result["validation"]["errors"][question.code.as_str()].as_str() {
            presenter.show_rejection(&question.code, message);
            continue;
        }
        answers = result["answers"].clone();
    }

    if let Some(path) = out {
        fs::write(path, serde_json::to_string_pretty(&answers)?)?;
        println!("Responses written to {}", path.display());
    }
    Ok(())
}

fn rejected_answers(result: &Value) -> Vec<(String, String)> {
    result["validation"]["errors"]
        .as_object()
        .map(|errors| {
            errors
                .iter()
                .map(|(code, message)| {
                    (
                        code.clone(),
                        message.as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_component_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

fn prompt_question(
    prompt: &PromptContext,
    question: &WizardQuestion,
    presenter: &WizardPresenter,
) -> CliResult<Value> {
    loop {
        presenter.show_prompt(prompt);
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err("input closed before the form was complete".into());
        }

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("wizard aborted by user".into());
        }

        match parse_answer(question, trimmed) {
            Ok(value) => return Ok(value),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

/// Turns a line of user input into a response value.
///
/// Blank input on an optional question yields `Null`, meaning "skip".
fn parse_answer(question: &WizardQuestion, raw: &str) -> Result<Value, AnswerParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        if !question.required {
            return Ok(Value::Null);
        }
        return Err(AnswerParseError::new(
            "This question requires an answer.",
            None,
        ));
    }

    match question.kind {
        QuestionType::YesNo | QuestionType::SingleChoice => {
            parse_choice(&question.choices, raw).map(Value::String)
        }
        QuestionType::MultipleChoice => parse_choice_list(&question.choices, raw),
        QuestionType::Integer => parse_integer(raw),
        QuestionType::TwoDecimal => parse_number(raw),
        QuestionType::FreeText | QuestionType::Unknown => Ok(Value::String(raw.to_string())),
    }
}

/// Matches a choice by text (case-insensitive) or by its 1-based position.
fn parse_choice(choices: &[String], raw: &str) -> Result<String, AnswerParseError> {
    if choices.is_empty() {
        return Err(AnswerParseError::new(
            "Choices are not defined for this question.",
            None,
        ));
    }
    if let Some(choice) = choices.iter().find(|choice| choice.eq_ignore_ascii_case(raw)) {
        return Ok(choice.clone());
    }
    if let Ok(position) = raw.parse::<usize>()
        && let Some(choice) = position.checked_sub(1).and_then(|index| choices.get(index))
    {
        return Ok(choice.clone());
    }
    Err(AnswerParseError::new(
        format!("Choose one of: {}.", choices.join(", ")),
        Some(format!("allowed values: {}", choices.join(", "))),
    ))
}

fn parse_choice_list(choices: &[String], raw: &str) -> Result<Value, AnswerParseError> {
    let mut selected: Vec<String> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let choice = parse_choice(choices, part)?;
        if !selected.contains(&choice) {
            selected.push(choice);
        }
    }
    if selected.is_empty() {
        return Err(AnswerParseError::new(
            "Select at least one option.",
            Some("expected comma-separated choices".to_string()),
        ));
    }
    Ok(Value::Array(selected.into_iter().map(Value::String).collect()))
}

fn parse_integer(raw: &str) -> Result<Value, AnswerParseError> {
    raw.parse::<i64>()
        .map(Number::from)
        .map(Value::Number)
        .map_err(|_| {
            AnswerParseError::new(
                "Please enter a whole number.",
                Some("expected integer".to_string()),
            )
        })
}

fn parse_number(raw: &str) -> Result<Value, AnswerParseError> {
    raw.parse::<f64>()
        .map_err(|_| {
            AnswerParseError::new(
                "Please enter a number.",
                Some("expected number".to_string()),
            )
        })
        .and_then(|value| {
            Number::from_f64(value).map(Value::Number).ok_or_else(|| {
                AnswerParseError::new(
                    "Please enter a finite number.",
                    Some("number must be finite".to_string()),
                )
            })
        })
}
