use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use serde_json::{Value, json};
use std::fs;

const SIMPLE_FORM: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../form-spec/tests/fixtures/simple_form.json"
);
const PETS_FORM: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../form-spec/tests/fixtures/conditional_form.json"
);

fn forms() -> Command {
    let mut cmd = Command::cargo_bin("greentic-forms").expect("binary");
    cmd.env_remove("FORMS_LOCALE");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf8 stdout")
}

#[test]
fn validate_accepts_complete_responses() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = TempDir::new()?;
    let responses = workspace.child("responses.json");
    responses.write_str(&json!({ "name": "Ada", "newsletter": "Yes" }).to_string())?;

    let stdout = stdout_of(
        forms()
            .arg("validate")
            .arg("--form")
            .arg(SIMPLE_FORM)
            .arg("--responses")
            .arg(responses.path()),
    );
    assert!(stdout.contains("Validation result: valid"));
    Ok(())
}

#[test]
fn validate_fails_and_lists_errors() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = TempDir::new()?;
    let responses = workspace.child("responses.json");
    responses.write_str(&json!({ "newsletter": "Maybe" }).to_string())?;

    let output = forms()
        .arg("validate")
        .arg("--form")
        .arg(SIMPLE_FORM)
        .arg("--responses")
        .arg(responses.path())
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output)?;
    assert!(stdout.contains("Validation result: invalid"));
    assert!(stdout.contains("name - This question is required"));
    assert!(stdout.contains("newsletter - Select Yes or No"));
    Ok(())
}

#[test]
fn validate_uses_locale_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = TempDir::new()?;
    let responses = workspace.child("responses.json");
    responses.write_str(&json!({ "name": "Ada", "newsletter": "Yes" }).to_string())?;

    let output = forms()
        .env("FORMS_LOCALE", "pt")
        .arg("validate")
        .arg("--form")
        .arg(SIMPLE_FORM)
        .arg("--responses")
        .arg(responses.path())
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output)?;
    assert!(stdout.contains("newsletter - Selecione Sim ou Não"));
    Ok(())
}

#[test]
fn visible_follows_conditional_rules() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = TempDir::new()?;
    let responses = workspace.child("responses.json");

    let stdout = stdout_of(forms().arg("visible").arg("--form").arg(PETS_FORM));
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["has_pet", "colors"]);

    responses.write_str(&json!({ "has_pet": "Yes", "colors": ["Blue"] }).to_string())?;
    let stdout = stdout_of(
        forms()
            .arg("visible")
            .arg("--form")
            .arg(PETS_FORM)
            .arg("--responses")
            .arg(responses.path()),
    );
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["has_pet", "pet_count", "colors", "budget"]
    );
    Ok(())
}

#[test]
fn progress_reports_next_question() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = TempDir::new()?;
    let responses = workspace.child("responses.json");
    responses.write_str(&json!({ "has_pet": "Yes" }).to_string())?;

    let stdout = stdout_of(
        forms()
            .arg("progress")
            .arg("--form")
            .arg(PETS_FORM)
            .arg("--responses")
            .arg(responses.path()),
    );
    assert!(stdout.contains("Progress: 1/4 (25%)"));
    assert!(stdout.contains("Next question: pet_count"));
    Ok(())
}

#[test]
fn render_json_lists_questions() {
    let stdout = stdout_of(
        forms()
            .arg("render")
            .arg("--form")
            .arg(SIMPLE_FORM)
            .arg("--format")
            .arg("json"),
    );
    let ui: Value = serde_json::from_str(&stdout).expect("json ui");
    assert_eq!(ui["form_id"], "example-form");
    assert_eq!(ui["status"], "need_input");
    assert_eq!(ui["next_question_code"], "name");
    assert_eq!(ui["questions"][1]["choices"], json!(["Yes", "No"]));
}

#[test]
fn check_passes_for_consistent_form() {
    let stdout = stdout_of(forms().arg("check").arg("--form").arg(PETS_FORM));
    assert!(stdout.contains("Form 'pets' is consistent."));
}

#[test]
fn check_fails_on_dangling_rule() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = TempDir::new()?;
    let form = workspace.child("broken.json");
    form.write_str(
        &json!({
            "id": "broken",
            "title": "Broken",
            "order": 1,
            "created_at": "2024-01-01T00:00:00Z",
            "questions": [
                {
                    "id": "q1", "form_id": "broken", "title": "Why?", "code": "why",
                    "order": 1, "type": "free_text",
                    "rules": [{ "id": "r1", "option_id": "gone", "question_id": "q0" }]
                }
            ]
        })
        .to_string(),
    )?;

    let output = forms()
        .arg("check")
        .arg("--form")
        .arg(form.path())
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output)?;
    assert!(stdout.contains("warning: rule 'r1' targets unknown option 'gone'"));
    Ok(())
}

#[test]
fn code_avoids_existing_codes() {
    let stdout = stdout_of(forms().arg("code").arg("Your Name!"));
    assert_eq!(stdout.trim(), "your_name");

    let stdout = stdout_of(forms().arg("code").arg("Name").arg("--form").arg(SIMPLE_FORM));
    assert_eq!(stdout.trim(), "name_2");
}

#[test]
fn fill_walks_conditional_form() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = TempDir::new()?;
    let out = workspace.child("answers.json");
    // has_pet, pet_count, skip colors, rejected budget, accepted budget
    let stdin = ["yes", "2", "", "3.456", "3.45"].join("\n") + "\n";

    let output = forms()
        .arg("fill")
        .arg("--form")
        .arg(PETS_FORM)
        .arg("--out")
        .arg(out.path())
        .write_stdin(stdin)
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stdout.contains("Form: Pet Survey"));
    assert!(stdout.contains("Done"));
    assert!(stderr.contains("Rejected budget: Must have at most 2 decimal places"));

    let answers: Value = serde_json::from_str(&fs::read_to_string(out.path())?)?;
    assert_eq!(
        answers,
        json!({ "has_pet": "Yes", "pet_count": 2, "budget": 3.45 })
    );
    Ok(())
}

#[test]
fn fill_stops_when_input_ends() {
    forms()
        .arg("fill")
        .arg("--form")
        .arg(SIMPLE_FORM)
        .write_stdin("Ada\n")
        .assert()
        .failure();
}
