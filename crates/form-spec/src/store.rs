//! Persistence collaborator.
//!
//! Forms and submissions are stored as whole snapshots keyed by id. There is
//! no transaction spanning entities; the last write wins.

use std::collections::HashMap;

use log::info;
use thiserror::Error;

use crate::answers::{Submission, ValidationReport};
use crate::schema::SchemaRegistry;
use crate::spec::{FormSpec, RecordIssue};
use crate::validate::validate_with;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("form '{0}' not found")]
    FormNotFound(String),
    #[error("invalid record: {}", describe_issues(.0))]
    InvalidRecord(Vec<RecordIssue>),
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode record '{id}': {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

fn describe_issues(issues: &[RecordIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}.{} {}", issue.entity, issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn missing_field(entity: &str, field: &'static str) -> RecordIssue {
    RecordIssue {
        entity: entity.to_string(),
        field,
        message: "must not be empty".into(),
    }
}

/// Get/put/delete access to forms and their submissions.
pub trait FormStore {
    fn get_form(&self, id: &str) -> Result<Option<FormSpec>, StoreError>;

    fn put_form(&mut self, form: &FormSpec) -> Result<(), StoreError>;

    /// Removes the form and every submission recorded for it.
    fn delete_form(&mut self, id: &str) -> Result<bool, StoreError>;

    /// All forms sorted by ordinal.
    fn list_forms(&self) -> Result<Vec<FormSpec>, StoreError>;

    fn submissions(&self, form_id: &str) -> Result<Vec<Submission>, StoreError>;

    /// Appends a submission and refreshes the owning form's response counter.
    fn put_submission(&mut self, submission: &Submission) -> Result<(), StoreError>;
}

/// In-process store keeping JSON snapshots.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    forms: HashMap<String, String>,
    submissions: HashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn decode<T: serde::de::DeserializeOwned>(id: &str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Decode {
        id: id.to_string(),
        source,
    })
}

impl FormStore for MemoryStore {
    fn get_form(&self, id: &str) -> Result<Option<FormSpec>, StoreError> {
        self.forms.get(id).map(|raw| decode(id, raw)).transpose()
    }

    fn put_form(&mut self, form: &FormSpec) -> Result<(), StoreError> {
        let issues = form.check_records();
        if !issues.is_empty() {
            return Err(StoreError::InvalidRecord(issues));
        }
        let raw = serde_json::to_string(form).map_err(StoreError::Encode)?;
        self.forms.insert(form.id.clone(), raw);
        Ok(())
    }

    fn delete_form(&mut self, id: &str) -> Result<bool, StoreError> {
        self.submissions.remove(id);
        Ok(self.forms.remove(id).is_some())
    }

    fn list_forms(&self) -> Result<Vec<FormSpec>, StoreError> {
        let mut forms = self
            .forms
            .iter()
            .map(|(id, raw)| decode::<FormSpec>(id, raw))
            .collect::<Result<Vec<_>, _>>()?;
        forms.sort_by(|left, right| left.order.cmp(&right.order).then(left.id.cmp(&right.id)));
        Ok(forms)
    }

    fn submissions(&self, form_id: &str) -> Result<Vec<Submission>, StoreError> {
        self.submissions
            .get(form_id)
            .map(|records| records.iter().map(|raw| decode(form_id, raw)).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn put_submission(&mut self, submission: &Submission) -> Result<(), StoreError> {
        let mut issues = Vec::new();
        if submission.id.is_empty() {
            issues.push(missing_field("submission", "id"));
        }
        if submission.form_id.is_empty() {
            issues.push(missing_field(&submission.id, "form_id"));
        }
        if !issues.is_empty() {
            return Err(StoreError::InvalidRecord(issues));
        }

        // Everything fallible runs before the first write.
        let raw = serde_json::to_string(submission).map_err(StoreError::Encode)?;
        let stored = self
            .submissions
            .get(&submission.form_id)
            .map_or(0, Vec::len);
        let count = u32::try_from(stored + 1).unwrap_or(u32::MAX);
        let form_raw = match self.get_form(&submission.form_id)? {
            Some(mut form) => {
                form.response_count = count;
                Some(serde_json::to_string(&form).map_err(StoreError::Encode)?)
            }
            None => None,
        };

        self.submissions
            .entry(submission.form_id.clone())
            .or_default()
            .push(raw);
        if let Some(form_raw) = form_raw {
            self.forms.insert(submission.form_id.clone(), form_raw);
        }
        Ok(())
    }
}

/// Result of [`submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted { response_count: u32 },
    Rejected(ValidationReport),
}

/// Validates a submission against its stored form and persists it when valid.
pub fn submit<S: FormStore + ?Sized>(
    store: &mut S,
    registry: &SchemaRegistry,
    submission: &Submission,
) -> Result<SubmitOutcome, StoreError> {
    let form = store
        .get_form(&submission.form_id)?
        .ok_or_else(|| StoreError::FormNotFound(submission.form_id.clone()))?;

    let report = validate_with(&form, &submission.responses, registry);
    if !report.valid {
        return Ok(SubmitOutcome::Rejected(report));
    }

    store.put_submission(submission)?;
    let response_count = store
        .get_form(&form.id)?
        .map(|form| form.response_count)
        .unwrap_or_default();
    info!(
        "stored submission '{}' for form '{}' ({} total)",
        submission.id, form.id, response_count
    );
    Ok(SubmitOutcome::Accepted { response_count })
}
