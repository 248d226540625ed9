#![allow(missing_docs)]

pub mod answers;
pub mod codes;
pub mod inspect;
pub mod locale;
pub mod progress;
pub mod render;
pub mod schema;
pub mod spec;
pub mod store;
pub mod validate;
pub mod visibility;

pub use answers::{ResponseSet, Submission, ValidationReport, is_empty_answer};
pub use codes::{generate_code, unique_code};
pub use inspect::{StructuralWarning, inspect};
pub use locale::Locale;
pub use progress::{ProgressSummary, next_question, progress, summarize};
pub use render::{
    RenderPayload, RenderQuestion, RenderStatus, build_render_payload, render_json_ui, render_text,
};
pub use schema::{AnswerValidator, SchemaRegistry, ValueShape, response_schema};
pub use spec::{ChoiceOption, ConditionalRule, FormSpec, QuestionSpec, QuestionType, RecordIssue};
pub use store::{FormStore, MemoryStore, StoreError, SubmitOutcome, submit};
pub use validate::{validate, validate_with};
pub use visibility::{FormIndex, VisibilityMap, resolve_visibility, visible_questions};
