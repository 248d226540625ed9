pub mod choice;
pub mod form;
pub mod question;

pub use choice::{ChoiceOption, ConditionalRule};
pub use form::{FormSpec, RecordIssue};
pub use question::{QuestionSpec, QuestionType};
