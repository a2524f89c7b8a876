pub mod attempt;
pub mod loaders;
pub mod options;
pub mod question;
pub mod quiz;

pub use attempt::{AttemptFilter, AttemptRecord};
pub use loaders::{load_all_attempt_fixtures, load_quiz_fixture, AttemptFixture, QuizFixture};
pub use options::{ExportOptions, FontFamily, NameOrdering, PageMargins, TextAlignment};
pub use question::{Attachment, AttachmentData, QuestionUnit, SlotContent, TextFormat};
pub use quiz::QuizContext;
