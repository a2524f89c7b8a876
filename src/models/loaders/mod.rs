pub mod toml_loader;

pub use toml_loader::{
    load_all_attempt_fixtures, load_attempt_fixture, load_quiz_fixture, AttemptFixture,
    QuizFixture, SlotFixture,
};
