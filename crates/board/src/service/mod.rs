//! Services sit between controllers and repositories.
//!
//! They apply defaults and orchestrate calls but never validate input or
//! swallow store errors; both are the caller's concern.

mod answer;
mod question;

pub use answer::AnswerService;
pub use question::QuestionService;
