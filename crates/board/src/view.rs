//! Typed view models handed to the presentation layer.

use crate::model::{Answer, Question};

/// The top page: the newest questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopPage {
    pub questions: Vec<Question>,
}

/// A question with its answers, oldest answer first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPage {
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// The answer form for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFormPage {
    pub question: Question,
}

/// Result of a like or unlike, as seen by the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeStatus {
    pub liked: bool,
    pub likes_count: i64,
}
