//! Framework-free request handlers.
//!
//! Each handler takes already-parsed inputs (the authenticated user, if any,
//! the session, typed forms) and returns a view model or a [`Route`] to
//! redirect to. Mounting them under an HTTP server is left to the host.
//!
//! Handlers own authentication checks and [validation](validate); services
//! below them do neither.

mod answer;
mod home;
mod question;
mod session;
pub mod validate;

use std::fmt;

use thiserror::Error;

pub use answer::AnswerController;
pub use home::HomeController;
pub use question::QuestionController;
pub use session::Session;
pub use validate::{AnswerForm, QuestionForm, ValidationErrors};

/// The authenticated user making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("not implemented")]
    NotImplemented,

    #[error(transparent)]
    Store(#[from] crate::Error),
}

impl ControllerError {
    /// HTTP status a host should answer with.
    pub fn status(&self) -> u16 {
        match self {
            ControllerError::Unauthorized => 401,
            ControllerError::NotFound => 404,
            ControllerError::Validation(_) => 422,
            ControllerError::NotImplemented => 501,
            ControllerError::Store(_) => 500,
        }
    }
}

impl From<ValidationErrors> for ControllerError {
    fn from(errors: ValidationErrors) -> Self {
        ControllerError::Validation(errors)
    }
}

pub type ControllerResult<T> = std::result::Result<T, ControllerError>;

/// Named routes of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    QuestionCreate,
    QuestionStore,
    QuestionShow(i64),
    AnswerCreate(i64),
    AnswerStore,
    AnswerLike(i64),
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::QuestionCreate => "question.create",
            Route::QuestionStore => "question.store",
            Route::QuestionShow(_) => "question.show",
            Route::AnswerCreate(_) => "answer.create",
            Route::AnswerStore => "answer.store",
            Route::AnswerLike(_) => "answer.like",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::QuestionCreate => f.write_str("/questions/new"),
            Route::QuestionStore => f.write_str("/questions"),
            Route::QuestionShow(id) => write!(f, "/questions/{id}"),
            Route::AnswerCreate(id) => write!(f, "/questions/{id}/answers/new"),
            Route::AnswerStore => f.write_str("/answers"),
            Route::AnswerLike(id) => write!(f, "/answers/{id}/like"),
        }
    }
}

fn require_auth(auth: Option<AuthUser>) -> ControllerResult<AuthUser> {
    auth.ok_or(ControllerError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_render_paths() {
        assert_eq!(Route::Home.to_string(), "/");
        assert_eq!(Route::QuestionShow(42).to_string(), "/questions/42");
        assert_eq!(Route::AnswerCreate(7).to_string(), "/questions/7/answers/new");
        assert_eq!(Route::AnswerLike(3).to_string(), "/answers/3/like");
        assert_eq!(Route::QuestionShow(1).name(), "question.show");
    }

    #[test]
    fn statuses() {
        assert_eq!(ControllerError::Unauthorized.status(), 401);
        assert_eq!(ControllerError::NotFound.status(), 404);
        assert_eq!(
            ControllerError::Validation(ValidationErrors::new()).status(),
            422
        );
        assert_eq!(ControllerError::NotImplemented.status(), 501);
    }
}
