use super::validate::{AnswerForm, ValidationErrors, validate_answer};
use super::{AuthUser, ControllerError, ControllerResult, Route, Session, require_auth};
use crate::ConstraintViolation;
use crate::repository::{AnswerRepository, LikeRepository, QuestionRepository};
use crate::service::{AnswerService, QuestionService};
use crate::view::{AnswerFormPage, LikeStatus};

pub struct AnswerController<'s, Q, A, L> {
    questions: &'s QuestionService<Q>,
    answers: &'s AnswerService<A, L>,
}

impl<'s, Q, A, L> AnswerController<'s, Q, A, L>
where
    Q: QuestionRepository,
    A: AnswerRepository,
    L: LikeRepository,
{
    pub fn new(questions: &'s QuestionService<Q>, answers: &'s AnswerService<A, L>) -> Self {
        Self { questions, answers }
    }

    /// `GET /questions/{id}/answers/new`
    ///
    /// Records the answer target in the session for [`store`](Self::store).
    pub async fn create(
        &self,
        auth: Option<AuthUser>,
        session: &mut Session,
        question_id: i64,
    ) -> ControllerResult<AnswerFormPage> {
        let user = require_auth(auth)?;
        let question = self
            .questions
            .question_detail(question_id)
            .await?
            .ok_or(ControllerError::NotFound)?;

        session.begin_answer(user.id, question_id);
        Ok(AnswerFormPage { question })
    }

    /// `POST /answers`
    ///
    /// Answers the question remembered by [`create`](Self::create), then
    /// forgets it. The signed-in user is the author; a form opened by
    /// someone else is rejected.
    pub async fn store(
        &self,
        auth: Option<AuthUser>,
        session: &mut Session,
        form: AnswerForm,
    ) -> ControllerResult<Route> {
        let user = require_auth(auth)?;
        validate_answer(&form)?;

        let Some(question_id) = session.question_id() else {
            let mut errors = ValidationErrors::new();
            errors.add("question_id", "No question selected to answer.");
            return Err(errors.into());
        };
        if session.user_id().is_some_and(|id| id != user.id) {
            return Err(ControllerError::Unauthorized);
        }

        self.answers
            .store_answer(&form.content, user.id, question_id)
            .await?;
        session.forget_question();
        Ok(Route::QuestionShow(question_id))
    }

    /// `POST /answers/{id}/like`
    pub async fn like(&self, auth: Option<AuthUser>, answer_id: i64) -> ControllerResult<LikeStatus> {
        let user = require_auth(auth)?;
        self.answers
            .like_answer(user.id, answer_id)
            .await
            .map_err(missing_answer)
    }

    /// `DELETE /answers/{id}/like`
    ///
    /// Unliking an answer that does not exist is a no-op.
    pub async fn unlike(&self, auth: Option<AuthUser>, answer_id: i64) -> ControllerResult<LikeStatus> {
        let user = require_auth(auth)?;
        Ok(self.answers.unlike_answer(user.id, answer_id).await?)
    }
}

const ANSWER_FOREIGN_KEY: &str = "answer_likes_answer_id_foreign";

/// A like pointing at a missing answer is a 404, not a store failure.
fn missing_answer(err: crate::Error) -> ControllerError {
    match err.constraint_violation() {
        Some(ConstraintViolation::ForeignKey { constraint })
            if constraint.as_deref() == Some(ANSWER_FOREIGN_KEY) =>
        {
            ControllerError::NotFound
        }
        _ => err.into(),
    }
}
