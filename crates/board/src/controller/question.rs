use super::validate::{QuestionForm, validate_question};
use super::{AuthUser, ControllerError, ControllerResult, Route, require_auth};
use crate::repository::{AnswerRepository, LikeRepository, QuestionRepository};
use crate::service::{AnswerService, QuestionService};
use crate::view::QuestionPage;

pub struct QuestionController<'s, Q, A, L> {
    questions: &'s QuestionService<Q>,
    answers: &'s AnswerService<A, L>,
}

impl<'s, Q, A, L> QuestionController<'s, Q, A, L>
where
    Q: QuestionRepository,
    A: AnswerRepository,
    L: LikeRepository,
{
    pub fn new(questions: &'s QuestionService<Q>, answers: &'s AnswerService<A, L>) -> Self {
        Self { questions, answers }
    }

    /// `GET /questions/new`. Only checks that someone is signed in.
    pub fn create(&self, auth: Option<AuthUser>) -> ControllerResult<()> {
        require_auth(auth).map(|_| ())
    }

    /// `POST /questions`
    pub async fn store(&self, auth: Option<AuthUser>, form: QuestionForm) -> ControllerResult<Route> {
        let user = require_auth(auth)?;
        validate_question(&form)?;

        let question = self
            .questions
            .store_question(&form.title, &form.content, user.id)
            .await?;
        Ok(Route::QuestionShow(question.id))
    }

    /// `GET /questions/{id}`
    pub async fn show(&self, id: i64) -> ControllerResult<QuestionPage> {
        let question = self
            .questions
            .question_detail(id)
            .await?
            .ok_or(ControllerError::NotFound)?;
        let answers = self.answers.answer_list_for_question_page(id).await?;
        Ok(QuestionPage { question, answers })
    }

    pub fn index(&self) -> ControllerResult<()> {
        Err(ControllerError::NotImplemented)
    }

    pub fn edit(&self, _id: i64) -> ControllerResult<()> {
        Err(ControllerError::NotImplemented)
    }

    pub fn update(&self, _id: i64, _form: QuestionForm) -> ControllerResult<()> {
        Err(ControllerError::NotImplemented)
    }

    pub fn destroy(&self, _id: i64) -> ControllerResult<()> {
        Err(ControllerError::NotImplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryBoard;

    fn services(board: &MemoryBoard) -> (QuestionService<MemoryBoard>, AnswerService<MemoryBoard, MemoryBoard>) {
        (
            QuestionService::new(board.clone(), None),
            AnswerService::new(board.clone(), board.clone()),
        )
    }

    fn form(title: &str, content: &str) -> QuestionForm {
        QuestionForm {
            title: title.to_owned(),
            content: content.to_owned(),
        }
    }

    #[tokio::test]
    async fn store_redirects_to_the_new_question() {
        let board = MemoryBoard::default();
        let (questions, answers) = services(&board);
        let controller = QuestionController::new(&questions, &answers);

        let route = controller
            .store(Some(AuthUser { id: 5 }), form("Title", "Body"))
            .await
            .unwrap();
        let Route::QuestionShow(id) = route else {
            panic!("unexpected redirect {route:?}");
        };

        let page = controller.show(id).await.unwrap();
        assert_eq!(page.question.title, "Title");
        assert_eq!(page.question.user_id, 5);
        assert!(page.answers.is_empty());
    }

    #[tokio::test]
    async fn store_rejects_guests_and_invalid_forms() {
        let board = MemoryBoard::default();
        let (questions, answers) = services(&board);
        let controller = QuestionController::new(&questions, &answers);

        let err = controller.store(None, form("Title", "Body")).await.unwrap_err();
        assert!(matches!(err, ControllerError::Unauthorized));

        let err = controller
            .store(Some(AuthUser { id: 5 }), form("", "Body"))
            .await
            .unwrap_err();
        let ControllerError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.field("title").len(), 1);

        assert!(questions.question_list_for_top().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn show_missing_question_is_not_found() {
        let board = MemoryBoard::default();
        let (questions, answers) = services(&board);
        let controller = QuestionController::new(&questions, &answers);

        assert!(matches!(
            controller.show(404).await,
            Err(ControllerError::NotFound)
        ));
    }

    #[test]
    fn create_requires_auth_and_stubs_are_not_implemented() {
        let board = MemoryBoard::default();
        let (questions, answers) = services(&board);
        let controller = QuestionController::new(&questions, &answers);

        assert!(controller.create(Some(AuthUser { id: 1 })).is_ok());
        assert!(matches!(controller.create(None), Err(ControllerError::Unauthorized)));
        assert!(matches!(controller.index(), Err(ControllerError::NotImplemented)));
        assert!(matches!(controller.edit(1), Err(ControllerError::NotImplemented)));
        assert!(matches!(
            controller.update(1, QuestionForm::default()),
            Err(ControllerError::NotImplemented)
        ));
        assert!(matches!(controller.destroy(1), Err(ControllerError::NotImplemented)));
    }
}
