use super::ControllerResult;
use crate::repository::QuestionRepository;
use crate::service::QuestionService;
use crate::view::TopPage;

pub struct HomeController<'s, R> {
    questions: &'s QuestionService<R>,
}

impl<'s, R: QuestionRepository> HomeController<'s, R> {
    pub fn new(questions: &'s QuestionService<R>) -> Self {
        Self { questions }
    }

    /// `GET /`
    pub async fn index(&self) -> ControllerResult<TopPage> {
        let questions = self.questions.question_list_for_top().await?;
        Ok(TopPage { questions })
    }
}
