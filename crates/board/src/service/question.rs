use crate::Result;
use crate::config::DEFAULT_TOPPAGE_QUESTION_COUNT;
use crate::model::Question;
use crate::repository::QuestionRepository;

/// Question use cases.
pub struct QuestionService<R> {
    repo: R,
    toppage_questions_count: Option<usize>,
}

impl<R: QuestionRepository> QuestionService<R> {
    /// `toppage_questions_count` is the configured top-page size; `None`
    /// falls back to [`DEFAULT_TOPPAGE_QUESTION_COUNT`].
    pub fn new(repo: R, toppage_questions_count: Option<usize>) -> Self {
        Self {
            repo,
            toppage_questions_count,
        }
    }

    /// Number of questions shown on the top page.
    pub fn toppage_size(&self) -> usize {
        self.toppage_questions_count
            .unwrap_or(DEFAULT_TOPPAGE_QUESTION_COUNT)
    }

    /// The newest questions for the top page.
    pub async fn question_list_for_top(&self) -> Result<Vec<Question>> {
        self.repo.list_questions(self.toppage_size()).await
    }

    pub async fn question_detail(&self, id: i64) -> Result<Option<Question>> {
        self.repo.find_question(id).await
    }

    pub async fn store_question(&self, title: &str, content: &str, user_id: i64) -> Result<Question> {
        self.repo.create_question(title, content, user_id).await
    }
}
