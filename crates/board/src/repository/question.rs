use std::future::Future;

use crate::model::{Question, decode_all};
use crate::{Result, TracedPool};

const LIST_QUESTIONS: &str = r#"
SELECT "id", "title", "content", "user_id", "created_at", "updated_at"
FROM "questions"
ORDER BY "created_at" DESC, "id" DESC
LIMIT $1
"#;

const FIND_QUESTION: &str = r#"
SELECT "id", "title", "content", "user_id", "created_at", "updated_at"
FROM "questions"
WHERE "id" = $1
"#;

const INSERT_QUESTION: &str = r#"
INSERT INTO "questions" ("title", "content", "user_id")
VALUES ($1, $2, $3)
RETURNING "id", "title", "content", "user_id", "created_at", "updated_at"
"#;

/// Access to the `questions` table.
pub trait QuestionRepository: Send + Sync {
    /// At most `limit` questions, newest first.
    fn list_questions(&self, limit: usize) -> impl Future<Output = Result<Vec<Question>>> + Send;

    /// The question with `id`, or `None`.
    fn find_question(&self, id: i64) -> impl Future<Output = Result<Option<Question>>> + Send;

    /// Insert a question in its own transaction and return the stored row.
    fn create_question(
        &self,
        title: &str,
        content: &str,
        author_id: i64,
    ) -> impl Future<Output = Result<Question>> + Send;
}

/// Postgres-backed [`QuestionRepository`].
#[derive(Clone)]
pub struct PgQuestionRepository {
    pool: TracedPool,
}

impl PgQuestionRepository {
    pub fn new(pool: TracedPool) -> Self {
        Self { pool }
    }
}

impl QuestionRepository for PgQuestionRepository {
    async fn list_questions(&self, limit: usize) -> Result<Vec<Question>> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(LIST_QUESTIONS, &[&super::sql_limit(limit)])
            .await?;
        Ok(decode_all(&rows)?)
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>> {
        let conn = self.pool.get().await?;
        let row = conn.query_opt(FIND_QUESTION, &[&id]).await?;
        Ok(row.as_ref().map(Question::try_from).transpose()?)
    }

    async fn create_question(&self, title: &str, content: &str, author_id: i64) -> Result<Question> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        let row = tx
            .query_one(INSERT_QUESTION, &[&title, &content, &author_id])
            .await?;
        let question = Question::try_from(&row)?;
        tx.commit().await?;

        tracing::debug!(question_id = question.id, user_id = author_id, "question stored");
        Ok(question)
    }
}
