use std::future::Future;

use crate::model::{Answer, decode_all};
use crate::{Result, TracedPool};

const LIST_ANSWERS_FOR_QUESTION: &str = r#"
SELECT a."id", a."content", a."user_id", a."question_id", a."created_at", a."updated_at",
       (SELECT count(*) FROM "answer_likes" l WHERE l."answer_id" = a."id") AS "likes_count"
FROM "answers" a
WHERE a."question_id" = $1
ORDER BY a."created_at", a."id"
"#;

const INSERT_ANSWER: &str = r#"
INSERT INTO "answers" ("content", "user_id", "question_id")
VALUES ($1, $2, $3)
RETURNING "id", "content", "user_id", "question_id", "created_at", "updated_at",
          0::BIGINT AS "likes_count"
"#;

/// Access to the `answers` table.
pub trait AnswerRepository: Send + Sync {
    /// Every answer to `question_id`, oldest first, with like counts.
    fn list_answers_for_question(
        &self,
        question_id: i64,
    ) -> impl Future<Output = Result<Vec<Answer>>> + Send;

    /// Insert an answer in its own transaction and return the stored row.
    fn create_answer(
        &self,
        content: &str,
        author_id: i64,
        question_id: i64,
    ) -> impl Future<Output = Result<Answer>> + Send;
}

/// Postgres-backed [`AnswerRepository`].
#[derive(Clone)]
pub struct PgAnswerRepository {
    pool: TracedPool,
}

impl PgAnswerRepository {
    pub fn new(pool: TracedPool) -> Self {
        Self { pool }
    }
}

impl AnswerRepository for PgAnswerRepository {
    async fn list_answers_for_question(&self, question_id: i64) -> Result<Vec<Answer>> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(LIST_ANSWERS_FOR_QUESTION, &[&question_id])
            .await?;
        Ok(decode_all(&rows)?)
    }

    async fn create_answer(&self, content: &str, author_id: i64, question_id: i64) -> Result<Answer> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        let row = tx
            .query_one(INSERT_ANSWER, &[&content, &author_id, &question_id])
            .await?;
        let answer = Answer::try_from(&row)?;
        tx.commit().await?;

        tracing::debug!(
            answer_id = answer.id,
            question_id,
            user_id = author_id,
            "answer stored"
        );
        Ok(answer)
    }
}
