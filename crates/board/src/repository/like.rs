use std::future::Future;

use crate::model::AnswerLike;
use crate::{Result, TracedPool};

const INSERT_LIKE: &str = r#"
INSERT INTO "answer_likes" ("user_id", "answer_id")
VALUES ($1, $2)
RETURNING "id", "user_id", "answer_id", "created_at", "updated_at"
"#;

const DELETE_LIKE: &str = r#"
DELETE FROM "answer_likes" WHERE "user_id" = $1 AND "answer_id" = $2
"#;

const COUNT_LIKES: &str = r#"
SELECT count(*) FROM "answer_likes" WHERE "answer_id" = $1
"#;

const IS_LIKED_BY: &str = r#"
SELECT EXISTS (
    SELECT 1 FROM "answer_likes" WHERE "answer_id" = $1 AND "user_id" = $2
)
"#;

/// Access to the `answer_likes` join table.
pub trait LikeRepository: Send + Sync {
    /// Record that `user_id` likes `answer_id`.
    ///
    /// A second like for the same pair is rejected by the unique index and
    /// comes back as a unique-violation store error.
    fn insert_like(
        &self,
        user_id: i64,
        answer_id: i64,
    ) -> impl Future<Output = Result<AnswerLike>> + Send;

    /// Remove the like, returning whether one existed.
    fn delete_like(&self, user_id: i64, answer_id: i64) -> impl Future<Output = Result<bool>> + Send;

    fn count_likes(&self, answer_id: i64) -> impl Future<Output = Result<i64>> + Send;

    fn is_liked_by(&self, answer_id: i64, user_id: i64)
    -> impl Future<Output = Result<bool>> + Send;
}

/// Postgres-backed [`LikeRepository`].
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: TracedPool,
}

impl PgLikeRepository {
    pub fn new(pool: TracedPool) -> Self {
        Self { pool }
    }
}

impl LikeRepository for PgLikeRepository {
    async fn insert_like(&self, user_id: i64, answer_id: i64) -> Result<AnswerLike> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        let row = tx.query_one(INSERT_LIKE, &[&user_id, &answer_id]).await?;
        let like = AnswerLike::try_from(&row)?;
        tx.commit().await?;
        Ok(like)
    }

    async fn delete_like(&self, user_id: i64, answer_id: i64) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        let deleted = tx.execute(DELETE_LIKE, &[&user_id, &answer_id]).await?;
        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn count_likes(&self, answer_id: i64) -> Result<i64> {
        let conn = self.pool.get().await?;
        let row = conn.query_one(COUNT_LIKES, &[&answer_id]).await?;
        Ok(row.try_get(0)?)
    }

    async fn is_liked_by(&self, answer_id: i64, user_id: i64) -> Result<bool> {
        let conn = self.pool.get().await?;
        let row = conn.query_one(IS_LIKED_BY, &[&answer_id, &user_id]).await?;
        Ok(row.try_get(0)?)
    }
}
