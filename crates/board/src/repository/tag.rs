use crate::model::{TagMaster, decode_all};
use crate::{Result, TracedPool};

/// Access to `tag_masters` and its `question_tags` / `answer_tags` join tables.
#[derive(Clone)]
pub struct TagRepository {
    pool: TracedPool,
}

impl TagRepository {
    pub fn new(pool: TracedPool) -> Self {
        Self { pool }
    }

    pub async fn create_tag(&self, name: &str) -> Result<TagMaster> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        let row = tx
            .query_one(
                r#"INSERT INTO "tag_masters" ("name") VALUES ($1)
                   RETURNING "id", "name", "created_at", "updated_at""#,
                &[&name],
            )
            .await?;
        let tag = TagMaster::try_from(&row)?;
        tx.commit().await?;
        Ok(tag)
    }

    /// Tag a question. Attaching the same tag twice is a no-op.
    pub async fn attach_to_question(&self, question_id: i64, tag_id: i64) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        tx.execute(
            r#"INSERT INTO "question_tags" ("question_id", "tag_id") VALUES ($1, $2)
               ON CONFLICT ("question_id", "tag_id") DO NOTHING"#,
            &[&question_id, &tag_id],
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Tag an answer. Attaching the same tag twice is a no-op.
    pub async fn attach_to_answer(&self, answer_id: i64, tag_id: i64) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        tx.execute(
            r#"INSERT INTO "answer_tags" ("answer_id", "tag_id") VALUES ($1, $2)
               ON CONFLICT ("answer_id", "tag_id") DO NOTHING"#,
            &[&answer_id, &tag_id],
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn tags_for_question(&self, question_id: i64) -> Result<Vec<TagMaster>> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                r#"SELECT t."id", t."name", t."created_at", t."updated_at"
                   FROM "tag_masters" t
                   JOIN "question_tags" qt ON qt."tag_id" = t."id"
                   WHERE qt."question_id" = $1
                   ORDER BY t."name", t."id""#,
                &[&question_id],
            )
            .await?;
        Ok(decode_all(&rows)?)
    }

    pub async fn tags_for_answer(&self, answer_id: i64) -> Result<Vec<TagMaster>> {
        let conn = self.pool.get().await?;
        let rows = conn
            .query(
                r#"SELECT t."id", t."name", t."created_at", t."updated_at"
                   FROM "tag_masters" t
                   JOIN "answer_tags" at ON at."tag_id" = t."id"
                   WHERE at."answer_id" = $1
                   ORDER BY t."name", t."id""#,
                &[&answer_id],
            )
            .await?;
        Ok(decode_all(&rows)?)
    }
}
