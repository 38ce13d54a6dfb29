//! Migration: create_answer_likes_table
//!
//! A user may like a given answer at most once.

use super::Step;
use crate::{Migration, MigrationContext, migration_version};

pub const MIGRATION: Migration = Migration::new(migration_version(file!()), up).with_down(down);

fn up<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.batch_execute(
            r#"
CREATE TABLE "answer_likes" (
    "id" BIGSERIAL PRIMARY KEY,
    "user_id" BIGINT NOT NULL,
    "answer_id" BIGINT NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT "answer_likes_user_id_foreign" FOREIGN KEY ("user_id")
        REFERENCES "users" ("id") ON UPDATE CASCADE ON DELETE CASCADE,
    CONSTRAINT "answer_likes_answer_id_foreign" FOREIGN KEY ("answer_id")
        REFERENCES "answers" ("id") ON UPDATE CASCADE ON DELETE CASCADE,
    CONSTRAINT "answer_likes_user_id_answer_id_unique" UNIQUE ("user_id", "answer_id")
);

CREATE INDEX "answer_likes_answer_id_index" ON "answer_likes" ("answer_id");
"#,
        )
        .await?;
        Ok(())
    })
}

fn down<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.execute(r#"DROP TABLE "answer_likes""#).await?;
        Ok(())
    })
}
