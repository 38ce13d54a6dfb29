//! Migration: create_answers_table
//!
//! Deleting a question does not cascade to its answers.

use super::Step;
use crate::{Migration, MigrationContext, migration_version};

pub const MIGRATION: Migration = Migration::new(migration_version(file!()), up).with_down(down);

fn up<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.batch_execute(
            r#"
CREATE TABLE "answers" (
    "id" BIGSERIAL PRIMARY KEY,
    "content" TEXT NOT NULL,
    "user_id" BIGINT NOT NULL,
    "question_id" BIGINT NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT "answers_user_id_foreign" FOREIGN KEY ("user_id") REFERENCES "users" ("id"),
    CONSTRAINT "answers_question_id_foreign" FOREIGN KEY ("question_id") REFERENCES "questions" ("id")
);

CREATE INDEX "answers_question_id_index" ON "answers" ("question_id");

CREATE TRIGGER "answers_touch_updated_at" BEFORE UPDATE ON "answers"
    FOR EACH ROW EXECUTE FUNCTION board_touch_updated_at();
"#,
        )
        .await?;
        Ok(())
    })
}

fn down<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.execute(r#"DROP TABLE "answers""#).await?;
        Ok(())
    })
}
