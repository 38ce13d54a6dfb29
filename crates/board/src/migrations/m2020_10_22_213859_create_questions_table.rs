//! Migration: create_questions_table

use super::Step;
use crate::{Migration, MigrationContext, migration_version};

pub const MIGRATION: Migration = Migration::new(migration_version(file!()), up).with_down(down);

fn up<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.batch_execute(
            r#"
CREATE TABLE "questions" (
    "id" BIGSERIAL PRIMARY KEY,
    "title" VARCHAR(255) NOT NULL,
    "content" TEXT NOT NULL,
    "user_id" BIGINT NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT "questions_user_id_foreign" FOREIGN KEY ("user_id") REFERENCES "users" ("id")
);

CREATE INDEX "questions_user_id_index" ON "questions" ("user_id");
CREATE INDEX "questions_created_at_index" ON "questions" ("created_at");

CREATE TRIGGER "questions_touch_updated_at" BEFORE UPDATE ON "questions"
    FOR EACH ROW EXECUTE FUNCTION board_touch_updated_at();
"#,
        )
        .await?;
        Ok(())
    })
}

fn down<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.execute(r#"DROP TABLE "questions""#).await?;
        Ok(())
    })
}
