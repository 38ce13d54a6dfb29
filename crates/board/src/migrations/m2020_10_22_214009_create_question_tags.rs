//! Migration: create_question_tags

use super::Step;
use crate::{Migration, MigrationContext, migration_version};

pub const MIGRATION: Migration = Migration::new(migration_version(file!()), up).with_down(down);

fn up<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.batch_execute(
            r#"
CREATE TABLE "question_tags" (
    "id" BIGSERIAL PRIMARY KEY,
    "question_id" BIGINT NOT NULL,
    "tag_id" BIGINT NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT "question_tags_question_id_foreign" FOREIGN KEY ("question_id")
        REFERENCES "questions" ("id") ON UPDATE CASCADE ON DELETE CASCADE,
    CONSTRAINT "question_tags_tag_id_foreign" FOREIGN KEY ("tag_id")
        REFERENCES "tag_masters" ("id") ON UPDATE CASCADE ON DELETE CASCADE,
    CONSTRAINT "question_tags_question_id_tag_id_unique" UNIQUE ("question_id", "tag_id")
);
"#,
        )
        .await?;
        Ok(())
    })
}

fn down<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.execute(r#"DROP TABLE IF EXISTS "question_tags""#).await?;
        Ok(())
    })
}
