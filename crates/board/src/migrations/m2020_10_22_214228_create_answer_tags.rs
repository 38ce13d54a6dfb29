//! Migration: create_answer_tags

use super::Step;
use crate::{Migration, MigrationContext, migration_version};

pub const MIGRATION: Migration = Migration::new(migration_version(file!()), up).with_down(down);

fn up<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.batch_execute(
            r#"
CREATE TABLE "answer_tags" (
    "id" BIGSERIAL PRIMARY KEY,
    "answer_id" BIGINT NOT NULL,
    "tag_id" BIGINT NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT "answer_tags_answer_id_foreign" FOREIGN KEY ("answer_id")
        REFERENCES "answers" ("id") ON UPDATE CASCADE ON DELETE CASCADE,
    CONSTRAINT "answer_tags_tag_id_foreign" FOREIGN KEY ("tag_id")
        REFERENCES "tag_masters" ("id") ON UPDATE CASCADE ON DELETE CASCADE,
    CONSTRAINT "answer_tags_answer_id_tag_id_unique" UNIQUE ("answer_id", "tag_id")
);
"#,
        )
        .await?;
        Ok(())
    })
}

fn down<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.execute(r#"DROP TABLE IF EXISTS "answer_tags""#).await?;
        Ok(())
    })
}
