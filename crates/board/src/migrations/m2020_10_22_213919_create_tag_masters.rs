//! Migration: create_tag_masters

use super::Step;
use crate::{Migration, MigrationContext, migration_version};

pub const MIGRATION: Migration = Migration::new(migration_version(file!()), up).with_down(down);

fn up<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.batch_execute(
            r#"
CREATE TABLE IF NOT EXISTS "tag_masters" (
    "id" BIGSERIAL PRIMARY KEY,
    "name" VARCHAR(255) NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TRIGGER "tag_masters_touch_updated_at" BEFORE UPDATE ON "tag_masters"
    FOR EACH ROW EXECUTE FUNCTION board_touch_updated_at();
"#,
        )
        .await?;
        Ok(())
    })
}

fn down<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.execute(r#"DROP TABLE IF EXISTS "tag_masters""#).await?;
        Ok(())
    })
}
