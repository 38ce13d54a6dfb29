//! Migration: create_users_table
//!
//! Also installs `board_touch_updated_at()`, the trigger function every
//! table uses to refresh `updated_at` on UPDATE.

use super::Step;
use crate::{Migration, MigrationContext, migration_version};

pub const MIGRATION: Migration = Migration::new(migration_version(file!()), up).with_down(down);

fn up<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.batch_execute(
            r#"
CREATE OR REPLACE FUNCTION board_touch_updated_at() RETURNS trigger AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TABLE "users" (
    "id" BIGSERIAL PRIMARY KEY,
    "name" VARCHAR(255) NOT NULL,
    "email" VARCHAR(255) NOT NULL,
    "email_verified_at" TIMESTAMPTZ,
    "password" VARCHAR(255) NOT NULL,
    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT "users_email_unique" UNIQUE ("email")
);

CREATE TRIGGER "users_touch_updated_at" BEFORE UPDATE ON "users"
    FOR EACH ROW EXECUTE FUNCTION board_touch_updated_at();
"#,
        )
        .await?;
        Ok(())
    })
}

fn down<'a>(ctx: &'a MigrationContext<'_>) -> Step<'a> {
    Box::pin(async move {
        ctx.execute(r#"DROP TABLE "users""#).await?;
        ctx.execute("DROP FUNCTION board_touch_updated_at()").await?;
        Ok(())
    })
}
