//! Migration runner.
//!
//! Migrations are plain Rust functions listed in [`crate::migrations::ALL`].
//! Each one runs inside its own transaction together with the bookkeeping
//! insert, so a failing migration leaves neither schema changes nor a
//! `_board_migrations` row behind.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::traced::{TracedObject, TracedTransaction};
use crate::{Error, MigrationError, MigrationResult, Result};

/// Bookkeeping table recording applied migrations.
pub const MIGRATIONS_TABLE: &str = "_board_migrations";

const CREATE_MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "_board_migrations" (
    "version" TEXT PRIMARY KEY,
    "name" TEXT NOT NULL,
    "applied_at" TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const COUNT_TABLES: &str = r#"
SELECT count(*) FROM information_schema.tables
WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'
"#;

/// Type alias for migration functions.
///
/// A migration borrows the [`MigrationContext`] for the duration of its
/// future. Returning [`MigrationResult`] lets `?` record the source location
/// of the failing statement.
pub type MigrationFn = for<'a, 'c> fn(
    &'a MigrationContext<'c>,
) -> Pin<Box<dyn Future<Output = MigrationResult<()>> + Send + 'a>>;

/// A registered migration.
#[derive(Clone, Copy)]
pub struct Migration {
    /// Sortable version, e.g. `2020_10_22_213859_create_questions_table`.
    pub version: &'static str,
    pub up: MigrationFn,
    pub down: Option<MigrationFn>,
}

impl Migration {
    pub const fn new(version: &'static str, up: MigrationFn) -> Self {
        Self {
            version,
            up,
            down: None,
        }
    }

    pub const fn with_down(mut self, down: MigrationFn) -> Self {
        self.down = Some(down);
        self
    }

    /// The human part of the version: everything after the timestamp.
    pub fn name(&self) -> &'static str {
        // yyyy_mm_dd_hhmmss_
        self.version.get(18..).unwrap_or(self.version)
    }
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("reversible", &self.down.is_some())
            .finish()
    }
}

/// Derive a migration version from its source path.
///
/// `src/migrations/m2020_10_22_213859_create_questions_table.rs` becomes
/// `2020_10_22_213859_create_questions_table`. Intended for `file!()`.
pub const fn migration_version(path: &'static str) -> &'static str {
    let bytes = path.as_bytes();

    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'/' || bytes[i] == b'\\' {
            start = i + 1;
        }
        i += 1;
    }

    let mut end = bytes.len();
    if end >= start + 3
        && bytes[end - 3] == b'.'
        && bytes[end - 2] == b'r'
        && bytes[end - 1] == b's'
    {
        end -= 3;
    }

    if start < end && bytes[start] == b'm' {
        start += 1;
        if start < end && bytes[start] == b'_' {
            start += 1;
        }
    }

    let (_, tail) = bytes.split_at(start);
    let (version, _) = tail.split_at(end - start);
    match std::str::from_utf8(version) {
        Ok(v) => v,
        Err(_) => panic!("migration file name is not valid UTF-8"),
    }
}

/// Handle given to a migration body.
pub struct MigrationContext<'c> {
    tx: TracedTransaction<'c>,
    version: &'static str,
}

impl MigrationContext<'_> {
    /// Execute a single statement.
    pub async fn execute(&self, sql: &str) -> std::result::Result<u64, tokio_postgres::Error> {
        self.tx.execute(sql, &[]).await
    }

    /// Execute several `;`-separated statements at once.
    pub async fn batch_execute(&self, sql: &str) -> std::result::Result<(), tokio_postgres::Error> {
        self.tx.batch_execute(sql).await
    }

    /// The version of the migration being run.
    pub fn version(&self) -> &'static str {
        self.version
    }
}

/// Applied/pending state of one registered migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub version: &'static str,
    pub name: &'static str,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Outcome of a down-then-up replay of the latest migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackProbe {
    pub version: &'static str,
    pub tables_before: i64,
    pub tables_after: i64,
}

impl RollbackProbe {
    /// Whether replaying the migration left the table count unchanged.
    pub fn preserved(&self) -> bool {
        self.tables_before == self.tables_after
    }
}

/// Applies registered migrations over one connection.
pub struct MigrationRunner<'a> {
    conn: &'a mut TracedObject,
    migrations: &'a [Migration],
}

impl<'a> MigrationRunner<'a> {
    /// Runner over the board's own migrations.
    pub fn new(conn: &'a mut TracedObject) -> Self {
        Self::with_migrations(conn, crate::migrations::ALL)
    }

    /// Runner over an explicit migration list (sorted by version on use).
    pub fn with_migrations(conn: &'a mut TracedObject, migrations: &'a [Migration]) -> Self {
        Self { conn, migrations }
    }

    fn sorted(&self) -> Vec<&'a Migration> {
        let mut sorted: Vec<&'a Migration> = self.migrations.iter().collect();
        sorted.sort_by_key(|m| m.version);
        sorted
    }

    async fn ensure_table(&self) -> Result<()> {
        self.conn.batch_execute(CREATE_MIGRATIONS_TABLE).await?;
        Ok(())
    }

    async fn applied(&self) -> Result<Vec<(String, DateTime<Utc>)>> {
        let rows = self
            .conn
            .query(
                r#"SELECT "version", "applied_at" FROM "_board_migrations" ORDER BY "version""#,
                &[],
            )
            .await?;
        rows.iter()
            .map(|row| Ok((row.try_get(0)?, row.try_get(1)?)))
            .collect()
    }

    /// Report every registered migration with its applied state.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
        self.ensure_table().await?;
        let applied = self.applied().await?;

        Ok(self
            .sorted()
            .into_iter()
            .map(|m| {
                let applied_at = applied
                    .iter()
                    .find(|(version, _)| version == m.version)
                    .map(|(_, at)| *at);
                MigrationStatus {
                    version: m.version,
                    name: m.name(),
                    applied: applied_at.is_some(),
                    applied_at,
                }
            })
            .collect())
    }

    /// Number of rows in the bookkeeping table.
    pub async fn applied_count(&self) -> Result<i64> {
        self.ensure_table().await?;
        let row = self
            .conn
            .query_one(r#"SELECT count(*) FROM "_board_migrations""#, &[])
            .await?;
        Ok(row.try_get(0)?)
    }

    /// Apply every pending migration in version order.
    ///
    /// Returns the versions that were applied by this call.
    pub async fn migrate(&mut self) -> Result<Vec<&'static str>> {
        self.ensure_table().await?;
        let applied = self.applied().await?;
        let pending: Vec<&'a Migration> = self
            .sorted()
            .into_iter()
            .filter(|m| !applied.iter().any(|(v, _)| v == m.version))
            .collect();

        let mut ran = Vec::with_capacity(pending.len());
        for migration in pending {
            info!(version = migration.version, "applying migration");
            let tx = self.conn.transaction().await?;
            let ctx = MigrationContext {
                tx,
                version: migration.version,
            };
            (migration.up)(&ctx).await?;
            ctx.tx
                .execute(
                    r#"INSERT INTO "_board_migrations" ("version", "name") VALUES ($1, $2)"#,
                    &[&migration.version, &migration.name()],
                )
                .await?;
            ctx.tx.commit().await?;
            ran.push(migration.version);
        }

        if ran.is_empty() {
            info!("no pending migrations");
        }
        Ok(ran)
    }

    /// Replay the latest applied migration (down, then up) and roll it all back.
    ///
    /// Postgres DDL is transactional, so the database is untouched whatever
    /// the outcome. Returns `None` when nothing has been applied yet.
    pub async fn rollback_probe(&mut self) -> Result<Option<RollbackProbe>> {
        self.ensure_table().await?;
        let applied = self.applied().await?;
        let Some(latest) = self
            .sorted()
            .into_iter()
            .rev()
            .find(|m| applied.iter().any(|(v, _)| v == m.version))
        else {
            return Ok(None);
        };
        let Some(down) = latest.down else {
            return Err(Error::NoDownStep {
                version: latest.version.to_string(),
            });
        };

        let tx = self.conn.transaction().await?;
        let tables_before: i64 = tx.query_one(COUNT_TABLES, &[]).await?.try_get(0)?;

        let ctx = MigrationContext {
            tx,
            version: latest.version,
        };
        let replay = async {
            down(&ctx).await?;
            (latest.up)(&ctx).await?;
            Ok::<(), MigrationError>(())
        }
        .await;

        if let Err(err) = replay {
            warn!(version = latest.version, error = %err, "rollback replay failed");
            ctx.tx.rollback().await?;
            return Err(err.into());
        }

        let counted = ctx.tx.query_one(COUNT_TABLES, &[]).await;
        ctx.tx.rollback().await?;
        let tables_after: i64 = counted?.try_get(0)?;

        Ok(Some(RollbackProbe {
            version: latest.version,
            tables_before,
            tables_after,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_from_unix_path() {
        assert_eq!(
            migration_version("crates/board/src/migrations/m2020_10_22_213859_create_questions_table.rs"),
            "2020_10_22_213859_create_questions_table"
        );
    }

    #[test]
    fn version_from_windows_path_and_prefix_variants() {
        assert_eq!(
            migration_version(r"src\migrations\m_2014_10_12_000000_create_users_table.rs"),
            "2014_10_12_000000_create_users_table"
        );
        assert_eq!(
            migration_version("2025_05_26_162000_create_answer_likes_table"),
            "2025_05_26_162000_create_answer_likes_table"
        );
    }

    #[test]
    fn name_strips_timestamp() {
        let m = crate::migrations::ALL[0];
        assert_eq!(m.version, "2014_10_12_000000_create_users_table");
        assert_eq!(m.name(), "create_users_table");
    }

    #[test]
    fn registered_versions_are_unique_and_reversible() {
        let mut versions: Vec<_> = crate::migrations::ALL.iter().map(|m| m.version).collect();
        let count = versions.len();
        versions.sort();
        versions.dedup();
        assert_eq!(versions.len(), count);
        assert!(crate::migrations::ALL.iter().all(|m| m.down.is_some()));
    }
}
