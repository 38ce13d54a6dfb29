//! Pre-migration safety check.
//!
//! Inspects the live schema, the migration bookkeeping and the migration
//! safety flags, and collects what it finds into a [`SafetyReport`]. The
//! report is informational: problems become [`Status::Fail`] or
//! [`Status::Warn`] findings, never errors. Only failing to talk to the
//! database at all is an error.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::flags::{FeatureFlags, MIGRATION_SAFETY_FLAGS, UPGRADE_FLAGS};
use crate::migrations::{REQUIRED_FOREIGN_KEYS, REQUIRED_TABLES};
use crate::{MigrationRunner, MigrationStatus, Result, RollbackProbe, TracedObject};

/// Oldest Postgres release the schema is written against (`server_version_num`).
pub const MIN_SERVER_VERSION_NUM: i32 = 130_000;

const LIST_TABLES: &str = r#"
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema = current_schema()
"#;

const COLUMN_EXISTS: &str = r#"
SELECT EXISTS (
    SELECT 1 FROM information_schema.columns
    WHERE table_schema = current_schema()
      AND table_name = $1::text
      AND column_name = $2::text
)
"#;

const FOREIGN_KEY_EXISTS: &str = r#"
SELECT EXISTS (
    SELECT 1
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON kcu.constraint_name = tc.constraint_name
     AND kcu.table_schema = tc.table_schema
    WHERE tc.constraint_type = 'FOREIGN KEY'
      AND tc.table_schema = current_schema()
      AND tc.table_name = $1::text
      AND kcu.column_name = $2::text
)
"#;

/// Which optional sections to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetyOptions {
    /// Prepare a backup location before checking.
    pub backup: bool,
    /// Replay the latest migration inside a rolled-back transaction.
    pub rollback_test: bool,
    /// Check the server and extension versions.
    pub dependency_check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub status: Status,
    pub message: String,
}

impl Finding {
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Status::Ok, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Status::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Status::Fail, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Status::Info, message)
    }

    fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub findings: Vec<Finding>,
}

impl Section {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            findings: Vec::new(),
        }
    }

    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafetyReport {
    pub sections: Vec<Section>,
}

impl SafetyReport {
    pub fn count(&self, status: Status) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.findings)
            .filter(|f| f.status == status)
            .count()
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// Runs the safety check over one connection.
pub struct SafetyCheck<'a> {
    conn: &'a mut TracedObject,
    flags: &'a FeatureFlags,
    backup_dir: PathBuf,
}

impl<'a> SafetyCheck<'a> {
    pub fn new(conn: &'a mut TracedObject, flags: &'a FeatureFlags, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            conn,
            flags,
            backup_dir: backup_dir.into(),
        }
    }

    pub async fn run(&mut self, options: SafetyOptions) -> Result<SafetyReport> {
        tracing::info!(?options, "starting migration safety check");
        let mut report = SafetyReport::default();

        if options.backup {
            let now = chrono::Local::now().naive_local();
            report
                .sections
                .push(backup_section(self.flags, &self.backup_dir, now));
        }

        report.sections.push(flag_section(self.flags));
        report.sections.push(self.structure_section().await?);

        let statuses = MigrationRunner::new(self.conn).status().await?;
        report.sections.push(migration_section(&statuses));

        if options.rollback_test {
            report.sections.push(self.rollback_section().await?);
        }

        if options.dependency_check {
            report.sections.push(self.dependency_section().await?);
        }

        let summary = summary_section(&report, self.flags, options);
        report.sections.push(summary);

        tracing::info!(
            failures = report.count(Status::Fail),
            warnings = report.count(Status::Warn),
            "migration safety check finished"
        );
        Ok(report)
    }

    async fn structure_section(&self) -> Result<Section> {
        let rows = self.conn.query(LIST_TABLES, &[]).await?;
        let present: Vec<String> = rows
            .iter()
            .map(|row| row.try_get(0))
            .collect::<std::result::Result<_, _>>()?;

        let mut section = table_section(&present);
        section.push(Finding::info("Checking foreign key constraints"));

        for &(table, column, reference) in REQUIRED_FOREIGN_KEYS {
            let has_column: bool = self
                .conn
                .query_one(COLUMN_EXISTS, &[&table, &column])
                .await?
                .try_get(0)?;
            let has_constraint: bool = self
                .conn
                .query_one(FOREIGN_KEY_EXISTS, &[&table, &column])
                .await?
                .try_get(0)?;
            section.push(foreign_key_finding(
                table,
                column,
                reference,
                has_column,
                has_constraint,
            ));
        }
        Ok(section)
    }

    async fn rollback_section(&mut self) -> Result<Section> {
        let mut section = Section::new("Migration Rollback Safety");
        if !self.flags.is_enabled("migration_rollback_protection") {
            section.push(Finding::warn(
                "Migration rollback protection is disabled - skipping rollback test",
            ));
            return Ok(section);
        }

        section.push(Finding::info(
            "Replaying the latest migration (down, up) inside a transaction that is rolled back",
        ));
        let probe = MigrationRunner::new(self.conn).rollback_probe().await;
        section.push(rollback_finding(probe));
        Ok(section)
    }

    async fn dependency_section(&self) -> Result<Section> {
        let mut section = Section::new("Upgrade Dependencies");

        let row = self
            .conn
            .query_one(
                "SELECT current_setting('server_version'), current_setting('server_version_num')::int4",
                &[],
            )
            .await?;
        let version: String = row.try_get(0)?;
        let version_num: i32 = row.try_get(1)?;

        section.push(Finding::info(format!("PostgreSQL version: {version}")));
        section.push(server_version_finding(version_num));

        let plpgsql: bool = self
            .conn
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'plpgsql')",
                &[],
            )
            .await?
            .try_get(0)?;
        section.push(if plpgsql {
            Finding::ok("plpgsql extension installed")
        } else {
            Finding::fail("plpgsql extension missing (needed by the updated_at trigger)")
        });

        section.push(Finding::info(format!(
            "board version: {}",
            env!("CARGO_PKG_VERSION")
        )));
        Ok(section)
    }
}

/// Path of the backup prepared at `now`.
pub fn backup_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(format!(
        "migration_safety_backup_{}.sql",
        now.format("%Y_%m_%d_%H%M%S")
    ))
}

/// Prepare the backup location. The dump itself is left to `pg_dump`.
pub fn backup_section(flags: &FeatureFlags, dir: &Path, now: NaiveDateTime) -> Section {
    let mut section = Section::new("Database Backup");
    if !flags.is_enabled("database_backup_before_migration") {
        section.push(Finding::warn("Database backup feature flag is disabled"));
        return section;
    }

    let path = backup_path(dir, now);
    if let Err(err) = std::fs::create_dir_all(dir) {
        section.push(Finding::fail(format!(
            "Could not create backup directory {}: {err}",
            dir.display()
        )));
        return section;
    }

    section.push(Finding::info(format!("Backup path: {}", path.display())));
    section.push(Finding::ok("Database backup preparation completed"));
    section
}

pub fn flag_section(flags: &FeatureFlags) -> Section {
    let mut section = Section::new("Feature Flags");
    for (group, names) in [
        ("Migration safety", MIGRATION_SAFETY_FLAGS),
        ("Framework upgrade", UPGRADE_FLAGS),
    ] {
        section.push(Finding::info(format!("{group} flags:")));
        for name in names {
            section.push(if flags.is_enabled(name) {
                Finding::ok(format!("{name}: enabled"))
            } else {
                Finding::warn(format!("{name}: disabled"))
            });
        }
    }
    section
}

/// Required tables, given the tables present in the schema.
pub fn table_section(present: &[String]) -> Section {
    let mut section = Section::new("Database Structure");
    let missing: Vec<&str> = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|table| !present.iter().any(|p| p == table))
        .collect();

    section.push(if missing.is_empty() {
        Finding::ok("All required tables are present")
    } else {
        Finding::fail(format!("Missing tables: {}", missing.join(", ")))
    });
    section
}

pub fn foreign_key_finding(
    table: &str,
    column: &str,
    reference: &str,
    has_column: bool,
    has_constraint: bool,
) -> Finding {
    match (has_column, has_constraint) {
        (false, _) => Finding::fail(format!("Missing column: {table}.{column}")),
        (true, false) => Finding::warn(format!(
            "{table}.{column} has no foreign key to {reference}"
        )),
        (true, true) => Finding::ok(format!("{table}.{column} -> {reference}")),
    }
}

pub fn migration_section(statuses: &[MigrationStatus]) -> Section {
    let mut section = Section::new("Migration Status");
    let applied = statuses.iter().filter(|s| s.applied).count();

    section.push(Finding::info(format!("Applied migrations: {applied}")));
    section.push(Finding::info(format!("Registered migrations: {}", statuses.len())));

    if applied == statuses.len() {
        section.push(Finding::ok("All migrations are applied"));
    } else {
        section.push(Finding::warn("Some migrations are not applied"));
        for status in statuses.iter().filter(|s| !s.applied) {
            section.push(Finding::info(format!("pending: {}", status.version)));
        }
    }
    section
}

pub fn rollback_finding(probe: Result<Option<RollbackProbe>>) -> Finding {
    match probe {
        Ok(None) => Finding::info("No applied migrations to roll back"),
        Ok(Some(probe)) if probe.preserved() => Finding::ok(format!(
            "Rollback test passed for {} - database structure preserved",
            probe.version
        )),
        Ok(Some(probe)) => Finding::fail(format!(
            "Rollback test failed for {} - table count changed from {} to {}",
            probe.version, probe.tables_before, probe.tables_after
        )),
        Err(err) => Finding::fail(format!("Rollback test failed: {err}")),
    }
}

pub fn server_version_finding(version_num: i32) -> Finding {
    if version_num >= MIN_SERVER_VERSION_NUM {
        Finding::ok("PostgreSQL version is supported")
    } else {
        Finding::fail("PostgreSQL 13 or newer is required")
    }
}

/// One line per completed step: ok, or failed if its section recorded a failure.
fn step_finding(report: &SafetyReport, title: &str, done: &str) -> Finding {
    let failures = report.section(title).map_or(0, |section| {
        section
            .findings
            .iter()
            .filter(|f| f.status == Status::Fail)
            .count()
    });
    match failures {
        0 => Finding::ok(done),
        n => Finding::fail(format!("{title}: {n} failure(s)")),
    }
}

pub fn summary_section(report: &SafetyReport, flags: &FeatureFlags, options: SafetyOptions) -> Section {
    let mut section = Section::new("Summary");
    section.push(step_finding(report, "Database Structure", "Database structure verified"));
    section.push(Finding::ok("Feature flags checked"));
    section.push(step_finding(report, "Migration Status", "Migration status verified"));
    if options.rollback_test {
        section.push(step_finding(report, "Migration Rollback Safety", "Rollback safety tested"));
    }
    if options.dependency_check {
        section.push(step_finding(report, "Upgrade Dependencies", "Dependencies verified"));
    }

    section.push(Finding::info("Migration safety check completed"));
    section.push(if flags.is_enabled("safe_migration_mode") {
        Finding::ok("Safe migration mode is ENABLED - proceed with confidence")
    } else {
        Finding::warn("Safe migration mode is DISABLED - enable for maximum safety")
    });
    section
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::flags::{MemoryCache, MemoryFlagStore};

    fn flags(pairs: &[(&str, bool)]) -> FeatureFlags {
        FeatureFlags::new(
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryFlagStore::from_flags(pairs.iter().copied())),
        )
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 26)
            .and_then(|d| d.and_hms_opt(16, 20, 5))
            .unwrap()
    }

    #[test]
    fn backup_path_is_timestamped() {
        let path = backup_path(Path::new("storage/backups"), at());
        assert_eq!(
            path,
            PathBuf::from("storage/backups/migration_safety_backup_2025_05_26_162005.sql")
        );
    }

    #[test]
    fn backup_is_gated_by_its_flag() {
        let dir = std::env::temp_dir().join(format!("board-backup-test-{}", std::process::id()));
        let disabled = backup_section(&flags(&[]), &dir, at());
        assert_eq!(
            disabled.findings,
            [Finding::warn("Database backup feature flag is disabled")]
        );
        assert!(!dir.exists());

        let enabled = backup_section(&flags(&[("database_backup_before_migration", true)]), &dir, at());
        assert_eq!(enabled.findings.last().map(|f| f.status), Some(Status::Ok));
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_tables_are_failures() {
        let present = vec!["users".to_owned(), "answers".to_owned()];
        let section = table_section(&present);
        assert_eq!(
            section.findings,
            [Finding::fail("Missing tables: questions, _board_migrations")]
        );

        let all: Vec<String> = REQUIRED_TABLES.iter().map(|t| t.to_string()).collect();
        assert_eq!(table_section(&all).findings[0].status, Status::Ok);
    }

    #[test]
    fn foreign_key_states() {
        assert_eq!(
            foreign_key_finding("answers", "user_id", "users.id", false, false).status,
            Status::Fail
        );
        assert_eq!(
            foreign_key_finding("answers", "user_id", "users.id", true, false).status,
            Status::Warn
        );
        assert_eq!(
            foreign_key_finding("answers", "user_id", "users.id", true, true),
            Finding::ok("answers.user_id -> users.id")
        );
    }

    #[test]
    fn pending_migrations_are_listed() {
        let statuses = [
            MigrationStatus {
                version: "2014_10_12_000000_create_users_table",
                name: "create_users_table",
                applied: true,
                applied_at: None,
            },
            MigrationStatus {
                version: "2020_10_22_213859_create_questions_table",
                name: "create_questions_table",
                applied: false,
                applied_at: None,
            },
        ];
        let section = migration_section(&statuses);
        let statuses: Vec<Status> = section.findings.iter().map(|f| f.status).collect();
        assert_eq!(statuses, [Status::Info, Status::Info, Status::Warn, Status::Info]);
        assert_eq!(
            section.findings[3].message,
            "pending: 2020_10_22_213859_create_questions_table"
        );
    }

    #[test]
    fn rollback_outcomes() {
        let probe = |before, after| {
            Ok(Some(RollbackProbe {
                version: "2025_05_26_162000_create_answer_likes_table",
                tables_before: before,
                tables_after: after,
            }))
        };
        assert_eq!(rollback_finding(probe(9, 9)).status, Status::Ok);
        assert_eq!(rollback_finding(probe(9, 8)).status, Status::Fail);
        assert_eq!(rollback_finding(Ok(None)).status, Status::Info);
    }

    #[test]
    fn server_versions() {
        assert_eq!(server_version_finding(160_002).status, Status::Ok);
        assert_eq!(server_version_finding(120_015).status, Status::Fail);
    }

    #[test]
    fn summary_reflects_options_and_safe_mode() {
        let on = summary_section(
            &SafetyReport::default(),
            &flags(&[("safe_migration_mode", true)]),
            SafetyOptions {
                rollback_test: true,
                ..SafetyOptions::default()
            },
        );
        assert!(on.findings.contains(&Finding::ok("Rollback safety tested")));
        assert!(!on.findings.contains(&Finding::ok("Dependencies verified")));
        assert_eq!(on.findings.last().map(|f| f.status), Some(Status::Ok));

        let off = summary_section(&SafetyReport::default(), &flags(&[]), SafetyOptions::default());
        assert_eq!(off.findings.last().map(|f| f.status), Some(Status::Warn));
    }

    #[test]
    fn summary_carries_section_failures() {
        let report = SafetyReport {
            sections: vec![
                table_section(&["users".to_owned()]),
                Section {
                    title: "Migration Status",
                    findings: vec![Finding::info("Registered migrations: 7")],
                },
            ],
        };

        let summary = summary_section(&report, &flags(&[]), SafetyOptions::default());
        assert_eq!(summary.findings[0], Finding::fail("Database Structure: 1 failure(s)"));
        assert_eq!(summary.findings[2], Finding::ok("Migration status verified"));
    }

    #[test]
    fn flag_section_lists_both_groups() {
        let section = flag_section(&flags(&[("safe_migration_mode", true)]));
        assert_eq!(section.findings.len(), 2 + MIGRATION_SAFETY_FLAGS.len() + UPGRADE_FLAGS.len());
        assert!(section.findings.contains(&Finding::ok("safe_migration_mode: enabled")));
        assert!(section.findings.contains(&Finding::warn("laravel_upgrade_new_syntax: disabled")));
    }
}
