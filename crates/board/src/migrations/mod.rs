//! Board schema migrations, oldest first.
//!
//! Each file exports a `MIGRATION` whose version is derived from its own file
//! name, so renaming a file renames the migration.

use std::future::Future;
use std::pin::Pin;

use crate::{Migration, MigrationResult};

mod m2014_10_12_000000_create_users_table;
mod m2020_10_22_213859_create_questions_table;
mod m2020_10_22_213919_create_tag_masters;
mod m2020_10_22_213935_create_answers_table;
mod m2020_10_22_214009_create_question_tags;
mod m2020_10_22_214228_create_answer_tags;
mod m2025_05_26_162000_create_answer_likes_table;

/// Future returned by a migration step.
pub(crate) type Step<'a> = Pin<Box<dyn Future<Output = MigrationResult<()>> + Send + 'a>>;

/// Every board migration.
pub static ALL: &[Migration] = &[
    m2014_10_12_000000_create_users_table::MIGRATION,
    m2020_10_22_213859_create_questions_table::MIGRATION,
    m2020_10_22_213919_create_tag_masters::MIGRATION,
    m2020_10_22_213935_create_answers_table::MIGRATION,
    m2020_10_22_214009_create_question_tags::MIGRATION,
    m2020_10_22_214228_create_answer_tags::MIGRATION,
    m2025_05_26_162000_create_answer_likes_table::MIGRATION,
];

/// Tables the application cannot run without.
pub const REQUIRED_TABLES: &[&str] = &["users", "questions", "answers", crate::migrate::MIGRATIONS_TABLE];

/// Foreign keys the application relies on: `(table, column, references)`.
pub const REQUIRED_FOREIGN_KEYS: &[(&str, &str, &str)] = &[
    ("questions", "user_id", "users.id"),
    ("answers", "user_id", "users.id"),
    ("answers", "question_id", "questions.id"),
];
