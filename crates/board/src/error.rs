use std::panic::Location;

use thiserror::Error;
use tokio_postgres::error::SqlState;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("failed to build connection pool: {0}")]
    BuildPool(#[from] deadpool_postgres::BuildError),

    #[error("migration failed: {0}")]
    Migration(#[from] MigrationError),

    #[error("migration {version} has no down step")]
    NoDownStep { version: String },
}

/// A store-level integrity violation, as reported by Postgres.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// A referenced row does not exist (or is still referenced).
    ForeignKey { constraint: Option<String> },

    /// A unique index rejected a duplicate.
    Unique { constraint: Option<String> },
}

impl Error {
    /// Classify this error as an integrity violation, if it is one.
    ///
    /// Repositories propagate store errors untouched; this is for the
    /// controller boundary, which decides how a violation is presented.
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        let Error::Postgres(err) = self else {
            return None;
        };
        let db = err.as_db_error()?;
        let constraint = db.constraint().map(str::to_owned);

        if *db.code() == SqlState::FOREIGN_KEY_VIOLATION {
            Some(ConstraintViolation::ForeignKey { constraint })
        } else if *db.code() == SqlState::UNIQUE_VIOLATION {
            Some(ConstraintViolation::Unique { constraint })
        } else {
            None
        }
    }

    /// Shorthand for "a unique index rejected this write".
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.constraint_violation(),
            Some(ConstraintViolation::Unique { .. })
        )
    }

    /// Shorthand for "a foreign key rejected this write".
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self.constraint_violation(),
            Some(ConstraintViolation::ForeignKey { .. })
        )
    }
}

/// Error raised inside a migration body.
///
/// The `?` operator records where the failing statement lives, so a broken
/// migration points at its own source line instead of at the runner.
#[derive(Debug, Error)]
#[error("{source} (at {location})")]
pub struct MigrationError {
    #[source]
    pub source: tokio_postgres::Error,
    pub location: &'static Location<'static>,
}

impl From<tokio_postgres::Error> for MigrationError {
    #[track_caller]
    fn from(source: tokio_postgres::Error) -> Self {
        Self {
            source,
            location: Location::caller(),
        }
    }
}
