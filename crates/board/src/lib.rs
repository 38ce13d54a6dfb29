//! Q&A board persistence flow over Postgres.
//!
//! This crate provides:
//! - The board schema as ordered Rust migrations
//! - Repositories for questions, answers, likes, users and tags
//! - Question/answer services generic over their repositories
//! - A cached feature-flag gate with an injectable cache client
//! - Framework-free controller contracts returning typed view models
//! - The migration safety check behind `board safety-check`
//!
//! # Layering
//!
//! ```text
//! controller (auth + validation) -> service -> repository -> Postgres
//! ```
//!
//! Repositories never validate input and never translate store errors: a
//! foreign key or unique violation comes back as [`Error::Postgres`], and
//! [`Error::constraint_violation`] classifies it for callers that care.
//!
//! # Table names
//!
//! Tables use plural names (`users`, `questions`, `answers`, `answer_likes`),
//! matching the schema the rest of the board already talks to. Junction tables
//! join the singular forms: `question_tags`, `answer_tags`.
//!
//! # Example
//!
//! ```ignore
//! let config = board::Config::from_env()?;
//! let pool = board::pool::connect(&config)?;
//!
//! let mut conn = pool.get().await?;
//! board::MigrationRunner::new(&mut conn).migrate().await?;
//!
//! let questions = board::QuestionService::new(
//!     board::PgQuestionRepository::new(pool.clone()),
//!     config.toppage_questions_count,
//! );
//! let top = questions.question_list_for_top().await?;
//! ```

pub mod config;
pub mod controller;
mod error;
pub mod flags;
mod migrate;
pub mod migrations;
pub mod model;
pub mod pool;
pub mod repository;
pub mod safety;
pub mod service;
#[cfg(test)]
mod testing;
mod traced;
pub mod view;

pub use config::{Config, ConfigError};
pub use error::{ConstraintViolation, Error, MigrationError};
pub use flags::{FeatureFlags, FlagCache, FlagStore, MemoryCache, MemoryFlagStore};
pub use migrate::{
    Migration, MigrationContext, MigrationFn, MigrationRunner, MigrationStatus, RollbackProbe,
    migration_version,
};
pub use model::{Answer, AnswerLike, Question, TagMaster, User};
pub use repository::{
    AnswerRepository, LikeRepository, PgAnswerRepository, PgLikeRepository, PgQuestionRepository,
    QuestionRepository, TagRepository, UserRepository,
};
pub use service::{AnswerService, QuestionService};
pub use traced::{TracedObject, TracedPool, TracedTransaction};

/// Result type for board operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for migration functions, captures caller location on error.
pub type MigrationResult<T> = std::result::Result<T, MigrationError>;
