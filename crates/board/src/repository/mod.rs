//! Data access, one repository per aggregate.
//!
//! Question, answer and like access sit behind traits so the services above
//! them can be exercised with in-memory doubles. Users and tags are only
//! touched by seeding and tests, so they are concrete.
//!
//! Writes run in a transaction scoped to the call. Nothing here validates
//! input or catches store errors.

mod answer;
mod like;
mod question;
mod tag;
mod user;

pub use answer::{AnswerRepository, PgAnswerRepository};
pub use like::{LikeRepository, PgLikeRepository};
pub use question::{PgQuestionRepository, QuestionRepository};
pub use tag::TagRepository;
pub use user::UserRepository;

/// Convert a caller-facing row limit into a SQL `LIMIT` parameter.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
