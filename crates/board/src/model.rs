//! Row types for the board schema.
//!
//! Each type maps one table (plus, for [`Answer`], its like count). Rows are
//! decoded by column name, so `SELECT` lists may be in any order.

use chrono::{DateTime, Utc};
use tokio_postgres::Row;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Unique across users.
    pub email: String,
    /// Password hash, as produced by the auth layer.
    pub password: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A question posted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Author (`users.id`).
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An answer to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub id: i64,
    pub content: String,
    /// Author (`users.id`).
    pub user_id: i64,
    /// The question answered (`questions.id`).
    pub question_id: i64,
    /// Number of `answer_likes` rows pointing at this answer.
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One user liking one answer. `(user_id, answer_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLike {
    pub id: i64,
    pub user_id: i64,
    pub answer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tag that can be attached to questions and answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMaster {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Row> for User {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            email_verified_at: row.try_get("email_verified_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<&Row> for Question {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<&Row> for Answer {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            user_id: row.try_get("user_id")?,
            question_id: row.try_get("question_id")?,
            likes_count: row.try_get("likes_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<&Row> for AnswerLike {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            answer_id: row.try_get("answer_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<&Row> for TagMaster {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Decode every row, stopping at the first column that fails to convert.
pub(crate) fn decode_all<T>(rows: &[Row]) -> Result<Vec<T>, tokio_postgres::Error>
where
    T: for<'r> TryFrom<&'r Row, Error = tokio_postgres::Error>,
{
    rows.iter().map(T::try_from).collect()
}
