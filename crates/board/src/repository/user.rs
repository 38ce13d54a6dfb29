use crate::model::User;
use crate::{Result, TracedPool};

const USER_COLUMNS: &str =
    r#""id", "name", "email", "password", "email_verified_at", "created_at", "updated_at""#;

/// Access to the `users` table.
///
/// Registration and password hashing belong to the auth layer; this stores
/// whatever hash it is handed.
#[derive(Clone)]
pub struct UserRepository {
    pool: TracedPool,
}

impl UserRepository {
    pub fn new(pool: TracedPool) -> Self {
        Self { pool }
    }

    /// Insert a user. A taken email is a unique-violation store error.
    pub async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let sql = format!(
            r#"INSERT INTO "users" ("name", "email", "password") VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"#
        );
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;
        let row = tx.query_one(&sql, &[&name, &email, &password_hash]).await?;
        let user = User::try_from(&row)?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM "users" WHERE "id" = $1"#);
        let conn = self.pool.get().await?;
        let row = conn.query_opt(&sql, &[&id]).await?;
        Ok(row.as_ref().map(User::try_from).transpose()?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM "users" WHERE "email" = $1"#);
        let conn = self.pool.get().await?;
        let row = conn.query_opt(&sql, &[&email]).await?;
        Ok(row.as_ref().map(User::try_from).transpose()?)
    }
}
