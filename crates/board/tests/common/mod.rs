//! Shared Postgres fixture for the integration tests.
//!
//! With `POSTGRES_HOST`/`POSTGRES_PORT` set, every test gets a fresh database
//! on that server. Otherwise a throwaway container is started per test.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use board::{MigrationRunner, TracedPool, User, UserRepository};
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

pub struct TestDb {
    pub pool: TracedPool,
    pub url: String,
    _container: Option<ContainerAsync<Postgres>>,
}

impl TestDb {
    /// A migrated, empty board database.
    pub async fn new() -> Self {
        let db = Self::unmigrated().await;
        let mut conn = db.pool.get().await.unwrap();
        MigrationRunner::new(&mut conn).migrate().await.unwrap();
        drop(conn);
        db
    }

    /// A database with no board tables yet.
    pub async fn unmigrated() -> Self {
        let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".into());
        let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "postgres".into());

        let (host, port, container) = match (
            std::env::var("POSTGRES_HOST"),
            std::env::var("POSTGRES_PORT"),
        ) {
            (Ok(host), Ok(port)) => (host, port.parse::<u16>().unwrap(), None),
            _ => {
                let container = Postgres::default().start().await.unwrap();
                let host = container.get_host().await.unwrap().to_string();
                let port = container.get_host_port_ipv4(5432).await.unwrap();
                (host, port, Some(container))
            }
        };

        let server = format!("postgres://{user}:{password}@{host}:{port}");
        let url = if container.is_some() {
            format!("{server}/postgres")
        } else {
            let name = format!(
                "board_test_{}_{}",
                std::process::id(),
                NEXT_DB.fetch_add(1, Ordering::Relaxed)
            );
            let admin = board::pool::connect_url(&format!("{server}/postgres"), 1).unwrap();
            let conn = admin.get().await.unwrap();
            conn.batch_execute(&format!(r#"DROP DATABASE IF EXISTS "{name}""#))
                .await
                .unwrap();
            conn.batch_execute(&format!(r#"CREATE DATABASE "{name}""#))
                .await
                .unwrap();
            format!("{server}/{name}")
        };

        let pool = board::pool::connect_url(&url, 4).unwrap();
        Self {
            pool,
            url,
            _container: container,
        }
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub async fn user(&self, name: &str) -> User {
        self.users()
            .create_user(name, &format!("{name}@example.com"), "!")
            .await
            .unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        let conn = self.pool.get().await.unwrap();
        conn.query_one(&format!(r#"SELECT count(*) FROM "{table}""#), &[])
            .await
            .unwrap()
            .get(0)
    }
}
