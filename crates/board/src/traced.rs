//! Traced database connection wrapper.
//!
//! Wraps a `deadpool_postgres` pool and logs every statement via tracing,
//! including statements issued inside a transaction.

use std::ops::Deref;

use tokio_postgres::types::ToSql;
use tokio_postgres::{Error, Row};
use tracing::Instrument;

/// A traced connection pool.
///
/// Wraps a `deadpool_postgres::Pool` and returns `TracedObject` from `get()`,
/// ensuring all queries are automatically logged.
///
/// # Example
///
/// ```ignore
/// use board::TracedPool;
///
/// let pool = TracedPool::new(pool);
/// let conn = pool.get().await?;
///
/// // All queries are automatically traced
/// conn.query("SELECT id FROM questions LIMIT $1", &[&10i64]).await?;
/// ```
#[derive(Clone)]
pub struct TracedPool {
    inner: deadpool_postgres::Pool,
}

impl TracedPool {
    /// Create a new traced pool wrapper.
    pub fn new(pool: deadpool_postgres::Pool) -> Self {
        Self { inner: pool }
    }

    /// Get a traced connection from the pool.
    pub async fn get(&self) -> Result<TracedObject, deadpool_postgres::PoolError> {
        let conn = self.inner.get().await?;
        Ok(TracedObject { inner: conn })
    }

    /// Get the inner pool (for cases where you need the raw pool).
    pub fn inner(&self) -> &deadpool_postgres::Pool {
        &self.inner
    }
}

/// A traced connection that owns the underlying pooled connection.
pub struct TracedObject {
    inner: deadpool_postgres::Object,
}

impl TracedObject {
    fn client(&self) -> &tokio_postgres::Client {
        self.inner.deref()
    }

    /// Execute a statement, returning the number of rows affected.
    pub async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, Error> {
        let span = tracing::debug_span!(
            "db.execute",
            sql = %sql,
            params = params.len(),
            affected = tracing::field::Empty,
        );
        let affected = self
            .client()
            .execute(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("affected", affected);
        Ok(affected)
    }

    /// Execute a query, returning all rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = tracing::field::Empty,
        );
        let rows = self
            .client()
            .query(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("rows", rows.len());
        Ok(rows)
    }

    /// Execute a query, returning at most one row.
    pub async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = tracing::field::Empty,
        );
        let row = self
            .client()
            .query_opt(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("rows", if row.is_some() { 1u64 } else { 0u64 });
        Ok(row)
    }

    /// Execute a query, returning exactly one row.
    pub async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Row, Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = 1u64,
        );
        self.client().query_one(sql, params).instrument(span).await
    }

    /// Run a multi-statement batch using the simple query protocol.
    pub async fn batch_execute(&self, sql: &str) -> Result<(), Error> {
        let span = tracing::debug_span!("db.batch", sql = %sql);
        self.client().batch_execute(sql).instrument(span).await
    }

    /// Begin a transaction on this connection.
    ///
    /// Dropping the returned transaction without calling
    /// [`TracedTransaction::commit`] rolls it back.
    pub async fn transaction(&mut self) -> Result<TracedTransaction<'_>, Error> {
        let tx = self
            .inner
            .transaction()
            .instrument(tracing::debug_span!("db.begin"))
            .await?;
        Ok(TracedTransaction { inner: tx })
    }

    /// Get the inner connection (for cases where you need the raw connection).
    pub fn inner(&self) -> &deadpool_postgres::Object {
        &self.inner
    }
}

/// A traced transaction borrowed from a [`TracedObject`].
pub struct TracedTransaction<'a> {
    inner: deadpool_postgres::Transaction<'a>,
}

impl TracedTransaction<'_> {
    /// Execute a statement, returning the number of rows affected.
    pub async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, Error> {
        let span = tracing::debug_span!(
            "db.execute",
            sql = %sql,
            params = params.len(),
            affected = tracing::field::Empty,
            tx = true,
        );
        let affected = self
            .inner
            .execute(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("affected", affected);
        Ok(affected)
    }

    /// Execute a query, returning all rows.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = tracing::field::Empty,
            tx = true,
        );
        let rows = self
            .inner
            .query(sql, params)
            .instrument(span.clone())
            .await?;
        span.record("rows", rows.len());
        Ok(rows)
    }

    /// Execute a query, returning exactly one row.
    pub async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Row, Error> {
        let span = tracing::debug_span!(
            "db.query",
            sql = %sql,
            params = params.len(),
            rows = 1u64,
            tx = true,
        );
        self.inner.query_one(sql, params).instrument(span).await
    }

    /// Run a multi-statement batch using the simple query protocol.
    pub async fn batch_execute(&self, sql: &str) -> Result<(), Error> {
        let span = tracing::debug_span!("db.batch", sql = %sql, tx = true);
        self.inner.batch_execute(sql).instrument(span).await
    }

    /// Commit the transaction.
    pub async fn commit(self) -> Result<(), Error> {
        self.inner
            .commit()
            .instrument(tracing::debug_span!("db.commit"))
            .await
    }

    /// Roll the transaction back explicitly.
    pub async fn rollback(self) -> Result<(), Error> {
        self.inner
            .rollback()
            .instrument(tracing::debug_span!("db.rollback"))
            .await
    }
}
