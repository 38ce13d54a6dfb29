//! Connection pool construction.

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

use crate::{Config, Result, TracedPool};

/// Build a traced pool from [`Config::database_url`].
///
/// No connection is opened until the first `get()`.
pub fn connect(config: &Config) -> Result<TracedPool> {
    connect_url(&config.database_url, config.pool_size)
}

/// Build a traced pool for an explicit connection string.
pub fn connect_url(database_url: &str, max_size: usize) -> Result<TracedPool> {
    let pg_config: tokio_postgres::Config = database_url.parse()?;
    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    let pool = Pool::builder(manager).max_size(max_size).build()?;
    tracing::debug!(max_size, "connection pool ready");
    Ok(TracedPool::new(pool))
}
