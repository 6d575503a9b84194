//! Repository layer for database operations
//!
//! Query functions take the connection explicitly: writes run inside a
//! [`UnitOfWork`] opened by the service for one request, reads borrow a
//! pooled connection. Both go back to the pool when dropped, and an
//! uncommitted unit of work rolls back on drop.

pub mod equipment;
pub mod lendings;
pub mod schema;
pub mod users;

use sqlx::{pool::PoolConnection, Pool, Postgres, Transaction};

use crate::error::AppResult;

/// One database transaction scoped to a single request operation
pub type UnitOfWork = Transaction<'static, Postgres>;

/// Main repository struct holding the database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a unit of work
    pub async fn begin(&self) -> AppResult<UnitOfWork> {
        Ok(self.pool.begin().await?)
    }

    /// Borrow a connection for read-only work
    pub async fn acquire(&self) -> AppResult<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }
}

/// Escape `%`, `_` and `\` so user text matches literally inside LIKE patterns
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
