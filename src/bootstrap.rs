//! One-time schema bootstrap
//!
//! Several server instances may start against the same database at once.
//! Table creation runs under a [`MigrationLock`] picked by probing the
//! database: a session-level advisory lock where the engine provides one,
//! nothing otherwise (the DDL is `IF NOT EXISTS` and safe to repeat).

use async_trait::async_trait;
use sqlx::{Connection, PgConnection, PgPool};

use crate::{error::AppResult, repository::schema};

/// Cross-process lock held while the schema is created
#[async_trait]
pub trait MigrationLock<C: Send>: Send + Sync {
    fn describe(&self) -> String;
    async fn acquire(&self, conn: &mut C) -> AppResult<()>;
    async fn release(&self, conn: &mut C) -> AppResult<()>;
}

/// Work performed while the lock is held
#[async_trait]
pub trait SchemaStep<C: Send>: Send + Sync {
    async fn apply(&self, conn: &mut C) -> AppResult<()>;
}

/// `pg_advisory_lock` / `pg_advisory_unlock` on a fixed key
pub struct AdvisoryLock {
    pub key: i64,
}

#[async_trait]
impl MigrationLock<PgConnection> for AdvisoryLock {
    fn describe(&self) -> String {
        format!("advisory lock {}", self.key)
    }

    async fn acquire(&self, conn: &mut PgConnection) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(self.key)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn release(&self, conn: &mut PgConnection) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(self.key)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

/// For engines without advisory locks
pub struct NoLock;

#[async_trait]
impl<C: Send> MigrationLock<C> for NoLock {
    fn describe(&self) -> String {
        "no lock".to_string()
    }

    async fn acquire(&self, _conn: &mut C) -> AppResult<()> {
        Ok(())
    }

    async fn release(&self, _conn: &mut C) -> AppResult<()> {
        Ok(())
    }
}

/// Creates every table of the inventory schema
pub struct CreateTables;

#[async_trait]
impl SchemaStep<PgConnection> for CreateTables {
    async fn apply(&self, conn: &mut PgConnection) -> AppResult<()> {
        schema::create_all(conn).await
    }
}

/// Result of [`run_exclusive`]
#[derive(Debug)]
pub struct GuardedRun {
    pub outcome: AppResult<()>,
    /// `Err` means the session may still hold the lock
    pub release: AppResult<()>,
}

/// Run `step` while holding `lock`. The lock is released whether the step
/// succeeds or fails; it is not released if it was never acquired.
pub async fn run_exclusive<C, L, S>(conn: &mut C, lock: &L, step: &S) -> GuardedRun
where
    C: Send,
    L: MigrationLock<C> + ?Sized,
    S: SchemaStep<C> + ?Sized,
{
    if let Err(e) = lock.acquire(conn).await {
        return GuardedRun {
            outcome: Err(e),
            release: Ok(()),
        };
    }

    let outcome = step.apply(conn).await;
    let release = lock.release(conn).await;
    GuardedRun { outcome, release }
}

/// Whether the connected engine provides `pg_advisory_lock`
pub async fn supports_advisory_locks(conn: &mut PgConnection) -> bool {
    let lookup = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM pg_catalog.pg_proc WHERE proname = 'pg_advisory_lock')",
    )
    .fetch_one(&mut *conn)
    .await;

    match lookup {
        Ok(supported) => supported,
        Err(e) => {
            tracing::debug!("Advisory lock lookup failed, assuming unsupported: {}", e);
            false
        }
    }
}

/// Create the schema once, serialized across instances when possible
pub async fn migrate_once(pool: &PgPool, lock_key: i64) -> AppResult<()> {
    let mut conn = pool.acquire().await?;

    let lock: Box<dyn MigrationLock<PgConnection>> = if supports_advisory_locks(&mut conn).await {
        Box::new(AdvisoryLock { key: lock_key })
    } else {
        tracing::warn!("Database has no advisory locks, creating schema without a lock");
        Box::new(NoLock)
    };

    tracing::info!("Creating schema under {}", lock.describe());
    let run = run_exclusive(&mut *conn, lock.as_ref(), &CreateTables).await;

    if let Err(e) = run.release {
        // The lock belongs to the session: end it instead of returning it to the pool
        tracing::error!("Failed to release {}: {}; closing connection", lock.describe(), e);
        if let Err(close_err) = conn.detach().close().await {
            tracing::warn!("Closing schema connection failed: {}", close_err);
        }
    }

    run.outcome
}
