//! Transaction handles shared across per-domain stores.
//!
//! A [`Tx`] is cloned into every store rebound with `new_with_tx`, so all of
//! them write through the same PostgreSQL transaction. The memory backend
//! uses [`Tx::noop`], whose commit and rollback do nothing.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use super::StoreError;

type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

#[derive(Clone)]
enum TxInner {
    Postgres(SharedTx),
    Noop,
}

/// Transaction handle. Cloning shares the underlying transaction.
#[derive(Clone)]
pub struct Tx {
    inner: TxInner,
}

impl std::fmt::Debug for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.inner {
            TxInner::Postgres(_) => "postgres",
            TxInner::Noop => "noop",
        };
        f.debug_struct("Tx").field("kind", &kind).finish()
    }
}

impl Tx {
    #[must_use]
    pub fn noop() -> Self {
        Self {
            inner: TxInner::Noop,
        }
    }

    pub(crate) async fn begin(pool: &PgPool) -> Result<Self, StoreError> {
        let tx = pool.begin().await?;
        Ok(Self {
            inner: TxInner::Postgres(Arc::new(Mutex::new(Some(tx)))),
        })
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self.inner, TxInner::Noop)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::TxClosed`] if the transaction was already
    /// finished, or the driver error if the commit fails.
    pub async fn commit(&self) -> Result<(), StoreError> {
        match &self.inner {
            TxInner::Postgres(shared) => {
                let tx = shared.lock().await.take().ok_or(StoreError::TxClosed)?;
                tx.commit().await?;
                Ok(())
            }
            TxInner::Noop => Ok(()),
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError::TxClosed`] if the transaction was already
    /// finished, or the driver error if the rollback fails.
    pub async fn rollback(&self) -> Result<(), StoreError> {
        match &self.inner {
            TxInner::Postgres(shared) => {
                let tx = shared.lock().await.take().ok_or(StoreError::TxClosed)?;
                tx.rollback().await?;
                Ok(())
            }
            TxInner::Noop => Ok(()),
        }
    }

    pub(crate) fn shared(&self) -> Option<SharedTx> {
        match &self.inner {
            TxInner::Postgres(shared) => Some(Arc::clone(shared)),
            TxInner::Noop => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Conn
// ---------------------------------------------------------------------------

/// Where a store sends its statements.
#[derive(Clone)]
pub enum Target {
    Pool(PgPool),
    Tx(SharedTx),
}

impl Target {
    /// Acquires a connection: a fresh pooled one, or exclusive access to the
    /// shared transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool is exhausted or the transaction has
    /// already been committed or rolled back.
    pub async fn acquire(&self) -> Result<Conn<'_>, StoreError> {
        match self {
            Self::Pool(pool) => Ok(Conn::Pooled(pool.acquire().await?)),
            Self::Tx(shared) => {
                let guard = shared.lock().await;
                MutexGuard::try_map(guard, |tx| tx.as_mut())
                    .map(Conn::Tx)
                    .map_err(|_| StoreError::TxClosed)
            }
        }
    }
}

/// A connection borrowed for the duration of one statement.
pub enum Conn<'a> {
    Pooled(PoolConnection<Postgres>),
    Tx(MappedMutexGuard<'a, Transaction<'static, Postgres>>),
}

impl Deref for Conn<'_> {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        match self {
            Self::Pooled(conn) => &**conn,
            Self::Tx(tx) => &***tx,
        }
    }
}

impl DerefMut for Conn<'_> {
    fn deref_mut(&mut self) -> &mut PgConnection {
        match self {
            Self::Pooled(conn) => &mut **conn,
            Self::Tx(tx) => &mut ***tx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_commit_and_rollback_succeed() {
        let tx = Tx::noop();
        assert!(tx.is_noop());
        assert!(tx.shared().is_none());
        tx.commit().await.unwrap();
        tx.rollback().await.unwrap();
    }
}
