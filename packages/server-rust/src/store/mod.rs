//! Storer implementations and backend selection.

pub mod cached;
pub mod memory;
pub mod pg;

pub use cached::{CacheConfig, CachedStore};
pub use memory::MemoryStore;
pub use pg::{PgStore, PgTable, RowBinds};

use std::sync::Arc;

use crate::bus::Storer;
use crate::sqldb::{Db, StoreError, Tx};

/// Persistence backend every domain store is created from.
#[derive(Debug, Clone)]
pub enum Backend {
    Postgres(Db),
    /// Process-local maps; data is lost on exit.
    Memory,
}

impl Backend {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory => "memory",
        }
    }

    /// Creates the storer for domain `D`. With the memory backend each call
    /// returns an independent, empty store.
    #[must_use]
    pub fn storer<D: PgTable>(&self) -> Arc<dyn Storer<D>> {
        match self {
            Self::Postgres(db) => Arc::new(PgStore::<D>::new(db.pool().clone())),
            Self::Memory => Arc::new(MemoryStore::<D>::new()),
        }
    }

    /// Starts a transaction. The memory backend returns a no-op handle.
    ///
    /// # Errors
    ///
    /// Returns an error if no database connection can be acquired.
    pub async fn begin(&self) -> Result<Tx, StoreError> {
        match self {
            Self::Postgres(db) => db.begin().await,
            Self::Memory => Ok(Tx::noop()),
        }
    }

    /// # Errors
    ///
    /// Returns the driver error if the database does not answer.
    pub async fn status_check(&self) -> Result<(), StoreError> {
        match self {
            Self::Postgres(db) => db.status_check().await.map_err(StoreError::from),
            Self::Memory => Ok(()),
        }
    }
}
