use std::sync::Arc;

use async_trait::async_trait;
use ichor_core::{OrderBy, Page};
use uuid::Uuid;

use super::Domain;
use crate::sqldb::{StoreError, Tx};

/// Persistence contract for one domain.
///
/// Implementations: PostgreSQL (`PgStore`), in-memory (`MemoryStore`) and
/// the read-through cache decorator (`CachedStore`). Used as
/// `Arc<dyn Storer<D>>`.
#[async_trait]
pub trait Storer<D: Domain>: Send + Sync {
    async fn create(&self, entity: &D::Entity) -> Result<(), StoreError>;

    /// Overwrites the stored entity with the same id.
    async fn update(&self, entity: &D::Entity) -> Result<(), StoreError>;

    async fn delete(&self, entity: &D::Entity) -> Result<(), StoreError>;

    /// One page of entities matching `filter`, sorted by `order`.
    async fn query(
        &self,
        filter: &D::Filter,
        order: &OrderBy,
        page: Page,
    ) -> Result<Vec<D::Entity>, StoreError>;

    async fn count(&self, filter: &D::Filter) -> Result<u64, StoreError>;

    async fn query_by_id(&self, id: Uuid) -> Result<D::Entity, StoreError>;

    /// Entities for every id that exists. Missing ids are skipped.
    async fn query_by_ids(&self, ids: &[Uuid]) -> Result<Vec<D::Entity>, StoreError>;

    /// Returns a storer whose statements run inside `tx`.
    ///
    /// # Errors
    ///
    /// Returns an error if `tx` cannot be used by this storer.
    fn new_with_tx(&self, tx: &Tx) -> Result<Arc<dyn Storer<D>>, StoreError>;
}
