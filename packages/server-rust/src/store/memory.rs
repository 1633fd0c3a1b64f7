//! In-memory storer backed by `DashMap`.
//!
//! Honors the same contract as the PostgreSQL store: filters through
//! [`Domain::matches`], ordering through [`Domain::order_value`], offset
//! pagination, and uniqueness through [`Domain::unique_keys`]. Foreign keys
//! are not checked.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use ichor_core::{Direction, OrderBy, Page};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::bus::{Domain, Entity, Storer};
use crate::sqldb::{StoreError, Tx};

/// DashMap-backed implementation of [`Storer`].
///
/// Clones (and stores returned by `new_with_tx`) share the same map.
pub struct MemoryStore<D: Domain> {
    rows: Arc<DashMap<Uuid, D::Entity>>,
    // Serializes writes so the uniqueness scan and the insert are atomic.
    write_lock: Arc<Mutex<()>>,
}

impl<D: Domain> Clone for MemoryStore<D> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<D: Domain> Default for MemoryStore<D> {
    fn default() -> Self {
        Self {
            rows: Arc::new(DashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl<D: Domain> MemoryStore<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_unique(&self, entity: &D::Entity) -> Result<(), StoreError> {
        let keys = D::unique_keys(entity);
        if keys.is_empty() {
            return Ok(());
        }
        for other in self.rows.iter() {
            if other.key() == &entity.id() {
                continue;
            }
            let taken = D::unique_keys(other.value());
            if let Some(key) = keys.iter().find(|k| taken.contains(k)) {
                return Err(StoreError::Duplicate(key.clone()));
            }
        }
        Ok(())
    }

    fn insert(&self, entity: &D::Entity) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        if self.rows.contains_key(&entity.id()) {
            return Err(StoreError::Duplicate(format!("{}_pkey", D::NAME)));
        }
        self.check_unique(entity)?;
        self.rows.insert(entity.id(), entity.clone());
        Ok(())
    }

    fn replace(&self, entity: &D::Entity) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        if !self.rows.contains_key(&entity.id()) {
            return Err(StoreError::NotFound);
        }
        self.check_unique(entity)?;
        self.rows.insert(entity.id(), entity.clone());
        Ok(())
    }

    fn matching(&self, filter: &D::Filter) -> Vec<D::Entity> {
        self.rows
            .iter()
            .filter(|e| D::matches(filter, e.value()))
            .map(|e| e.value().clone())
            .collect()
    }
}

fn compare<D: Domain>(order: &OrderBy, a: &D::Entity, b: &D::Entity) -> Ordering {
    let by_field = D::order_value(a, order.field).cmp(&D::order_value(b, order.field));
    let by_field = match order.direction {
        Direction::Asc => by_field,
        Direction::Desc => by_field.reverse(),
    };
    by_field.then_with(|| a.id().cmp(&b.id()))
}

#[async_trait]
impl<D: Domain> Storer<D> for MemoryStore<D> {
    async fn create(&self, entity: &D::Entity) -> Result<(), StoreError> {
        self.insert(entity)
    }

    async fn update(&self, entity: &D::Entity) -> Result<(), StoreError> {
        self.replace(entity)
    }

    async fn delete(&self, entity: &D::Entity) -> Result<(), StoreError> {
        self.rows.remove(&entity.id());
        Ok(())
    }

    async fn query(
        &self,
        filter: &D::Filter,
        order: &OrderBy,
        page: Page,
    ) -> Result<Vec<D::Entity>, StoreError> {
        let mut items = self.matching(filter);
        items.sort_by(|a, b| compare::<D>(order, a, b));
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let rows = usize::try_from(page.rows_per_page()).unwrap_or(usize::MAX);
        Ok(items.into_iter().skip(offset).take(rows).collect())
    }

    async fn count(&self, filter: &D::Filter) -> Result<u64, StoreError> {
        let n = self
            .rows
            .iter()
            .filter(|e| D::matches(filter, e.value()))
            .count();
        Ok(n as u64)
    }

    async fn query_by_id(&self, id: Uuid) -> Result<D::Entity, StoreError> {
        self.rows
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn query_by_ids(&self, ids: &[Uuid]) -> Result<Vec<D::Entity>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.rows.get(id).map(|e| e.value().clone()))
            .collect())
    }

    fn new_with_tx(&self, _tx: &Tx) -> Result<Arc<dyn Storer<D>>, StoreError> {
        Ok(Arc::new(self.clone()))
    }
}
