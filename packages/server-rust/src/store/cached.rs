//! Read-through cache decorator over any [`Storer`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ichor_core::{OrderBy, Page};
use quick_cache::sync::Cache;
use tracing::debug;
use uuid::Uuid;

use crate::bus::{Domain, Entity, Storer};
use crate::sqldb::{StoreError, Tx};

/// Capacity and time-to-live of a [`CachedStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached entities.
    pub capacity: usize,
    /// Entries older than this are re-read from the inner store.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl: Duration::from_secs(60),
        }
    }
}

#[derive(Clone)]
struct Cached<E> {
    entity: E,
    stored_at: Instant,
}

/// Caches entities by id in front of another storer.
///
/// Writes refresh the cache after the inner store succeeds and deletes
/// evict. `query_by_id` reads through, `query_by_ids` only fetches misses,
/// and `query`/`count` always go to the inner store. A store bound to a
/// transaction evicts on write instead of populating, so a rolled-back
/// transaction cannot leave uncommitted entities in the cache.
///
/// Every write bumps a generation counter before touching the cache. A read
/// that misses only fills the cache if no write happened while it was at
/// the inner store.
pub struct CachedStore<D: Domain> {
    inner: Arc<dyn Storer<D>>,
    cache: Arc<Cache<Uuid, Cached<D::Entity>>>,
    generation: Arc<AtomicU64>,
    ttl: Duration,
    populate: bool,
}

impl<D: Domain> CachedStore<D> {
    #[must_use]
    pub fn new(inner: Arc<dyn Storer<D>>, config: CacheConfig) -> Self {
        Self {
            inner,
            cache: Arc::new(Cache::new(config.capacity)),
            generation: Arc::new(AtomicU64::new(0)),
            ttl: config.ttl,
            populate: true,
        }
    }

    fn get(&self, id: Uuid) -> Option<D::Entity> {
        let hit = self.cache.get(&id)?;
        if hit.stored_at.elapsed() > self.ttl {
            self.cache.remove(&id);
            return None;
        }
        Some(hit.entity)
    }

    fn insert(&self, entity: &D::Entity) {
        self.cache.insert(
            entity.id(),
            Cached {
                entity: entity.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// After a successful write.
    fn put(&self, entity: &D::Entity) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.populate {
            self.insert(entity);
        } else {
            self.cache.remove(&entity.id());
        }
    }

    fn evict(&self, id: Uuid) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.remove(&id);
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// After a read-through miss. `seen` is the generation taken before the
    /// inner read; a write since then may have cached a newer version.
    fn fill(&self, entity: &D::Entity, seen: u64) {
        if !self.populate || self.generation() != seen {
            return;
        }
        self.insert(entity);
        if self.generation() != seen {
            self.cache.remove(&entity.id());
        }
    }

    /// Number of cached entries, including expired ones not yet evicted.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<D: Domain> Storer<D> for CachedStore<D> {
    async fn create(&self, entity: &D::Entity) -> Result<(), StoreError> {
        self.inner.create(entity).await?;
        self.put(entity);
        Ok(())
    }

    async fn update(&self, entity: &D::Entity) -> Result<(), StoreError> {
        self.inner.update(entity).await?;
        self.put(entity);
        Ok(())
    }

    async fn delete(&self, entity: &D::Entity) -> Result<(), StoreError> {
        self.inner.delete(entity).await?;
        self.evict(entity.id());
        Ok(())
    }

    async fn query(
        &self,
        filter: &D::Filter,
        order: &OrderBy,
        page: Page,
    ) -> Result<Vec<D::Entity>, StoreError> {
        self.inner.query(filter, order, page).await
    }

    async fn count(&self, filter: &D::Filter) -> Result<u64, StoreError> {
        self.inner.count(filter).await
    }

    async fn query_by_id(&self, id: Uuid) -> Result<D::Entity, StoreError> {
        if let Some(entity) = self.get(id) {
            return Ok(entity);
        }
        let seen = self.generation();
        let entity = self.inner.query_by_id(id).await?;
        self.fill(&entity, seen);
        Ok(entity)
    }

    async fn query_by_ids(&self, ids: &[Uuid]) -> Result<Vec<D::Entity>, StoreError> {
        let mut found = Vec::with_capacity(ids.len());
        let mut misses = Vec::new();
        for &id in ids {
            match self.get(id) {
                Some(entity) => found.push(entity),
                None => misses.push(id),
            }
        }
        if !misses.is_empty() {
            debug!(domain = D::NAME, misses = misses.len(), "cache misses");
            let seen = self.generation();
            for entity in self.inner.query_by_ids(&misses).await? {
                self.fill(&entity, seen);
                found.push(entity);
            }
        }
        Ok(found)
    }

    fn new_with_tx(&self, tx: &Tx) -> Result<Arc<dyn Storer<D>>, StoreError> {
        Ok(Arc::new(Self {
            inner: self.inner.new_with_tx(tx)?,
            cache: Arc::clone(&self.cache),
            generation: Arc::clone(&self.generation),
            ttl: self.ttl,
            populate: false,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ichor_core::RequestContext;
    use tokio::sync::Notify;

    use super::*;
    use crate::bus::now_micros;
    use crate::domain::currency::{Currency, CurrencyDomain, NewCurrency};
    use crate::store::MemoryStore;

    /// Counts reads that reach the wrapped store.
    struct CountingStore {
        inner: MemoryStore<CurrencyDomain>,
        by_id: AtomicUsize,
        by_ids: AtomicUsize,
        last_ids: parking_lot::Mutex<Vec<Uuid>>,
        /// Holds the next `query_by_id` after it has read: signals the first
        /// `Notify`, then waits on the second.
        hold_next_read: parking_lot::Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
    }

    impl CountingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryStore::new(),
                by_id: AtomicUsize::new(0),
                by_ids: AtomicUsize::new(0),
                last_ids: parking_lot::Mutex::new(Vec::new()),
                hold_next_read: parking_lot::Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl Storer<CurrencyDomain> for CountingStore {
        async fn create(&self, e: &Currency) -> Result<(), StoreError> {
            self.inner.create(e).await
        }
        async fn update(&self, e: &Currency) -> Result<(), StoreError> {
            self.inner.update(e).await
        }
        async fn delete(&self, e: &Currency) -> Result<(), StoreError> {
            self.inner.delete(e).await
        }
        async fn query(
            &self,
            f: &<CurrencyDomain as Domain>::Filter,
            o: &OrderBy,
            p: Page,
        ) -> Result<Vec<Currency>, StoreError> {
            self.inner.query(f, o, p).await
        }
        async fn count(&self, f: &<CurrencyDomain as Domain>::Filter) -> Result<u64, StoreError> {
            self.inner.count(f).await
        }
        async fn query_by_id(&self, id: Uuid) -> Result<Currency, StoreError> {
            self.by_id.fetch_add(1, Ordering::SeqCst);
            let read = self.inner.query_by_id(id).await;
            let hold = self.hold_next_read.lock().take();
            if let Some((fetched, release)) = hold {
                fetched.notify_one();
                release.notified().await;
            }
            read
        }
        async fn query_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Currency>, StoreError> {
            self.by_ids.fetch_add(1, Ordering::SeqCst);
            *self.last_ids.lock() = ids.to_vec();
            self.inner.query_by_ids(ids).await
        }
        fn new_with_tx(&self, tx: &Tx) -> Result<Arc<dyn Storer<CurrencyDomain>>, StoreError> {
            self.inner.new_with_tx(tx)
        }
    }

    fn currency(code: &str) -> Currency {
        CurrencyDomain::build(
            NewCurrency {
                code: code.to_string(),
                name: format!("{code} name"),
                symbol: "$".to_string(),
                locale: "en-US".to_string(),
                decimal_places: 2,
                is_active: true,
                sort_order: 0,
            },
            Uuid::new_v4(),
            now_micros(),
            &RequestContext::system(),
        )
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let counting = CountingStore::new();
        let inner = counting.inner.clone();
        let store = CachedStore::new(counting.clone(), CacheConfig::default());
        let usd = currency("USD");
        // Written behind the cache's back so the first read must miss.
        inner.create(&usd).await.unwrap();

        assert_eq!(store.query_by_id(usd.id).await.unwrap(), usd);
        assert_eq!(store.query_by_id(usd.id).await.unwrap(), usd);
        assert_eq!(counting.by_id.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn writes_populate_the_cache() {
        let counting = CountingStore::new();
        let store = CachedStore::new(counting.clone(), CacheConfig::default());
        let usd = currency("USD");
        store.create(&usd).await.unwrap();

        store.query_by_id(usd.id).await.unwrap();
        assert_eq!(counting.by_id.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_evicts() {
        let counting = CountingStore::new();
        let store = CachedStore::new(counting.clone(), CacheConfig::default());
        let usd = currency("USD");
        store.create(&usd).await.unwrap();
        store.delete(&usd).await.unwrap();

        assert!(matches!(
            store.query_by_id(usd.id).await,
            Err(StoreError::NotFound)
        ));
        assert_eq!(counting.by_id.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn query_by_ids_only_fetches_misses() {
        let counting = CountingStore::new();
        let inner = counting.inner.clone();
        let store = CachedStore::new(counting.clone(), CacheConfig::default());
        let usd = currency("USD");
        let eur = currency("EUR");
        store.create(&usd).await.unwrap();
        inner.create(&eur).await.unwrap();

        let found = store.query_by_ids(&[usd.id, eur.id]).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(counting.by_ids.load(Ordering::SeqCst), 1);
        assert_eq!(*counting.last_ids.lock(), vec![eur.id]);

        // Both are cached now: no further round trip.
        store.query_by_ids(&[usd.id, eur.id]).await.unwrap();
        assert_eq!(counting.by_ids.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_re_read() {
        let counting = CountingStore::new();
        let config = CacheConfig {
            capacity: 16,
            ttl: Duration::from_millis(20),
        };
        let store = CachedStore::new(counting.clone(), config);
        let usd = currency("USD");
        store.create(&usd).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;
        store.query_by_id(usd.id).await.unwrap();

        assert_eq!(counting.by_id.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tx_bound_store_evicts_instead_of_populating() {
        let counting = CountingStore::new();
        let store = CachedStore::new(counting.clone(), CacheConfig::default());
        let usd = currency("USD");
        store.create(&usd).await.unwrap();
        assert_eq!(store.cached_len(), 1);

        let tx_store = store.new_with_tx(&Tx::noop()).unwrap();
        tx_store.update(&usd).await.unwrap();

        assert_eq!(store.cached_len(), 0);
    }

    #[tokio::test]
    async fn read_overlapping_an_update_does_not_recache_the_old_value() {
        let counting = CountingStore::new();
        let inner = counting.inner.clone();
        let store = Arc::new(CachedStore::new(counting.clone(), CacheConfig::default()));
        let usd = currency("USD");
        inner.create(&usd).await.unwrap();

        let fetched = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *counting.hold_next_read.lock() = Some((Arc::clone(&fetched), Arc::clone(&release)));

        let id = usd.id;
        let reader = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.query_by_id(id).await })
        };
        fetched.notified().await;

        let renamed = Currency {
            name: "Dollar".to_string(),
            ..usd.clone()
        };
        store.update(&renamed).await.unwrap();
        release.notify_one();

        assert_eq!(reader.await.unwrap().unwrap(), usd);
        assert_eq!(store.query_by_id(id).await.unwrap(), renamed);
        assert_eq!(counting.by_id.load(Ordering::SeqCst), 1);
    }
}
