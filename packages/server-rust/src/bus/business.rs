use std::sync::Arc;

use ichor_core::{Action, Delegate, EventData, OrderBy, Page, RequestContext};
use tracing::{debug, error};
use uuid::Uuid;

use super::{next_stamp, now_micros, BusError, Domain, Entity, Storer};
use crate::sqldb::{StoreError, Tx};

/// Business-layer API for domain `D`.
///
/// Owns the domain's storer and the shared delegate. Mutations stamp audit
/// timestamps, persist through the storer, then announce the change through
/// the delegate. Delegate failures are logged and never fail the mutation.
pub struct Business<D: Domain> {
    storer: Arc<dyn Storer<D>>,
    delegate: Arc<Delegate>,
}

impl<D: Domain> Clone for Business<D> {
    fn clone(&self) -> Self {
        Self {
            storer: Arc::clone(&self.storer),
            delegate: Arc::clone(&self.delegate),
        }
    }
}

fn store_err<D: Domain>(err: StoreError) -> BusError {
    BusError::from_store(D::NAME, err)
}

impl<D: Domain> Business<D> {
    #[must_use]
    pub fn new(storer: Arc<dyn Storer<D>>, delegate: Arc<Delegate>) -> Self {
        Self { storer, delegate }
    }

    /// Returns a copy of this business whose storer runs inside `tx`.
    ///
    /// # Errors
    ///
    /// Returns `BusError::Store` if the storer cannot join the transaction.
    pub fn new_with_tx(&self, tx: &Tx) -> Result<Self, BusError> {
        let storer = self.storer.new_with_tx(tx).map_err(store_err::<D>)?;
        Ok(Self {
            storer,
            delegate: Arc::clone(&self.delegate),
        })
    }

    /// Assigns a new id and timestamps, persists, and fires `created`.
    ///
    /// # Errors
    ///
    /// `UniqueEntry` or `ForeignKeyViolation` for constraint violations,
    /// `Store` for anything else.
    pub async fn create(&self, ctx: &RequestContext, new: D::New) -> Result<D::Entity, BusError> {
        let entity = D::build(new, Uuid::new_v4(), now_micros(), ctx);
        self.storer.create(&entity).await.map_err(store_err::<D>)?;

        debug!(domain = D::NAME, entity_id = %entity.id(), "created");
        self.notify(Action::Created, EventData::created(D::NAME, ctx, entity.id(), &entity))
            .await;
        Ok(entity)
    }

    /// Applies the set fields of `update` to `entity`, persists, and fires
    /// `updated` with before and after snapshots.
    ///
    /// # Errors
    ///
    /// `NotFound` if the entity was deleted meanwhile, `UniqueEntry` or
    /// `ForeignKeyViolation` for constraint violations.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        entity: D::Entity,
        update: D::Update,
    ) -> Result<D::Entity, BusError> {
        let before = entity.clone();
        let mut after = entity;
        let now = next_stamp(before.updated_date());
        D::apply(&mut after, update, now, ctx);
        self.storer.update(&after).await.map_err(store_err::<D>)?;

        debug!(domain = D::NAME, entity_id = %after.id(), "updated");
        self.notify(
            Action::Updated,
            EventData::updated(D::NAME, ctx, after.id(), &before, &after),
        )
        .await;
        Ok(after)
    }

    /// Hard-deletes `entity` and fires `deleted`.
    ///
    /// # Errors
    ///
    /// `ForeignKeyViolation` if other entities still reference it.
    pub async fn delete(&self, ctx: &RequestContext, entity: D::Entity) -> Result<(), BusError> {
        self.storer.delete(&entity).await.map_err(store_err::<D>)?;

        debug!(domain = D::NAME, entity_id = %entity.id(), "deleted");
        self.notify(Action::Deleted, EventData::deleted(D::NAME, ctx, entity.id(), &entity))
            .await;
        Ok(())
    }

    /// # Errors
    ///
    /// `Store` if the storer fails.
    pub async fn query(
        &self,
        filter: &D::Filter,
        order: &OrderBy,
        page: Page,
    ) -> Result<Vec<D::Entity>, BusError> {
        self.storer
            .query(filter, order, page)
            .await
            .map_err(store_err::<D>)
    }

    /// # Errors
    ///
    /// `Store` if the storer fails.
    pub async fn count(&self, filter: &D::Filter) -> Result<u64, BusError> {
        self.storer.count(filter).await.map_err(store_err::<D>)
    }

    /// # Errors
    ///
    /// `NotFound` if no entity has this id.
    pub async fn query_by_id(&self, id: Uuid) -> Result<D::Entity, BusError> {
        self.storer.query_by_id(id).await.map_err(store_err::<D>)
    }

    /// # Errors
    ///
    /// `Store` if the storer fails. Unknown ids are skipped, not errors.
    pub async fn query_by_ids(&self, ids: &[Uuid]) -> Result<Vec<D::Entity>, BusError> {
        self.storer.query_by_ids(ids).await.map_err(store_err::<D>)
    }

    async fn notify(&self, action: Action, event: Result<EventData, serde_json::Error>) {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                error!(domain = D::NAME, %action, error = %e, "failed to encode delegate event");
                return;
            }
        };
        metrics::counter!(
            "ichor_delegate_events_total",
            "domain" => D::NAME,
            "action" => action.as_str()
        )
        .increment(1);
        if let Err(e) = self.delegate.call(&event).await {
            error!(
                domain = D::NAME,
                %action,
                entity_id = %event.entity_id,
                error = %e,
                "delegate call failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ichor_core::EventHandler;

    use super::*;
    use crate::domain::tag::{NewTag, TagDomain, TagFilter, UpdateTag};
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<EventData>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn handle(&self, event: &EventData) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct Failing {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EventHandler for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn handle(&self, _event: &EventData) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("handler down")
        }
    }

    fn business() -> (Business<TagDomain>, Arc<Delegate>) {
        let delegate = Arc::new(Delegate::new());
        let storer = Arc::new(MemoryStore::<TagDomain>::new());
        (Business::new(storer, Arc::clone(&delegate)), delegate)
    }

    fn new_tag(name: &str) -> NewTag {
        NewTag {
            name: name.to_string(),
            description: format!("{name} items"),
        }
    }

    #[tokio::test]
    async fn create_then_query_by_id_round_trips() {
        let (bus, _) = business();
        let ctx = RequestContext::system();

        let created = bus.create(&ctx, new_tag("fragile")).await.unwrap();
        let fetched = bus.query_by_id(created.id).await.unwrap();

        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn partial_update_keeps_unset_fields() {
        let (bus, _) = business();
        let ctx = RequestContext::system();
        let created = bus.create(&ctx, new_tag("fragile")).await.unwrap();

        let update = UpdateTag {
            name: None,
            description: Some("handle with care".to_string()),
        };
        let updated = bus.update(&ctx, created.clone(), update).await.unwrap();

        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, "handle with care");
        assert_eq!(bus.query_by_id(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn delete_then_query_by_id_is_not_found() {
        let (bus, _) = business();
        let ctx = RequestContext::system();
        let created = bus.create(&ctx, new_tag("fragile")).await.unwrap();

        bus.delete(&ctx, created.clone()).await.unwrap();

        assert!(matches!(
            bus.query_by_id(created.id).await,
            Err(BusError::NotFound { domain: "tag" })
        ));
    }

    #[tokio::test]
    async fn duplicate_name_is_unique_entry() {
        let (bus, _) = business();
        let ctx = RequestContext::system();
        bus.create(&ctx, new_tag("fragile")).await.unwrap();

        let err = bus.create(&ctx, new_tag("fragile")).await.unwrap_err();
        assert!(matches!(err, BusError::UniqueEntry { domain: "tag", .. }));
    }

    #[tokio::test]
    async fn mutations_fire_delegate_events() {
        let (bus, delegate) = business();
        let recorder = Arc::new(Recorder::default());
        let handler: Arc<dyn EventHandler> = recorder.clone();
        delegate.register_all("tag", &handler);
        let ctx = RequestContext::system();

        let created = bus.create(&ctx, new_tag("fragile")).await.unwrap();
        let update = UpdateTag {
            name: Some("breakable".to_string()),
            description: None,
        };
        let updated = bus.update(&ctx, created.clone(), update).await.unwrap();
        bus.delete(&ctx, updated).await.unwrap();

        let events = recorder.events.lock().unwrap();
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![Action::Created, Action::Updated, Action::Deleted]);
        assert!(events.iter().all(|e| e.entity_id == created.id));
        assert_eq!(events[1].before.as_ref().unwrap()["name"], "fragile");
        assert_eq!(events[1].entity["name"], "breakable");
    }

    #[tokio::test]
    async fn failing_handler_does_not_fail_mutation() {
        let (bus, delegate) = business();
        let failing = Arc::new(Failing {
            calls: AtomicUsize::new(0),
        });
        delegate.register("tag", Action::Created, failing.clone());

        let created = bus
            .create(&RequestContext::system(), new_tag("fragile"))
            .await
            .unwrap();

        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert!(bus.query_by_id(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn query_and_count_agree_on_filter() {
        let (bus, _) = business();
        let ctx = RequestContext::system();
        for name in ["alpha", "beta", "alphabet"] {
            bus.create(&ctx, new_tag(name)).await.unwrap();
        }
        let filter = TagFilter {
            name: Some("ALPHA".to_string()),
            ..TagFilter::default()
        };

        let items = bus
            .query(&filter, &TagDomain::DEFAULT_ORDER, Page::default())
            .await
            .unwrap();
        let names: Vec<_> = items.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["alpha", "alphabet"]);
        assert_eq!(bus.count(&filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn query_by_ids_skips_unknown_ids() {
        let (bus, _) = business();
        let ctx = RequestContext::system();
        let a = bus.create(&ctx, new_tag("a")).await.unwrap();
        let b = bus.create(&ctx, new_tag("b")).await.unwrap();

        let found = bus
            .query_by_ids(&[a.id, Uuid::new_v4(), b.id])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn update_stamps_audit_fields_and_keeps_the_rest() {
        use crate::domain::currency::{CurrencyDomain, NewCurrency, UpdateCurrency};

        let bus = Business::new(
            Arc::new(MemoryStore::<CurrencyDomain>::new()),
            Arc::new(Delegate::new()),
        );
        let creator = RequestContext::new(Uuid::new_v4(), vec!["ADMIN".to_string()]);
        let editor = RequestContext::new(Uuid::new_v4(), vec!["ADMIN".to_string()]);

        let created = bus
            .create(
                &creator,
                NewCurrency {
                    code: "CHF".to_string(),
                    name: "Swiss Franc".to_string(),
                    symbol: "Fr".to_string(),
                    locale: "de-CH".to_string(),
                    decimal_places: 2,
                    is_active: true,
                    sort_order: 7,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.created_date, created.updated_date);

        // Back to back updates land in the same microsecond often enough.
        let mut current = created.clone();
        for sort_order in [8, 9] {
            let update = UpdateCurrency {
                sort_order: Some(sort_order),
                ..UpdateCurrency::default()
            };
            let next = bus.update(&editor, current.clone(), update).await.unwrap();
            assert!(next.updated_date > current.updated_date);
            current = next;
        }

        assert_eq!(current.sort_order, 9);
        assert_eq!(current.created_date, created.created_date);
        assert_eq!(current.created_by, creator.user_id);
        assert_eq!(current.updated_by, editor.user_id);
        assert_eq!(current.code, "CHF");
        assert_eq!(current.name, "Swiss Franc");
        assert_eq!(current.locale, "de-CH");
        assert_eq!(bus.query_by_id(created.id).await.unwrap(), current);
    }
}
