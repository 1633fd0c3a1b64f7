//! In-process event dispatch from the business layer to interested subsystems.
//!
//! Business-layer mutations publish an [`EventData`] through the [`Delegate`]
//! after the write succeeds. Handlers are registered per `(domain, action)`
//! and invoked once each, in registration order. Delivery is best effort: a
//! failing handler does not stop the remaining handlers, and the caller is
//! expected to log the returned [`DelegateError`] rather than fail the write.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::RequestContext;

/// Kind of mutation being announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Created, Action::Updated, Action::Deleted];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload delivered to handlers. Entity snapshots are JSON so handlers stay
/// decoupled from the business types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub domain: String,
    pub action: Action,
    pub entity_id: Uuid,
    pub user_id: Uuid,
    /// Entity after the mutation (the removed entity for deletes).
    pub entity: serde_json::Value,
    /// Entity before an update. `None` for creates and deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

impl EventData {
    /// # Errors
    ///
    /// Returns an error if the entity cannot be serialized to JSON.
    pub fn created<T: Serialize>(
        domain: &str,
        ctx: &RequestContext,
        entity_id: Uuid,
        entity: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            domain: domain.to_string(),
            action: Action::Created,
            entity_id,
            user_id: ctx.user_id,
            entity: serde_json::to_value(entity)?,
            before: None,
            occurred_at: Utc::now(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if either snapshot cannot be serialized to JSON.
    pub fn updated<T: Serialize>(
        domain: &str,
        ctx: &RequestContext,
        entity_id: Uuid,
        before: &T,
        after: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            domain: domain.to_string(),
            action: Action::Updated,
            entity_id,
            user_id: ctx.user_id,
            entity: serde_json::to_value(after)?,
            before: Some(serde_json::to_value(before)?),
            occurred_at: Utc::now(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the entity cannot be serialized to JSON.
    pub fn deleted<T: Serialize>(
        domain: &str,
        ctx: &RequestContext,
        entity_id: Uuid,
        entity: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            domain: domain.to_string(),
            action: Action::Deleted,
            entity_id,
            user_id: ctx.user_id,
            entity: serde_json::to_value(entity)?,
            before: None,
            occurred_at: Utc::now(),
        })
    }
}

/// Receiver of delegate events.
///
/// Used as `Arc<dyn EventHandler>`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    /// Handles one event. Errors are collected by the delegate, not retried.
    async fn handle(&self, event: &EventData) -> anyhow::Result<()>;
}

/// Failure report for a dispatch in which at least one handler failed.
#[derive(Debug, thiserror::Error)]
#[error("{} delegate handler(s) failed for {domain}.{action}: {}", .failures.len(), summarize(.failures))]
pub struct DelegateError {
    pub domain: String,
    pub action: Action,
    /// `(handler name, error message)` for every failed handler.
    pub failures: Vec<(String, String)>,
}

fn summarize(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Registry and dispatcher of event handlers keyed by `(domain, action)`.
#[derive(Default)]
pub struct Delegate {
    handlers: DashMap<(String, Action), Vec<Arc<dyn EventHandler>>>,
}

impl Delegate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for one action on one domain.
    pub fn register(&self, domain: &str, action: Action, handler: Arc<dyn EventHandler>) {
        self.handlers
            .entry((domain.to_string(), action))
            .or_default()
            .push(handler);
    }

    /// Registers `handler` for every action on `domain`.
    pub fn register_all(&self, domain: &str, handler: &Arc<dyn EventHandler>) {
        for action in Action::ALL {
            self.register(domain, action, Arc::clone(handler));
        }
    }

    #[must_use]
    pub fn handler_count(&self, domain: &str, action: Action) -> usize {
        self.handlers
            .get(&(domain.to_string(), action))
            .map_or(0, |h| h.len())
    }

    /// Invokes every handler registered for the event's domain and action.
    ///
    /// # Errors
    ///
    /// Returns a [`DelegateError`] listing every handler that failed. All
    /// handlers run regardless of earlier failures.
    pub async fn call(&self, event: &EventData) -> Result<(), DelegateError> {
        // Clone the handler list so no map shard lock is held across awaits.
        let handlers: Vec<Arc<dyn EventHandler>> = match self
            .handlers
            .get(&(event.domain.clone(), event.action))
        {
            Some(entry) => entry.value().clone(),
            None => return Ok(()),
        };

        let mut failures = Vec::new();
        for handler in handlers {
            if let Err(e) = handler.handle(event).await {
                failures.push((handler.name().to_string(), e.to_string()));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DelegateError {
                domain: event.domain.clone(),
                action: event.action,
                failures,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingHandler {
        name: &'static str,
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingHandler {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        fn name(&self) -> &str {
            self.name
        }

        async fn handle(&self, _event: &EventData) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    #[derive(Serialize)]
    struct Tag {
        name: &'static str,
    }

    fn event(domain: &str) -> EventData {
        EventData::created(
            domain,
            &RequestContext::system(),
            Uuid::new_v4(),
            &Tag { name: "fragile" },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn no_handlers_is_ok() {
        let delegate = Delegate::new();
        assert!(delegate.call(&event("tag")).await.is_ok());
    }

    #[tokio::test]
    async fn every_handler_called_once() {
        let delegate = Delegate::new();
        let a = CountingHandler::new("a", false);
        let b = CountingHandler::new("b", false);
        delegate.register("tag", Action::Created, a.clone());
        delegate.register("tag", Action::Created, b.clone());

        delegate.call(&event("tag")).await.unwrap();

        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_does_not_stop_remaining_handlers() {
        let delegate = Delegate::new();
        let bad = CountingHandler::new("bad", true);
        let good = CountingHandler::new("good", false);
        delegate.register("tag", Action::Created, bad.clone());
        delegate.register("tag", Action::Created, good.clone());

        let err = delegate.call(&event("tag")).await.unwrap_err();

        assert_eq!(good.calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.failures, vec![("bad".to_string(), "boom".to_string())]);
        assert_eq!(
            err.to_string(),
            "1 delegate handler(s) failed for tag.created: bad: boom"
        );
    }

    #[tokio::test]
    async fn handlers_are_scoped_by_domain_and_action() {
        let delegate = Delegate::new();
        let h = CountingHandler::new("h", false);
        delegate.register("tag", Action::Deleted, h.clone());

        delegate.call(&event("tag")).await.unwrap();
        delegate.call(&event("asset")).await.unwrap();

        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn register_all_covers_every_action() {
        let delegate = Delegate::new();
        let h: Arc<dyn EventHandler> = CountingHandler::new("h", false);
        delegate.register_all("form", &h);
        for action in Action::ALL {
            assert_eq!(delegate.handler_count("form", action), 1);
        }
        assert_eq!(delegate.handler_count("tag", Action::Created), 0);
    }

    #[test]
    fn updated_event_carries_both_snapshots() {
        let before = Tag { name: "old" };
        let after = Tag { name: "new" };
        let data = EventData::updated("tag", &RequestContext::system(), Uuid::nil(), &before, &after)
            .unwrap();
        assert_eq!(data.action, Action::Updated);
        assert_eq!(data.entity["name"], "new");
        assert_eq!(data.before.unwrap()["name"], "old");
    }
}
