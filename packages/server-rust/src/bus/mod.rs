//! Business layer shared by every domain.
//!
//! A domain describes itself once through [`Domain`]: its entity, input and
//! patch types, how to build and patch entities, and how to match and order
//! them in memory. [`Business`] then provides the create/update/delete/query
//! orchestration, timestamping, error mapping and delegate notifications for
//! all domains alike.

mod business;
mod storer;

pub use business::Business;
pub use storer::Storer;

use std::fmt::Debug;

use chrono::{DateTime, TimeDelta, Utc};
use ichor_core::{OrderBy, RequestContext};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::sqldb::StoreError;

// ---------------------------------------------------------------------------
// Entity / Domain traits
// ---------------------------------------------------------------------------

/// A persisted business entity with a UUID identity.
pub trait Entity: Clone + Debug + Serialize + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    /// Last modification time, for entities that carry one.
    fn updated_date(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Static description of one business domain.
pub trait Domain: Send + Sync + 'static {
    /// Domain name used in events, logs and error messages (`"currency"`).
    const NAME: &'static str;
    /// Fully qualified table name (`"core.currencies"`).
    const TABLE: &'static str;
    /// Order applied when the client does not send `orderBy`.
    const DEFAULT_ORDER: OrderBy;

    type Entity: Entity;
    type New: Send + Sync + 'static;
    type Update: Send + Sync + 'static;
    type Filter: Default + Clone + Debug + Send + Sync + 'static;

    /// Builds a new entity from validated input.
    fn build(new: Self::New, id: Uuid, now: DateTime<Utc>, ctx: &RequestContext) -> Self::Entity;

    /// Copies every set field of `update` into `entity` and stamps the
    /// modification audit fields.
    fn apply(entity: &mut Self::Entity, update: Self::Update, now: DateTime<Utc>, ctx: &RequestContext);

    /// In-memory evaluation of a filter, with the same semantics as the SQL
    /// WHERE clause the store generates.
    fn matches(filter: &Self::Filter, entity: &Self::Entity) -> bool;

    /// Sort key of `entity` for the business order field `field`.
    fn order_value(entity: &Self::Entity, field: &str) -> Option<OrderValue>;

    /// Keys that must be unique across all entities of this domain.
    fn unique_keys(_entity: &Self::Entity) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// OrderValue
// ---------------------------------------------------------------------------

/// Comparable projection of an entity field, used for in-memory ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
    Time(DateTime<Utc>),
    Decimal(Decimal),
}

impl From<&str> for OrderValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<&String> for OrderValue {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<i32> for OrderValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for OrderValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Uuid> for OrderValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<DateTime<Utc>> for OrderValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Time(v)
    }
}

impl From<Decimal> for OrderValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

// ---------------------------------------------------------------------------
// BusError
// ---------------------------------------------------------------------------

/// Errors returned by [`Business`] operations.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("{domain} not found")]
    NotFound { domain: &'static str },
    #[error("{domain} entry is not unique: {detail}")]
    UniqueEntry { domain: &'static str, detail: String },
    #[error("{domain} references a missing entity: {detail}")]
    ForeignKeyViolation { domain: &'static str, detail: String },
    #[error("{domain}: {source}")]
    Store {
        domain: &'static str,
        #[source]
        source: StoreError,
    },
}

impl BusError {
    pub(crate) fn from_store(domain: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound { domain },
            StoreError::Duplicate(detail) => Self::UniqueEntry { domain, detail },
            StoreError::ForeignKey(detail) => Self::ForeignKeyViolation { domain, detail },
            source @ (StoreError::UnknownOrder(_)
            | StoreError::TxClosed
            | StoreError::Database(_)) => Self::Store { domain, source },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers for domain implementations
// ---------------------------------------------------------------------------

/// Current time truncated to microseconds, the precision PostgreSQL stores.
#[must_use]
pub fn now_micros() -> DateTime<Utc> {
    truncate_micros(Utc::now())
}

#[must_use]
pub fn truncate_micros(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(t.timestamp_micros()).unwrap_or(t)
}

/// A timestamp strictly later than `previous`, normally just "now".
#[must_use]
pub fn next_stamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now_micros();
    match previous {
        Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
        _ => now,
    }
}

/// Case-insensitive substring match, the in-memory twin of `ILIKE '%v%'`.
#[must_use]
pub fn ilike(value: &str, pattern: &str) -> bool {
    value.to_lowercase().contains(&pattern.to_lowercase())
}

/// `None` filter values match everything.
pub(crate) fn eq_opt<T: PartialEq>(filter: Option<&T>, value: &T) -> bool {
    filter.map_or(true, |f| f == value)
}

pub(crate) fn ilike_opt(filter: Option<&String>, value: &str) -> bool {
    filter.map_or(true, |f| ilike(value, f))
}

/// Inclusive range check with open ends.
pub(crate) fn within<T: PartialOrd>(start: Option<&T>, end: Option<&T>, value: &T) -> bool {
    start.map_or(true, |s| value >= s) && end.map_or(true, |e| value <= e)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn truncation_drops_nanoseconds() {
        let t = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let truncated = truncate_micros(t);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_456_000);
    }

    #[test]
    fn next_stamp_always_advances() {
        let future = now_micros() + TimeDelta::seconds(60);
        let next = next_stamp(Some(future));
        assert!(next > future);
        assert_eq!(next - future, TimeDelta::microseconds(1));

        let past = now_micros() - TimeDelta::seconds(60);
        assert!(next_stamp(Some(past)) > past);
    }

    #[test]
    fn ilike_is_case_insensitive_substring() {
        assert!(ilike("US Dollar", "dollar"));
        assert!(ilike("US Dollar", ""));
        assert!(!ilike("Euro", "dollar"));
    }

    #[test]
    fn within_treats_missing_bounds_as_open() {
        assert!(within(None, None, &5));
        assert!(within(Some(&5), Some(&5), &5));
        assert!(!within(Some(&6), None, &5));
        assert!(!within(None, Some(&4), &5));
    }

    #[test]
    fn order_values_compare_within_variant() {
        assert!(OrderValue::from("a") < OrderValue::from("b"));
        assert!(OrderValue::from(1_i32) < OrderValue::from(2_i32));
        assert!(Some(OrderValue::from(false)) > None);
    }

    #[test]
    fn store_errors_map_to_business_errors() {
        assert!(matches!(
            BusError::from_store("tag", StoreError::NotFound),
            BusError::NotFound { domain: "tag" }
        ));
        assert!(matches!(
            BusError::from_store("tag", StoreError::Duplicate("tags_name_key".into())),
            BusError::UniqueEntry { .. }
        ));
        assert!(matches!(
            BusError::from_store("tag", StoreError::ForeignKey("fk".into())),
            BusError::ForeignKeyViolation { .. }
        ));
        assert!(matches!(
            BusError::from_store("tag", StoreError::TxClosed),
            BusError::Store { .. }
        ));
    }
}
