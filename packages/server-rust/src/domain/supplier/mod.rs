//! Suppliers goods are procured from.

mod app;
mod store;

pub use app::{NewSupplierDto, SupplierDto, UpdateSupplierDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, within, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub payment_terms: String,
    pub lead_time_days: i32,
    pub rating: Decimal,
    pub is_active: bool,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub payment_terms: String,
    pub lead_time_days: i32,
    pub rating: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSupplier {
    pub name: Option<String>,
    pub payment_terms: Option<String>,
    pub lead_time_days: Option<i32>,
    pub rating: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierFilter {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub payment_terms: Option<String>,
    pub lead_time_days: Option<i32>,
    pub min_rating: Option<Decimal>,
    pub max_rating: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl Entity for Supplier {
    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_date(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_date)
    }
}

pub struct SupplierDomain;

impl Domain for SupplierDomain {
    const NAME: &'static str = "supplier";
    const TABLE: &'static str = "procurement.suppliers";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("name");

    type Entity = Supplier;
    type New = NewSupplier;
    type Update = UpdateSupplier;
    type Filter = SupplierFilter;

    fn build(new: NewSupplier, id: Uuid, now: DateTime<Utc>, _ctx: &RequestContext) -> Supplier {
        Supplier {
            id,
            name: new.name,
            payment_terms: new.payment_terms,
            lead_time_days: new.lead_time_days,
            rating: new.rating,
            is_active: new.is_active,
            created_date: now,
            updated_date: now,
        }
    }

    fn apply(s: &mut Supplier, update: UpdateSupplier, now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(name) = update.name {
            s.name = name;
        }
        if let Some(terms) = update.payment_terms {
            s.payment_terms = terms;
        }
        if let Some(days) = update.lead_time_days {
            s.lead_time_days = days;
        }
        if let Some(rating) = update.rating {
            s.rating = rating;
        }
        if let Some(active) = update.is_active {
            s.is_active = active;
        }
        s.updated_date = now;
    }

    fn matches(filter: &SupplierFilter, s: &Supplier) -> bool {
        eq_opt(filter.id.as_ref(), &s.id)
            && ilike_opt(filter.name.as_ref(), &s.name)
            && ilike_opt(filter.payment_terms.as_ref(), &s.payment_terms)
            && eq_opt(filter.lead_time_days.as_ref(), &s.lead_time_days)
            && within(filter.min_rating.as_ref(), filter.max_rating.as_ref(), &s.rating)
            && eq_opt(filter.is_active.as_ref(), &s.is_active)
    }

    fn order_value(s: &Supplier, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(s.id.into()),
            "name" => Some((&s.name).into()),
            "payment_terms" => Some((&s.payment_terms).into()),
            "lead_time_days" => Some(s.lead_time_days.into()),
            "rating" => Some(s.rating.into()),
            "is_active" => Some(s.is_active.into()),
            _ => None,
        }
    }

    fn unique_keys(s: &Supplier) -> Vec<String> {
        vec![format!("name={}", s.name)]
    }
}
