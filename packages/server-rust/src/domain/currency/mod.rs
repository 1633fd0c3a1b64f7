//! ISO 4217 currencies. Reads go through a read-through cache.

mod app;
mod store;

pub use app::{CurrencyDto, NewCurrencyDto, UpdateCurrencyDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub locale: String,
    pub decimal_places: i32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_by: Uuid,
    pub created_date: DateTime<Utc>,
    pub updated_by: Uuid,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCurrency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub locale: String,
    pub decimal_places: i32,
    pub is_active: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCurrency {
    pub code: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub locale: Option<String>,
    pub decimal_places: Option<i32>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct CurrencyFilter {
    pub id: Option<Uuid>,
    pub code: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

impl Entity for Currency {
    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_date(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_date)
    }
}

pub struct CurrencyDomain;

impl Domain for CurrencyDomain {
    const NAME: &'static str = "currency";
    const TABLE: &'static str = "core.currencies";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("code");

    type Entity = Currency;
    type New = NewCurrency;
    type Update = UpdateCurrency;
    type Filter = CurrencyFilter;

    fn build(new: NewCurrency, id: Uuid, now: DateTime<Utc>, ctx: &RequestContext) -> Currency {
        Currency {
            id,
            code: new.code,
            name: new.name,
            symbol: new.symbol,
            locale: new.locale,
            decimal_places: new.decimal_places,
            is_active: new.is_active,
            sort_order: new.sort_order,
            created_by: ctx.user_id,
            created_date: now,
            updated_by: ctx.user_id,
            updated_date: now,
        }
    }

    fn apply(c: &mut Currency, update: UpdateCurrency, now: DateTime<Utc>, ctx: &RequestContext) {
        if let Some(code) = update.code {
            c.code = code;
        }
        if let Some(name) = update.name {
            c.name = name;
        }
        if let Some(symbol) = update.symbol {
            c.symbol = symbol;
        }
        if let Some(locale) = update.locale {
            c.locale = locale;
        }
        if let Some(places) = update.decimal_places {
            c.decimal_places = places;
        }
        if let Some(active) = update.is_active {
            c.is_active = active;
        }
        if let Some(order) = update.sort_order {
            c.sort_order = order;
        }
        c.updated_by = ctx.user_id;
        c.updated_date = now;
    }

    fn matches(filter: &CurrencyFilter, c: &Currency) -> bool {
        eq_opt(filter.id.as_ref(), &c.id)
            && eq_opt(filter.code.as_ref(), &c.code)
            && ilike_opt(filter.name.as_ref(), &c.name)
            && eq_opt(filter.is_active.as_ref(), &c.is_active)
    }

    fn order_value(c: &Currency, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(c.id.into()),
            "code" => Some((&c.code).into()),
            "name" => Some((&c.name).into()),
            "sort_order" => Some(c.sort_order.into()),
            "is_active" => Some(c.is_active.into()),
            _ => None,
        }
    }

    fn unique_keys(c: &Currency) -> Vec<String> {
        vec![format!("code={}", c.code)]
    }
}
