//! Tracked physical assets.

mod app;
mod store;

pub use app::{AssetDto, NewAssetDto, UpdateAssetDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    pub serial_number: String,
    pub model_number: String,
    pub is_enabled: bool,
    pub created_by: Uuid,
    pub created_date: DateTime<Utc>,
    pub updated_by: Uuid,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub serial_number: String,
    pub model_number: String,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAsset {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub model_number: Option<String>,
    pub is_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub model_number: Option<String>,
    pub is_enabled: Option<bool>,
}

impl Entity for Asset {
    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_date(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_date)
    }
}

pub struct AssetDomain;

impl Domain for AssetDomain {
    const NAME: &'static str = "asset";
    const TABLE: &'static str = "assets.assets";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("name");

    type Entity = Asset;
    type New = NewAsset;
    type Update = UpdateAsset;
    type Filter = AssetFilter;

    fn build(new: NewAsset, id: Uuid, now: DateTime<Utc>, ctx: &RequestContext) -> Asset {
        Asset {
            id,
            name: new.name,
            serial_number: new.serial_number,
            model_number: new.model_number,
            is_enabled: new.is_enabled,
            created_by: ctx.user_id,
            created_date: now,
            updated_by: ctx.user_id,
            updated_date: now,
        }
    }

    fn apply(a: &mut Asset, update: UpdateAsset, now: DateTime<Utc>, ctx: &RequestContext) {
        if let Some(name) = update.name {
            a.name = name;
        }
        if let Some(serial) = update.serial_number {
            a.serial_number = serial;
        }
        if let Some(model) = update.model_number {
            a.model_number = model;
        }
        if let Some(enabled) = update.is_enabled {
            a.is_enabled = enabled;
        }
        a.updated_by = ctx.user_id;
        a.updated_date = now;
    }

    fn matches(filter: &AssetFilter, a: &Asset) -> bool {
        eq_opt(filter.id.as_ref(), &a.id)
            && ilike_opt(filter.name.as_ref(), &a.name)
            && eq_opt(filter.serial_number.as_ref(), &a.serial_number)
            && ilike_opt(filter.model_number.as_ref(), &a.model_number)
            && eq_opt(filter.is_enabled.as_ref(), &a.is_enabled)
    }

    fn order_value(a: &Asset, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(a.id.into()),
            "name" => Some((&a.name).into()),
            "serial_number" => Some((&a.serial_number).into()),
            "model_number" => Some((&a.model_number).into()),
            "is_enabled" => Some(a.is_enabled.into()),
            "created_date" => Some(a.created_date.into()),
            _ => None,
        }
    }

    fn unique_keys(a: &Asset) -> Vec<String> {
        vec![format!("serial_number={}", a.serial_number)]
    }
}
