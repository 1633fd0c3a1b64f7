//! First-level subdivisions of a country (states, provinces).

mod app;
mod store;

pub use app::{NewRegionDto, RegionDto, UpdateRegionDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: Uuid,
    pub country_id: Uuid,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct NewRegion {
    pub country_id: Uuid,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRegion {
    pub country_id: Option<Uuid>,
    pub name: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RegionFilter {
    pub id: Option<Uuid>,
    pub country_id: Option<Uuid>,
    pub name: Option<String>,
    pub code: Option<String>,
}

impl Entity for Region {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct RegionDomain;

impl Domain for RegionDomain {
    const NAME: &'static str = "region";
    const TABLE: &'static str = "geography.regions";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("name");

    type Entity = Region;
    type New = NewRegion;
    type Update = UpdateRegion;
    type Filter = RegionFilter;

    fn build(new: NewRegion, id: Uuid, _now: DateTime<Utc>, _ctx: &RequestContext) -> Region {
        Region {
            id,
            country_id: new.country_id,
            name: new.name,
            code: new.code,
        }
    }

    fn apply(r: &mut Region, update: UpdateRegion, _now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(country_id) = update.country_id {
            r.country_id = country_id;
        }
        if let Some(name) = update.name {
            r.name = name;
        }
        if let Some(code) = update.code {
            r.code = code;
        }
    }

    fn matches(filter: &RegionFilter, r: &Region) -> bool {
        eq_opt(filter.id.as_ref(), &r.id)
            && eq_opt(filter.country_id.as_ref(), &r.country_id)
            && ilike_opt(filter.name.as_ref(), &r.name)
            && eq_opt(filter.code.as_ref(), &r.code)
    }

    fn order_value(r: &Region, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(r.id.into()),
            "country_id" => Some(r.country_id.into()),
            "name" => Some((&r.name).into()),
            "code" => Some((&r.code).into()),
            _ => None,
        }
    }

    fn unique_keys(r: &Region) -> Vec<String> {
        vec![format!("country_id={},code={}", r.country_id, r.code)]
    }
}
