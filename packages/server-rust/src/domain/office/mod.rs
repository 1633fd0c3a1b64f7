//! Company offices, each located at a street address.

mod app;
mod store;

pub use app::{NewOfficeDto, OfficeDto, UpdateOfficeDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Office {
    pub id: Uuid,
    pub name: String,
    pub street_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewOffice {
    pub name: String,
    pub street_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOffice {
    pub name: Option<String>,
    pub street_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct OfficeFilter {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub street_id: Option<Uuid>,
}

impl Entity for Office {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct OfficeDomain;

impl Domain for OfficeDomain {
    const NAME: &'static str = "office";
    const TABLE: &'static str = "hr.offices";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("name");

    type Entity = Office;
    type New = NewOffice;
    type Update = UpdateOffice;
    type Filter = OfficeFilter;

    fn build(new: NewOffice, id: Uuid, _now: DateTime<Utc>, _ctx: &RequestContext) -> Office {
        Office {
            id,
            name: new.name,
            street_id: new.street_id,
        }
    }

    fn apply(o: &mut Office, update: UpdateOffice, _now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(name) = update.name {
            o.name = name;
        }
        if let Some(street_id) = update.street_id {
            o.street_id = street_id;
        }
    }

    fn matches(filter: &OfficeFilter, o: &Office) -> bool {
        eq_opt(filter.id.as_ref(), &o.id)
            && ilike_opt(filter.name.as_ref(), &o.name)
            && eq_opt(filter.street_id.as_ref(), &o.street_id)
    }

    fn order_value(o: &Office, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(o.id.into()),
            "name" => Some((&o.name).into()),
            "street_id" => Some(o.street_id.into()),
            _ => None,
        }
    }

    fn unique_keys(o: &Office) -> Vec<String> {
        vec![format!("name={}", o.name)]
    }
}
