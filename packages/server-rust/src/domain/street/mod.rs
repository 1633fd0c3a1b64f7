//! Street addresses within a region.

mod app;
mod store;

pub use app::{NewStreetDto, StreetDto, UpdateStreetDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Street {
    pub id: Uuid,
    pub region_id: Uuid,
    pub line_1: String,
    pub line_2: Option<String>,
    pub postal_code: String,
}

#[derive(Debug, Clone)]
pub struct NewStreet {
    pub region_id: Uuid,
    pub line_1: String,
    pub line_2: Option<String>,
    pub postal_code: String,
}

/// `line_2: Some(None)` clears the column.
#[derive(Debug, Clone, Default)]
#[allow(clippy::option_option)]
pub struct UpdateStreet {
    pub region_id: Option<Uuid>,
    pub line_1: Option<String>,
    pub line_2: Option<Option<String>>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StreetFilter {
    pub id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub line_1: Option<String>,
    pub line_2: Option<String>,
    pub postal_code: Option<String>,
}

impl Entity for Street {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct StreetDomain;

impl Domain for StreetDomain {
    const NAME: &'static str = "street";
    const TABLE: &'static str = "geography.streets";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("line_1");

    type Entity = Street;
    type New = NewStreet;
    type Update = UpdateStreet;
    type Filter = StreetFilter;

    fn build(new: NewStreet, id: Uuid, _now: DateTime<Utc>, _ctx: &RequestContext) -> Street {
        Street {
            id,
            region_id: new.region_id,
            line_1: new.line_1,
            line_2: new.line_2,
            postal_code: new.postal_code,
        }
    }

    fn apply(s: &mut Street, update: UpdateStreet, _now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(region_id) = update.region_id {
            s.region_id = region_id;
        }
        if let Some(line_1) = update.line_1 {
            s.line_1 = line_1;
        }
        if let Some(line_2) = update.line_2 {
            s.line_2 = line_2;
        }
        if let Some(postal_code) = update.postal_code {
            s.postal_code = postal_code;
        }
    }

    fn matches(filter: &StreetFilter, s: &Street) -> bool {
        eq_opt(filter.id.as_ref(), &s.id)
            && eq_opt(filter.region_id.as_ref(), &s.region_id)
            && ilike_opt(filter.line_1.as_ref(), &s.line_1)
            && filter
                .line_2
                .as_ref()
                .map_or(true, |f| s.line_2.as_deref().is_some_and(|v| ilike(v, f)))
            && ilike_opt(filter.postal_code.as_ref(), &s.postal_code)
    }

    fn order_value(s: &Street, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(s.id.into()),
            "region_id" => Some(s.region_id.into()),
            "line_1" => Some((&s.line_1).into()),
            "line_2" => s.line_2.as_ref().map(Into::into),
            "postal_code" => Some((&s.postal_code).into()),
            _ => None,
        }
    }
}
