//! ISO 3166 countries.

mod app;
mod store;

pub use app::{CountryDto, NewCountryDto, UpdateCountryDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Country {
    pub id: Uuid,
    pub number: i32,
    pub name: String,
    pub alpha_2: String,
    pub alpha_3: String,
}

#[derive(Debug, Clone)]
pub struct NewCountry {
    pub number: i32,
    pub name: String,
    pub alpha_2: String,
    pub alpha_3: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCountry {
    pub number: Option<i32>,
    pub name: Option<String>,
    pub alpha_2: Option<String>,
    pub alpha_3: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CountryFilter {
    pub id: Option<Uuid>,
    pub number: Option<i32>,
    pub name: Option<String>,
    pub alpha_2: Option<String>,
    pub alpha_3: Option<String>,
}

impl Entity for Country {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct CountryDomain;

impl Domain for CountryDomain {
    const NAME: &'static str = "country";
    const TABLE: &'static str = "geography.countries";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("name");

    type Entity = Country;
    type New = NewCountry;
    type Update = UpdateCountry;
    type Filter = CountryFilter;

    fn build(new: NewCountry, id: Uuid, _now: DateTime<Utc>, _ctx: &RequestContext) -> Country {
        Country {
            id,
            number: new.number,
            name: new.name,
            alpha_2: new.alpha_2,
            alpha_3: new.alpha_3,
        }
    }

    fn apply(c: &mut Country, update: UpdateCountry, _now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(number) = update.number {
            c.number = number;
        }
        if let Some(name) = update.name {
            c.name = name;
        }
        if let Some(alpha_2) = update.alpha_2 {
            c.alpha_2 = alpha_2;
        }
        if let Some(alpha_3) = update.alpha_3 {
            c.alpha_3 = alpha_3;
        }
    }

    fn matches(filter: &CountryFilter, c: &Country) -> bool {
        eq_opt(filter.id.as_ref(), &c.id)
            && eq_opt(filter.number.as_ref(), &c.number)
            && ilike_opt(filter.name.as_ref(), &c.name)
            && eq_opt(filter.alpha_2.as_ref(), &c.alpha_2)
            && eq_opt(filter.alpha_3.as_ref(), &c.alpha_3)
    }

    fn order_value(c: &Country, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(c.id.into()),
            "number" => Some(c.number.into()),
            "name" => Some((&c.name).into()),
            "alpha_2" => Some((&c.alpha_2).into()),
            "alpha_3" => Some((&c.alpha_3).into()),
            _ => None,
        }
    }

    fn unique_keys(c: &Country) -> Vec<String> {
        vec![
            format!("alpha_2={}", c.alpha_2),
            format!("alpha_3={}", c.alpha_3),
        ]
    }
}
