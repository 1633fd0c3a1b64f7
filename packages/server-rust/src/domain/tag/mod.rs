//! Asset tags: free-form labels attached to assets through asset tags.

mod app;
mod store;

pub use app::{NewTagDto, TagDto, UpdateTagDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Entity for Tag {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct TagDomain;

impl Domain for TagDomain {
    const NAME: &'static str = "tag";
    const TABLE: &'static str = "assets.tags";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("name");

    type Entity = Tag;
    type New = NewTag;
    type Update = UpdateTag;
    type Filter = TagFilter;

    fn build(new: NewTag, id: Uuid, _now: DateTime<Utc>, _ctx: &RequestContext) -> Tag {
        Tag {
            id,
            name: new.name,
            description: new.description,
        }
    }

    fn apply(tag: &mut Tag, update: UpdateTag, _now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(name) = update.name {
            tag.name = name;
        }
        if let Some(description) = update.description {
            tag.description = description;
        }
    }

    fn matches(filter: &TagFilter, tag: &Tag) -> bool {
        eq_opt(filter.id.as_ref(), &tag.id)
            && ilike_opt(filter.name.as_ref(), &tag.name)
            && ilike_opt(filter.description.as_ref(), &tag.description)
    }

    fn order_value(tag: &Tag, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(tag.id.into()),
            "name" => Some((&tag.name).into()),
            "description" => Some((&tag.description).into()),
            _ => None,
        }
    }

    fn unique_keys(tag: &Tag) -> Vec<String> {
        vec![format!("name={}", tag.name)]
    }
}
