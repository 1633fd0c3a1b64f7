//! Join rows linking assets to tags.

mod app;
mod store;

pub use app::{AssetTagDto, NewAssetTagDto, UpdateAssetTagDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetTag {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub tag_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewAssetTag {
    pub asset_id: Uuid,
    pub tag_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAssetTag {
    pub asset_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetTagFilter {
    pub id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

impl Entity for AssetTag {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct AssetTagDomain;

impl Domain for AssetTagDomain {
    const NAME: &'static str = "assettag";
    const TABLE: &'static str = "assets.asset_tags";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("asset_id");

    type Entity = AssetTag;
    type New = NewAssetTag;
    type Update = UpdateAssetTag;
    type Filter = AssetTagFilter;

    fn build(new: NewAssetTag, id: Uuid, _now: DateTime<Utc>, _ctx: &RequestContext) -> AssetTag {
        AssetTag {
            id,
            asset_id: new.asset_id,
            tag_id: new.tag_id,
        }
    }

    fn apply(t: &mut AssetTag, update: UpdateAssetTag, _now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(asset_id) = update.asset_id {
            t.asset_id = asset_id;
        }
        if let Some(tag_id) = update.tag_id {
            t.tag_id = tag_id;
        }
    }

    fn matches(filter: &AssetTagFilter, t: &AssetTag) -> bool {
        eq_opt(filter.id.as_ref(), &t.id)
            && eq_opt(filter.asset_id.as_ref(), &t.asset_id)
            && eq_opt(filter.tag_id.as_ref(), &t.tag_id)
    }

    fn order_value(t: &AssetTag, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(t.id.into()),
            "asset_id" => Some(t.asset_id.into()),
            "tag_id" => Some(t.tag_id.into()),
            _ => None,
        }
    }

    fn unique_keys(t: &AssetTag) -> Vec<String> {
        vec![format!("asset_id={},tag_id={}", t.asset_id, t.tag_id)]
    }
}
