use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{AssetTag, AssetTagDomain, AssetTagFilter, NewAssetTag, UpdateAssetTag};
use crate::app::AppDomain;

#[derive(Debug, Serialize)]
pub struct AssetTagDto {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub tag_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewAssetTagDto {
    #[validate(required)]
    pub asset_id: Option<Uuid>,
    #[validate(required)]
    pub tag_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssetTagDto {
    pub asset_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

impl AppDomain for AssetTagDomain {
    const ROUTE: &'static str = "assets/assettags";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("asset_tag_id", "id"),
        ("asset_id", "asset_id"),
        ("tag_id", "tag_id"),
    ];

    type Dto = AssetTagDto;
    type NewDto = NewAssetTagDto;
    type UpdateDto = UpdateAssetTagDto;

    fn to_dto(t: AssetTag) -> AssetTagDto {
        AssetTagDto {
            id: t.id,
            asset_id: t.asset_id,
            tag_id: t.tag_id,
        }
    }

    fn to_bus_new(dto: NewAssetTagDto) -> Result<NewAssetTag, Error> {
        Ok(NewAssetTag {
            asset_id: dto.asset_id.unwrap_or_default(),
            tag_id: dto.tag_id.unwrap_or_default(),
        })
    }

    fn to_bus_update(dto: UpdateAssetTagDto) -> Result<UpdateAssetTag, Error> {
        Ok(UpdateAssetTag {
            asset_id: dto.asset_id,
            tag_id: dto.tag_id,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<AssetTagFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = AssetTagFilter {
            id: p.uuid("asset_tag_id"),
            asset_id: p.uuid("asset_id"),
            tag_id: p.uuid("tag_id"),
        };
        p.finish(filter)
    }
}
