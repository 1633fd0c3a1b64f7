use chrono::{DateTime, Utc};
use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Asset, AssetDomain, AssetFilter, NewAsset, UpdateAsset};
use crate::app::AppDomain;

#[derive(Debug, Serialize)]
pub struct AssetDto {
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

#[derive(Debug, Deserialize, Validate)]
pub struct NewAssetDto {
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub serial_number: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub model_number: Option<String>,
    pub is_enabled: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssetDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub serial_number: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub model_number: Option<String>,
    pub is_enabled: Option<bool>,
}

impl AppDomain for AssetDomain {
    const ROUTE: &'static str = "assets/assets";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("asset_id", "id"),
        ("name", "name"),
        ("serial_number", "serial_number"),
        ("model_number", "model_number"),
        ("is_enabled", "is_enabled"),
        ("created_date", "created_date"),
    ];

    type Dto = AssetDto;
    type NewDto = NewAssetDto;
    type UpdateDto = UpdateAssetDto;

    fn to_dto(a: Asset) -> AssetDto {
        AssetDto {
            id: a.id,
            name: a.name,
            serial_number: a.serial_number,
            model_number: a.model_number,
            is_enabled: a.is_enabled,
            created_by: a.created_by,
            created_date: a.created_date,
            updated_by: a.updated_by,
            updated_date: a.updated_date,
        }
    }

    fn to_bus_new(dto: NewAssetDto) -> Result<NewAsset, Error> {
        Ok(NewAsset {
            name: dto.name.unwrap_or_default(),
            serial_number: dto.serial_number.unwrap_or_default(),
            model_number: dto.model_number.unwrap_or_default(),
            is_enabled: dto.is_enabled.unwrap_or(true),
        })
    }

    fn to_bus_update(dto: UpdateAssetDto) -> Result<UpdateAsset, Error> {
        Ok(UpdateAsset {
            name: dto.name,
            serial_number: dto.serial_number,
            model_number: dto.model_number,
            is_enabled: dto.is_enabled,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<AssetFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = AssetFilter {
            id: p.uuid("asset_id"),
            name: p.string("name"),
            serial_number: p.string("serial_number"),
            model_number: p.string("model_number"),
            is_enabled: p.bool("is_enabled"),
        };
        p.finish(filter)
    }
}
