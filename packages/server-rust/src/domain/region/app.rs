use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{NewRegion, Region, RegionDomain, RegionFilter, UpdateRegion};
use crate::app::AppDomain;

#[derive(Debug, Serialize)]
pub struct RegionDto {
    pub id: Uuid,
    pub country_id: Uuid,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewRegionDto {
    #[validate(required)]
    pub country_id: Option<Uuid>,
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, max = 10))]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRegionDto {
    pub country_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub code: Option<String>,
}

impl AppDomain for RegionDomain {
    const ROUTE: &'static str = "geography/regions";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("region_id", "id"),
        ("country_id", "country_id"),
        ("name", "name"),
        ("code", "code"),
    ];

    type Dto = RegionDto;
    type NewDto = NewRegionDto;
    type UpdateDto = UpdateRegionDto;

    fn to_dto(r: Region) -> RegionDto {
        RegionDto {
            id: r.id,
            country_id: r.country_id,
            name: r.name,
            code: r.code,
        }
    }

    fn to_bus_new(dto: NewRegionDto) -> Result<NewRegion, Error> {
        Ok(NewRegion {
            country_id: dto.country_id.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            code: dto.code.unwrap_or_default(),
        })
    }

    fn to_bus_update(dto: UpdateRegionDto) -> Result<UpdateRegion, Error> {
        Ok(UpdateRegion {
            country_id: dto.country_id,
            name: dto.name,
            code: dto.code,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<RegionFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = RegionFilter {
            id: p.uuid("region_id"),
            country_id: p.uuid("country_id"),
            name: p.string("name"),
            code: p.string("code"),
        };
        p.finish(filter)
    }
}
