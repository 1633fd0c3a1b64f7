use ichor_core::filter::QueryParams;
use ichor_core::serde_ext::double_option;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{NewStreet, Street, StreetDomain, StreetFilter, UpdateStreet};
use crate::app::AppDomain;

#[derive(Debug, Serialize)]
pub struct StreetDto {
    pub id: Uuid,
    pub region_id: Uuid,
    pub line_1: String,
    pub line_2: Option<String>,
    pub postal_code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewStreetDto {
    #[validate(required)]
    pub region_id: Option<Uuid>,
    #[validate(required, length(min = 1, max = 100))]
    pub line_1: Option<String>,
    #[validate(length(max = 100))]
    pub line_2: Option<String>,
    #[validate(required, length(min = 1, max = 20))]
    pub postal_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[allow(clippy::option_option)]
pub struct UpdateStreetDto {
    pub region_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub line_1: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub line_2: Option<Option<String>>,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: Option<String>,
}

impl AppDomain for StreetDomain {
    const ROUTE: &'static str = "geography/streets";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("street_id", "id"),
        ("region_id", "region_id"),
        ("line_1", "line_1"),
        ("line_2", "line_2"),
        ("postal_code", "postal_code"),
    ];

    type Dto = StreetDto;
    type NewDto = NewStreetDto;
    type UpdateDto = UpdateStreetDto;

    fn to_dto(s: Street) -> StreetDto {
        StreetDto {
            id: s.id,
            region_id: s.region_id,
            line_1: s.line_1,
            line_2: s.line_2,
            postal_code: s.postal_code,
        }
    }

    fn to_bus_new(dto: NewStreetDto) -> Result<NewStreet, Error> {
        Ok(NewStreet {
            region_id: dto.region_id.unwrap_or_default(),
            line_1: dto.line_1.unwrap_or_default(),
            line_2: dto.line_2.filter(|l| !l.trim().is_empty()),
            postal_code: dto.postal_code.unwrap_or_default(),
        })
    }

    fn to_bus_update(dto: UpdateStreetDto) -> Result<UpdateStreet, Error> {
        if let Some(Some(line_2)) = &dto.line_2 {
            if line_2.chars().count() > 100 {
                return Err(Error::field(
                    "line_2",
                    "line_2 must be at most 100 characters",
                ));
            }
        }
        Ok(UpdateStreet {
            region_id: dto.region_id,
            line_1: dto.line_1,
            line_2: dto.line_2,
            postal_code: dto.postal_code,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<StreetFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = StreetFilter {
            id: p.uuid("street_id"),
            region_id: p.uuid("region_id"),
            line_1: p.string("line_1"),
            line_2: p.string("line_2"),
            postal_code: p.string("postal_code"),
        };
        p.finish(filter)
    }
}
