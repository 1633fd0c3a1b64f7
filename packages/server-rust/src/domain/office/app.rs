use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{NewOffice, Office, OfficeDomain, OfficeFilter, UpdateOffice};
use crate::app::AppDomain;

#[derive(Debug, Serialize)]
pub struct OfficeDto {
    pub id: Uuid,
    pub name: String,
    pub street_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewOfficeDto {
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required)]
    pub street_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOfficeDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub street_id: Option<Uuid>,
}

impl AppDomain for OfficeDomain {
    const ROUTE: &'static str = "hr/offices";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("office_id", "id"),
        ("name", "name"),
        ("street_id", "street_id"),
    ];

    type Dto = OfficeDto;
    type NewDto = NewOfficeDto;
    type UpdateDto = UpdateOfficeDto;

    fn to_dto(o: Office) -> OfficeDto {
        OfficeDto {
            id: o.id,
            name: o.name,
            street_id: o.street_id,
        }
    }

    fn to_bus_new(dto: NewOfficeDto) -> Result<NewOffice, Error> {
        Ok(NewOffice {
            name: dto.name.unwrap_or_default(),
            street_id: dto.street_id.unwrap_or_default(),
        })
    }

    fn to_bus_update(dto: UpdateOfficeDto) -> Result<UpdateOffice, Error> {
        Ok(UpdateOffice {
            name: dto.name,
            street_id: dto.street_id,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<OfficeFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = OfficeFilter {
            id: p.uuid("office_id"),
            name: p.string("name"),
            street_id: p.uuid("street_id"),
        };
        p.finish(filter)
    }
}
