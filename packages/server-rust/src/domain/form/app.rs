use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Form, FormDomain, FormFilter, NewForm, UpdateForm};
use crate::app::AppDomain;

#[derive(Debug, Serialize)]
pub struct FormDto {
    pub id: Uuid,
    pub name: String,
    pub is_reference_data: bool,
    pub allow_inline_create: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewFormDto {
    #[validate(required, length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    pub is_reference_data: bool,
    #[serde(default)]
    pub allow_inline_create: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFormDto {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub is_reference_data: Option<bool>,
    pub allow_inline_create: Option<bool>,
}

impl AppDomain for FormDomain {
    const ROUTE: &'static str = "config/forms";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("form_id", "id"),
        ("name", "name"),
        ("is_reference_data", "is_reference_data"),
        ("allow_inline_create", "allow_inline_create"),
    ];

    type Dto = FormDto;
    type NewDto = NewFormDto;
    type UpdateDto = UpdateFormDto;

    fn to_dto(form: Form) -> FormDto {
        FormDto {
            id: form.id,
            name: form.name,
            is_reference_data: form.is_reference_data,
            allow_inline_create: form.allow_inline_create,
        }
    }

    fn to_bus_new(dto: NewFormDto) -> Result<NewForm, Error> {
        Ok(NewForm {
            name: dto.name.unwrap_or_default(),
            is_reference_data: dto.is_reference_data,
            allow_inline_create: dto.allow_inline_create,
        })
    }

    fn to_bus_update(dto: UpdateFormDto) -> Result<UpdateForm, Error> {
        Ok(UpdateForm {
            name: dto.name,
            is_reference_data: dto.is_reference_data,
            allow_inline_create: dto.allow_inline_create,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<FormFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = FormFilter {
            id: p.uuid("form_id"),
            name: p.string("name"),
            is_reference_data: p.bool("is_reference_data"),
            allow_inline_create: p.bool("allow_inline_create"),
        };
        p.finish(filter)
    }
}
