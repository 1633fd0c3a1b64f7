use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{NewTag, Tag, TagDomain, TagFilter, UpdateTag};
use crate::app::AppDomain;

#[derive(Debug, Serialize)]
pub struct TagDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewTagDto {
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required, length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl AppDomain for TagDomain {
    const ROUTE: &'static str = "assets/tags";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("tag_id", "id"),
        ("name", "name"),
        ("description", "description"),
    ];

    type Dto = TagDto;
    type NewDto = NewTagDto;
    type UpdateDto = UpdateTagDto;

    fn to_dto(tag: Tag) -> TagDto {
        TagDto {
            id: tag.id,
            name: tag.name,
            description: tag.description,
        }
    }

    fn to_bus_new(dto: NewTagDto) -> Result<NewTag, Error> {
        Ok(NewTag {
            name: dto.name.unwrap_or_default(),
            description: dto.description.unwrap_or_default(),
        })
    }

    fn to_bus_update(dto: UpdateTagDto) -> Result<UpdateTag, Error> {
        Ok(UpdateTag {
            name: dto.name,
            description: dto.description,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<TagFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = TagFilter {
            id: p.uuid("tag_id"),
            name: p.string("name"),
            description: p.string("description"),
        };
        p.finish(filter)
    }
}
