use chrono::{DateTime, Utc};
use ichor_core::context::{ROLE_ADMIN, ROLE_USER};
use ichor_core::filter::QueryParams;
use ichor_core::{Error, FieldErrors, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{NewUser, UpdateUser, User, UserDomain, UserFilter};
use crate::app::AppDomain;

/// Upper-cases role names and rejects unknown ones.
fn parse_roles(roles: Vec<String>) -> Result<Vec<String>, Error> {
    let mut errors = FieldErrors::new();
    let mut parsed = Vec::with_capacity(roles.len());
    for role in roles {
        let upper = role.trim().to_ascii_uppercase();
        if upper == ROLE_ADMIN || upper == ROLE_USER {
            if !parsed.contains(&upper) {
                parsed.push(upper);
            }
        } else {
            errors.add("roles", format!("unknown role {role}"));
        }
    }
    if parsed.is_empty() && errors.is_empty() {
        errors.add("roles", "roles must contain at least one role");
    }
    errors.into_result().map(|()| parsed)
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub enabled: bool,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewUserDto {
    #[validate(required, length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required)]
    pub roles: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserDto {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

impl AppDomain for UserDomain {
    const ROUTE: &'static str = "core/users";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("user_id", "id"),
        ("username", "username"),
        ("first_name", "first_name"),
        ("last_name", "last_name"),
        ("email", "email"),
        ("enabled", "enabled"),
        ("created_date", "created_date"),
    ];

    type Dto = UserDto;
    type NewDto = NewUserDto;
    type UpdateDto = UpdateUserDto;

    fn to_dto(user: User) -> UserDto {
        UserDto {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            roles: user.roles,
            enabled: user.enabled,
            created_date: user.created_date,
            updated_date: user.updated_date,
        }
    }

    fn to_bus_new(dto: NewUserDto) -> Result<NewUser, Error> {
        Ok(NewUser {
            username: dto.username.unwrap_or_default(),
            first_name: dto.first_name.unwrap_or_default(),
            last_name: dto.last_name.unwrap_or_default(),
            email: dto.email.unwrap_or_default(),
            roles: parse_roles(dto.roles.unwrap_or_default())?,
            enabled: dto.enabled.unwrap_or(true),
        })
    }

    fn to_bus_update(dto: UpdateUserDto) -> Result<UpdateUser, Error> {
        Ok(UpdateUser {
            username: dto.username,
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            roles: dto.roles.map(parse_roles).transpose()?,
            enabled: dto.enabled,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<UserFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = UserFilter {
            id: p.uuid("user_id"),
            username: p.string("username"),
            first_name: p.string("first_name"),
            last_name: p.string("last_name"),
            email: p.string("email"),
            enabled: p.bool("enabled"),
            start_created_date: p.time("start_created_date"),
            end_created_date: p.time("end_created_date"),
        };
        p.finish(filter)
    }
}
