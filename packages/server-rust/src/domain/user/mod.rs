//! Users known to the system. Credentials live with the external auth
//! provider; only profile and role data is stored here.

mod app;
mod store;

pub use app::{NewUserDto, UpdateUserDto, UserDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, within, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
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

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub id: Option<Uuid>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub enabled: Option<bool>,
    pub start_created_date: Option<DateTime<Utc>>,
    pub end_created_date: Option<DateTime<Utc>>,
}

impl Entity for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_date(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_date)
    }
}

pub struct UserDomain;

impl Domain for UserDomain {
    const NAME: &'static str = "user";
    const TABLE: &'static str = "core.users";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("username");

    type Entity = User;
    type New = NewUser;
    type Update = UpdateUser;
    type Filter = UserFilter;

    fn build(new: NewUser, id: Uuid, now: DateTime<Utc>, _ctx: &RequestContext) -> User {
        User {
            id,
            username: new.username,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            roles: new.roles,
            enabled: new.enabled,
            created_date: now,
            updated_date: now,
        }
    }

    fn apply(user: &mut User, update: UpdateUser, now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(roles) = update.roles {
            user.roles = roles;
        }
        if let Some(enabled) = update.enabled {
            user.enabled = enabled;
        }
        user.updated_date = now;
    }

    fn matches(filter: &UserFilter, user: &User) -> bool {
        eq_opt(filter.id.as_ref(), &user.id)
            && ilike_opt(filter.username.as_ref(), &user.username)
            && ilike_opt(filter.first_name.as_ref(), &user.first_name)
            && ilike_opt(filter.last_name.as_ref(), &user.last_name)
            && ilike_opt(filter.email.as_ref(), &user.email)
            && eq_opt(filter.enabled.as_ref(), &user.enabled)
            && within(
                filter.start_created_date.as_ref(),
                filter.end_created_date.as_ref(),
                &user.created_date,
            )
    }

    fn order_value(user: &User, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(user.id.into()),
            "username" => Some((&user.username).into()),
            "first_name" => Some((&user.first_name).into()),
            "last_name" => Some((&user.last_name).into()),
            "email" => Some((&user.email).into()),
            "enabled" => Some(user.enabled.into()),
            "created_date" => Some(user.created_date.into()),
            _ => None,
        }
    }

    fn unique_keys(user: &User) -> Vec<String> {
        vec![
            format!("username={}", user.username),
            format!("email={}", user.email.to_lowercase()),
        ]
    }
}
