use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{User, UserDomain, UserFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct UserRow {
    id: Uuid,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    roles: Vec<String>,
    enabled: bool,
    created_date: DateTime<Utc>,
    updated_date: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            roles: row.roles,
            enabled: row.enabled,
            created_date: row.created_date,
            updated_date: row.updated_date,
        }
    }
}

impl PgTable for UserDomain {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "username",
        "first_name",
        "last_name",
        "email",
        "roles",
        "enabled",
        "created_date",
        "updated_date",
    ];

    type Row = UserRow;

    fn bind_row(user: &User, row: &mut RowBinds<'_>) {
        row.push_bind(user.id)
            .push_bind(user.username.clone())
            .push_bind(user.first_name.clone())
            .push_bind(user.last_name.clone())
            .push_bind(user.email.clone())
            .push_bind(user.roles.clone())
            .push_bind(user.enabled)
            .push_bind(user.created_date)
            .push_bind(user.updated_date);
    }

    fn apply_filter(filter: &UserFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .ilike("username", filter.username.as_deref())
            .ilike("first_name", filter.first_name.as_deref())
            .ilike("last_name", filter.last_name.as_deref())
            .ilike("email", filter.email.as_deref())
            .eq("enabled", filter.enabled)
            .gte("created_date", filter.start_created_date)
            .lte("created_date", filter.end_created_date);
    }
}
