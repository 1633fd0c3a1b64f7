use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Asset, AssetDomain, AssetFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct AssetRow {
    id: Uuid,
    name: String,
    serial_number: String,
    model_number: String,
    is_enabled: bool,
    created_by: Uuid,
    created_date: DateTime<Utc>,
    updated_by: Uuid,
    updated_date: DateTime<Utc>,
}

impl From<AssetRow> for Asset {
    fn from(row: AssetRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            serial_number: row.serial_number,
            model_number: row.model_number,
            is_enabled: row.is_enabled,
            created_by: row.created_by,
            created_date: row.created_date,
            updated_by: row.updated_by,
            updated_date: row.updated_date,
        }
    }
}

impl PgTable for AssetDomain {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "serial_number",
        "model_number",
        "is_enabled",
        "created_by",
        "created_date",
        "updated_by",
        "updated_date",
    ];

    type Row = AssetRow;

    fn bind_row(a: &Asset, row: &mut RowBinds<'_>) {
        row.push_bind(a.id)
            .push_bind(a.name.clone())
            .push_bind(a.serial_number.clone())
            .push_bind(a.model_number.clone())
            .push_bind(a.is_enabled)
            .push_bind(a.created_by)
            .push_bind(a.created_date)
            .push_bind(a.updated_by)
            .push_bind(a.updated_date);
    }

    fn apply_filter(filter: &AssetFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .ilike("name", filter.name.as_deref())
            .eq("serial_number", filter.serial_number.clone())
            .ilike("model_number", filter.model_number.as_deref())
            .eq("is_enabled", filter.is_enabled);
    }
}
