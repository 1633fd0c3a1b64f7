use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Currency, CurrencyDomain, CurrencyFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct CurrencyRow {
    id: Uuid,
    code: String,
    name: String,
    symbol: String,
    locale: String,
    decimal_places: i32,
    is_active: bool,
    sort_order: i32,
    created_by: Uuid,
    created_date: DateTime<Utc>,
    updated_by: Uuid,
    updated_date: DateTime<Utc>,
}

impl From<CurrencyRow> for Currency {
    fn from(row: CurrencyRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            symbol: row.symbol,
            locale: row.locale,
            decimal_places: row.decimal_places,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_by: row.created_by,
            created_date: row.created_date,
            updated_by: row.updated_by,
            updated_date: row.updated_date,
        }
    }
}

impl PgTable for CurrencyDomain {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "code",
        "name",
        "symbol",
        "locale",
        "decimal_places",
        "is_active",
        "sort_order",
        "created_by",
        "created_date",
        "updated_by",
        "updated_date",
    ];

    type Row = CurrencyRow;

    fn bind_row(c: &Currency, row: &mut RowBinds<'_>) {
        row.push_bind(c.id)
            .push_bind(c.code.clone())
            .push_bind(c.name.clone())
            .push_bind(c.symbol.clone())
            .push_bind(c.locale.clone())
            .push_bind(c.decimal_places)
            .push_bind(c.is_active)
            .push_bind(c.sort_order)
            .push_bind(c.created_by)
            .push_bind(c.created_date)
            .push_bind(c.updated_by)
            .push_bind(c.updated_date);
    }

    fn apply_filter(filter: &CurrencyFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("code", filter.code.clone())
            .ilike("name", filter.name.as_deref())
            .eq("is_active", filter.is_active);
    }
}
