use sqlx::FromRow;
use uuid::Uuid;

use super::{Region, RegionDomain, RegionFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct RegionRow {
    id: Uuid,
    country_id: Uuid,
    name: String,
    code: String,
}

impl From<RegionRow> for Region {
    fn from(row: RegionRow) -> Self {
        Self {
            id: row.id,
            country_id: row.country_id,
            name: row.name,
            code: row.code,
        }
    }
}

impl PgTable for RegionDomain {
    const COLUMNS: &'static [&'static str] = &["id", "country_id", "name", "code"];

    type Row = RegionRow;

    fn bind_row(r: &Region, row: &mut RowBinds<'_>) {
        row.push_bind(r.id)
            .push_bind(r.country_id)
            .push_bind(r.name.clone())
            .push_bind(r.code.clone());
    }

    fn apply_filter(filter: &RegionFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("country_id", filter.country_id)
            .ilike("name", filter.name.as_deref())
            .eq("code", filter.code.clone());
    }
}
