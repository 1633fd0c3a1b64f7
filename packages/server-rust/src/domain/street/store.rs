use sqlx::FromRow;
use uuid::Uuid;

use super::{Street, StreetDomain, StreetFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct StreetRow {
    id: Uuid,
    region_id: Uuid,
    line_1: String,
    line_2: Option<String>,
    postal_code: String,
}

impl From<StreetRow> for Street {
    fn from(row: StreetRow) -> Self {
        Self {
            id: row.id,
            region_id: row.region_id,
            line_1: row.line_1,
            line_2: row.line_2,
            postal_code: row.postal_code,
        }
    }
}

impl PgTable for StreetDomain {
    const COLUMNS: &'static [&'static str] =
        &["id", "region_id", "line_1", "line_2", "postal_code"];

    type Row = StreetRow;

    fn bind_row(s: &Street, row: &mut RowBinds<'_>) {
        row.push_bind(s.id)
            .push_bind(s.region_id)
            .push_bind(s.line_1.clone())
            .push_bind(s.line_2.clone())
            .push_bind(s.postal_code.clone());
    }

    fn apply_filter(filter: &StreetFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("region_id", filter.region_id)
            .ilike("line_1", filter.line_1.as_deref())
            .ilike("line_2", filter.line_2.as_deref())
            .ilike("postal_code", filter.postal_code.as_deref());
    }
}
