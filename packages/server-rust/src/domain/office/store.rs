use sqlx::FromRow;
use uuid::Uuid;

use super::{Office, OfficeDomain, OfficeFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct OfficeRow {
    id: Uuid,
    name: String,
    street_id: Uuid,
}

impl From<OfficeRow> for Office {
    fn from(row: OfficeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            street_id: row.street_id,
        }
    }
}

impl PgTable for OfficeDomain {
    const COLUMNS: &'static [&'static str] = &["id", "name", "street_id"];

    type Row = OfficeRow;

    fn bind_row(o: &Office, row: &mut RowBinds<'_>) {
        row.push_bind(o.id)
            .push_bind(o.name.clone())
            .push_bind(o.street_id);
    }

    fn apply_filter(filter: &OfficeFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .ilike("name", filter.name.as_deref())
            .eq("street_id", filter.street_id);
    }
}
