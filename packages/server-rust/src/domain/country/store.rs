use sqlx::FromRow;
use uuid::Uuid;

use super::{Country, CountryDomain, CountryFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct CountryRow {
    id: Uuid,
    number: i32,
    name: String,
    alpha_2: String,
    alpha_3: String,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Self {
            id: row.id,
            number: row.number,
            name: row.name,
            alpha_2: row.alpha_2,
            alpha_3: row.alpha_3,
        }
    }
}

impl PgTable for CountryDomain {
    const COLUMNS: &'static [&'static str] = &["id", "number", "name", "alpha_2", "alpha_3"];

    type Row = CountryRow;

    fn bind_row(c: &Country, row: &mut RowBinds<'_>) {
        row.push_bind(c.id)
            .push_bind(c.number)
            .push_bind(c.name.clone())
            .push_bind(c.alpha_2.clone())
            .push_bind(c.alpha_3.clone());
    }

    fn apply_filter(filter: &CountryFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("number", filter.number)
            .ilike("name", filter.name.as_deref())
            .eq("alpha_2", filter.alpha_2.clone())
            .eq("alpha_3", filter.alpha_3.clone());
    }
}
