use sqlx::FromRow;
use uuid::Uuid;

use super::{Form, FormDomain, FormFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct FormRow {
    id: Uuid,
    name: String,
    is_reference_data: bool,
    allow_inline_create: bool,
}

impl From<FormRow> for Form {
    fn from(row: FormRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            is_reference_data: row.is_reference_data,
            allow_inline_create: row.allow_inline_create,
        }
    }
}

impl PgTable for FormDomain {
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "is_reference_data", "allow_inline_create"];

    type Row = FormRow;

    fn bind_row(form: &Form, row: &mut RowBinds<'_>) {
        row.push_bind(form.id)
            .push_bind(form.name.clone())
            .push_bind(form.is_reference_data)
            .push_bind(form.allow_inline_create);
    }

    fn apply_filter(filter: &FormFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .ilike("name", filter.name.as_deref())
            .eq("is_reference_data", filter.is_reference_data)
            .eq("allow_inline_create", filter.allow_inline_create);
    }
}
