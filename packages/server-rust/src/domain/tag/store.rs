use sqlx::FromRow;
use uuid::Uuid;

use super::{Tag, TagDomain, TagFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct TagRow {
    id: Uuid,
    name: String,
    description: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

impl PgTable for TagDomain {
    const COLUMNS: &'static [&'static str] = &["id", "name", "description"];

    type Row = TagRow;

    fn bind_row(tag: &Tag, row: &mut RowBinds<'_>) {
        row.push_bind(tag.id)
            .push_bind(tag.name.clone())
            .push_bind(tag.description.clone());
    }

    fn apply_filter(filter: &TagFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .ilike("name", filter.name.as_deref())
            .ilike("description", filter.description.as_deref());
    }
}
