use sqlx::FromRow;
use uuid::Uuid;

use super::{AssetTag, AssetTagDomain, AssetTagFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct AssetTagRow {
    id: Uuid,
    asset_id: Uuid,
    tag_id: Uuid,
}

impl From<AssetTagRow> for AssetTag {
    fn from(row: AssetTagRow) -> Self {
        Self {
            id: row.id,
            asset_id: row.asset_id,
            tag_id: row.tag_id,
        }
    }
}

impl PgTable for AssetTagDomain {
    const COLUMNS: &'static [&'static str] = &["id", "asset_id", "tag_id"];

    type Row = AssetTagRow;

    fn bind_row(t: &AssetTag, row: &mut RowBinds<'_>) {
        row.push_bind(t.id).push_bind(t.asset_id).push_bind(t.tag_id);
    }

    fn apply_filter(filter: &AssetTagFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("asset_id", filter.asset_id)
            .eq("tag_id", filter.tag_id);
    }
}
