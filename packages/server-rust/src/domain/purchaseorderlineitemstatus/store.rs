use sqlx::FromRow;
use uuid::Uuid;

use super::{
    PurchaseOrderLineItemStatus, PurchaseOrderLineItemStatusDomain,
    PurchaseOrderLineItemStatusFilter,
};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct PurchaseOrderLineItemStatusRow {
    id: Uuid,
    name: String,
    description: String,
    sort_order: i32,
}

impl From<PurchaseOrderLineItemStatusRow> for PurchaseOrderLineItemStatus {
    fn from(row: PurchaseOrderLineItemStatusRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            sort_order: row.sort_order,
        }
    }
}

impl PgTable for PurchaseOrderLineItemStatusDomain {
    const COLUMNS: &'static [&'static str] = &["id", "name", "description", "sort_order"];

    type Row = PurchaseOrderLineItemStatusRow;

    fn bind_row(status: &PurchaseOrderLineItemStatus, row: &mut RowBinds<'_>) {
        row.push_bind(status.id)
            .push_bind(status.name.clone())
            .push_bind(status.description.clone())
            .push_bind(status.sort_order);
    }

    fn apply_filter(filter: &PurchaseOrderLineItemStatusFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .ilike("name", filter.name.as_deref())
            .ilike("description", filter.description.as_deref());
    }
}
