use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{InventoryTransaction, InventoryTransactionDomain, InventoryTransactionFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct InventoryTransactionRow {
    id: Uuid,
    product_id: Uuid,
    location_id: Uuid,
    user_id: Uuid,
    quantity: i32,
    transaction_type: String,
    reference_number: String,
    transaction_date: DateTime<Utc>,
    created_date: DateTime<Utc>,
    updated_date: DateTime<Utc>,
}

impl From<InventoryTransactionRow> for InventoryTransaction {
    fn from(row: InventoryTransactionRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            location_id: row.location_id,
            user_id: row.user_id,
            quantity: row.quantity,
            transaction_type: row.transaction_type,
            reference_number: row.reference_number,
            transaction_date: row.transaction_date,
            created_date: row.created_date,
            updated_date: row.updated_date,
        }
    }
}

impl PgTable for InventoryTransactionDomain {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "product_id",
        "location_id",
        "user_id",
        "quantity",
        "transaction_type",
        "reference_number",
        "transaction_date",
        "created_date",
        "updated_date",
    ];

    type Row = InventoryTransactionRow;

    fn bind_row(it: &InventoryTransaction, row: &mut RowBinds<'_>) {
        row.push_bind(it.id)
            .push_bind(it.product_id)
            .push_bind(it.location_id)
            .push_bind(it.user_id)
            .push_bind(it.quantity)
            .push_bind(it.transaction_type.clone())
            .push_bind(it.reference_number.clone())
            .push_bind(it.transaction_date)
            .push_bind(it.created_date)
            .push_bind(it.updated_date);
    }

    fn apply_filter(filter: &InventoryTransactionFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("product_id", filter.product_id)
            .eq("location_id", filter.location_id)
            .eq("user_id", filter.user_id)
            .eq("quantity", filter.quantity)
            .eq("transaction_type", filter.transaction_type.clone())
            .ilike("reference_number", filter.reference_number.as_deref())
            .gte("transaction_date", filter.start_transaction_date)
            .lte("transaction_date", filter.end_transaction_date);
    }
}
