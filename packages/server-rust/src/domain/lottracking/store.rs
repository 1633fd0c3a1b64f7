use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{LotTracking, LotTrackingDomain, LotTrackingFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct LotTrackingRow {
    id: Uuid,
    supplier_product_id: Uuid,
    lot_number: String,
    manufacture_date: DateTime<Utc>,
    expiration_date: DateTime<Utc>,
    received_date: DateTime<Utc>,
    quantity: i32,
    quality_status: String,
    created_date: DateTime<Utc>,
    updated_date: DateTime<Utc>,
}

impl From<LotTrackingRow> for LotTracking {
    fn from(row: LotTrackingRow) -> Self {
        Self {
            id: row.id,
            supplier_product_id: row.supplier_product_id,
            lot_number: row.lot_number,
            manufacture_date: row.manufacture_date,
            expiration_date: row.expiration_date,
            received_date: row.received_date,
            quantity: row.quantity,
            quality_status: row.quality_status,
            created_date: row.created_date,
            updated_date: row.updated_date,
        }
    }
}

impl PgTable for LotTrackingDomain {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "supplier_product_id",
        "lot_number",
        "manufacture_date",
        "expiration_date",
        "received_date",
        "quantity",
        "quality_status",
        "created_date",
        "updated_date",
    ];

    type Row = LotTrackingRow;

    fn bind_row(lot: &LotTracking, row: &mut RowBinds<'_>) {
        row.push_bind(lot.id)
            .push_bind(lot.supplier_product_id)
            .push_bind(lot.lot_number.clone())
            .push_bind(lot.manufacture_date)
            .push_bind(lot.expiration_date)
            .push_bind(lot.received_date)
            .push_bind(lot.quantity)
            .push_bind(lot.quality_status.clone())
            .push_bind(lot.created_date)
            .push_bind(lot.updated_date);
    }

    fn apply_filter(filter: &LotTrackingFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("supplier_product_id", filter.supplier_product_id)
            .ilike("lot_number", filter.lot_number.as_deref())
            .eq("quality_status", filter.quality_status.clone())
            .gte("expiration_date", filter.start_expiration_date)
            .lte("expiration_date", filter.end_expiration_date);
    }
}
