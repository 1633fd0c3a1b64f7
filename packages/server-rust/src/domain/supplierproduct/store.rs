use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::{SupplierProduct, SupplierProductDomain, SupplierProductFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct SupplierProductRow {
    id: Uuid,
    supplier_id: Uuid,
    product_id: Uuid,
    supplier_part_number: String,
    min_order_quantity: i32,
    max_order_quantity: i32,
    lead_time_days: i32,
    unit_cost: Decimal,
    is_primary_supplier: bool,
    created_date: DateTime<Utc>,
    updated_date: DateTime<Utc>,
}

impl From<SupplierProductRow> for SupplierProduct {
    fn from(row: SupplierProductRow) -> Self {
        Self {
            id: row.id,
            supplier_id: row.supplier_id,
            product_id: row.product_id,
            supplier_part_number: row.supplier_part_number,
            min_order_quantity: row.min_order_quantity,
            max_order_quantity: row.max_order_quantity,
            lead_time_days: row.lead_time_days,
            unit_cost: row.unit_cost,
            is_primary_supplier: row.is_primary_supplier,
            created_date: row.created_date,
            updated_date: row.updated_date,
        }
    }
}

impl PgTable for SupplierProductDomain {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "supplier_id",
        "product_id",
        "supplier_part_number",
        "min_order_quantity",
        "max_order_quantity",
        "lead_time_days",
        "unit_cost",
        "is_primary_supplier",
        "created_date",
        "updated_date",
    ];

    type Row = SupplierProductRow;

    fn bind_row(sp: &SupplierProduct, row: &mut RowBinds<'_>) {
        row.push_bind(sp.id)
            .push_bind(sp.supplier_id)
            .push_bind(sp.product_id)
            .push_bind(sp.supplier_part_number.clone())
            .push_bind(sp.min_order_quantity)
            .push_bind(sp.max_order_quantity)
            .push_bind(sp.lead_time_days)
            .push_bind(sp.unit_cost)
            .push_bind(sp.is_primary_supplier)
            .push_bind(sp.created_date)
            .push_bind(sp.updated_date);
    }

    fn apply_filter(filter: &SupplierProductFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("supplier_id", filter.supplier_id)
            .eq("product_id", filter.product_id)
            .ilike("supplier_part_number", filter.supplier_part_number.as_deref())
            .eq("lead_time_days", filter.lead_time_days)
            .eq("unit_cost", filter.unit_cost)
            .eq("is_primary_supplier", filter.is_primary_supplier);
    }
}
