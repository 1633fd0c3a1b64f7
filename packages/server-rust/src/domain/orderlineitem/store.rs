use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::{OrderLineItem, OrderLineItemDomain, OrderLineItemFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct OrderLineItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    description: Option<String>,
    quantity: i32,
    unit_price: Decimal,
    discount: Decimal,
    line_total: Decimal,
    created_by: Uuid,
    created_date: DateTime<Utc>,
    updated_by: Uuid,
    updated_date: DateTime<Utc>,
}

impl From<OrderLineItemRow> for OrderLineItem {
    fn from(row: OrderLineItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
            discount: row.discount,
            line_total: row.line_total,
            created_by: row.created_by,
            created_date: row.created_date,
            updated_by: row.updated_by,
            updated_date: row.updated_date,
        }
    }
}

impl PgTable for OrderLineItemDomain {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "order_id",
        "product_id",
        "description",
        "quantity",
        "unit_price",
        "discount",
        "line_total",
        "created_by",
        "created_date",
        "updated_by",
        "updated_date",
    ];

    type Row = OrderLineItemRow;

    fn bind_row(item: &OrderLineItem, row: &mut RowBinds<'_>) {
        row.push_bind(item.id)
            .push_bind(item.order_id)
            .push_bind(item.product_id)
            .push_bind(item.description.clone())
            .push_bind(item.quantity)
            .push_bind(item.unit_price)
            .push_bind(item.discount)
            .push_bind(item.line_total)
            .push_bind(item.created_by)
            .push_bind(item.created_date)
            .push_bind(item.updated_by)
            .push_bind(item.updated_date);
    }

    fn apply_filter(filter: &OrderLineItemFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .eq("order_id", filter.order_id)
            .eq("product_id", filter.product_id)
            .eq("quantity", filter.quantity)
            .eq("created_by", filter.created_by);
    }
}
