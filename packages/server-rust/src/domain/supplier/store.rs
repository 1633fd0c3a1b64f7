use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::{Supplier, SupplierDomain, SupplierFilter};
use crate::sqldb::WhereClause;
use crate::store::{PgTable, RowBinds};

#[derive(FromRow)]
pub struct SupplierRow {
    id: Uuid,
    name: String,
    payment_terms: String,
    lead_time_days: i32,
    rating: Decimal,
    is_active: bool,
    created_date: DateTime<Utc>,
    updated_date: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            payment_terms: row.payment_terms,
            lead_time_days: row.lead_time_days,
            rating: row.rating,
            is_active: row.is_active,
            created_date: row.created_date,
            updated_date: row.updated_date,
        }
    }
}

impl PgTable for SupplierDomain {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "payment_terms",
        "lead_time_days",
        "rating",
        "is_active",
        "created_date",
        "updated_date",
    ];

    type Row = SupplierRow;

    fn bind_row(s: &Supplier, row: &mut RowBinds<'_>) {
        row.push_bind(s.id)
            .push_bind(s.name.clone())
            .push_bind(s.payment_terms.clone())
            .push_bind(s.lead_time_days)
            .push_bind(s.rating)
            .push_bind(s.is_active)
            .push_bind(s.created_date)
            .push_bind(s.updated_date);
    }

    fn apply_filter(filter: &SupplierFilter, clause: &mut WhereClause<'_>) {
        clause
            .eq("id", filter.id)
            .ilike("name", filter.name.as_deref())
            .ilike("payment_terms", filter.payment_terms.as_deref())
            .eq("lead_time_days", filter.lead_time_days)
            .gte("rating", filter.min_rating)
            .lte("rating", filter.max_rating)
            .eq("is_active", filter.is_active);
    }
}
