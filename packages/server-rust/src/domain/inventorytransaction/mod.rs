//! Stock movements of a product at a location.

mod app;
mod store;

pub use app::{InventoryTransactionDto, NewInventoryTransactionDto, UpdateInventoryTransactionDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, within, Domain, Entity, OrderValue};

/// Accepted `transaction_type` values.
pub const TRANSACTION_TYPES: &[&str] = &["IN", "OUT", "ADJUSTMENT", "TRANSFER"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryTransaction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub transaction_type: String,
    pub reference_number: String,
    pub transaction_date: DateTime<Utc>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInventoryTransaction {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub transaction_type: String,
    pub reference_number: String,
    pub transaction_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateInventoryTransaction {
    pub product_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub transaction_type: Option<String>,
    pub reference_number: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryTransactionFilter {
    pub id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub transaction_type: Option<String>,
    pub reference_number: Option<String>,
    pub start_transaction_date: Option<DateTime<Utc>>,
    pub end_transaction_date: Option<DateTime<Utc>>,
}

impl Entity for InventoryTransaction {
    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_date(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_date)
    }
}

pub struct InventoryTransactionDomain;

impl Domain for InventoryTransactionDomain {
    const NAME: &'static str = "inventorytransaction";
    const TABLE: &'static str = "inventory.inventory_transactions";
    const DEFAULT_ORDER: OrderBy = OrderBy::desc("transaction_date");

    type Entity = InventoryTransaction;
    type New = NewInventoryTransaction;
    type Update = UpdateInventoryTransaction;
    type Filter = InventoryTransactionFilter;

    fn build(
        new: NewInventoryTransaction,
        id: Uuid,
        now: DateTime<Utc>,
        _ctx: &RequestContext,
    ) -> InventoryTransaction {
        InventoryTransaction {
            id,
            product_id: new.product_id,
            location_id: new.location_id,
            user_id: new.user_id,
            quantity: new.quantity,
            transaction_type: new.transaction_type,
            reference_number: new.reference_number,
            transaction_date: new.transaction_date,
            created_date: now,
            updated_date: now,
        }
    }

    fn apply(
        it: &mut InventoryTransaction,
        update: UpdateInventoryTransaction,
        now: DateTime<Utc>,
        _ctx: &RequestContext,
    ) {
        if let Some(product_id) = update.product_id {
            it.product_id = product_id;
        }
        if let Some(location_id) = update.location_id {
            it.location_id = location_id;
        }
        if let Some(user_id) = update.user_id {
            it.user_id = user_id;
        }
        if let Some(quantity) = update.quantity {
            it.quantity = quantity;
        }
        if let Some(kind) = update.transaction_type {
            it.transaction_type = kind;
        }
        if let Some(reference) = update.reference_number {
            it.reference_number = reference;
        }
        if let Some(date) = update.transaction_date {
            it.transaction_date = date;
        }
        it.updated_date = now;
    }

    fn matches(filter: &InventoryTransactionFilter, it: &InventoryTransaction) -> bool {
        eq_opt(filter.id.as_ref(), &it.id)
            && eq_opt(filter.product_id.as_ref(), &it.product_id)
            && eq_opt(filter.location_id.as_ref(), &it.location_id)
            && eq_opt(filter.user_id.as_ref(), &it.user_id)
            && eq_opt(filter.quantity.as_ref(), &it.quantity)
            && eq_opt(filter.transaction_type.as_ref(), &it.transaction_type)
            && ilike_opt(filter.reference_number.as_ref(), &it.reference_number)
            && within(
                filter.start_transaction_date.as_ref(),
                filter.end_transaction_date.as_ref(),
                &it.transaction_date,
            )
    }

    fn order_value(it: &InventoryTransaction, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(it.id.into()),
            "product_id" => Some(it.product_id.into()),
            "location_id" => Some(it.location_id.into()),
            "user_id" => Some(it.user_id.into()),
            "quantity" => Some(it.quantity.into()),
            "transaction_type" => Some((&it.transaction_type).into()),
            "reference_number" => Some((&it.reference_number).into()),
            "transaction_date" => Some(it.transaction_date.into()),
            _ => None,
        }
    }
}
