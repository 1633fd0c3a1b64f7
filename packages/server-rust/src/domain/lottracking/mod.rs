//! Lots received from a supplier product, tracked through quality control.

mod app;
mod store;

pub use app::{LotTrackingDto, NewLotTrackingDto, UpdateLotTrackingDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, within, Domain, Entity, OrderValue};

/// Accepted `quality_status` values.
pub const QUALITY_STATUSES: &[&str] = &["good", "on_hold", "quarantined", "released", "expired"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotTracking {
    pub id: Uuid,
    pub supplier_product_id: Uuid,
    pub lot_number: String,
    pub manufacture_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub received_date: DateTime<Utc>,
    pub quantity: i32,
    pub quality_status: String,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLotTracking {
    pub supplier_product_id: Uuid,
    pub lot_number: String,
    pub manufacture_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub received_date: DateTime<Utc>,
    pub quantity: i32,
    pub quality_status: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateLotTracking {
    pub supplier_product_id: Option<Uuid>,
    pub lot_number: Option<String>,
    pub manufacture_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub received_date: Option<DateTime<Utc>>,
    pub quantity: Option<i32>,
    pub quality_status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LotTrackingFilter {
    pub id: Option<Uuid>,
    pub supplier_product_id: Option<Uuid>,
    pub lot_number: Option<String>,
    pub quality_status: Option<String>,
    pub start_expiration_date: Option<DateTime<Utc>>,
    pub end_expiration_date: Option<DateTime<Utc>>,
}

impl Entity for LotTracking {
    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_date(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_date)
    }
}

pub struct LotTrackingDomain;

impl Domain for LotTrackingDomain {
    const NAME: &'static str = "lottracking";
    const TABLE: &'static str = "inventory.lot_trackings";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("lot_number");

    type Entity = LotTracking;
    type New = NewLotTracking;
    type Update = UpdateLotTracking;
    type Filter = LotTrackingFilter;

    fn build(new: NewLotTracking, id: Uuid, now: DateTime<Utc>, _ctx: &RequestContext) -> LotTracking {
        LotTracking {
            id,
            supplier_product_id: new.supplier_product_id,
            lot_number: new.lot_number,
            manufacture_date: new.manufacture_date,
            expiration_date: new.expiration_date,
            received_date: new.received_date,
            quantity: new.quantity,
            quality_status: new.quality_status,
            created_date: now,
            updated_date: now,
        }
    }

    fn apply(lot: &mut LotTracking, update: UpdateLotTracking, now: DateTime<Utc>, _ctx: &RequestContext) {
        if let Some(id) = update.supplier_product_id {
            lot.supplier_product_id = id;
        }
        if let Some(number) = update.lot_number {
            lot.lot_number = number;
        }
        if let Some(date) = update.manufacture_date {
            lot.manufacture_date = date;
        }
        if let Some(date) = update.expiration_date {
            lot.expiration_date = date;
        }
        if let Some(date) = update.received_date {
            lot.received_date = date;
        }
        if let Some(quantity) = update.quantity {
            lot.quantity = quantity;
        }
        if let Some(status) = update.quality_status {
            lot.quality_status = status;
        }
        lot.updated_date = now;
    }

    fn matches(filter: &LotTrackingFilter, lot: &LotTracking) -> bool {
        eq_opt(filter.id.as_ref(), &lot.id)
            && eq_opt(filter.supplier_product_id.as_ref(), &lot.supplier_product_id)
            && ilike_opt(filter.lot_number.as_ref(), &lot.lot_number)
            && eq_opt(filter.quality_status.as_ref(), &lot.quality_status)
            && within(
                filter.start_expiration_date.as_ref(),
                filter.end_expiration_date.as_ref(),
                &lot.expiration_date,
            )
    }

    fn order_value(lot: &LotTracking, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(lot.id.into()),
            "supplier_product_id" => Some(lot.supplier_product_id.into()),
            "lot_number" => Some((&lot.lot_number).into()),
            "manufacture_date" => Some(lot.manufacture_date.into()),
            "expiration_date" => Some(lot.expiration_date.into()),
            "received_date" => Some(lot.received_date.into()),
            "quantity" => Some(lot.quantity.into()),
            "quality_status" => Some((&lot.quality_status).into()),
            _ => None,
        }
    }

    fn unique_keys(lot: &LotTracking) -> Vec<String> {
        vec![format!("lot_number={}", lot.lot_number)]
    }
}
