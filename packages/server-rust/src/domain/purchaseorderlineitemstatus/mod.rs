//! Lifecycle states a purchase order line item can be in.

mod app;
mod store;

pub use app::{
    NewPurchaseOrderLineItemStatusDto, PurchaseOrderLineItemStatusDto,
    UpdatePurchaseOrderLineItemStatusDto,
};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrderLineItemStatus {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct NewPurchaseOrderLineItemStatus {
    pub name: String,
    pub description: String,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePurchaseOrderLineItemStatus {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderLineItemStatusFilter {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Entity for PurchaseOrderLineItemStatus {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct PurchaseOrderLineItemStatusDomain;

impl Domain for PurchaseOrderLineItemStatusDomain {
    const NAME: &'static str = "purchaseorderlineitemstatus";
    const TABLE: &'static str = "procurement.purchase_order_line_item_statuses";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("sort_order");

    type Entity = PurchaseOrderLineItemStatus;
    type New = NewPurchaseOrderLineItemStatus;
    type Update = UpdatePurchaseOrderLineItemStatus;
    type Filter = PurchaseOrderLineItemStatusFilter;

    fn build(
        new: NewPurchaseOrderLineItemStatus,
        id: Uuid,
        _now: DateTime<Utc>,
        _ctx: &RequestContext,
    ) -> PurchaseOrderLineItemStatus {
        PurchaseOrderLineItemStatus {
            id,
            name: new.name,
            description: new.description,
            sort_order: new.sort_order,
        }
    }

    fn apply(
        status: &mut PurchaseOrderLineItemStatus,
        update: UpdatePurchaseOrderLineItemStatus,
        _now: DateTime<Utc>,
        _ctx: &RequestContext,
    ) {
        if let Some(name) = update.name {
            status.name = name;
        }
        if let Some(description) = update.description {
            status.description = description;
        }
        if let Some(sort_order) = update.sort_order {
            status.sort_order = sort_order;
        }
    }

    fn matches(filter: &PurchaseOrderLineItemStatusFilter, status: &PurchaseOrderLineItemStatus) -> bool {
        eq_opt(filter.id.as_ref(), &status.id)
            && ilike_opt(filter.name.as_ref(), &status.name)
            && ilike_opt(filter.description.as_ref(), &status.description)
    }

    fn order_value(status: &PurchaseOrderLineItemStatus, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(status.id.into()),
            "name" => Some((&status.name).into()),
            "description" => Some((&status.description).into()),
            "sort_order" => Some(status.sort_order.into()),
            _ => None,
        }
    }

    fn unique_keys(status: &PurchaseOrderLineItemStatus) -> Vec<String> {
        vec![format!("name={}", status.name)]
    }
}
