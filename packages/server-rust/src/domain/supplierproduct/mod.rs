//! Products offered by a supplier, with ordering limits and cost.

mod app;
mod store;

pub use app::{NewSupplierProductDto, SupplierProductDto, UpdateSupplierProductDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, ilike_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierProduct {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub product_id: Uuid,
    pub supplier_part_number: String,
    pub min_order_quantity: i32,
    pub max_order_quantity: i32,
    pub lead_time_days: i32,
    pub unit_cost: Decimal,
    pub is_primary_supplier: bool,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSupplierProduct {
    pub supplier_id: Uuid,
    pub product_id: Uuid,
    pub supplier_part_number: String,
    pub min_order_quantity: i32,
    pub max_order_quantity: i32,
    pub lead_time_days: i32,
    pub unit_cost: Decimal,
    pub is_primary_supplier: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSupplierProduct {
    pub supplier_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub supplier_part_number: Option<String>,
    pub min_order_quantity: Option<i32>,
    pub max_order_quantity: Option<i32>,
    pub lead_time_days: Option<i32>,
    pub unit_cost: Option<Decimal>,
    pub is_primary_supplier: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierProductFilter {
    pub id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub supplier_part_number: Option<String>,
    pub lead_time_days: Option<i32>,
    pub unit_cost: Option<Decimal>,
    pub is_primary_supplier: Option<bool>,
}

impl Entity for SupplierProduct {
    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_date(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_date)
    }
}

pub struct SupplierProductDomain;

impl Domain for SupplierProductDomain {
    const NAME: &'static str = "supplierproduct";
    const TABLE: &'static str = "procurement.supplier_products";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("supplier_part_number");

    type Entity = SupplierProduct;
    type New = NewSupplierProduct;
    type Update = UpdateSupplierProduct;
    type Filter = SupplierProductFilter;

    fn build(
        new: NewSupplierProduct,
        id: Uuid,
        now: DateTime<Utc>,
        _ctx: &RequestContext,
    ) -> SupplierProduct {
        SupplierProduct {
            id,
            supplier_id: new.supplier_id,
            product_id: new.product_id,
            supplier_part_number: new.supplier_part_number,
            min_order_quantity: new.min_order_quantity,
            max_order_quantity: new.max_order_quantity,
            lead_time_days: new.lead_time_days,
            unit_cost: new.unit_cost,
            is_primary_supplier: new.is_primary_supplier,
            created_date: now,
            updated_date: now,
        }
    }

    fn apply(
        sp: &mut SupplierProduct,
        update: UpdateSupplierProduct,
        now: DateTime<Utc>,
        _ctx: &RequestContext,
    ) {
        if let Some(supplier_id) = update.supplier_id {
            sp.supplier_id = supplier_id;
        }
        if let Some(product_id) = update.product_id {
            sp.product_id = product_id;
        }
        if let Some(part) = update.supplier_part_number {
            sp.supplier_part_number = part;
        }
        if let Some(min) = update.min_order_quantity {
            sp.min_order_quantity = min;
        }
        if let Some(max) = update.max_order_quantity {
            sp.max_order_quantity = max;
        }
        if let Some(days) = update.lead_time_days {
            sp.lead_time_days = days;
        }
        if let Some(cost) = update.unit_cost {
            sp.unit_cost = cost;
        }
        if let Some(primary) = update.is_primary_supplier {
            sp.is_primary_supplier = primary;
        }
        sp.updated_date = now;
    }

    fn matches(filter: &SupplierProductFilter, sp: &SupplierProduct) -> bool {
        eq_opt(filter.id.as_ref(), &sp.id)
            && eq_opt(filter.supplier_id.as_ref(), &sp.supplier_id)
            && eq_opt(filter.product_id.as_ref(), &sp.product_id)
            && ilike_opt(filter.supplier_part_number.as_ref(), &sp.supplier_part_number)
            && eq_opt(filter.lead_time_days.as_ref(), &sp.lead_time_days)
            && eq_opt(filter.unit_cost.as_ref(), &sp.unit_cost)
            && eq_opt(filter.is_primary_supplier.as_ref(), &sp.is_primary_supplier)
    }

    fn order_value(sp: &SupplierProduct, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(sp.id.into()),
            "supplier_id" => Some(sp.supplier_id.into()),
            "product_id" => Some(sp.product_id.into()),
            "supplier_part_number" => Some((&sp.supplier_part_number).into()),
            "min_order_quantity" => Some(sp.min_order_quantity.into()),
            "max_order_quantity" => Some(sp.max_order_quantity.into()),
            "lead_time_days" => Some(sp.lead_time_days.into()),
            "unit_cost" => Some(sp.unit_cost.into()),
            "is_primary_supplier" => Some(sp.is_primary_supplier.into()),
            _ => None,
        }
    }

    fn unique_keys(sp: &SupplierProduct) -> Vec<String> {
        vec![format!(
            "supplier_id={},supplier_part_number={}",
            sp.supplier_id, sp.supplier_part_number
        )]
    }
}
