use std::str::FromStr;

use chrono::{DateTime, Utc};
use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    NewSupplierProduct, SupplierProduct, SupplierProductDomain, SupplierProductFilter,
    UpdateSupplierProduct,
};
use crate::app::AppDomain;

fn parse_cost(raw: &str) -> Result<Decimal, Error> {
    let cost = Decimal::from_str(raw.trim())
        .map_err(|_| Error::field("unit_cost", format!("{raw} is not a valid decimal")))?;
    if cost.is_sign_negative() {
        return Err(Error::field("unit_cost", "unit_cost must not be negative"));
    }
    Ok(cost)
}

fn check_quantities(min: i32, max: i32) -> Result<(), Error> {
    if max < min {
        return Err(Error::field(
            "max_order_quantity",
            format!("max_order_quantity {max} is less than min_order_quantity {min}"),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SupplierProductDto {
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

#[derive(Debug, Deserialize, Validate)]
pub struct NewSupplierProductDto {
    #[validate(required)]
    pub supplier_id: Option<Uuid>,
    #[validate(required)]
    pub product_id: Option<Uuid>,
    #[validate(required, length(min = 1, max = 100))]
    pub supplier_part_number: Option<String>,
    #[validate(required, range(min = 1))]
    pub min_order_quantity: Option<i32>,
    #[validate(required, range(min = 1))]
    pub max_order_quantity: Option<i32>,
    #[validate(required, range(min = 0, max = 365))]
    pub lead_time_days: Option<i32>,
    #[validate(required)]
    pub unit_cost: Option<String>,
    pub is_primary_supplier: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierProductDto {
    pub supplier_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub supplier_part_number: Option<String>,
    #[validate(range(min = 1))]
    pub min_order_quantity: Option<i32>,
    #[validate(range(min = 1))]
    pub max_order_quantity: Option<i32>,
    #[validate(range(min = 0, max = 365))]
    pub lead_time_days: Option<i32>,
    pub unit_cost: Option<String>,
    pub is_primary_supplier: Option<bool>,
}

impl AppDomain for SupplierProductDomain {
    const ROUTE: &'static str = "procurement/supplierproducts";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("supplier_product_id", "id"),
        ("supplier_id", "supplier_id"),
        ("product_id", "product_id"),
        ("supplier_part_number", "supplier_part_number"),
        ("min_order_quantity", "min_order_quantity"),
        ("max_order_quantity", "max_order_quantity"),
        ("lead_time_days", "lead_time_days"),
        ("unit_cost", "unit_cost"),
        ("is_primary_supplier", "is_primary_supplier"),
    ];

    type Dto = SupplierProductDto;
    type NewDto = NewSupplierProductDto;
    type UpdateDto = UpdateSupplierProductDto;

    fn to_dto(sp: SupplierProduct) -> SupplierProductDto {
        SupplierProductDto {
            id: sp.id,
            supplier_id: sp.supplier_id,
            product_id: sp.product_id,
            supplier_part_number: sp.supplier_part_number,
            min_order_quantity: sp.min_order_quantity,
            max_order_quantity: sp.max_order_quantity,
            lead_time_days: sp.lead_time_days,
            unit_cost: sp.unit_cost,
            is_primary_supplier: sp.is_primary_supplier,
            created_date: sp.created_date,
            updated_date: sp.updated_date,
        }
    }

    fn to_bus_new(dto: NewSupplierProductDto) -> Result<NewSupplierProduct, Error> {
        let min = dto.min_order_quantity.unwrap_or_default();
        let max = dto.max_order_quantity.unwrap_or_default();
        check_quantities(min, max)?;

        Ok(NewSupplierProduct {
            unit_cost: parse_cost(dto.unit_cost.as_deref().unwrap_or_default())?,
            supplier_id: dto.supplier_id.unwrap_or_default(),
            product_id: dto.product_id.unwrap_or_default(),
            supplier_part_number: dto.supplier_part_number.unwrap_or_default(),
            min_order_quantity: min,
            max_order_quantity: max,
            lead_time_days: dto.lead_time_days.unwrap_or_default(),
            is_primary_supplier: dto.is_primary_supplier.unwrap_or(false),
        })
    }

    fn to_bus_update(dto: UpdateSupplierProductDto) -> Result<UpdateSupplierProduct, Error> {
        Ok(UpdateSupplierProduct {
            unit_cost: dto.unit_cost.as_deref().map(parse_cost).transpose()?,
            supplier_id: dto.supplier_id,
            product_id: dto.product_id,
            supplier_part_number: dto.supplier_part_number,
            min_order_quantity: dto.min_order_quantity,
            max_order_quantity: dto.max_order_quantity,
            lead_time_days: dto.lead_time_days,
            is_primary_supplier: dto.is_primary_supplier,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<SupplierProductFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = SupplierProductFilter {
            id: p.uuid("supplier_product_id"),
            supplier_id: p.uuid("supplier_id"),
            product_id: p.uuid("product_id"),
            supplier_part_number: p.string("supplier_part_number"),
            lead_time_days: p.int("lead_time_days"),
            unit_cost: p.decimal("unit_cost"),
            is_primary_supplier: p.bool("is_primary_supplier"),
        };
        p.finish(filter)
    }

    fn check_update(sp: &SupplierProduct, update: &UpdateSupplierProduct) -> Result<(), Error> {
        check_quantities(
            update.min_order_quantity.unwrap_or(sp.min_order_quantity),
            update.max_order_quantity.unwrap_or(sp.max_order_quantity),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Domain;
    use ichor_core::RequestContext;

    fn stored(min: i32, max: i32) -> SupplierProduct {
        SupplierProductDomain::build(
            NewSupplierProduct {
                supplier_id: Uuid::new_v4(),
                product_id: Uuid::new_v4(),
                supplier_part_number: "P-1".into(),
                min_order_quantity: min,
                max_order_quantity: max,
                lead_time_days: 3,
                unit_cost: Decimal::new(1250, 2),
                is_primary_supplier: true,
            },
            Uuid::new_v4(),
            Utc::now(),
            &RequestContext::system(),
        )
    }

    #[test]
    fn max_below_min_is_rejected_on_create() {
        let dto = NewSupplierProductDto {
            supplier_id: Some(Uuid::new_v4()),
            product_id: Some(Uuid::new_v4()),
            supplier_part_number: Some("P-1".into()),
            min_order_quantity: Some(10),
            max_order_quantity: Some(5),
            lead_time_days: Some(3),
            unit_cost: Some("12.50".into()),
            is_primary_supplier: None,
        };
        let err = SupplierProductDomain::to_bus_new(dto).unwrap_err();
        assert_eq!(err.fields[0].field, "max_order_quantity");
    }

    #[test]
    fn partial_update_is_checked_against_stored_quantities() {
        let sp = stored(10, 20);
        let lower_max = UpdateSupplierProduct {
            max_order_quantity: Some(5),
            ..UpdateSupplierProduct::default()
        };
        assert!(SupplierProductDomain::check_update(&sp, &lower_max).is_err());

        let raise_min = UpdateSupplierProduct {
            min_order_quantity: Some(20),
            ..UpdateSupplierProduct::default()
        };
        assert!(SupplierProductDomain::check_update(&sp, &raise_min).is_ok());
    }

    #[test]
    fn negative_cost_is_rejected() {
        assert!(parse_cost("-0.01").is_err());
        assert_eq!(parse_cost("0").unwrap(), Decimal::ZERO);
    }
}
