use std::str::FromStr;

use chrono::{DateTime, Utc};
use ichor_core::filter::QueryParams;
use ichor_core::serde_ext::double_option;
use ichor_core::{Error, FieldErrors, FilterParser};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    line_total, NewOrderLineItem, OrderLineItem, OrderLineItemDomain, OrderLineItemFilter,
    UpdateOrderLineItem,
};
use crate::app::AppDomain;

/// Largest accepted price or discount, 999 999 999 999.99.
const MAX_MONEY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);
const MAX_MONEY_SCALE: u32 = 4;

fn parse_money(field: &str, raw: &str, errors: &mut FieldErrors) -> Option<Decimal> {
    match Decimal::from_str(raw.trim()) {
        Ok(d) if d.is_sign_negative() => {
            errors.add(field, format!("{field} must not be negative"));
            None
        }
        Ok(d) if d > MAX_MONEY => {
            errors.add(field, format!("{field} must be at most {MAX_MONEY}"));
            None
        }
        Ok(d) if d.scale() > MAX_MONEY_SCALE => {
            errors.add(
                field,
                format!("{field} must have at most {MAX_MONEY_SCALE} decimal places"),
            );
            None
        }
        Ok(d) => Some(d),
        Err(_) => {
            errors.add(field, format!("{raw} is not a valid decimal"));
            None
        }
    }
}

fn check_total(quantity: i32, unit_price: Decimal, discount: Decimal) -> Result<(), Error> {
    match line_total(quantity, unit_price, discount) {
        None => Err(Error::field("unit_price", "line amount is too large")),
        Some(total) if total.is_sign_negative() => {
            Err(Error::field("discount", "discount exceeds the line amount"))
        }
        Some(_) => Ok(()),
    }
}

#[derive(Debug, Serialize)]
pub struct OrderLineItemDto {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub line_total: Decimal,
    pub created_by: Uuid,
    pub created_date: DateTime<Utc>,
    pub updated_by: Uuid,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewOrderLineItemDto {
    #[validate(required)]
    pub order_id: Option<Uuid>,
    #[validate(required)]
    pub product_id: Option<Uuid>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(required, range(min = 1))]
    pub quantity: Option<i32>,
    #[validate(required)]
    pub unit_price: Option<String>,
    pub discount: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[allow(clippy::option_option)]
pub struct UpdateOrderLineItemDto {
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
    pub unit_price: Option<String>,
    pub discount: Option<String>,
}

impl AppDomain for OrderLineItemDomain {
    const ROUTE: &'static str = "sales/orderlineitems";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("order_line_item_id", "id"),
        ("order_id", "order_id"),
        ("product_id", "product_id"),
        ("quantity", "quantity"),
        ("unit_price", "unit_price"),
        ("line_total", "line_total"),
        ("created_date", "created_date"),
    ];

    type Dto = OrderLineItemDto;
    type NewDto = NewOrderLineItemDto;
    type UpdateDto = UpdateOrderLineItemDto;

    fn to_dto(item: OrderLineItem) -> OrderLineItemDto {
        OrderLineItemDto {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            line_total: item.line_total,
            created_by: item.created_by,
            created_date: item.created_date,
            updated_by: item.updated_by,
            updated_date: item.updated_date,
        }
    }

    fn to_bus_new(dto: NewOrderLineItemDto) -> Result<NewOrderLineItem, Error> {
        let mut errors = FieldErrors::new();
        let unit_price = parse_money(
            "unit_price",
            dto.unit_price.as_deref().unwrap_or_default(),
            &mut errors,
        );
        let discount = match dto.discount.as_deref() {
            Some(raw) => parse_money("discount", raw, &mut errors),
            None => Some(Decimal::ZERO),
        };
        let (Some(unit_price), Some(discount)) = (unit_price, discount) else {
            return Err(errors.into());
        };

        let quantity = dto.quantity.unwrap_or_default();
        check_total(quantity, unit_price, discount)?;

        Ok(NewOrderLineItem {
            order_id: dto.order_id.unwrap_or_default(),
            product_id: dto.product_id.unwrap_or_default(),
            description: dto.description,
            quantity,
            unit_price,
            discount,
        })
    }

    fn to_bus_update(dto: UpdateOrderLineItemDto) -> Result<UpdateOrderLineItem, Error> {
        let mut errors = FieldErrors::new();
        let unit_price = dto
            .unit_price
            .as_deref()
            .and_then(|raw| parse_money("unit_price", raw, &mut errors));
        let discount = dto
            .discount
            .as_deref()
            .and_then(|raw| parse_money("discount", raw, &mut errors));
        if let Some(Some(description)) = &dto.description {
            if description.chars().count() > 500 {
                errors.add("description", "description must be at most 500 characters");
            }
        }
        errors.into_result()?;

        Ok(UpdateOrderLineItem {
            order_id: dto.order_id,
            product_id: dto.product_id,
            description: dto.description,
            quantity: dto.quantity,
            unit_price,
            discount,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<OrderLineItemFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = OrderLineItemFilter {
            id: p.uuid("order_line_item_id"),
            order_id: p.uuid("order_id"),
            product_id: p.uuid("product_id"),
            quantity: p.int("quantity"),
            created_by: p.uuid("created_by"),
        };
        p.finish(filter)
    }

    fn check_update(item: &OrderLineItem, update: &UpdateOrderLineItem) -> Result<(), Error> {
        check_total(
            update.quantity.unwrap_or(item.quantity),
            update.unit_price.unwrap_or(item.unit_price),
            update.discount.unwrap_or(item.discount),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(price: &str, discount: Option<&str>) -> NewOrderLineItemDto {
        NewOrderLineItemDto {
            order_id: Some(Uuid::new_v4()),
            product_id: Some(Uuid::new_v4()),
            description: None,
            quantity: Some(2),
            unit_price: Some(price.into()),
            discount: discount.map(str::to_string),
        }
    }

    #[test]
    fn discount_defaults_to_zero() {
        let new = OrderLineItemDomain::to_bus_new(dto("9.99", None)).unwrap();
        assert_eq!(new.discount, Decimal::ZERO);
    }

    #[test]
    fn bad_money_values_are_reported_together() {
        let err = OrderLineItemDomain::to_bus_new(dto("abc", Some("-1"))).unwrap_err();
        let fields: Vec<_> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["unit_price", "discount"]);
    }

    #[test]
    fn discount_may_not_exceed_amount() {
        let err = OrderLineItemDomain::to_bus_new(dto("1.00", Some("2.01"))).unwrap_err();
        assert_eq!(err.fields[0].field, "discount");
    }

    #[test]
    fn huge_prices_are_field_errors() {
        let err = OrderLineItemDomain::to_bus_new(dto("79228162514264337593543950335", None))
            .unwrap_err();
        assert_eq!(err.kind, ichor_core::ErrorKind::InvalidArgument);
        assert_eq!(err.fields[0].field, "unit_price");

        let err = OrderLineItemDomain::to_bus_new(dto("1.00001", None)).unwrap_err();
        assert_eq!(err.fields[0].field, "unit_price");

        let new = OrderLineItemDomain::to_bus_new(dto("999999999999.99", None)).unwrap();
        assert_eq!(new.unit_price, MAX_MONEY);
    }

    #[test]
    fn update_that_overflows_the_total_is_rejected() {
        let ctx = ichor_core::RequestContext::system();
        let item = <OrderLineItemDomain as crate::bus::Domain>::build(
            OrderLineItemDomain::to_bus_new(dto("10.00", None)).unwrap(),
            Uuid::new_v4(),
            Utc::now(),
            &ctx,
        );
        let update = UpdateOrderLineItem {
            quantity: Some(i32::MAX),
            unit_price: Some(Decimal::MAX),
            ..UpdateOrderLineItem::default()
        };
        let err = OrderLineItemDomain::check_update(&item, &update).unwrap_err();
        assert_eq!(err.fields[0].field, "unit_price");

        let fine = UpdateOrderLineItem {
            quantity: Some(i32::MAX),
            unit_price: Some(MAX_MONEY),
            ..UpdateOrderLineItem::default()
        };
        assert!(OrderLineItemDomain::check_update(&item, &fine).is_ok());
    }

    #[test]
    fn description_can_be_cleared() {
        let dto: UpdateOrderLineItemDto = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let update = OrderLineItemDomain::to_bus_update(dto).unwrap();
        assert_eq!(update.description, Some(None));
    }
}
