//! Sales order line items. `line_total` is derived, never client supplied.

mod app;
mod store;

pub use app::{NewOrderLineItemDto, OrderLineItemDto, UpdateOrderLineItemDto};

use chrono::{DateTime, Utc};
use ichor_core::{OrderBy, RequestContext};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{eq_opt, Domain, Entity, OrderValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineItem {
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

#[derive(Debug, Clone)]
pub struct NewOrderLineItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
}

/// `description: Some(None)` clears the column.
#[derive(Debug, Clone, Default)]
#[allow(clippy::option_option)]
pub struct UpdateOrderLineItem {
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub description: Option<Option<String>>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub discount: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderLineItemFilter {
    pub id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub created_by: Option<Uuid>,
}

/// `quantity * unit_price - discount`, or `None` when the result does not
/// fit in a `Decimal`.
#[must_use]
pub fn line_total(quantity: i32, unit_price: Decimal, discount: Decimal) -> Option<Decimal> {
    Decimal::from(quantity)
        .checked_mul(unit_price)?
        .checked_sub(discount)
}

/// Amounts accepted by the app layer always fit; anything else saturates.
fn stored_total(quantity: i32, unit_price: Decimal, discount: Decimal) -> Decimal {
    line_total(quantity, unit_price, discount).unwrap_or(Decimal::MAX)
}

impl Entity for OrderLineItem {
    fn id(&self) -> Uuid {
        self.id
    }

    fn updated_date(&self) -> Option<DateTime<Utc>> {
        Some(self.updated_date)
    }
}

pub struct OrderLineItemDomain;

impl Domain for OrderLineItemDomain {
    const NAME: &'static str = "orderlineitem";
    const TABLE: &'static str = "sales.order_line_items";
    const DEFAULT_ORDER: OrderBy = OrderBy::asc("created_date");

    type Entity = OrderLineItem;
    type New = NewOrderLineItem;
    type Update = UpdateOrderLineItem;
    type Filter = OrderLineItemFilter;

    fn build(new: NewOrderLineItem, id: Uuid, now: DateTime<Utc>, ctx: &RequestContext) -> OrderLineItem {
        OrderLineItem {
            id,
            order_id: new.order_id,
            product_id: new.product_id,
            description: new.description,
            quantity: new.quantity,
            unit_price: new.unit_price,
            discount: new.discount,
            line_total: stored_total(new.quantity, new.unit_price, new.discount),
            created_by: ctx.user_id,
            created_date: now,
            updated_by: ctx.user_id,
            updated_date: now,
        }
    }

    fn apply(
        item: &mut OrderLineItem,
        update: UpdateOrderLineItem,
        now: DateTime<Utc>,
        ctx: &RequestContext,
    ) {
        if let Some(order_id) = update.order_id {
            item.order_id = order_id;
        }
        if let Some(product_id) = update.product_id {
            item.product_id = product_id;
        }
        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(quantity) = update.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = update.unit_price {
            item.unit_price = price;
        }
        if let Some(discount) = update.discount {
            item.discount = discount;
        }
        item.line_total = stored_total(item.quantity, item.unit_price, item.discount);
        item.updated_by = ctx.user_id;
        item.updated_date = now;
    }

    fn matches(filter: &OrderLineItemFilter, item: &OrderLineItem) -> bool {
        eq_opt(filter.id.as_ref(), &item.id)
            && eq_opt(filter.order_id.as_ref(), &item.order_id)
            && eq_opt(filter.product_id.as_ref(), &item.product_id)
            && eq_opt(filter.quantity.as_ref(), &item.quantity)
            && eq_opt(filter.created_by.as_ref(), &item.created_by)
    }

    fn order_value(item: &OrderLineItem, field: &str) -> Option<OrderValue> {
        match field {
            "id" => Some(item.id.into()),
            "order_id" => Some(item.order_id.into()),
            "product_id" => Some(item.product_id.into()),
            "quantity" => Some(item.quantity.into()),
            "unit_price" => Some(item.unit_price.into()),
            "line_total" => Some(item.line_total.into()),
            "created_date" => Some(item.created_date.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_follows_every_price_change() {
        let ctx = RequestContext::system();
        let mut item = OrderLineItemDomain::build(
            NewOrderLineItem {
                order_id: Uuid::new_v4(),
                product_id: Uuid::new_v4(),
                description: None,
                quantity: 3,
                unit_price: Decimal::new(1000, 2),
                discount: Decimal::new(250, 2),
            },
            Uuid::new_v4(),
            Utc::now(),
            &ctx,
        );
        assert_eq!(item.line_total, Decimal::new(2750, 2));

        let update = UpdateOrderLineItem {
            quantity: Some(4),
            ..UpdateOrderLineItem::default()
        };
        OrderLineItemDomain::apply(&mut item, update, Utc::now(), &ctx);
        assert_eq!(item.line_total, Decimal::new(3750, 2));
        assert_eq!(item.discount, Decimal::new(250, 2));
    }

    #[test]
    fn line_total_reports_overflow() {
        assert_eq!(line_total(2, Decimal::MAX, Decimal::ZERO), None);
        assert_eq!(line_total(1, Decimal::MIN, Decimal::MAX), None);
        assert_eq!(
            line_total(2, Decimal::new(150, 2), Decimal::ONE),
            Some(Decimal::new(200, 2))
        );
    }
}
