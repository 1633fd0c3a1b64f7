use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    NewPurchaseOrderLineItemStatus, PurchaseOrderLineItemStatus,
    PurchaseOrderLineItemStatusDomain, PurchaseOrderLineItemStatusFilter,
    UpdatePurchaseOrderLineItemStatus,
};
use crate::app::AppDomain;

#[derive(Debug, Serialize)]
pub struct PurchaseOrderLineItemStatusDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPurchaseOrderLineItemStatusDto {
    #[validate(required, length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePurchaseOrderLineItemStatusDto {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
}

impl AppDomain for PurchaseOrderLineItemStatusDomain {
    const ROUTE: &'static str = "procurement/purchaseorderlineitemstatuses";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("purchase_order_line_item_status_id", "id"),
        ("name", "name"),
        ("description", "description"),
        ("sort_order", "sort_order"),
    ];

    type Dto = PurchaseOrderLineItemStatusDto;
    type NewDto = NewPurchaseOrderLineItemStatusDto;
    type UpdateDto = UpdatePurchaseOrderLineItemStatusDto;

    fn to_dto(status: PurchaseOrderLineItemStatus) -> PurchaseOrderLineItemStatusDto {
        PurchaseOrderLineItemStatusDto {
            id: status.id,
            name: status.name,
            description: status.description,
            sort_order: status.sort_order,
        }
    }

    fn to_bus_new(
        dto: NewPurchaseOrderLineItemStatusDto,
    ) -> Result<NewPurchaseOrderLineItemStatus, Error> {
        Ok(NewPurchaseOrderLineItemStatus {
            name: dto.name.unwrap_or_default(),
            description: dto.description.unwrap_or_default(),
            sort_order: dto.sort_order.unwrap_or_default(),
        })
    }

    fn to_bus_update(
        dto: UpdatePurchaseOrderLineItemStatusDto,
    ) -> Result<UpdatePurchaseOrderLineItemStatus, Error> {
        Ok(UpdatePurchaseOrderLineItemStatus {
            name: dto.name,
            description: dto.description,
            sort_order: dto.sort_order,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<PurchaseOrderLineItemStatusFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = PurchaseOrderLineItemStatusFilter {
            id: p.uuid("purchase_order_line_item_status_id"),
            name: p.string("name"),
            description: p.string("description"),
        };
        p.finish(filter)
    }
}
