use chrono::{DateTime, Utc};
use ichor_core::filter::QueryParams;
use ichor_core::{Error, FieldErrors, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    LotTracking, LotTrackingDomain, LotTrackingFilter, NewLotTracking, UpdateLotTracking,
    QUALITY_STATUSES,
};
use crate::app::AppDomain;

fn check_status(status: &str, errors: &mut FieldErrors) {
    if !QUALITY_STATUSES.contains(&status) {
        errors.add(
            "quality_status",
            format!("quality_status must be one of {}", QUALITY_STATUSES.join(", ")),
        );
    }
}

fn check_dates(manufacture: DateTime<Utc>, expiration: DateTime<Utc>, errors: &mut FieldErrors) {
    if expiration < manufacture {
        errors.add("expiration_date", "expiration_date is before manufacture_date");
    }
}

#[derive(Debug, Serialize)]
pub struct LotTrackingDto {
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

#[derive(Debug, Deserialize, Validate)]
pub struct NewLotTrackingDto {
    #[validate(required)]
    pub supplier_product_id: Option<Uuid>,
    #[validate(required, length(min = 1, max = 100))]
    pub lot_number: Option<String>,
    #[validate(required)]
    pub manufacture_date: Option<DateTime<Utc>>,
    #[validate(required)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[validate(required)]
    pub received_date: Option<DateTime<Utc>>,
    #[validate(required, range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(required)]
    pub quality_status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLotTrackingDto {
    pub supplier_product_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub lot_number: Option<String>,
    pub manufacture_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub received_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub quality_status: Option<String>,
}

impl AppDomain for LotTrackingDomain {
    const ROUTE: &'static str = "inventory/lottrackings";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("lot_id", "id"),
        ("supplier_product_id", "supplier_product_id"),
        ("lot_number", "lot_number"),
        ("manufacture_date", "manufacture_date"),
        ("expiration_date", "expiration_date"),
        ("received_date", "received_date"),
        ("quantity", "quantity"),
        ("quality_status", "quality_status"),
    ];

    type Dto = LotTrackingDto;
    type NewDto = NewLotTrackingDto;
    type UpdateDto = UpdateLotTrackingDto;

    fn to_dto(lot: LotTracking) -> LotTrackingDto {
        LotTrackingDto {
            id: lot.id,
            supplier_product_id: lot.supplier_product_id,
            lot_number: lot.lot_number,
            manufacture_date: lot.manufacture_date,
            expiration_date: lot.expiration_date,
            received_date: lot.received_date,
            quantity: lot.quantity,
            quality_status: lot.quality_status,
            created_date: lot.created_date,
            updated_date: lot.updated_date,
        }
    }

    fn to_bus_new(dto: NewLotTrackingDto) -> Result<NewLotTracking, Error> {
        let new = NewLotTracking {
            supplier_product_id: dto.supplier_product_id.unwrap_or_default(),
            lot_number: dto.lot_number.unwrap_or_default(),
            manufacture_date: dto.manufacture_date.unwrap_or_default(),
            expiration_date: dto.expiration_date.unwrap_or_default(),
            received_date: dto.received_date.unwrap_or_default(),
            quantity: dto.quantity.unwrap_or_default(),
            quality_status: dto.quality_status.unwrap_or_default(),
        };

        let mut errors = FieldErrors::new();
        check_status(&new.quality_status, &mut errors);
        check_dates(new.manufacture_date, new.expiration_date, &mut errors);
        errors.into_result().map(|()| new)
    }

    fn to_bus_update(dto: UpdateLotTrackingDto) -> Result<UpdateLotTracking, Error> {
        let mut errors = FieldErrors::new();
        if let Some(status) = &dto.quality_status {
            check_status(status, &mut errors);
        }
        errors.into_result()?;

        Ok(UpdateLotTracking {
            supplier_product_id: dto.supplier_product_id,
            lot_number: dto.lot_number,
            manufacture_date: dto.manufacture_date,
            expiration_date: dto.expiration_date,
            received_date: dto.received_date,
            quantity: dto.quantity,
            quality_status: dto.quality_status,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<LotTrackingFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = LotTrackingFilter {
            id: p.uuid("lot_id"),
            supplier_product_id: p.uuid("supplier_product_id"),
            lot_number: p.string("lot_number"),
            quality_status: p.string("quality_status"),
            start_expiration_date: p.time("start_expiration_date"),
            end_expiration_date: p.time("end_expiration_date"),
        };
        p.finish(filter)
    }

    fn check_update(lot: &LotTracking, update: &UpdateLotTracking) -> Result<(), Error> {
        let mut errors = FieldErrors::new();
        check_dates(
            update.manufacture_date.unwrap_or(lot.manufacture_date),
            update.expiration_date.unwrap_or(lot.expiration_date),
            &mut errors,
        );
        errors.into_result()
    }
}
