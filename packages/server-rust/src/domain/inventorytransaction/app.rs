use chrono::{DateTime, Utc};
use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{
    InventoryTransaction, InventoryTransactionDomain, InventoryTransactionFilter,
    NewInventoryTransaction, UpdateInventoryTransaction, TRANSACTION_TYPES,
};
use crate::app::AppDomain;

fn parse_type(raw: String) -> Result<String, Error> {
    let upper = raw.trim().to_ascii_uppercase();
    if TRANSACTION_TYPES.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(Error::field(
            "transaction_type",
            format!(
                "transaction_type must be one of {}",
                TRANSACTION_TYPES.join(", ")
            ),
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryTransactionDto {
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

#[derive(Debug, Deserialize, Validate)]
pub struct NewInventoryTransactionDto {
    #[validate(required)]
    pub product_id: Option<Uuid>,
    #[validate(required)]
    pub location_id: Option<Uuid>,
    #[validate(required)]
    pub user_id: Option<Uuid>,
    #[validate(required)]
    pub quantity: Option<i32>,
    #[validate(required)]
    pub transaction_type: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub reference_number: Option<String>,
    #[validate(required)]
    pub transaction_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInventoryTransactionDto {
    pub product_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub transaction_type: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub reference_number: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
}

impl AppDomain for InventoryTransactionDomain {
    const ROUTE: &'static str = "inventory/inventorytransactions";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("inventory_transaction_id", "id"),
        ("product_id", "product_id"),
        ("location_id", "location_id"),
        ("user_id", "user_id"),
        ("quantity", "quantity"),
        ("transaction_type", "transaction_type"),
        ("reference_number", "reference_number"),
        ("transaction_date", "transaction_date"),
    ];

    type Dto = InventoryTransactionDto;
    type NewDto = NewInventoryTransactionDto;
    type UpdateDto = UpdateInventoryTransactionDto;

    fn to_dto(it: InventoryTransaction) -> InventoryTransactionDto {
        InventoryTransactionDto {
            id: it.id,
            product_id: it.product_id,
            location_id: it.location_id,
            user_id: it.user_id,
            quantity: it.quantity,
            transaction_type: it.transaction_type,
            reference_number: it.reference_number,
            transaction_date: it.transaction_date,
            created_date: it.created_date,
            updated_date: it.updated_date,
        }
    }

    fn to_bus_new(dto: NewInventoryTransactionDto) -> Result<NewInventoryTransaction, Error> {
        Ok(NewInventoryTransaction {
            transaction_type: parse_type(dto.transaction_type.unwrap_or_default())?,
            product_id: dto.product_id.unwrap_or_default(),
            location_id: dto.location_id.unwrap_or_default(),
            user_id: dto.user_id.unwrap_or_default(),
            quantity: dto.quantity.unwrap_or_default(),
            reference_number: dto.reference_number.unwrap_or_default(),
            transaction_date: dto.transaction_date.unwrap_or_default(),
        })
    }

    fn to_bus_update(dto: UpdateInventoryTransactionDto) -> Result<UpdateInventoryTransaction, Error> {
        Ok(UpdateInventoryTransaction {
            transaction_type: dto.transaction_type.map(parse_type).transpose()?,
            product_id: dto.product_id,
            location_id: dto.location_id,
            user_id: dto.user_id,
            quantity: dto.quantity,
            reference_number: dto.reference_number,
            transaction_date: dto.transaction_date,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<InventoryTransactionFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = InventoryTransactionFilter {
            id: p.uuid("inventory_transaction_id"),
            product_id: p.uuid("product_id"),
            location_id: p.uuid("location_id"),
            user_id: p.uuid("user_id"),
            quantity: p.int("quantity"),
            transaction_type: p.string("transaction_type"),
            reference_number: p.string("reference_number"),
            start_transaction_date: p.time("start_transaction_date"),
            end_transaction_date: p.time("end_transaction_date"),
        };
        if let (Some(start), Some(end)) = (filter.start_transaction_date, filter.end_transaction_date) {
            if end < start {
                p.reject(
                    "end_transaction_date",
                    "end_transaction_date is before start_transaction_date",
                );
            }
        }
        p.finish(filter)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::bus::Domain;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn transaction_type_is_normalized() {
        assert_eq!(parse_type("in".into()).unwrap(), "IN");
        assert!(parse_type("GIFT".into()).is_err());
    }

    #[test]
    fn date_range_filter_is_inclusive() {
        let filter = InventoryTransactionDomain::parse_filter(&params(&[
            ("start_transaction_date", "2024-01-01"),
            ("end_transaction_date", "2024-01-31"),
        ]))
        .unwrap();

        let mut it = InventoryTransactionDomain::build(
            NewInventoryTransaction {
                product_id: Uuid::new_v4(),
                location_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                quantity: 5,
                transaction_type: "IN".into(),
                reference_number: "PO-1".into(),
                transaction_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
            Uuid::new_v4(),
            Utc::now(),
            &ichor_core::RequestContext::system(),
        );
        assert!(InventoryTransactionDomain::matches(&filter, &it));

        it.transaction_date = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert!(!InventoryTransactionDomain::matches(&filter, &it));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let err = InventoryTransactionDomain::parse_filter(&params(&[
            ("start_transaction_date", "2024-02-01"),
            ("end_transaction_date", "2024-01-01"),
        ]))
        .unwrap_err();
        assert_eq!(err.fields[0].field, "end_transaction_date");
    }
}
