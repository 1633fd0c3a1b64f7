use std::str::FromStr;

use chrono::{DateTime, Utc};
use ichor_core::filter::QueryParams;
use ichor_core::{Error, FilterParser};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{NewSupplier, Supplier, SupplierDomain, SupplierFilter, UpdateSupplier};
use crate::app::AppDomain;

/// Ratings arrive as decimal strings and must lie in `0..=5`.
fn parse_rating(raw: &str) -> Result<Decimal, Error> {
    let rating = Decimal::from_str(raw.trim())
        .map_err(|_| Error::field("rating", format!("{raw} is not a valid decimal")))?;
    if rating.is_sign_negative() || rating > Decimal::new(5, 0) {
        return Err(Error::field("rating", "rating must be between 0 and 5"));
    }
    Ok(rating)
}

#[derive(Debug, Serialize)]
pub struct SupplierDto {
    pub id: Uuid,
    pub name: String,
    pub payment_terms: String,
    pub lead_time_days: i32,
    pub rating: Decimal,
    pub is_active: bool,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewSupplierDto {
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub payment_terms: Option<String>,
    #[validate(required, range(min = 0, max = 365))]
    pub lead_time_days: Option<i32>,
    #[validate(required)]
    pub rating: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub payment_terms: Option<String>,
    #[validate(range(min = 0, max = 365))]
    pub lead_time_days: Option<i32>,
    pub rating: Option<String>,
    pub is_active: Option<bool>,
}

impl AppDomain for SupplierDomain {
    const ROUTE: &'static str = "procurement/suppliers";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("supplier_id", "id"),
        ("name", "name"),
        ("payment_terms", "payment_terms"),
        ("lead_time_days", "lead_time_days"),
        ("rating", "rating"),
        ("is_active", "is_active"),
    ];

    type Dto = SupplierDto;
    type NewDto = NewSupplierDto;
    type UpdateDto = UpdateSupplierDto;

    fn to_dto(s: Supplier) -> SupplierDto {
        SupplierDto {
            id: s.id,
            name: s.name,
            payment_terms: s.payment_terms,
            lead_time_days: s.lead_time_days,
            rating: s.rating,
            is_active: s.is_active,
            created_date: s.created_date,
            updated_date: s.updated_date,
        }
    }

    fn to_bus_new(dto: NewSupplierDto) -> Result<NewSupplier, Error> {
        Ok(NewSupplier {
            rating: parse_rating(dto.rating.as_deref().unwrap_or_default())?,
            name: dto.name.unwrap_or_default(),
            payment_terms: dto.payment_terms.unwrap_or_default(),
            lead_time_days: dto.lead_time_days.unwrap_or_default(),
            is_active: dto.is_active.unwrap_or(true),
        })
    }

    fn to_bus_update(dto: UpdateSupplierDto) -> Result<UpdateSupplier, Error> {
        Ok(UpdateSupplier {
            rating: dto.rating.as_deref().map(parse_rating).transpose()?,
            name: dto.name,
            payment_terms: dto.payment_terms,
            lead_time_days: dto.lead_time_days,
            is_active: dto.is_active,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<SupplierFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = SupplierFilter {
            id: p.uuid("supplier_id"),
            name: p.string("name"),
            payment_terms: p.string("payment_terms"),
            lead_time_days: p.int("lead_time_days"),
            min_rating: p.decimal("min_rating"),
            max_rating: p.decimal("max_rating"),
            is_active: p.bool("is_active"),
        };
        p.finish(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert_eq!(parse_rating("4.5").unwrap(), Decimal::new(45, 1));
        assert_eq!(parse_rating("5").unwrap(), Decimal::new(5, 0));
        assert!(parse_rating("5.01").is_err());
        assert!(parse_rating("-1").is_err());
        assert_eq!(parse_rating("abc").unwrap_err().fields[0].field, "rating");
    }
}
