use chrono::{DateTime, Utc};
use ichor_core::filter::QueryParams;
use ichor_core::{Error, FieldErrors, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Currency, CurrencyDomain, CurrencyFilter, NewCurrency, UpdateCurrency};
use crate::app::AppDomain;
use crate::domain::pattern::CodePattern;

static CURRENCY_CODE: CodePattern = CodePattern::new("^[A-Z]{3}$");

fn check_code(code: Option<&str>, errors: &mut FieldErrors) {
    if let Some(code) = code {
        if !CURRENCY_CODE.is_match(code) {
            errors.add("code", "code must be three uppercase letters");
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CurrencyDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub locale: String,
    pub decimal_places: i32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_by: Uuid,
    pub created_date: DateTime<Utc>,
    pub updated_by: Uuid,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCurrencyDto {
    #[validate(required, length(equal = 3))]
    pub code: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, max = 10))]
    pub symbol: Option<String>,
    #[validate(required, length(min = 2, max = 20))]
    pub locale: Option<String>,
    #[validate(required, range(min = 0, max = 10))]
    pub decimal_places: Option<i32>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCurrencyDto {
    #[validate(length(equal = 3))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub symbol: Option<String>,
    #[validate(length(min = 2, max = 20))]
    pub locale: Option<String>,
    #[validate(range(min = 0, max = 10))]
    pub decimal_places: Option<i32>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl AppDomain for CurrencyDomain {
    const ROUTE: &'static str = "core/currencies";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("currency_id", "id"),
        ("code", "code"),
        ("name", "name"),
        ("sort_order", "sort_order"),
        ("is_active", "is_active"),
    ];

    type Dto = CurrencyDto;
    type NewDto = NewCurrencyDto;
    type UpdateDto = UpdateCurrencyDto;

    fn to_dto(c: Currency) -> CurrencyDto {
        CurrencyDto {
            id: c.id,
            code: c.code,
            name: c.name,
            symbol: c.symbol,
            locale: c.locale,
            decimal_places: c.decimal_places,
            is_active: c.is_active,
            sort_order: c.sort_order,
            created_by: c.created_by,
            created_date: c.created_date,
            updated_by: c.updated_by,
            updated_date: c.updated_date,
        }
    }

    fn to_bus_new(dto: NewCurrencyDto) -> Result<NewCurrency, Error> {
        let mut errors = FieldErrors::new();
        check_code(dto.code.as_deref(), &mut errors);
        errors.into_result()?;

        Ok(NewCurrency {
            code: dto.code.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            symbol: dto.symbol.unwrap_or_default(),
            locale: dto.locale.unwrap_or_default(),
            decimal_places: dto.decimal_places.unwrap_or_default(),
            is_active: dto.is_active.unwrap_or(true),
            sort_order: dto.sort_order.unwrap_or_default(),
        })
    }

    fn to_bus_update(dto: UpdateCurrencyDto) -> Result<UpdateCurrency, Error> {
        let mut errors = FieldErrors::new();
        check_code(dto.code.as_deref(), &mut errors);
        errors.into_result()?;

        Ok(UpdateCurrency {
            code: dto.code,
            name: dto.name,
            symbol: dto.symbol,
            locale: dto.locale,
            decimal_places: dto.decimal_places,
            is_active: dto.is_active,
            sort_order: dto.sort_order,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<CurrencyFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = CurrencyFilter {
            id: p.uuid("currency_id"),
            code: p.string("code"),
            name: p.string("name"),
            is_active: p.bool("is_active"),
        };
        p.finish(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(code: &str) -> NewCurrencyDto {
        NewCurrencyDto {
            code: Some(code.to_string()),
            name: Some("US Dollar".into()),
            symbol: Some("$".into()),
            locale: Some("en-US".into()),
            decimal_places: Some(2),
            is_active: None,
            sort_order: None,
        }
    }

    #[test]
    fn lowercase_code_is_rejected() {
        let err = CurrencyDomain::to_bus_new(dto("usd")).unwrap_err();
        assert_eq!(err.fields[0].field, "code");
    }

    #[test]
    fn omitted_flags_get_defaults() {
        let new = CurrencyDomain::to_bus_new(dto("USD")).unwrap();
        assert!(new.is_active);
        assert_eq!(new.sort_order, 0);
    }
}
