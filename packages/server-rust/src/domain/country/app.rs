use ichor_core::filter::QueryParams;
use ichor_core::{Error, FieldErrors, FilterParser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Country, CountryDomain, CountryFilter, NewCountry, UpdateCountry};
use crate::app::AppDomain;
use crate::domain::pattern::CodePattern;

static ALPHA_2: CodePattern = CodePattern::new("^[A-Z]{2}$");
static ALPHA_3: CodePattern = CodePattern::new("^[A-Z]{3}$");

fn check_alpha(alpha_2: Option<&str>, alpha_3: Option<&str>) -> Result<(), Error> {
    let mut errors = FieldErrors::new();
    if alpha_2.is_some_and(|a| !ALPHA_2.is_match(a)) {
        errors.add("alpha_2", "alpha_2 must be two uppercase letters");
    }
    if alpha_3.is_some_and(|a| !ALPHA_3.is_match(a)) {
        errors.add("alpha_3", "alpha_3 must be three uppercase letters");
    }
    errors.into_result()
}

#[derive(Debug, Serialize)]
pub struct CountryDto {
    pub id: Uuid,
    pub number: i32,
    pub name: String,
    pub alpha_2: String,
    pub alpha_3: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCountryDto {
    #[validate(required, range(min = 1, max = 999))]
    pub number: Option<i32>,
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required)]
    pub alpha_2: Option<String>,
    #[validate(required)]
    pub alpha_3: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCountryDto {
    #[validate(range(min = 1, max = 999))]
    pub number: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub alpha_2: Option<String>,
    pub alpha_3: Option<String>,
}

impl AppDomain for CountryDomain {
    const ROUTE: &'static str = "geography/countries";
    const ORDER_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("country_id", "id"),
        ("number", "number"),
        ("name", "name"),
        ("alpha_2", "alpha_2"),
        ("alpha_3", "alpha_3"),
    ];

    type Dto = CountryDto;
    type NewDto = NewCountryDto;
    type UpdateDto = UpdateCountryDto;

    fn to_dto(c: Country) -> CountryDto {
        CountryDto {
            id: c.id,
            number: c.number,
            name: c.name,
            alpha_2: c.alpha_2,
            alpha_3: c.alpha_3,
        }
    }

    fn to_bus_new(dto: NewCountryDto) -> Result<NewCountry, Error> {
        check_alpha(dto.alpha_2.as_deref(), dto.alpha_3.as_deref())?;
        Ok(NewCountry {
            number: dto.number.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            alpha_2: dto.alpha_2.unwrap_or_default(),
            alpha_3: dto.alpha_3.unwrap_or_default(),
        })
    }

    fn to_bus_update(dto: UpdateCountryDto) -> Result<UpdateCountry, Error> {
        check_alpha(dto.alpha_2.as_deref(), dto.alpha_3.as_deref())?;
        Ok(UpdateCountry {
            number: dto.number,
            name: dto.name,
            alpha_2: dto.alpha_2,
            alpha_3: dto.alpha_3,
        })
    }

    fn parse_filter(params: &QueryParams) -> Result<CountryFilter, Error> {
        let mut p = FilterParser::new(params);
        let filter = CountryFilter {
            id: p.uuid("country_id"),
            number: p.int("number"),
            name: p.string("name"),
            alpha_2: p.string("alpha_2"),
            alpha_3: p.string("alpha_3"),
        };
        p.finish(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_codes_are_checked_together() {
        let err = check_alpha(Some("usa"), Some("US")).unwrap_err();
        let fields: Vec<_> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["alpha_2", "alpha_3"]);
        assert!(check_alpha(Some("US"), Some("USA")).is_ok());
        assert!(check_alpha(None, None).is_ok());
    }
}
