//! ORDER BY parsing against a per-domain allow-list.
//!
//! ORDER BY columns cannot be bound as SQL parameters, so the only defense
//! against injection is refusing any field that is not in a fixed map. An
//! unknown field or direction is always an error; the default order only
//! applies when the client sent nothing at all.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errs::Error;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// SQL keyword for this direction.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A validated ordering on a business-layer field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub direction: Direction,
}

impl OrderBy {
    #[must_use]
    pub const fn new(field: &'static str, direction: Direction) -> Self {
        Self { field, direction }
    }

    #[must_use]
    pub const fn asc(field: &'static str) -> Self {
        Self::new(field, Direction::Asc)
    }

    #[must_use]
    pub const fn desc(field: &'static str) -> Self {
        Self::new(field, Direction::Desc)
    }
}

/// Parses `"field"` or `"field,DIRECTION"` using `allowed` to map query
/// names to business field names.
///
/// # Errors
///
/// Returns `InvalidArgument` if the field is not in `allowed`, the direction
/// is not `ASC`/`DESC`, or the value has more than two comma-separated parts.
pub fn parse(
    allowed: &[(&'static str, &'static str)],
    order_by: Option<&str>,
    default: OrderBy,
) -> Result<OrderBy, Error> {
    let Some(raw) = order_by.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    let mut parts = raw.split(',');
    let name = parts.next().map(str::trim).unwrap_or_default();
    let direction = parts.next();
    if parts.next().is_some() {
        return Err(Error::field("orderBy", format!("invalid order: {raw}")));
    }

    let Some((_, field)) = allowed.iter().find(|(query_name, _)| *query_name == name) else {
        return Err(Error::field("orderBy", format!("unknown order: {name}")));
    };

    let direction = match direction {
        None => Direction::Asc,
        Some(dir) => Direction::parse(dir)
            .ok_or_else(|| Error::field("orderBy", format!("unknown direction: {}", dir.trim())))?,
    };

    Ok(OrderBy::new(field, direction))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::errs::ErrorKind;

    const FIELDS: &[(&str, &str)] = &[
        ("currency_id", "id"),
        ("code", "code"),
        ("name", "name"),
    ];
    const DEFAULT: OrderBy = OrderBy::asc("code");

    #[test]
    fn empty_input_uses_default() {
        assert_eq!(parse(FIELDS, None, DEFAULT).unwrap(), DEFAULT);
        assert_eq!(parse(FIELDS, Some("  "), DEFAULT).unwrap(), DEFAULT);
    }

    #[test]
    fn field_without_direction_is_ascending() {
        let order = parse(FIELDS, Some("name"), DEFAULT).unwrap();
        assert_eq!(order, OrderBy::asc("name"));
    }

    #[test]
    fn maps_query_name_to_business_field() {
        let order = parse(FIELDS, Some("currency_id,desc"), DEFAULT).unwrap();
        assert_eq!(order, OrderBy::desc("id"));
    }

    #[test]
    fn direction_is_case_insensitive_and_trimmed() {
        let order = parse(FIELDS, Some("name, Desc "), DEFAULT).unwrap();
        assert_eq!(order.direction, Direction::Desc);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse(FIELDS, Some("password,ASC"), DEFAULT).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.fields[0].field, "orderBy");
        assert_eq!(err.fields[0].error, "unknown order: password");
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let err = parse(FIELDS, Some("name,sideways"), DEFAULT).unwrap_err();
        assert_eq!(err.fields[0].error, "unknown direction: sideways");
    }

    #[test]
    fn injection_attempt_is_rejected() {
        assert!(parse(FIELDS, Some("name; DROP TABLE core.users"), DEFAULT).is_err());
        assert!(parse(FIELDS, Some("name,ASC,extra"), DEFAULT).is_err());
    }

    proptest! {
        #[test]
        fn never_accepts_fields_outside_allow_list(name in "[a-z_;() ]{1,20}") {
            let result = parse(FIELDS, Some(&name), DEFAULT);
            let trimmed = name.trim();
            let known = trimmed.is_empty() || FIELDS.iter().any(|(q, _)| *q == trimmed);
            prop_assert_eq!(result.is_ok(), known);
        }
    }
}
