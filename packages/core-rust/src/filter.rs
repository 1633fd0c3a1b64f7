//! Typed parsing of filter query parameters.
//!
//! Each domain turns its raw query-string map into a `QueryFilter` by pulling
//! parameters through a [`FilterParser`]. Parse failures do not abort early:
//! they accumulate as field-scoped errors and are reported together by
//! [`FilterParser::finish`].

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errs::{Error, FieldErrors};

/// Raw query parameters as received by the HTTP layer.
pub type QueryParams = HashMap<String, String>;

/// Accumulating parser over a query parameter map.
pub struct FilterParser<'a> {
    params: &'a QueryParams,
    errors: FieldErrors,
}

impl<'a> FilterParser<'a> {
    #[must_use]
    pub fn new(params: &'a QueryParams) -> Self {
        Self {
            params,
            errors: FieldErrors::new(),
        }
    }

    /// Trimmed, non-empty value for `key`.
    fn raw(&self, key: &str) -> Option<&'a str> {
        self.params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Free-text value, returned as-is.
    pub fn string(&mut self, key: &str) -> Option<String> {
        self.raw(key).map(str::to_string)
    }

    pub fn uuid(&mut self, key: &str) -> Option<Uuid> {
        let raw = self.raw(key)?;
        match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                self.errors.add(key, format!("invalid UUID: {e}"));
                None
            }
        }
    }

    /// Integer value of any `FromStr` numeric type (`i32`, `i64`, ...).
    pub fn int<T: FromStr>(&mut self, key: &str) -> Option<T> {
        let raw = self.raw(key)?;
        if let Ok(n) = raw.parse::<T>() {
            Some(n)
        } else {
            self.errors.add(key, format!("{raw} is not a valid integer"));
            None
        }
    }

    /// Accepts `true`/`false`/`1`/`0` (case-insensitive).
    pub fn bool(&mut self, key: &str) -> Option<bool> {
        let raw = self.raw(key)?;
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => {
                self.errors.add(key, format!("{raw} is not a valid boolean"));
                None
            }
        }
    }

    /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date meaning midnight UTC.
    pub fn time(&mut self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.raw(key)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Some(midnight.and_utc());
        }
        self.errors.add(
            key,
            format!("{raw} is not a valid date, expected RFC 3339 or YYYY-MM-DD"),
        );
        None
    }

    pub fn decimal(&mut self, key: &str) -> Option<Decimal> {
        let raw = self.raw(key)?;
        if let Ok(d) = Decimal::from_str(raw) {
            Some(d)
        } else {
            self.errors.add(key, format!("{raw} is not a valid decimal"));
            None
        }
    }

    /// Records an error computed by the caller (cross-field checks).
    pub fn reject(&mut self, key: &str, error: impl Into<String>) {
        self.errors.add(key, error);
    }

    /// Returns `filter` if every parameter parsed cleanly.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` listing every parameter that failed to parse.
    pub fn finish<T>(self, filter: T) -> Result<T, Error> {
        self.errors.into_result().map(|()| filter)
    }
}
