//! Application-facing error taxonomy.
//!
//! Every error that reaches a client is an [`Error`] carrying a closed
//! [`ErrorKind`]. The HTTP layer maps each kind to exactly one status code, so
//! adding a kind forces every `match` on it to be revisited.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{ValidationErrors, ValidationErrorsKind};

/// Closed set of error kinds surfaced by the app layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Client supplied a malformed or out-of-range value. HTTP 400.
    InvalidArgument,
    /// Missing or invalid credentials, or a failed table-access check. HTTP 401.
    Unauthenticated,
    /// Authenticated but forbidden by a rule. HTTP 403.
    PermissionDenied,
    /// Resource does not exist. HTTP 404.
    NotFound,
    /// Resource already exists. HTTP 409.
    AlreadyExists,
    /// Conflicting write (uniqueness or foreign-key violation). HTTP 409.
    Aborted,
    /// Operation rejected because the system is not in the required state. HTTP 412.
    FailedPrecondition,
    /// Dependency temporarily unavailable. HTTP 503.
    Unavailable,
    /// Unexpected failure. HTTP 500.
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Unauthenticated => "unauthenticated",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::AlreadyExists => "already_exists",
            Self::Aborted => "aborted",
            Self::FailedPrecondition => "failed_precondition",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
        }
    }

    /// HTTP status code for this kind.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::Unauthenticated => 401,
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::AlreadyExists | Self::Aborted => 409,
            Self::FailedPrecondition => 412,
            Self::Unavailable => 503,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
        }
    }
}

/// Ordered collection of field errors, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, error: impl Into<String>) {
        self.0.push(FieldError::new(field, error));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns `Ok(())` when empty, otherwise an `InvalidArgument` error.
    ///
    /// # Errors
    ///
    /// Returns the accumulated field errors as an [`Error`].
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }

    /// Merges another set of field errors into this one.
    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    /// Takes over the field errors of `err`. An error without field detail
    /// is recorded under `field` with its message.
    pub fn absorb(&mut self, field: &str, err: Error) {
        if err.fields.is_empty() {
            self.add(field, err.message);
        } else {
            self.0.extend(err.fields);
        }
    }
}

impl From<FieldErrors> for Error {
    fn from(fields: FieldErrors) -> Self {
        let message = serde_json::to_string(&fields.0)
            .unwrap_or_else(|_| "validation failed".to_string());
        Self {
            kind: ErrorKind::InvalidArgument,
            message,
            fields: fields.0,
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out: Vec<FieldError> = Vec::new();
        for (field, kind) in errors.errors() {
            let field = field.to_string();
            match kind {
                ValidationErrorsKind::Field(list) => {
                    for err in list {
                        out.push(FieldError::new(&field, describe(&field, err)));
                    }
                }
                ValidationErrorsKind::Struct(_) | ValidationErrorsKind::List(_) => {
                    out.push(FieldError::new(&field, format!("{field} is invalid")));
                }
            }
        }
        // HashMap iteration order is random; keep responses deterministic.
        out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.error.cmp(&b.error)));
        Self(out)
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        FieldErrors::from(errors).into()
    }
}

/// Renders a validator error as a human-readable sentence.
fn describe(field: &str, err: &validator::ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    let param = |name: &str| err.params.get(name).map(ToString::to_string);
    match err.code.as_ref() {
        "required" => format!("{field} is a required field"),
        "email" => format!("{field} must be a valid email address"),
        "length" => match (param("min"), param("max"), param("equal")) {
            (_, _, Some(eq)) => format!("{field} must be exactly {eq} characters"),
            (Some(min), Some(max), None) => {
                format!("{field} must be between {min} and {max} characters")
            }
            (Some(min), None, None) => format!("{field} must be at least {min} characters"),
            (None, Some(max), None) => format!("{field} must be at most {max} characters"),
            (None, None, None) => format!("{field} has an invalid length"),
        },
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("{field} must be between {min} and {max}"),
            (Some(min), None) => format!("{field} must be {min} or greater"),
            (None, Some(max)) => format!("{field} must be {max} or less"),
            (None, None) => format!("{field} is out of range"),
        },
        code => format!("{field} failed {code} validation"),
    }
}

/// Error returned by the app layer and rendered by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    #[serde(rename = "code")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Single-field validation error.
    #[must_use]
    pub fn field(field: impl Into<String>, error: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.add(field, error);
        fields.into()
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct NewThing {
        #[validate(required, length(min = 3, max = 3))]
        code: Option<String>,
        #[validate(required)]
        name: Option<String>,
        #[validate(email)]
        email: Option<String>,
        #[validate(range(min = 0, max = 10))]
        places: Option<i32>,
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(ErrorKind::InvalidArgument.http_status(), 400);
        assert_eq!(ErrorKind::Unauthenticated.http_status(), 401);
        assert_eq!(ErrorKind::PermissionDenied.http_status(), 403);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::AlreadyExists.http_status(), 409);
        assert_eq!(ErrorKind::Aborted.http_status(), 409);
        assert_eq!(ErrorKind::FailedPrecondition.http_status(), 412);
        assert_eq!(ErrorKind::Unavailable.http_status(), 503);
        assert_eq!(ErrorKind::Internal.http_status(), 500);
    }

    #[test]
    fn kind_serializes_as_code() {
        let err = Error::not_found("currency not found");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "not_found");
        assert_eq!(json["message"], "currency not found");
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn missing_required_field_reports_field_error() {
        let thing = NewThing {
            code: None,
            name: Some("Dollar".into()),
            email: None,
            places: None,
        };
        let err: Error = thing.validate().unwrap_err().into();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(
            err.fields,
            vec![FieldError::new("code", "code is a required field")]
        );
        assert_eq!(
            err.message,
            r#"[{"field":"code","error":"code is a required field"}]"#
        );
    }

    #[test]
    fn multiple_failures_are_sorted_by_field() {
        let thing = NewThing {
            code: Some("TOOLONG".into()),
            name: None,
            email: Some("not-an-email".into()),
            places: Some(11),
        };
        let fields = FieldErrors::from(thing.validate().unwrap_err());
        let names: Vec<_> = fields.as_slice().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["code", "email", "name", "places"]);
        assert_eq!(fields.as_slice()[0].error, "code must be between 3 and 3 characters");
        assert_eq!(fields.as_slice()[1].error, "email must be a valid email address");
        assert!(fields.as_slice()[3].error.starts_with("places must be between 0"));
    }

    #[test]
    fn empty_field_errors_is_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
        let mut fields = FieldErrors::new();
        fields.add("rows", "must be a number");
        let err = fields.into_result().unwrap_err();
        assert_eq!(err.fields.len(), 1);
    }

    #[test]
    fn absorb_keeps_fields_or_falls_back_to_message() {
        let mut fields = FieldErrors::new();
        fields.absorb("orderBy", Error::field("orderBy", "unknown order: x"));
        fields.absorb("query", Error::invalid_argument("bad query"));
        assert_eq!(
            fields.as_slice(),
            &[
                FieldError::new("orderBy", "unknown order: x"),
                FieldError::new("query", "bad query"),
            ]
        );
    }
}
