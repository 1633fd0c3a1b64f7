//! Serde helpers shared by request DTOs.

use serde::{Deserialize, Deserializer};

/// Deserializes a field that is both optional (can be absent) and nullable (can be null).
///
/// - Absent field -> `None` (outer Option, via `#[serde(default)]`)
/// - Present field with null -> `Some(None)`
/// - Present field with value -> `Some(Some(value))`
///
/// Without this, serde collapses `null` into the outer `None`, losing the
/// distinction between "leave unchanged" and "clear the column".
///
/// # Errors
///
/// Propagates the inner deserializer's error.
#[allow(clippy::option_option)]
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::double_option")]
        #[allow(clippy::option_option)]
        line_2: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.line_2, None);

        let null: Patch = serde_json::from_str(r#"{"line_2": null}"#).unwrap();
        assert_eq!(null.line_2, Some(None));

        let value: Patch = serde_json::from_str(r#"{"line_2": "Suite 4"}"#).unwrap();
        assert_eq!(value.line_2, Some(Some("Suite 4".to_string())));
    }
}
