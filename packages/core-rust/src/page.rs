//! Offset pagination parsed from untrusted query strings.

use crate::errs::{Error, FieldErrors};

/// Page number used when the client omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Rows per page used when the client omits `rows`.
pub const DEFAULT_ROWS: u32 = 10;
/// Largest `rows` value a client may request.
pub const MAX_ROWS: u32 = 100;

/// A validated page request. Fields are private so every instance has
/// passed the bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    rows: u32,
}

impl Page {
    /// Builds a page from already-numeric values.
    ///
    /// Only the lower bounds are enforced here. Internal callers may request
    /// more than [`MAX_ROWS`]; the cap applies to client input in [`Page::parse`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either value is zero.
    pub fn new(number: u32, rows: u32) -> Result<Self, Error> {
        let mut fields = FieldErrors::new();
        if number == 0 {
            fields.add("page", "page value must be greater than 0");
        }
        if rows == 0 {
            fields.add("rows", "rows value must be greater than 0");
        }
        fields.into_result()?;
        Ok(Self { number, rows })
    }

    /// A single page holding every row, for internal callers.
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            number: 1,
            rows: u32::MAX,
        }
    }

    /// Parses the `page` and `rows` query parameters.
    ///
    /// Absent or empty values fall back to [`DEFAULT_PAGE`]/[`DEFAULT_ROWS`].
    /// A value that is present but malformed is always an error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` with a field error per bad parameter.
    pub fn parse(page: Option<&str>, rows: Option<&str>) -> Result<Self, Error> {
        let mut fields = FieldErrors::new();

        let number = match page.map(str::trim).filter(|s| !s.is_empty()) {
            None => DEFAULT_PAGE,
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) => {
                    fields.add("page", "page value must be greater than 0");
                    0
                }
                Ok(n) => n,
                Err(_) => {
                    fields.add("page", format!("page conversion: {raw} is not a positive integer"));
                    0
                }
            },
        };

        let rows = match rows.map(str::trim).filter(|s| !s.is_empty()) {
            None => DEFAULT_ROWS,
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) => {
                    fields.add("rows", "rows value must be greater than 0");
                    0
                }
                Ok(n) if n > MAX_ROWS => {
                    fields.add(
                        "rows",
                        format!("rows value too large, must be less than or equal to {MAX_ROWS}"),
                    );
                    0
                }
                Ok(n) => n,
                Err(_) => {
                    fields.add("rows", format!("rows conversion: {raw} is not a positive integer"));
                    0
                }
            },
        };

        fields.into_result()?;
        Ok(Self { number, rows })
    }

    #[must_use]
    pub fn number(self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn rows_per_page(self) -> u32 {
        self.rows
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.rows)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE,
            rows: DEFAULT_ROWS,
        }
    }
}
