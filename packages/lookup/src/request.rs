//! Lookup request parameters.

use std::str::FromStr;

use nyc_housing_address::borough::is_valid_zip;
use nyc_housing_record_models::RecordCategory;

use crate::LookupError;

/// Entries returned per category when `count` is omitted.
pub const DEFAULT_COUNT: usize = 5;

/// How many entries to return per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCount {
    /// At most this many (always positive).
    Limit(usize),
    /// Every entry.
    All,
}

impl Default for RecordCount {
    fn default() -> Self {
        Self::Limit(DEFAULT_COUNT)
    }
}

impl RecordCount {
    /// Truncation limit, `None` meaning unlimited.
    #[must_use]
    pub const fn as_limit(self) -> Option<usize> {
        match self {
            Self::Limit(n) => Some(n),
            Self::All => None,
        }
    }
}

impl FromStr for RecordCount {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<usize>() {
            Ok(0) => Err(LookupError::invalid("count", "must be at least 1")),
            Ok(n) => Ok(Self::Limit(n)),
            Err(_) => Err(LookupError::invalid(
                "count",
                format!("expected a positive integer or \"all\", got '{s}'"),
            )),
        }
    }
}

/// A validated lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// Address as typed by the caller.
    pub address: String,
    /// Five-digit ZIP code.
    pub zip: String,
    /// Entries per category.
    pub count: RecordCount,
    /// Restricts output to one category.
    pub category: Option<RecordCategory>,
}

impl LookupRequest {
    /// A request with default count and no category filter.
    #[must_use]
    pub fn new(address: impl Into<String>, zip: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            zip: zip.into(),
            count: RecordCount::default(),
            category: None,
        }
    }

    /// Validates raw request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidParameter`] if `address` or
    /// `zip_code` is missing, the ZIP is not five digits, `count` is not a
    /// positive integer or `all`, or `category` is unknown.
    pub fn from_params(
        address: Option<&str>,
        zip: Option<&str>,
        count: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, LookupError> {
        let address = address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| LookupError::invalid("address", "is required"))?;

        let zip = zip
            .map(str::trim)
            .filter(|z| !z.is_empty())
            .ok_or_else(|| LookupError::invalid("zip_code", "is required"))?;
        if !is_valid_zip(zip) {
            return Err(LookupError::invalid(
                "zip_code",
                format!("expected five digits, got '{zip}'"),
            ));
        }

        let count = count
            .filter(|c| !c.trim().is_empty())
            .map(str::parse::<RecordCount>)
            .transpose()?
            .unwrap_or_default();

        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| {
                c.parse::<RecordCategory>()
                    .map_err(|_| LookupError::invalid("category", format!("unknown category '{c}'")))
            })
            .transpose()?;

        Ok(Self {
            address: address.to_string(),
            zip: zip.to_string(),
            count,
            category,
        })
    }
}
