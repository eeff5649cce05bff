#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end building lookup.
//!
//! [`BuildingLookup`] takes a [`LookupRequest`], normalizes the address,
//! resolves a building identifier, fans out to every dataset gateway
//! concurrently and merges the results with [`correlate`]. When every
//! gateway comes back empty the [`ScrapeFallbackPort`] gets one chance to
//! supply data.
//!
//! Only caller mistakes and unexpected failures surface as
//! [`LookupError`]. Gateway failures degrade to empty categories and an
//! unresolved identifier is a normal outcome.

pub mod config;
pub mod correlate;
pub mod fallback;
pub mod pipeline;
pub mod request;

use nyc_housing_address::AddressParseError;

pub use config::LookupConfig;
pub use correlate::{GatewayOutput, correlate};
pub use fallback::{FallbackOutcome, NoFallback, ScrapeFallbackPort};
pub use pipeline::BuildingLookup;
pub use request::{DEFAULT_COUNT, LookupRequest, RecordCount};

/// Request-level lookup failures.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The address could not be parsed.
    #[error(transparent)]
    AddressParse(#[from] AddressParseError),

    /// A request parameter is missing or malformed.
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name as it appears in the request.
        name: &'static str,
        /// What was wrong.
        message: String,
    },

    /// Startup configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The lookup task panicked or was cancelled.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl LookupError {
    /// Builds an [`LookupError::InvalidParameter`].
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AddressParse(_) | Self::InvalidParameter { .. } => 400,
            Self::Config(_) | Self::Unexpected(_) => 500,
        }
    }

    /// Message safe to show to the caller. Server-side failures get a
    /// generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AddressParse(_) | Self::InvalidParameter { .. } => self.to_string(),
            Self::Config(_) | Self::Unexpected(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_are_400() {
        let parse = LookupError::from(AddressParseError::MissingHouseNumber {
            input: "Hewes St".to_string(),
        });
        assert_eq!(parse.status_code(), 400);
        assert!(parse.user_message().contains("house number"));
        assert_eq!(LookupError::invalid("zip_code", "bad").status_code(), 400);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = LookupError::Unexpected("socket closed at 10.0.0.3".to_string());
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.user_message(), "Internal server error");
    }
}
