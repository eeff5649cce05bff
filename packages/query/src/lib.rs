#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structured filter expressions for open-data queries.
//!
//! Address variants are turned into a [`FilterExpression`], a list of
//! `(field, operator, value)` clauses joined by `AND`. Gateways render it
//! into an escaped `SoQL` `$where` string with [`FilterExpression::to_soql`]
//! or evaluate it directly against in-memory rows with
//! [`FilterExpression::matches`]. Values are never spliced into query text
//! without escaping.

pub mod layout;
mod soql;

use std::collections::BTreeMap;

pub use layout::{FieldLayout, IdentifierKind, build_clauses, build_filter};

/// Errors from building or rendering a filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The address produced no variants.
    #[error("No address variants to query")]
    EmptyVariants,

    /// The layout is keyed by an identifier the resolver did not find.
    #[error("Building {0} is unknown")]
    MissingIdentifier(IdentifierKind),

    /// A field name is not a plain column identifier.
    #[error("Invalid field name '{0}'")]
    InvalidField(String),

    /// An `IN` clause has no values.
    #[error("Empty IN list for field '{0}'")]
    EmptyInList(String),
}

/// One comparison against a dataset column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `field = value`
    Eq {
        /// Column name.
        field: String,
        /// Literal value.
        value: String,
    },
    /// `field IN (values...)`
    In {
        /// Column name.
        field: String,
        /// Literal values.
        values: Vec<String>,
    },
    /// `field >= value`
    Gte {
        /// Column name.
        field: String,
        /// Literal value.
        value: String,
    },
}

impl Clause {
    /// Equality clause.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Membership clause.
    #[must_use]
    pub fn is_in<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Lower-bound clause.
    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Gte {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Column this clause tests.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Eq { field, .. } | Self::In { field, .. } | Self::Gte { field, .. } => field,
        }
    }

    fn matches(&self, row: &BTreeMap<String, String>) -> bool {
        let Some(actual) = row.get(self.field()).map(|v| v.trim()) else {
            return false;
        };
        match self {
            Self::Eq { value, .. } => actual.eq_ignore_ascii_case(value),
            Self::In { values, .. } => values.iter().any(|v| actual.eq_ignore_ascii_case(v)),
            Self::Gte { value, .. } => actual >= value.as_str(),
        }
    }
}

/// A conjunction of [`Clause`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    clauses: Vec<Clause>,
}

impl FilterExpression {
    /// An expression with no clauses (matches everything).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Appends a clause.
    #[must_use]
    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Appends several clauses.
    #[must_use]
    pub fn and_all(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.clauses.extend(clauses);
        self
    }

    /// The clauses in insertion order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether there are no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders the expression as an escaped `SoQL` `$where` value.
    ///
    /// # Errors
    ///
    /// * [`QueryError::InvalidField`] if a field is not a plain identifier
    /// * [`QueryError::EmptyInList`] if an `IN` clause has no values
    pub fn to_soql(&self) -> Result<String, QueryError> {
        soql::render(&self.clauses)
    }

    /// Evaluates the expression against one row. String comparisons are
    /// ASCII case-insensitive; a missing column never matches.
    #[must_use]
    pub fn matches(&self, row: &BTreeMap<String, String>) -> bool {
        self.clauses.iter().all(|c| c.matches(row))
    }
}
