//! `SoQL` rendering with literal escaping.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Clause, QueryError};

static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Quotes a string literal, doubling embedded single quotes.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn checked_field(field: &str) -> Result<&str, QueryError> {
    if FIELD_RE.is_match(field) {
        Ok(field)
    } else {
        Err(QueryError::InvalidField(field.to_string()))
    }
}

pub(crate) fn render(clauses: &[Clause]) -> Result<String, QueryError> {
    let mut out = String::new();
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            out.push_str(" AND ");
        }
        let field = checked_field(clause.field())?;
        match clause {
            Clause::Eq { value, .. } => {
                write!(out, "{field} = {}", quote(value)).unwrap();
            }
            Clause::Gte { value, .. } => {
                write!(out, "{field} >= {}", quote(value)).unwrap();
            }
            Clause::In { values, .. } => {
                if values.is_empty() {
                    return Err(QueryError::EmptyInList(field.to_string()));
                }
                let list = values
                    .iter()
                    .map(|v| quote(v))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(out, "{field} IN ({list})").unwrap();
            }
        }
    }
    Ok(out)
}
