//! Per-dataset field layouts and the variant query builder.
//!
//! Each dataset stores addresses differently: one combined address column,
//! separate house-number and street-name columns, or only a building
//! identifier. [`build_filter`] picks the right clauses for a layout.

use nyc_housing_address::{AddressVariantSet, borough::borough_from_zip};
use nyc_housing_record_models::BuildingIdentifier;
use serde::Deserialize;
use strum_macros::Display;

use crate::{Clause, FilterExpression, QueryError};

/// Which building identifier an identifier-keyed dataset uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    /// Building Identification Number.
    #[strum(serialize = "BIN")]
    Bin,
    /// Borough-Block-Lot.
    #[strum(serialize = "BBL")]
    Bbl,
}

/// How a dataset encodes the address of a row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldLayout {
    /// One column holding the full upper-case address string.
    Combined {
        /// Address column.
        address: String,
        /// ZIP column.
        zip: Option<String>,
    },
    /// Separate house-number and street-name columns.
    Split {
        /// House-number column. `None` for block-range datasets that are
        /// filtered by house number after the query.
        house_number: Option<String>,
        /// Street-name column.
        street_name: String,
        /// ZIP column.
        zip: Option<String>,
        /// Upper-case borough name column, used when there is no ZIP column.
        borough: Option<String>,
    },
    /// Rows keyed only by a building identifier.
    Identifier {
        /// Identifier column.
        field: String,
        /// Which identifier the column holds.
        identifier: IdentifierKind,
    },
}

impl FieldLayout {
    /// Identifier this layout requires, if any.
    #[must_use]
    pub const fn required_identifier(&self) -> Option<IdentifierKind> {
        match self {
            Self::Identifier { identifier, .. } => Some(*identifier),
            Self::Combined { .. } | Self::Split { .. } => None,
        }
    }
}

/// Builds address-keyed clauses for a combined or split layout.
///
/// Identifier layouts yield an empty expression; use [`build_filter`] to
/// include the identifier clause.
///
/// # Errors
///
/// * [`QueryError::EmptyVariants`] if the variant set is empty
pub fn build_clauses(
    variants: &AddressVariantSet,
    zip: &str,
    layout: &FieldLayout,
) -> Result<FilterExpression, QueryError> {
    if variants.is_empty() {
        return Err(QueryError::EmptyVariants);
    }

    let filter = match layout {
        FieldLayout::Combined { address, zip: zip_field } => {
            let filter = FilterExpression::new().and(Clause::is_in(address, variants.iter()));
            match zip_field {
                Some(field) => filter.and(Clause::eq(field, zip)),
                None => filter,
            }
        }
        FieldLayout::Split {
            house_number,
            street_name,
            zip: zip_field,
            borough,
        } => {
            let mut filter = FilterExpression::new();
            if let Some(field) = house_number {
                filter = filter.and(Clause::is_in(field, variants.house_numbers()));
            }
            filter = filter.and(Clause::is_in(street_name, variants.street_names()));
            if let Some(field) = zip_field {
                filter = filter.and(Clause::eq(field, zip));
            } else if let Some(field) = borough
                && let Some(b) = borough_from_zip(zip)
            {
                filter = filter.and(Clause::eq(field, b.upper()));
            }
            filter
        }
        FieldLayout::Identifier { .. } => FilterExpression::new(),
    };

    Ok(filter)
}

/// Builds the full filter for one dataset.
///
/// # Errors
///
/// * [`QueryError::MissingIdentifier`] if the layout is identifier-keyed
///   and the building's identifier is unknown
/// * [`QueryError::EmptyVariants`] if an address-keyed layout gets an
///   empty variant set
pub fn build_filter(
    layout: &FieldLayout,
    variants: &AddressVariantSet,
    zip: &str,
    building: &BuildingIdentifier,
) -> Result<FilterExpression, QueryError> {
    match layout {
        FieldLayout::Identifier { field, identifier } => {
            let value = match identifier {
                IdentifierKind::Bin => building.bin.as_deref(),
                IdentifierKind::Bbl => building.bbl.as_deref(),
            }
            .ok_or(QueryError::MissingIdentifier(*identifier))?;
            Ok(FilterExpression::new().and(Clause::eq(field, value)))
        }
        FieldLayout::Combined { .. } | FieldLayout::Split { .. } => {
            build_clauses(variants, zip, layout)
        }
    }
}

#[cfg(test)]
mod tests {
    use nyc_housing_address::normalize;
    use nyc_housing_record_models::{Borough, SourceTier};

    use super::*;

    fn hewes() -> AddressVariantSet {
        normalize("393 Hewes St").unwrap().variants
    }

    #[test]
    fn combined_layout_uses_full_variants() {
        let layout = FieldLayout::Combined {
            address: "incident_address".to_string(),
            zip: Some("incident_zip".to_string()),
        };
        let filter = build_clauses(&hewes(), "11211", &layout).unwrap();
        assert_eq!(
            filter.clauses(),
            &[
                Clause::is_in("incident_address", ["393 HEWES ST", "393 HEWES STREET"]),
                Clause::eq("incident_zip", "11211"),
            ]
        );
    }

    #[test]
    fn split_layout_separates_house_and_street() {
        let layout = FieldLayout::Split {
            house_number: Some("housenumber".to_string()),
            street_name: "streetname".to_string(),
            zip: Some("zip".to_string()),
            borough: None,
        };
        let filter = build_clauses(&hewes(), "11211", &layout).unwrap();
        assert_eq!(
            filter.clauses(),
            &[
                Clause::is_in("housenumber", ["393"]),
                Clause::is_in("streetname", ["HEWES ST", "HEWES STREET"]),
                Clause::eq("zip", "11211"),
            ]
        );
    }

    #[test]
    fn range_layout_omits_house_number() {
        let layout = FieldLayout::Split {
            house_number: None,
            street_name: "streetname".to_string(),
            zip: None,
            borough: Some("boro".to_string()),
        };
        let filter = build_clauses(&hewes(), "11211", &layout).unwrap();
        assert_eq!(
            filter.clauses(),
            &[
                Clause::is_in("streetname", ["HEWES ST", "HEWES STREET"]),
                Clause::eq("boro", "BROOKLYN"),
            ]
        );
    }

    #[test]
    fn empty_variants_are_rejected() {
        let layout = FieldLayout::Combined {
            address: "incident_address".to_string(),
            zip: None,
        };
        assert_eq!(
            build_clauses(&AddressVariantSet::default(), "11211", &layout),
            Err(QueryError::EmptyVariants)
        );
    }

    #[test]
    fn identifier_layout_needs_identifier() {
        let layout = FieldLayout::Identifier {
            field: "bin".to_string(),
            identifier: IdentifierKind::Bin,
        };
        let unknown = BuildingIdentifier::unresolved(Some(Borough::Brooklyn));
        assert_eq!(
            build_filter(&layout, &hewes(), "11211", &unknown),
            Err(QueryError::MissingIdentifier(IdentifierKind::Bin))
        );

        let known = BuildingIdentifier {
            bin: Some("3061234".to_string()),
            bbl: None,
            borough: Some(Borough::Brooklyn),
            source_tier: SourceTier::Primary,
        };
        let filter = build_filter(&layout, &hewes(), "11211", &known).unwrap();
        assert_eq!(filter.to_soql().unwrap(), "bin = '3061234'");
    }

    #[test]
    fn layouts_parse_from_toml() {
        let layout: FieldLayout = toml_layout(
            r#"
            type = "split"
            street_name = "streetname"
            zip = "zip"
            "#,
        );
        assert!(matches!(layout, FieldLayout::Split { house_number: None, .. }));
    }

    fn toml_layout(s: &str) -> FieldLayout {
        toml::from_str(s).unwrap()
    }
}
