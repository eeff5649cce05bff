#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Free-text NYC street address normalization.
//!
//! NYC datasets encode the same building many ways: `"67 W 45 ST"`,
//! `"67 WEST 45TH STREET"`, `"67 W 45TH ST"`. [`normalize`] parses a typed
//! address into its parts and produces an [`AddressVariantSet`] covering
//! the directional, ordinal and street-type spellings so that downstream
//! queries can match whichever encoding a dataset happens to use.

pub mod borough;
pub mod house_number;
pub mod normalize;
pub mod synonyms;

use std::collections::BTreeSet;

pub use normalize::{NormalizedAddress, normalize};
pub use synonyms::Directional;

/// Errors from parsing a free-text address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// The first token is not a house number.
    #[error("Address must start with a house number (e.g. \"393 Hewes St\"): '{input}'")]
    MissingHouseNumber {
        /// The raw input.
        input: String,
    },

    /// A house number was found but nothing after it.
    #[error("Address is missing a street name: '{input}'")]
    MissingStreet {
        /// The raw input.
        input: String,
    },
}

/// A parsed street address. All text fields are upper-case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// House number, hyphens preserved (`"99-15"`).
    pub house_number: String,
    /// Compass prefix, if any.
    pub directional: Option<Directional>,
    /// Numbered-street token as typed (`"45"`, `"45TH"`).
    pub street_number: Option<String>,
    /// Remaining street name tokens (`"HEWES"`, `"ST MARKS"`).
    pub street_name: String,
    /// Trailing street type as typed (`"ST"`, `"STREET"`).
    pub street_type: Option<String>,
    /// Apartment / unit designator.
    pub apartment: Option<String>,
}

impl Address {
    /// Whether this is the empty address produced from blank input.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.house_number.is_empty()
    }

    /// Street portion in canonical upper-case form: directional expanded,
    /// ordinal stripped, street type abbreviated.
    #[must_use]
    pub fn street_line(&self) -> String {
        let number = self
            .street_number
            .as_deref()
            .map(normalize::ordinal_digits);
        let street_type = self
            .street_type
            .as_deref()
            .map(|t| synonyms::street_type_abbreviation(t).unwrap_or(t));

        [
            self.directional.map(Directional::full),
            number,
            Some(self.street_name.as_str()),
            street_type,
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Upper-case canonical form (`"67 WEST 45 ST"`). Always a member of
    /// the address's variant set.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!("{} {}", self.house_number, self.street_line())
    }

    /// Title-cased canonical form (`"67 West 45 St"`).
    #[must_use]
    pub fn canonical(&self) -> String {
        self.canonical_key()
            .split(' ')
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// House number as an integer for range comparisons.
    #[must_use]
    pub fn house_number_value(&self) -> Option<u32> {
        house_number::house_number_value(&self.house_number)
    }
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            let mut out = first.to_ascii_uppercase().to_string();
            out.push_str(&chars.as_str().to_ascii_lowercase());
            out
        }
        _ => token.to_string(),
    }
}

/// Plausible alternate renderings of one physical address, upper-case and
/// deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressVariantSet(BTreeSet<String>);

impl AddressVariantSet {
    /// Builds the variant set for an address: the cartesian product of its
    /// directional, street-number and street-type spellings.
    #[must_use]
    pub fn for_address(address: &Address) -> Self {
        if address.is_empty() {
            return Self::default();
        }

        let directionals: Vec<&str> = address
            .directional
            .map_or_else(|| vec![""], |d| vec![d.abbreviation(), d.full()]);
        let numbers: Vec<String> = address
            .street_number
            .as_deref()
            .map_or_else(|| vec![String::new()], normalize::ordinal_forms);
        let types: Vec<String> = address
            .street_type
            .as_deref()
            .map_or_else(|| vec![String::new()], synonyms::street_type_forms);

        let mut set = BTreeSet::new();
        for directional in &directionals {
            for number in &numbers {
                for street_type in &types {
                    let joined = [
                        address.house_number.as_str(),
                        directional,
                        number.as_str(),
                        address.street_name.as_str(),
                        street_type.as_str(),
                    ]
                    .into_iter()
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                    if !joined.is_empty() {
                        set.insert(joined);
                    }
                }
            }
        }
        set.insert(address.canonical_key());

        Self(set)
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, variant: &str) -> bool {
        self.0.contains(&variant.trim().to_uppercase())
    }

    /// Iterates the variants in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty (only for blank input).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distinct house-number tokens across all variants.
    #[must_use]
    pub fn house_numbers(&self) -> BTreeSet<&str> {
        self.iter()
            .filter_map(|v| v.split_once(' ').map(|(house, _)| house))
            .collect()
    }

    /// Distinct street remainders (everything after the house number).
    #[must_use]
    pub fn street_names(&self) -> BTreeSet<&str> {
        self.iter()
            .filter_map(|v| v.split_once(' ').map(|(_, street)| street))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_cases_alphabetic_tokens_only() {
        assert_eq!(title_case("HEWES"), "Hewes");
        assert_eq!(title_case("45"), "45");
        assert_eq!(title_case("12A"), "12A");
    }

    #[test]
    fn empty_address_has_empty_variants() {
        let address = Address::default();
        assert!(address.is_empty());
        assert!(AddressVariantSet::for_address(&address).is_empty());
        assert_eq!(address.canonical(), "");
    }

    #[test]
    fn splits_house_numbers_and_streets() {
        let parsed = normalize("393 Hewes St").unwrap();
        let houses = parsed.variants.house_numbers();
        assert_eq!(houses.into_iter().collect::<Vec<_>>(), vec!["393"]);
        let streets = parsed.variants.street_names();
        assert!(streets.contains("HEWES ST"));
        assert!(streets.contains("HEWES STREET"));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let parsed = normalize("393 Hewes St").unwrap();
        assert!(parsed.variants.contains("393 hewes street"));
        assert!(parsed.variants.contains(&parsed.address.canonical()));
    }
}
