//! Parsing of free-text addresses into [`Address`] parts.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Address, AddressParseError, AddressVariantSet, synonyms};

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,;]").expect("valid regex"));

static HOUSE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[A-Z]?(?:-[0-9]+[A-Z]?)?$").expect("valid regex"));

static STREET_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(?:ST|ND|RD|TH)?$").expect("valid regex"));

const APARTMENT_DESIGNATORS: &[&str] = &["APT", "APARTMENT", "UNIT", "#"];

/// A parsed address together with its variant set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedAddress {
    pub address: Address,
    pub variants: AddressVariantSet,
}

/// Parses free text into an [`Address`] and builds its variants.
///
/// Blank input yields an empty address and empty variant set rather than
/// an error.
///
/// # Errors
///
/// * [`AddressParseError::MissingHouseNumber`] if the first token is not a
///   house number
/// * [`AddressParseError::MissingStreet`] if nothing follows the house
///   number
pub fn normalize(raw: &str) -> Result<NormalizedAddress, AddressParseError> {
    let cleaned = PUNCTUATION_RE.replace_all(raw, " ").to_uppercase();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();

    if tokens.is_empty() {
        return Ok(NormalizedAddress::default());
    }

    let apartment = split_apartment(&mut tokens);

    let (&house, rest) = tokens.split_first().ok_or_else(|| {
        AddressParseError::MissingHouseNumber {
            input: raw.to_string(),
        }
    })?;
    if !HOUSE_NUMBER_RE.is_match(house) {
        return Err(AddressParseError::MissingHouseNumber {
            input: raw.to_string(),
        });
    }
    if rest.is_empty() {
        return Err(AddressParseError::MissingStreet {
            input: raw.to_string(),
        });
    }

    let mut rest = rest;

    let mut directional = None;
    if rest.len() > 1
        && let Some(d) = synonyms::Directional::parse(rest[0])
    {
        directional = Some(d);
        rest = &rest[1..];
    }

    let mut street_number = None;
    if STREET_NUMBER_RE.is_match(rest[0]) {
        street_number = Some(rest[0].to_string());
        rest = &rest[1..];
    }

    let mut street_type = None;
    if let Some((&last, init)) = rest.split_last()
        && synonyms::is_street_type(last)
        && (!init.is_empty() || street_number.is_some())
    {
        street_type = Some(last.to_string());
        rest = init;
    }

    let street_name = rest.join(" ");
    if street_name.is_empty() && street_number.is_none() {
        return Err(AddressParseError::MissingStreet {
            input: raw.to_string(),
        });
    }

    let address = Address {
        house_number: house.to_string(),
        directional,
        street_number,
        street_name,
        street_type,
        apartment,
    };
    let variants = AddressVariantSet::for_address(&address);

    Ok(NormalizedAddress { address, variants })
}

/// Removes an apartment designator and everything after it, returning the
/// unit if one was given.
fn split_apartment(tokens: &mut Vec<&str>) -> Option<String> {
    let position = tokens
        .iter()
        .skip(1)
        .position(|t| APARTMENT_DESIGNATORS.contains(t) || t.starts_with('#'))?
        + 1;

    let designator = tokens[position];
    let unit = if designator.len() > 1 && designator.starts_with('#') {
        Some(designator[1..].to_string())
    } else {
        tokens.get(position + 1).map(|t| t.trim_start_matches('#').to_string())
    };
    tokens.truncate(position);

    unit.filter(|u| !u.is_empty())
}

/// Digits of a street-number token (`"45TH"` -> `"45"`).
pub(crate) fn ordinal_digits(token: &str) -> &str {
    STREET_NUMBER_RE
        .captures(token)
        .and_then(|c| c.get(1))
        .map_or(token, |m| m.as_str())
}

/// English ordinal suffix for a number.
fn ordinal_suffix(n: u32) -> &'static str {
    if (11..=13).contains(&(n % 100)) {
        return "TH";
    }
    match n % 10 {
        1 => "ST",
        2 => "ND",
        3 => "RD",
        _ => "TH",
    }
}

/// Bare and suffixed spellings of a street-number token.
pub(crate) fn ordinal_forms(token: &str) -> Vec<String> {
    let digits = ordinal_digits(token);
    digits.parse::<u32>().map_or_else(
        |_| vec![token.to_string()],
        |n| vec![digits.to_string(), format!("{digits}{}", ordinal_suffix(n))],
    )
}
