//! Street type and directional synonym tables.
//!
//! Street types map between the USPS abbreviation and the full word so a
//! single input expands to every spelling NYC datasets are known to use.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Street types as (canonical abbreviation, full word, other accepted
/// spellings).
///
/// Source: USPS Publication 28 suffixes common in the five boroughs.
const STREET_TYPES: &[(&str, &str, &[&str])] = &[
    ("ALY", "ALLEY", &[]),
    ("AVE", "AVENUE", &["AV", "AVEN"]),
    ("BLVD", "BOULEVARD", &["BLV", "BOUL"]),
    ("BRG", "BRIDGE", &[]),
    ("CIR", "CIRCLE", &[]),
    ("CRES", "CRESCENT", &[]),
    ("CT", "COURT", &[]),
    ("DR", "DRIVE", &[]),
    ("EXPY", "EXPRESSWAY", &[]),
    ("HWY", "HIGHWAY", &[]),
    ("LN", "LANE", &[]),
    ("LOOP", "LOOP", &[]),
    ("OVAL", "OVAL", &[]),
    ("PARK", "PARK", &[]),
    ("PKWY", "PARKWAY", &["PKY"]),
    ("PL", "PLACE", &[]),
    ("PLZ", "PLAZA", &[]),
    ("RD", "ROAD", &[]),
    ("ROW", "ROW", &[]),
    ("SQ", "SQUARE", &[]),
    ("ST", "STREET", &["STR"]),
    ("TER", "TERRACE", &["TERR"]),
    ("TPKE", "TURNPIKE", &[]),
    ("WAY", "WAY", &[]),
    ("WALK", "WALK", &[]),
];

/// Every accepted spelling mapped to its `STREET_TYPES` row index.
static STREET_TYPE_INDEX: LazyLock<BTreeMap<&'static str, usize>> = LazyLock::new(|| {
    let mut index = BTreeMap::new();
    for (i, (abbr, full, others)) in STREET_TYPES.iter().enumerate() {
        index.insert(*abbr, i);
        index.insert(*full, i);
        for other in *others {
            index.insert(*other, i);
        }
    }
    index
});

/// Returns `true` if `token` (upper-case) is a recognized street type.
#[must_use]
pub fn is_street_type(token: &str) -> bool {
    STREET_TYPE_INDEX.contains_key(token)
}

/// Returns the canonical abbreviation for a street type token.
#[must_use]
pub fn street_type_abbreviation(token: &str) -> Option<&'static str> {
    STREET_TYPE_INDEX.get(token).map(|&i| STREET_TYPES[i].0)
}

/// Returns every spelling to emit for a street type token: the canonical
/// abbreviation, the full word, and the token itself when it is a third
/// spelling. Unknown tokens yield only themselves.
#[must_use]
pub fn street_type_forms(token: &str) -> Vec<String> {
    let Some(&i) = STREET_TYPE_INDEX.get(token) else {
        return vec![token.to_string()];
    };
    let (abbr, full, _) = STREET_TYPES[i];
    let mut forms = vec![abbr.to_string()];
    if full != abbr {
        forms.push(full.to_string());
    }
    if token != abbr && token != full {
        forms.push(token.to_string());
    }
    forms
}

/// A compass prefix on a street name (`W 45 ST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directional {
    /// North / N.
    North,
    /// South / S.
    South,
    /// East / E.
    East,
    /// West / W.
    West,
}

impl Directional {
    /// Parses an abbreviated or full directional token (upper-case).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "N" | "NORTH" => Some(Self::North),
            "S" | "SOUTH" => Some(Self::South),
            "E" | "EAST" => Some(Self::East),
            "W" | "WEST" => Some(Self::West),
            _ => None,
        }
    }

    /// Single-letter form.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::South => "S",
            Self::East => "E",
            Self::West => "W",
        }
    }

    /// Full-word form.
    #[must_use]
    pub const fn full(self) -> &'static str {
        match self {
            Self::North => "NORTH",
            Self::South => "SOUTH",
            Self::East => "EAST",
            Self::West => "WEST",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_street_types() {
        assert!(is_street_type("ST"));
        assert!(is_street_type("STREET"));
        assert!(is_street_type("AV"));
        assert!(!is_street_type("HEWES"));
    }

    #[test]
    fn expands_street_type_both_ways() {
        assert_eq!(street_type_forms("ST"), vec!["ST", "STREET"]);
        assert_eq!(street_type_forms("STREET"), vec!["ST", "STREET"]);
    }

    #[test]
    fn keeps_alternate_spelling() {
        assert_eq!(street_type_forms("AV"), vec!["AVE", "AVENUE", "AV"]);
        assert_eq!(street_type_abbreviation("AVENUE"), Some("AVE"));
    }

    #[test]
    fn single_form_street_types() {
        assert_eq!(street_type_forms("WAY"), vec!["WAY"]);
    }

    #[test]
    fn parses_directionals() {
        assert_eq!(Directional::parse("W"), Some(Directional::West));
        assert_eq!(Directional::parse("NORTH"), Some(Directional::North));
        assert_eq!(Directional::parse("NE"), None);
        assert_eq!(Directional::East.full(), "EAST");
    }
}
