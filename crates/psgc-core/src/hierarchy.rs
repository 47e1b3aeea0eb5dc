// crates/psgc-core/src/hierarchy.rs

//! # Hierarchy Classifier
//!
//! Decides which table a record belongs to and derives the codes of its
//! enclosing units. Both are pure string operations on the fixed-width code:
//! an ancestor at level `L` keeps the first `L.boundary()` digits and
//! zero-fills the rest.
//!
//! The raw `Geographic Level` tag is the source of truth for placement.
//! [`infer_level`] re-derives a level from the digit structure only so the
//! loader can count disagreements; it never overrides the tag.

use crate::model::{CityMuniKind, GeographicRecord, Level};

/// Tags shorter than this are treated as unclassifiable.
pub const MIN_TAG_LEN: usize = 3;

/// Where a record is stored besides the masterlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Region,
    Province,
    CityMuni(CityMuniKind),
    Barangay,
    /// Masterlist only: empty, short, or unknown tags (`SubMun`, ...).
    Unclassified,
}

impl Placement {
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.len() < MIN_TAG_LEN {
            return Placement::Unclassified;
        }
        match tag {
            "Reg" => Placement::Region,
            "Prov" => Placement::Province,
            "City" => Placement::CityMuni(CityMuniKind::City),
            "Mun" => Placement::CityMuni(CityMuniKind::Mun),
            "Bgy" => Placement::Barangay,
            _ => Placement::Unclassified,
        }
    }

    pub fn level(self) -> Option<Level> {
        match self {
            Placement::Region => Some(Level::Region),
            Placement::Province => Some(Level::Province),
            Placement::CityMuni(_) => Some(Level::CityMuni),
            Placement::Barangay => Some(Level::Barangay),
            Placement::Unclassified => None,
        }
    }
}

/// Codes of the units enclosing a record. Only the levels above the record's
/// own level are filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancestors {
    pub region: Option<String>,
    pub province: Option<String>,
    pub city_muni: Option<String>,
}

impl Ancestors {
    pub fn derive(code: &str, level: Option<Level>) -> Self {
        let Some(level) = level else {
            return Self::default();
        };
        let above = |parent: Level| (parent < level).then(|| ancestor_code(code, parent.boundary()));
        Self {
            region: above(Level::Region),
            province: above(Level::Province),
            city_muni: above(Level::CityMuni),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub placement: Placement,
    pub ancestors: Ancestors,
}

impl Classification {
    pub fn level(&self) -> Option<Level> {
        self.placement.level()
    }
}

pub fn classify(record: &GeographicRecord) -> Classification {
    let placement = Placement::from_tag(&record.level);
    Classification {
        placement,
        ancestors: Ancestors::derive(&record.code, placement.level()),
    }
}

/// Keeps the first `boundary` characters of `code` and zero-fills the rest.
///
/// The result always has the same width as `code`; a boundary at or past the
/// width returns the code unchanged.
///
/// ```rust
/// use psgc_core::hierarchy::ancestor_code;
///
/// assert_eq!(ancestor_code("1380100000", 5), "1380100000");
/// assert_eq!(ancestor_code("0102805001", 7), "0102805000");
/// assert_eq!(ancestor_code("0102805001", 2), "0100000000");
/// ```
pub fn ancestor_code(code: &str, boundary: usize) -> String {
    let width = code.chars().count();
    if boundary >= width {
        return code.to_string();
    }
    code.chars()
        .take(boundary)
        .chain(std::iter::repeat('0').take(width - boundary))
        .collect()
}

/// The level implied by where a code's meaningful digits stop.
///
/// Returns `None` for an all-zero (or empty) code.
pub fn infer_level(code: &str) -> Option<Level> {
    let significant = code.trim_end_matches('0').chars().count();
    if significant == 0 {
        return None;
    }
    Level::ALL
        .into_iter()
        .find(|level| significant <= level.boundary())
        .or(Some(Level::Barangay))
}

/// `true` when the digit structure of `code` agrees with `level`.
pub fn is_consistent(code: &str, level: Level) -> bool {
    infer_level(code) == Some(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, level: &str) -> GeographicRecord {
        GeographicRecord::new(code, "x", "", level)
    }

    #[test]
    fn ancestor_keeps_width_and_is_idempotent() {
        for code in ["0100000000", "0102805001", "1380100000", "1999901001"] {
            for boundary in [2, 5, 7] {
                let once = ancestor_code(code, boundary);
                assert_eq!(once.len(), code.len());
                assert_eq!(ancestor_code(&once, boundary), once);
                assert!(code.starts_with(&once[..boundary]));
            }
        }
    }

    #[test]
    fn ancestor_of_short_code_is_unchanged() {
        assert_eq!(ancestor_code("01", 5), "01");
        assert_eq!(ancestor_code("", 2), "");
    }

    #[test]
    fn city_in_ncr_derives_its_province_code() {
        let class = classify(&record("1380100000", "City"));
        assert_eq!(class.placement, Placement::CityMuni(CityMuniKind::City));
        assert_eq!(class.ancestors.province.as_deref(), Some("1380100000"));
        assert_eq!(class.ancestors.region.as_deref(), Some("1300000000"));
        assert_eq!(class.ancestors.city_muni, None);
    }

    #[test]
    fn barangay_gets_every_ancestor() {
        let class = classify(&record("0102805001", "Bgy"));
        assert_eq!(
            class.ancestors,
            Ancestors {
                region: Some("0100000000".into()),
                province: Some("0102800000".into()),
                city_muni: Some("0102805000".into()),
            }
        );
    }

    #[test]
    fn region_has_no_ancestors() {
        let class = classify(&record("1300000000", "Reg"));
        assert_eq!(class.level(), Some(Level::Region));
        assert_eq!(class.ancestors, Ancestors::default());
    }

    #[test]
    fn short_and_unknown_tags_are_unclassified() {
        for tag in ["", "Re", "  ", "SubMun", "reg"] {
            assert_eq!(Placement::from_tag(tag), Placement::Unclassified, "{tag:?}");
        }
        assert_eq!(Placement::from_tag(" Mun "), Placement::CityMuni(CityMuniKind::Mun));
    }

    #[test]
    fn infer_level_follows_significant_digits() {
        assert_eq!(infer_level("1300000000"), Some(Level::Region));
        assert_eq!(infer_level("0102800000"), Some(Level::Province));
        assert_eq!(infer_level("0102805000"), Some(Level::CityMuni));
        assert_eq!(infer_level("0102805001"), Some(Level::Barangay));
        assert_eq!(infer_level("0000000000"), None);
        assert!(is_consistent("0102801000", Level::CityMuni));
        assert!(!is_consistent("1380100000", Level::CityMuni));
    }
}
