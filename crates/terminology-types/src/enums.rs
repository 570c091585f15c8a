//! Terminology enumeration types.
//!
//! This module provides enum representations for the coded values used by
//! definition resources: publication status, value set filter operators and
//! concept map relationships.

use std::fmt;

/// Publication status of a definition resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PublicationStatus {
    /// Still under development.
    #[default]
    Draft,
    /// Ready for normal use.
    Active,
    /// Withdrawn or superseded.
    Retired,
    /// Status not known.
    Unknown,
}

impl PublicationStatus {
    /// Returns the wire code for this status.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Retired => "retired",
            Self::Unknown => "unknown",
        }
    }
}

/// Operator of a value set include filter.
///
/// Only [`FilterOperator::Equals`] and [`FilterOperator::Regex`] are evaluated
/// by the expander; the remaining operators are accepted so definitions load,
/// but concepts filtered with them never match. Operator strings outside the
/// vocabulary are kept in [`FilterOperator::Unknown`] rather than rejected.
///
/// # Examples
///
/// ```
/// use terminology_types::FilterOperator;
///
/// assert_eq!(FilterOperator::from_code("regex"), FilterOperator::Regex);
/// assert_eq!(FilterOperator::from_code("descendant-of"), FilterOperator::DescendentOf);
/// assert!(FilterOperator::Equals.is_evaluated());
/// assert!(!FilterOperator::IsA.is_evaluated());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum FilterOperator {
    /// `=`: exact string equality.
    Equals,
    /// `is-a`
    IsA,
    /// `descendent-of` (also read from `descendant-of`).
    DescendentOf,
    /// `is-not-a`
    IsNotA,
    /// `regex`: pattern match anywhere in the value.
    Regex,
    /// `in`
    In,
    /// `not-in`
    NotIn,
    /// `generalizes`
    Generalizes,
    /// `exists`
    Exists,
    /// Any other operator string.
    Unknown(String),
}

impl FilterOperator {
    /// Parses an operator code. Never fails: unrecognized codes become `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "=" => Self::Equals,
            "is-a" => Self::IsA,
            "descendent-of" | "descendant-of" => Self::DescendentOf,
            "is-not-a" => Self::IsNotA,
            "regex" => Self::Regex,
            "in" => Self::In,
            "not-in" => Self::NotIn,
            "generalizes" => Self::Generalizes,
            "exists" => Self::Exists,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the operator code.
    pub fn as_code(&self) -> &str {
        match self {
            Self::Equals => "=",
            Self::IsA => "is-a",
            Self::DescendentOf => "descendent-of",
            Self::IsNotA => "is-not-a",
            Self::Regex => "regex",
            Self::In => "in",
            Self::NotIn => "not-in",
            Self::Generalizes => "generalizes",
            Self::Exists => "exists",
            Self::Unknown(code) => code,
        }
    }

    /// Returns true if the expander evaluates this operator.
    pub fn is_evaluated(&self) -> bool {
        matches!(self, Self::Equals | Self::Regex)
    }
}

impl From<String> for FilterOperator {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_code().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Relationship (equivalence) between a concept map source and target code.
///
/// # Examples
///
/// ```
/// use terminology_types::ConceptMapRelationship;
///
/// let rel = ConceptMapRelationship::from_code("narrower");
/// assert_eq!(rel, Some(ConceptMapRelationship::Narrower));
/// assert!(rel.unwrap().is_match());
/// assert!(!ConceptMapRelationship::Disjoint.is_match());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ConceptMapRelationship {
    /// Related in some unspecified way.
    Relatedto,
    /// Same meaning.
    Equivalent,
    /// Exactly the same, including spelling.
    Equal,
    /// Target is wider in meaning.
    Wider,
    /// Target subsumes the source.
    Subsumes,
    /// Target is narrower in meaning.
    Narrower,
    /// Target specializes the source.
    Specializes,
    /// Overlapping but not exact.
    Inexact,
    /// No match exists.
    Unmatched,
    /// Explicitly not the same.
    Disjoint,
}

impl ConceptMapRelationship {
    /// Parses a relationship code.
    ///
    /// Returns `None` if the code is not a known relationship.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "relatedto" => Some(Self::Relatedto),
            "equivalent" => Some(Self::Equivalent),
            "equal" => Some(Self::Equal),
            "wider" => Some(Self::Wider),
            "subsumes" => Some(Self::Subsumes),
            "narrower" => Some(Self::Narrower),
            "specializes" => Some(Self::Specializes),
            "inexact" => Some(Self::Inexact),
            "unmatched" => Some(Self::Unmatched),
            "disjoint" => Some(Self::Disjoint),
            _ => None,
        }
    }

    /// Returns the relationship code.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Relatedto => "relatedto",
            Self::Equivalent => "equivalent",
            Self::Equal => "equal",
            Self::Wider => "wider",
            Self::Subsumes => "subsumes",
            Self::Narrower => "narrower",
            Self::Specializes => "specializes",
            Self::Inexact => "inexact",
            Self::Unmatched => "unmatched",
            Self::Disjoint => "disjoint",
        }
    }

    /// Returns true unless the relationship states that no usable mapping exists.
    pub fn is_match(self) -> bool {
        !matches!(self, Self::Unmatched | Self::Disjoint)
    }
}

impl fmt::Display for ConceptMapRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_operator_codes() {
        for code in [
            "=",
            "is-a",
            "descendent-of",
            "is-not-a",
            "regex",
            "in",
            "not-in",
            "generalizes",
            "exists",
        ] {
            let op = FilterOperator::from_code(code);
            assert!(!matches!(op, FilterOperator::Unknown(_)), "{code}");
            assert_eq!(op.as_code(), code);
        }
    }

    #[test]
    fn test_unknown_filter_operator_is_kept() {
        let op = FilterOperator::from_code("starts-with");
        assert_eq!(op, FilterOperator::Unknown("starts-with".to_string()));
        assert_eq!(op.to_string(), "starts-with");
        assert!(!op.is_evaluated());
    }

    #[test]
    fn test_relationship_from_code() {
        assert_eq!(
            ConceptMapRelationship::from_code("equivalent"),
            Some(ConceptMapRelationship::Equivalent)
        );
        assert_eq!(ConceptMapRelationship::from_code("sameas"), None);
        assert_eq!(ConceptMapRelationship::Inexact.as_code(), "inexact");
        assert!(!ConceptMapRelationship::Unmatched.is_match());
    }

    #[test]
    fn test_publication_status_default() {
        assert_eq!(PublicationStatus::default(), PublicationStatus::Draft);
        assert_eq!(PublicationStatus::Retired.as_code(), "retired");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_enum_serde() {
        let op: FilterOperator = serde_json::from_str("\"descendant-of\"").unwrap();
        assert_eq!(op, FilterOperator::DescendentOf);
        assert_eq!(serde_json::to_string(&FilterOperator::Regex).unwrap(), "\"regex\"");

        let rel: ConceptMapRelationship = serde_json::from_str("\"relatedto\"").unwrap();
        assert_eq!(rel, ConceptMapRelationship::Relatedto);
        assert!(serde_json::from_str::<ConceptMapRelationship>("\"bogus\"").is_err());
    }
}
