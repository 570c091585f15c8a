//! Concept map types.
//!
//! A concept map is an ordered list of [`Group`]s, each translating codes
//! from one source system to one target system.

use crate::{ConceptMapRelationship, PublicationStatus};

/// A concept map definition.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ConceptMapDefinition {
    /// Logical id assigned by the definition store.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub id: Option<String>,
    /// Canonical URL identifying this concept map.
    pub url: String,
    /// Business version.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub version: Option<String>,
    /// Computer-friendly name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Human-friendly title.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub title: Option<String>,
    /// Publication status.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: PublicationStatus,
    /// Source value set canonical.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub source_canonical: Option<String>,
    /// Target value set canonical.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub target_canonical: Option<String>,
    /// Mapping groups, searched in order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub group: Vec<Group>,
}

/// Mappings from one source system to one target system.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Group {
    /// Source system URL. An absent source matches any requested source.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub source: Option<String>,
    /// Source system version.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub source_version: Option<String>,
    /// Target system URL. An absent target matches any requested target.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub target: Option<String>,
    /// Target system version.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub target_version: Option<String>,
    /// Source elements, scanned in order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: Vec<Element>,
}

impl Group {
    /// Creates a group between two systems.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        element: Vec<Element>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
            element,
            ..Default::default()
        }
    }
}

/// A source code and the targets it maps to.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    /// Source code.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub code: Option<String>,
    /// Source display.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub display: Option<String>,
    /// Targets, in declaration order.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub target: Vec<Target>,
}

impl Element {
    /// Creates an element for a source code.
    pub fn new(code: impl Into<String>, target: Vec<Target>) -> Self {
        Self {
            code: Some(code.into()),
            display: None,
            target,
        }
    }
}

/// One mapping target.
///
/// The relationship is read from `relationship`, or from the older
/// `equivalence` field name.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    /// Target code.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub code: Option<String>,
    /// Target display.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub display: Option<String>,
    /// Relationship of target to source.
    #[cfg_attr(feature = "serde", serde(alias = "equivalence"))]
    pub relationship: ConceptMapRelationship,
    /// Free-text comment.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub comment: Option<String>,
}

impl Target {
    /// Creates a target with a code and relationship.
    pub fn new(code: impl Into<String>, relationship: ConceptMapRelationship) -> Self {
        Self {
            code: Some(code.into()),
            display: None,
            relationship,
            comment: None,
        }
    }

    /// Sets the display text.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}
