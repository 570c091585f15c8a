//! Value set types.

use crate::{Designation, FilterOperator, PublicationStatus};

/// A value set definition: identity plus the compose rules that define
/// its membership.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueSetDefinition {
    /// Logical id assigned by the definition store.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub id: Option<String>,
    /// Canonical URL identifying this value set.
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
    /// Content logical definition. A value set without one expands to nothing.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub compose: Option<Compose>,
}

impl ValueSetDefinition {
    /// Returns the include rules in declaration order.
    pub fn includes(&self) -> &[Include] {
        self.compose
            .as_ref()
            .map(|c| c.include.as_slice())
            .unwrap_or_default()
    }
}

/// Ordered include and exclude rules.
///
/// Exclude rules are carried for completeness but are not subtracted from
/// expansions.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compose {
    /// Include rules, applied in order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub include: Vec<Include>,
    /// Exclude rules.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub exclude: Vec<Include>,
}

/// A single include (or exclude) rule referencing one code system.
///
/// # Examples
///
/// ```
/// use terminology_types::{Include, IncludeRule};
///
/// let include = Include::whole_system("http://ex/cs");
/// assert!(matches!(include.rule(), IncludeRule::WholeSystem));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Include {
    /// Code system URL the rule draws from.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub system: Option<String>,
    /// Code system version.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub version: Option<String>,
    /// Explicitly enumerated concepts.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub concept: Vec<IncludeConcept>,
    /// Property filters, all of which must hold.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub filter: Vec<Filter>,
}

/// The form an include rule takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IncludeRule<'a> {
    /// An explicit list of codes.
    Concepts(&'a [IncludeConcept]),
    /// Property filters over the system's full concept list.
    Filters(&'a [Filter]),
    /// Every concept in the referenced system.
    WholeSystem,
}

impl Include {
    /// Creates a rule that includes an entire code system.
    pub fn whole_system(system: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            ..Default::default()
        }
    }

    /// Creates a rule that lists explicit concepts.
    pub fn concepts(system: impl Into<String>, concept: Vec<IncludeConcept>) -> Self {
        Self {
            system: Some(system.into()),
            concept,
            ..Default::default()
        }
    }

    /// Creates a rule that filters the system's concepts.
    pub fn filtered(system: impl Into<String>, filter: Vec<Filter>) -> Self {
        Self {
            system: Some(system.into()),
            filter,
            ..Default::default()
        }
    }

    /// Classifies this rule. Explicit concepts take precedence over filters.
    pub fn rule(&self) -> IncludeRule<'_> {
        if !self.concept.is_empty() {
            IncludeRule::Concepts(&self.concept)
        } else if !self.filter.is_empty() {
            IncludeRule::Filters(&self.filter)
        } else {
            IncludeRule::WholeSystem
        }
    }
}

/// An explicitly listed concept in an include rule.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncludeConcept {
    /// The code.
    pub code: String,
    /// Display to use for this code in the value set.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub display: Option<String>,
    /// Additional designations.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "designation", default, skip_serializing_if = "Vec::is_empty")
    )]
    pub designations: Vec<Designation>,
}

impl IncludeConcept {
    /// Creates an included concept with a display.
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: Some(display.into()),
            designations: Vec::new(),
        }
    }
}

/// A property filter: `property op value`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Filter {
    /// Property name: `code`, `display`, or a concept property code.
    pub property: String,
    /// Operator.
    pub op: FilterOperator,
    /// Value to compare against (a pattern for `regex`).
    pub value: String,
}

impl Filter {
    /// Creates a filter.
    pub fn new(property: impl Into<String>, op: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            op,
            value: value.into(),
        }
    }
}
