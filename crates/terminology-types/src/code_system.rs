//! Code system types.
//!
//! A code system is a named vocabulary whose concepts form a forest: each
//! [`Concept`] owns its nested children, so descendants are reached by
//! walking down the owned tree.

use std::borrow::Cow;

use crate::PublicationStatus;

/// A code system definition.
///
/// The concept forest is stored as given; code lookup and hierarchy queries
/// are answered by the engine over a borrowed view of this value.
///
/// # Examples
///
/// ```
/// use terminology_types::{CodeSystemDefinition, Concept};
///
/// let cs = CodeSystemDefinition {
///     url: "http://ex/cs".to_string(),
///     case_sensitive: false,
///     concept: vec![Concept::new("abc", "Alphabet")],
///     ..Default::default()
/// };
///
/// assert!(cs.codes_match("ABC", "abc"));
/// assert_eq!(cs.fold_code("AbC"), "abc");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CodeSystemDefinition {
    /// Logical id assigned by the definition store.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub id: Option<String>,
    /// Canonical URL identifying this code system.
    pub url: String,
    /// Business version of the code system.
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
    /// Whether codes are compared case-sensitively. Defaults to true.
    #[cfg_attr(feature = "serde", serde(default = "default_case_sensitive"))]
    pub case_sensitive: bool,
    /// Top-level concepts of the forest.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub concept: Vec<Concept>,
}

#[cfg(feature = "serde")]
fn default_case_sensitive() -> bool {
    true
}

impl Default for CodeSystemDefinition {
    fn default() -> Self {
        Self {
            id: None,
            url: String::new(),
            version: None,
            name: String::new(),
            title: None,
            status: PublicationStatus::default(),
            case_sensitive: true,
            concept: Vec::new(),
        }
    }
}

impl CodeSystemDefinition {
    /// Compares two codes under this system's case-sensitivity rule.
    pub fn codes_match(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.to_lowercase() == b.to_lowercase()
        }
    }

    /// Returns the search key for a code: the code itself, or its lowercase
    /// form when the system is case-insensitive.
    pub fn fold_code<'c>(&self, code: &'c str) -> Cow<'c, str> {
        if self.case_sensitive {
            Cow::Borrowed(code)
        } else {
            Cow::Owned(code.to_lowercase())
        }
    }

    /// Counts every concept in the forest, nested ones included.
    pub fn concept_count(&self) -> usize {
        fn count(concepts: &[Concept]) -> usize {
            concepts.iter().map(|c| 1 + count(&c.children)).sum()
        }
        count(&self.concept)
    }
}

/// A single concept in a code system.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Concept {
    /// Code, unique within the code system.
    pub code: String,
    /// Preferred display text.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub display: Option<String>,
    /// Formal definition.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub definition: Option<String>,
    /// Alternate, language-tagged display strings.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "designation", default, skip_serializing_if = "Vec::is_empty")
    )]
    pub designations: Vec<Designation>,
    /// Property values attached to this concept.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "property", default, skip_serializing_if = "Vec::is_empty")
    )]
    pub properties: Vec<ConceptProperty>,
    /// Nested child concepts.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "concept", default, skip_serializing_if = "Vec::is_empty")
    )]
    pub children: Vec<Concept>,
}

impl Concept {
    /// Creates a leaf concept with a code and display.
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: Some(display.into()),
            ..Default::default()
        }
    }

    /// Returns the value of the first property with the given property code.
    ///
    /// `None` if no property has that code or the first one carries no value.
    pub fn property(&self, code: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.code == code)
            .and_then(|p| p.value.as_ref())
    }

    /// Returns true if this concept has nested children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// An alternate display string for a concept.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Designation {
    /// Language tag (e.g., "en", "de").
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub language: Option<String>,
    /// How this designation is meant to be used.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "use", default, skip_serializing_if = "Option::is_none")
    )]
    pub use_: Option<Coding>,
    /// The display text.
    pub value: String,
}

/// A reference to a code in a code system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coding {
    /// Code system URL.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub system: Option<String>,
    /// Code system version.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub version: Option<String>,
    /// The code.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub code: Option<String>,
    /// Display text for the code.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub display: Option<String>,
}

/// A property attached to a concept: a property code and at most one typed value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConceptProperty {
    /// Property code (e.g., "status", "parent").
    pub code: String,
    /// The typed value, serialized as one of `valueCode`, `valueString`, ...
    /// Absent when the entry has no recognized value slot.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub value: Option<PropertyValue>,
}

impl ConceptProperty {
    /// Creates a property from a code and value.
    pub fn new(code: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            code: code.into(),
            value: Some(value),
        }
    }

    /// Creates a property that carries no value.
    pub fn without_value(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value: None,
        }
    }
}

/// The typed slot of a concept property.
///
/// # Examples
///
/// ```
/// use terminology_types::PropertyValue;
///
/// assert_eq!(PropertyValue::Integer(42).to_string(), "42");
/// assert_eq!(PropertyValue::Boolean(false).to_string(), "false");
/// assert_eq!(PropertyValue::Code("active".into()).type_name(), "code");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    /// `valueCode`
    #[cfg_attr(feature = "serde", serde(rename = "valueCode"))]
    Code(String),
    /// `valueString`
    #[cfg_attr(feature = "serde", serde(rename = "valueString"))]
    String(String),
    /// `valueInteger`
    #[cfg_attr(feature = "serde", serde(rename = "valueInteger"))]
    Integer(i64),
    /// `valueBoolean`
    #[cfg_attr(feature = "serde", serde(rename = "valueBoolean"))]
    Boolean(bool),
    /// `valueDateTime`, kept as the lexical form.
    #[cfg_attr(feature = "serde", serde(rename = "valueDateTime"))]
    DateTime(String),
    /// `valueDecimal`
    #[cfg_attr(feature = "serde", serde(rename = "valueDecimal"))]
    Decimal(f64),
    /// `valueCoding`
    #[cfg_attr(feature = "serde", serde(rename = "valueCoding"))]
    Coding(Coding),
}

impl PropertyValue {
    /// Returns the FHIR type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Code(_) => "code",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "dateTime",
            Self::Decimal(_) => "decimal",
            Self::Coding(_) => "Coding",
        }
    }
}

/// String form used when matching filters. A Coding renders as its code.
impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(s) | Self::String(s) | Self::DateTime(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Coding(c) => f.write_str(c.code.as_deref().unwrap_or_default()),
        }
    }
}
