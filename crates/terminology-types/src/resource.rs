//! Tagged union of the definition resources.

use crate::{CodeSystemDefinition, ConceptMapDefinition, ValueSetDefinition};

/// Any definition resource, discriminated by `resourceType` on the wire.
///
/// # Examples
///
/// ```
/// use terminology_types::{Resource, ValueSetDefinition};
///
/// let resource = Resource::from(ValueSetDefinition::default());
/// assert_eq!(resource.resource_type(), "ValueSet");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "resourceType"))]
pub enum Resource {
    /// A code system.
    CodeSystem(CodeSystemDefinition),
    /// A value set.
    ValueSet(ValueSetDefinition),
    /// A concept map.
    ConceptMap(ConceptMapDefinition),
}

impl Resource {
    /// Returns the `resourceType` name.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::CodeSystem(_) => "CodeSystem",
            Self::ValueSet(_) => "ValueSet",
            Self::ConceptMap(_) => "ConceptMap",
        }
    }

    /// Returns the canonical URL of the wrapped definition.
    pub fn url(&self) -> &str {
        match self {
            Self::CodeSystem(cs) => &cs.url,
            Self::ValueSet(vs) => &vs.url,
            Self::ConceptMap(cm) => &cm.url,
        }
    }
}

impl From<CodeSystemDefinition> for Resource {
    fn from(cs: CodeSystemDefinition) -> Self {
        Self::CodeSystem(cs)
    }
}

impl From<ValueSetDefinition> for Resource {
    fn from(vs: ValueSetDefinition) -> Self {
        Self::ValueSet(vs)
    }
}

impl From<ConceptMapDefinition> for Resource {
    fn from(cm: ConceptMapDefinition) -> Self {
        Self::ConceptMap(cm)
    }
}
