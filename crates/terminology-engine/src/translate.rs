//! Code translation through a concept map.
//!
//! Groups are searched in order, skipping any whose source or target system
//! conflicts with the requested one. The first element whose code equals the
//! source code and that declares at least one target wins; its targets are
//! returned as matches and the search stops there.

use serde::Serialize;
use terminology_types::{ConceptMapDefinition, ConceptMapRelationship, Group, Target};

use crate::types::{TerminologyError, TerminologyResult};

/// One translation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationMatch {
    /// Target system (the matched group's target).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Target code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Target display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Relationship of the target to the source code.
    pub relationship: ConceptMapRelationship,
}

impl TranslationMatch {
    fn new(group: &Group, target: &Target) -> Self {
        Self {
            system: group.target.clone(),
            code: target.code.clone(),
            display: target.display.clone(),
            relationship: target.relationship,
        }
    }
}

/// Returns true when at least one match is usable, i.e. not `unmatched`
/// or `disjoint`.
pub fn has_usable_match(matches: &[TranslationMatch]) -> bool {
    matches.iter().any(|m| m.relationship.is_match())
}

/// Translates codes using a single concept map.
#[derive(Debug, Clone, Copy)]
pub struct ConceptMapTranslator<'m> {
    map: &'m ConceptMapDefinition,
}

impl<'m> ConceptMapTranslator<'m> {
    /// Creates a translator over a concept map.
    pub fn new(map: &'m ConceptMapDefinition) -> Self {
        Self { map }
    }

    /// Translates `code`, optionally restricted to groups with the given
    /// source and target systems.
    ///
    /// Fails with [`TerminologyError::TranslationNotFound`] if no eligible
    /// group has an element for the code.
    pub fn translate(
        &self,
        source_system: Option<&str>,
        code: &str,
        target_system: Option<&str>,
    ) -> TerminologyResult<Vec<TranslationMatch>> {
        for group in self.eligible_groups(source_system, target_system) {
            let element = group
                .element
                .iter()
                .find(|e| e.code.as_deref() == Some(code) && !e.target.is_empty());

            if let Some(element) = element {
                tracing::debug!(
                    concept_map = %self.map.url,
                    code,
                    targets = element.target.len(),
                    "Translated code"
                );
                return Ok(element
                    .target
                    .iter()
                    .map(|t| TranslationMatch::new(group, t))
                    .collect());
            }
        }

        Err(TerminologyError::TranslationNotFound {
            code: code.to_string(),
            system: source_system.map(str::to_string),
        })
    }

    fn eligible_groups<'s>(
        &self,
        source_system: Option<&'s str>,
        target_system: Option<&'s str>,
    ) -> impl Iterator<Item = &'m Group> + 's
    where
        'm: 's,
    {
        self.map.group.iter().filter(move |group| {
            system_allows(group.source.as_deref(), source_system)
                && system_allows(group.target.as_deref(), target_system)
        })
    }
}

/// A group system conflicts with a requested system only when both are set
/// and differ.
fn system_allows(group_system: Option<&str>, requested: Option<&str>) -> bool {
    match (group_system, requested) {
        (Some(declared), Some(wanted)) => declared == wanted,
        _ => true,
    }
}
