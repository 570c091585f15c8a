//! The operation façade.
//!
//! [`TerminologyEngine`] is stateless: every operation is a pure function of
//! the definitions passed in, so one engine can be shared freely across
//! threads.

use serde::Serialize;
use terminology_types::{
    CodeSystemDefinition, ConceptMapDefinition, ConceptProperty, Designation, ValueSetDefinition,
};

use crate::expand::{Expansion, ValueSetExpander};
use crate::store::CodeSystemResolver;
use crate::subsumes::{SubsumptionOutcome, SubsumptionResolver};
use crate::translate::{ConceptMapTranslator, TranslationMatch};
use crate::tree::ConceptTree;
use crate::types::{ExpansionParams, TerminologyError, TerminologyResult};

/// Result of a code lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptDetails {
    /// Name of the code system.
    pub name: String,
    /// Version of the code system, if it declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The code as stored in the code system.
    pub code: String,
    /// Display text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Formal definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Every designation of the concept.
    #[serde(rename = "designation", skip_serializing_if = "Vec::is_empty")]
    pub designations: Vec<Designation>,
    /// The requested properties that the concept carries.
    #[serde(rename = "property", skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ConceptProperty>,
}

/// Result of a code validation.
///
/// A display mismatch is advisory: it sets `message` but leaves `valid`
/// true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Whether the code was found.
    #[serde(rename = "result")]
    pub valid: bool,
    /// The display the code system or value set holds for the code.
    #[serde(rename = "display", skip_serializing_if = "Option::is_none")]
    pub expected_display: Option<String>,
    /// Why the code is invalid, or a note about a display mismatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    fn not_found(message: String) -> Self {
        Self {
            valid: false,
            expected_display: None,
            message: Some(message),
        }
    }

    fn found(
        expected: Option<&str>,
        given: Option<&str>,
        displays_match: impl Fn(&str, &str) -> bool,
    ) -> Self {
        let message = match (given, expected) {
            (Some(given), Some(expected)) if !displays_match(given, expected) => Some(format!(
                "The display '{}' is not correct. Expected: '{}'",
                given, expected
            )),
            _ => None,
        };
        Self {
            valid: true,
            expected_display: expected.map(str::to_string),
            message,
        }
    }
}

/// Stateless entry point for the terminology operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminologyEngine;

impl TerminologyEngine {
    /// Creates an engine.
    pub fn new() -> Self {
        Self
    }

    /// Looks up a code.
    ///
    /// Properties are only returned when named in `properties`; an empty
    /// list returns none.
    pub fn lookup(
        &self,
        code_system: &CodeSystemDefinition,
        code: &str,
        properties: &[String],
    ) -> TerminologyResult<ConceptDetails> {
        let tree = ConceptTree::new(code_system);
        let concept = tree.find(code).ok_or_else(|| TerminologyError::CodeNotFound {
            system: code_system.url.clone(),
            code: code.to_string(),
        })?;

        let properties = concept
            .properties
            .iter()
            .filter(|p| properties.iter().any(|wanted| *wanted == p.code))
            .cloned()
            .collect();

        Ok(ConceptDetails {
            name: code_system.name.clone(),
            version: code_system.version.clone(),
            code: concept.code.clone(),
            display: concept.display.clone(),
            definition: concept.definition.clone(),
            designations: concept.designations.clone(),
            properties,
        })
    }

    /// Checks that a code exists in a code system, and optionally that
    /// `display` matches the concept's display under the system's
    /// case-sensitivity rule.
    pub fn validate_code(
        &self,
        code_system: &CodeSystemDefinition,
        code: &str,
        display: Option<&str>,
    ) -> ValidationResult {
        let tree = ConceptTree::new(code_system);
        let Some(concept) = tree.find(code) else {
            let err = TerminologyError::CodeNotFound {
                system: code_system.url.clone(),
                code: code.to_string(),
            };
            return ValidationResult::not_found(err.to_string());
        };

        ValidationResult::found(concept.display.as_deref(), display, |given, expected| {
            if code_system.case_sensitive {
                given == expected
            } else {
                given.to_lowercase() == expected.to_lowercase()
            }
        })
    }

    /// Checks that a code is a member of a value set.
    ///
    /// The value set is expanded in full. A member matches on exact code
    /// and, if `system` is given, exact system. Displays are compared
    /// exactly.
    pub fn validate_code_in_value_set<R: CodeSystemResolver + ?Sized>(
        &self,
        value_set: &ValueSetDefinition,
        resolver: &R,
        code: &str,
        system: Option<&str>,
        display: Option<&str>,
    ) -> ValidationResult {
        let members = ValueSetExpander::new(resolver).expand_all(value_set, None);
        let member = members
            .iter()
            .find(|m| m.code == code && system.map_or(true, |s| m.system.as_deref() == Some(s)));

        match member {
            Some(member) => {
                ValidationResult::found(member.display.as_deref(), display, |a, b| a == b)
            }
            None => ValidationResult::not_found(match system {
                Some(system) => format!(
                    "Code {} from system {} not found in value set",
                    code, system
                ),
                None => format!("Code {} not found in value set", code),
            }),
        }
    }

    /// Tests whether `code_a` subsumes `code_b` in a code system.
    pub fn subsumes(
        &self,
        code_system: &CodeSystemDefinition,
        code_a: &str,
        code_b: &str,
    ) -> TerminologyResult<SubsumptionOutcome> {
        let tree = ConceptTree::new(code_system);
        SubsumptionResolver::new(&tree).subsumes(code_a, code_b)
    }

    /// Expands a value set, resolving included code systems through
    /// `resolver`.
    pub fn expand<R: CodeSystemResolver + ?Sized>(
        &self,
        value_set: &ValueSetDefinition,
        resolver: &R,
        params: &ExpansionParams,
    ) -> Expansion {
        ValueSetExpander::new(resolver).expand(value_set, params)
    }

    /// Translates a code through a concept map.
    pub fn translate(
        &self,
        concept_map: &ConceptMapDefinition,
        code: &str,
        source_system: Option<&str>,
        target_system: Option<&str>,
    ) -> TerminologyResult<Vec<TranslationMatch>> {
        ConceptMapTranslator::new(concept_map).translate(source_system, code, target_system)
    }
}
