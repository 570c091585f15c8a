//! Value set expansion.
//!
//! Include rules are processed in declaration order. Each rule contributes
//! either its explicit concept list, the filtered concepts of its code
//! system, or every concept of its code system, always in the system's
//! pre-order. The optional text filter is applied to each rule's output and
//! the results are concatenated; pagination slices the concatenation.
//!
//! Exclude rules are not subtracted. An include whose code system cannot be
//! resolved contributes nothing.

use serde::Serialize;
use terminology_types::{
    CodeSystemDefinition, Concept, Designation, Include, IncludeConcept, IncludeRule,
    ValueSetDefinition,
};

use crate::filter::FilterEvaluator;
use crate::store::CodeSystemResolver;
use crate::tree::ConceptTree;
use crate::types::ExpansionParams;

/// One member of a value set expansion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedConcept {
    /// Code system the code belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The code.
    pub code: String,
    /// Display text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Designations carried over from the concept or include entry.
    #[serde(rename = "designation", skip_serializing_if = "Vec::is_empty")]
    pub designations: Vec<Designation>,
}

impl ExpandedConcept {
    fn from_include(system: Option<&str>, concept: &IncludeConcept) -> Self {
        Self {
            system: system.map(str::to_string),
            code: concept.code.clone(),
            display: concept.display.clone(),
            designations: concept.designations.clone(),
        }
    }

    fn from_concept(system: Option<&str>, concept: &Concept) -> Self {
        Self {
            system: system.map(str::to_string),
            code: concept.code.clone(),
            display: concept.display.clone(),
            designations: concept.designations.clone(),
        }
    }

    /// Returns true if the code or display contains `needle` (already
    /// lowercased) as a substring, ignoring case.
    fn matches_text(&self, needle: &str) -> bool {
        self.code.to_lowercase().contains(needle)
            || self
                .display
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// A page of an expansion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expansion {
    /// Size of the full expansion before pagination.
    pub total: usize,
    /// Offset the page starts at.
    pub offset: usize,
    /// The page of members.
    pub contains: Vec<ExpandedConcept>,
}

/// Expands value sets against code systems supplied by a resolver.
pub struct ValueSetExpander<'r, R: CodeSystemResolver + ?Sized> {
    resolver: &'r R,
}

impl<'r, R: CodeSystemResolver + ?Sized> ValueSetExpander<'r, R> {
    /// Creates an expander that resolves include systems through `resolver`.
    pub fn new(resolver: &'r R) -> Self {
        Self { resolver }
    }

    /// Expands a value set and returns one page of it.
    pub fn expand(&self, value_set: &ValueSetDefinition, params: &ExpansionParams) -> Expansion {
        let all = self.expand_all(value_set, params.text_filter());
        let total = all.len();
        let contains: Vec<ExpandedConcept> = all
            .into_iter()
            .skip(params.offset)
            .take(params.count.unwrap_or(usize::MAX))
            .collect();

        tracing::debug!(
            value_set = %value_set.url,
            total,
            offset = params.offset,
            returned = contains.len(),
            "Expanded value set"
        );

        Expansion {
            total,
            offset: params.offset,
            contains,
        }
    }

    /// Returns the full, unpaginated expansion, optionally text-filtered.
    pub fn expand_all(
        &self,
        value_set: &ValueSetDefinition,
        filter_text: Option<&str>,
    ) -> Vec<ExpandedConcept> {
        let needle = filter_text.filter(|f| !f.is_empty()).map(str::to_lowercase);
        let mut out = Vec::new();

        for include in value_set.includes() {
            let mut concepts = self.expand_include(include);
            if let Some(needle) = needle.as_deref() {
                concepts.retain(|c| c.matches_text(needle));
            }
            out.extend(concepts);
        }

        out
    }

    fn expand_include(&self, include: &Include) -> Vec<ExpandedConcept> {
        let system = include.system.as_deref();

        match include.rule() {
            IncludeRule::Concepts(concepts) => concepts
                .iter()
                .map(|c| ExpandedConcept::from_include(system, c))
                .collect(),
            IncludeRule::Filters(filters) => {
                let Some(code_system) = self.resolve(include) else {
                    return Vec::new();
                };
                let tree = ConceptTree::new(code_system);
                let evaluator = FilterEvaluator::new(filters);
                tree.flatten()
                    .iter()
                    .filter(|c| evaluator.matches(c))
                    .map(|c| ExpandedConcept::from_concept(system, c))
                    .collect()
            }
            IncludeRule::WholeSystem => {
                let Some(code_system) = self.resolve(include) else {
                    return Vec::new();
                };
                ConceptTree::new(code_system)
                    .flatten()
                    .iter()
                    .map(|c| ExpandedConcept::from_concept(system, c))
                    .collect()
            }
        }
    }

    fn resolve(&self, include: &Include) -> Option<&'r CodeSystemDefinition> {
        let url = include.system.as_deref()?;
        let resolved = self.resolver.code_system(url, include.version.as_deref());
        if resolved.is_none() {
            tracing::debug!(
                system = url,
                version = include.version.as_deref().unwrap_or(""),
                "Included code system not found, include contributes no concepts"
            );
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminology_types::{Compose, Filter, FilterOperator};

    fn make_test_system() -> CodeSystemDefinition {
        let mut beta = Concept::new("A2", "Beta");
        beta.children.push(Concept::new("A2a", "Beta Child"));
        CodeSystemDefinition {
            url: "http://ex/cs".to_string(),
            concept: vec![Concept::new("A1", "Alpha"), beta, Concept::new("A3", "Gamma")],
            ..Default::default()
        }
    }

    fn make_test_value_set(include: Vec<Include>) -> ValueSetDefinition {
        ValueSetDefinition {
            url: "http://ex/vs".to_string(),
            compose: Some(Compose {
                include,
                exclude: Vec::new(),
            }),
            ..Default::default()
        }
    }

    fn codes(concepts: &[ExpandedConcept]) -> Vec<&str> {
        concepts.iter().map(|c| c.code.as_str()).collect()
    }

    #[test]
    fn test_filter_include_on_code() {
        let systems = vec![make_test_system()];
        let vs = make_test_value_set(vec![Include::filtered(
            "http://ex/cs",
            vec![Filter::new("code", FilterOperator::Equals, "A1")],
        )]);

        let expansion = ValueSetExpander::new(&systems).expand(&vs, &ExpansionParams::all());
        assert_eq!(expansion.total, 1);
        assert_eq!(codes(&expansion.contains), vec!["A1"]);
        assert_eq!(expansion.contains[0].system.as_deref(), Some("http://ex/cs"));
    }

    #[test]
    fn test_whole_system_include_in_preorder() {
        let systems = vec![make_test_system()];
        let vs = make_test_value_set(vec![Include::whole_system("http://ex/cs")]);

        let all = ValueSetExpander::new(&systems).expand_all(&vs, None);
        assert_eq!(codes(&all), vec!["A1", "A2", "A2a", "A3"]);
        assert_eq!(all[2].display.as_deref(), Some("Beta Child"));
    }

    #[test]
    fn test_includes_concatenate_in_declaration_order() {
        let systems = vec![make_test_system()];
        let vs = make_test_value_set(vec![
            Include::concepts("http://ex/other", vec![IncludeConcept::new("Z9", "Zed")]),
            Include::filtered(
                "http://ex/cs",
                vec![Filter::new("code", FilterOperator::Regex, "^A2")],
            ),
        ]);

        let all = ValueSetExpander::new(&systems).expand_all(&vs, None);
        assert_eq!(codes(&all), vec!["Z9", "A2", "A2a"]);
        assert_eq!(all[0].system.as_deref(), Some("http://ex/other"));
    }

    #[test]
    fn test_text_filter_is_case_insensitive_on_code_or_display() {
        let systems = vec![make_test_system()];
        let vs = make_test_value_set(vec![Include::whole_system("http://ex/cs")]);
        let expander = ValueSetExpander::new(&systems);

        assert_eq!(codes(&expander.expand_all(&vs, Some("BETA"))), vec!["A2", "A2a"]);
        assert_eq!(codes(&expander.expand_all(&vs, Some("a3"))), vec!["A3"]);
        assert_eq!(expander.expand_all(&vs, Some("")).len(), 4);
    }

    #[test]
    fn test_missing_system_contributes_nothing() {
        let systems = vec![make_test_system()];
        let vs = make_test_value_set(vec![
            Include::whole_system("http://ex/missing"),
            Include::filtered(
                "http://ex/missing",
                vec![Filter::new("code", FilterOperator::Equals, "A1")],
            ),
            Include::whole_system("http://ex/cs"),
        ]);

        let all = ValueSetExpander::new(&systems).expand_all(&vs, None);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_excludes_are_not_applied() {
        let systems = vec![make_test_system()];
        let mut vs = make_test_value_set(vec![Include::whole_system("http://ex/cs")]);
        if let Some(compose) = vs.compose.as_mut() {
            compose
                .exclude
                .push(Include::concepts("http://ex/cs", vec![IncludeConcept::new("A1", "Alpha")]));
        }

        let all = ValueSetExpander::new(&systems).expand_all(&vs, None);
        assert!(all.iter().any(|c| c.code == "A1"));
    }

    #[test]
    fn test_pagination_slices_full_expansion() {
        let systems = vec![make_test_system()];
        let vs = make_test_value_set(vec![Include::whole_system("http://ex/cs")]);
        let expander = ValueSetExpander::new(&systems);
        let full = expander.expand_all(&vs, None);

        for offset in 0..=5 {
            for count in 0..=5 {
                let params = ExpansionParams {
                    filter: None,
                    offset,
                    count: Some(count),
                };
                let page = expander.expand(&vs, &params);
                let end = (offset + count).min(full.len());
                let start = offset.min(full.len());
                assert_eq!(page.total, full.len());
                assert_eq!(page.contains, full[start..end].to_vec());
            }
        }

        let params = ExpansionParams {
            offset: 1,
            ..Default::default()
        };
        assert_eq!(expander.expand(&vs, &params).contains, full[1..].to_vec());
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let systems = vec![make_test_system()];
        let vs = make_test_value_set(vec![
            Include::whole_system("http://ex/cs"),
            Include::concepts("http://ex/cs", vec![IncludeConcept::new("A1", "Alpha")]),
        ]);
        let expander = ValueSetExpander::new(&systems);
        assert_eq!(
            expander.expand(&vs, &ExpansionParams::all()),
            expander.expand(&vs, &ExpansionParams::all())
        );
    }

    #[test]
    fn test_value_set_without_compose_is_empty() {
        let systems: Vec<CodeSystemDefinition> = Vec::new();
        let vs = ValueSetDefinition::default();
        let expansion = ValueSetExpander::new(&systems).expand(&vs, &ExpansionParams::all());
        assert_eq!(expansion.total, 0);
        assert!(expansion.contains.is_empty());
    }
}
