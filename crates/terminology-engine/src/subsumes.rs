//! Structural subsumption between two codes of one code system.

use std::fmt;

use serde::Serialize;

use crate::tree::ConceptTree;
use crate::types::{TerminologyError, TerminologyResult};

/// Outcome of a subsumption test of code A against code B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubsumptionOutcome {
    /// A and B are the same code.
    Equivalent,
    /// A is an ancestor of B.
    Subsumes,
    /// A is a descendant of B.
    SubsumedBy,
    /// Neither contains the other.
    NotSubsumed,
}

impl SubsumptionOutcome {
    /// Returns the outcome code (`equivalent`, `subsumes`, `subsumed-by`,
    /// `not-subsumed`).
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Equivalent => "equivalent",
            Self::Subsumes => "subsumes",
            Self::SubsumedBy => "subsumed-by",
            Self::NotSubsumed => "not-subsumed",
        }
    }

    /// Returns the outcome seen from the other code's side.
    pub fn inverse(self) -> Self {
        match self {
            Self::Subsumes => Self::SubsumedBy,
            Self::SubsumedBy => Self::Subsumes,
            other => other,
        }
    }
}

impl fmt::Display for SubsumptionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Resolves parent/child containment between codes.
///
/// Only nesting in the concept forest counts; a flat code system reports
/// [`SubsumptionOutcome::NotSubsumed`] for any two distinct codes.
#[derive(Debug)]
pub struct SubsumptionResolver<'t, 'a> {
    tree: &'t ConceptTree<'a>,
}

impl<'t, 'a> SubsumptionResolver<'t, 'a> {
    /// Creates a resolver over a concept tree.
    pub fn new(tree: &'t ConceptTree<'a>) -> Self {
        Self { tree }
    }

    /// Tests whether `code_a` subsumes `code_b`.
    ///
    /// Fails with [`TerminologyError::CodeNotFound`] if either code is not
    /// in the code system.
    pub fn subsumes(&self, code_a: &str, code_b: &str) -> TerminologyResult<SubsumptionOutcome> {
        let system = self.tree.system();
        for code in [code_a, code_b] {
            if !self.tree.contains(code) {
                return Err(TerminologyError::CodeNotFound {
                    system: system.url.clone(),
                    code: code.to_string(),
                });
            }
        }

        let outcome = if system.codes_match(code_a, code_b) {
            SubsumptionOutcome::Equivalent
        } else if self.tree.is_descendant(code_a, code_b) {
            SubsumptionOutcome::Subsumes
        } else if self.tree.is_descendant(code_b, code_a) {
            SubsumptionOutcome::SubsumedBy
        } else {
            SubsumptionOutcome::NotSubsumed
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminology_types::{CodeSystemDefinition, Concept};

    fn make_test_system(case_sensitive: bool) -> CodeSystemDefinition {
        let mut beta = Concept::new("A2", "Beta");
        beta.children.push(Concept::new("A2a", "Beta Child"));
        CodeSystemDefinition {
            url: "http://ex/cs".to_string(),
            case_sensitive,
            concept: vec![Concept::new("A1", "Alpha"), beta],
            ..Default::default()
        }
    }

    #[test]
    fn test_subsumption_outcomes() {
        let cs = make_test_system(true);
        let tree = ConceptTree::new(&cs);
        let resolver = SubsumptionResolver::new(&tree);

        assert_eq!(resolver.subsumes("A2", "A2a"), Ok(SubsumptionOutcome::Subsumes));
        assert_eq!(resolver.subsumes("A2a", "A2"), Ok(SubsumptionOutcome::SubsumedBy));
        assert_eq!(resolver.subsumes("A1", "A2"), Ok(SubsumptionOutcome::NotSubsumed));
        assert_eq!(resolver.subsumes("A1", "A1"), Ok(SubsumptionOutcome::Equivalent));
    }

    #[test]
    fn test_subsumption_is_antisymmetric() {
        let cs = make_test_system(true);
        let tree = ConceptTree::new(&cs);
        let resolver = SubsumptionResolver::new(&tree);

        let codes = ["A1", "A2", "A2a"];
        for a in codes {
            for b in codes {
                let forward = resolver.subsumes(a, b).unwrap();
                let backward = resolver.subsumes(b, a).unwrap();
                assert_eq!(forward.inverse(), backward, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_case_insensitive_equivalence() {
        let cs = make_test_system(false);
        let tree = ConceptTree::new(&cs);
        let resolver = SubsumptionResolver::new(&tree);

        assert_eq!(resolver.subsumes("a1", "A1"), Ok(SubsumptionOutcome::Equivalent));
        assert_eq!(resolver.subsumes("a2", "A2A"), Ok(SubsumptionOutcome::Subsumes));
    }

    #[test]
    fn test_unknown_code_fails() {
        let cs = make_test_system(true);
        let tree = ConceptTree::new(&cs);
        let resolver = SubsumptionResolver::new(&tree);

        assert_eq!(
            resolver.subsumes("A1", "Q"),
            Err(TerminologyError::CodeNotFound {
                system: "http://ex/cs".to_string(),
                code: "Q".to_string(),
            })
        );
        assert!(resolver.subsumes("Q", "Q").is_err());
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(SubsumptionOutcome::SubsumedBy.as_code(), "subsumed-by");
        assert_eq!(SubsumptionOutcome::NotSubsumed.to_string(), "not-subsumed");
        assert_eq!(
            serde_json::to_string(&SubsumptionOutcome::SubsumedBy).unwrap(),
            "\"subsumed-by\""
        );
    }
}
