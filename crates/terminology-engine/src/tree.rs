//! Concept forest view with code lookup and descendant queries.
//!
//! [`ConceptTree`] borrows a [`CodeSystemDefinition`] and flattens its forest
//! once, in pre-order, building a code index on the way. Lookups after
//! construction are O(1); descendant checks walk only the ancestor's own
//! subtree.
//!
//! ```ignore
//! let tree = ConceptTree::new(&code_system);
//! let concept = tree.find("A2a");
//! let is_child = tree.is_descendant("A2", "A2a");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use terminology_types::{CodeSystemDefinition, Concept};

/// Read-only view of one code system's concept forest.
pub struct ConceptTree<'a> {
    system: &'a CodeSystemDefinition,
    /// Every concept in pre-order (parent before its children, children
    /// before the parent's next sibling).
    flat: Vec<&'a Concept>,
    /// Code (case-folded when the system is case-insensitive) to position in
    /// `flat` of its first pre-order occurrence.
    index: HashMap<Cow<'a, str>, usize>,
}

impl std::fmt::Debug for ConceptTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConceptTree")
            .field("system", &self.system.url)
            .field("concepts", &self.flat.len())
            .field("case_sensitive", &self.system.case_sensitive)
            .finish()
    }
}

impl<'a> ConceptTree<'a> {
    /// Builds the view. O(n) in the number of concepts.
    pub fn new(system: &'a CodeSystemDefinition) -> Self {
        let flat = preorder(&system.concept);
        let mut index = HashMap::with_capacity(flat.len());

        for (pos, &concept) in flat.iter().enumerate() {
            index.entry(system.fold_code(&concept.code)).or_insert(pos);
        }

        Self {
            system,
            flat,
            index,
        }
    }

    /// Returns the code system this tree was built from.
    pub fn system(&self) -> &'a CodeSystemDefinition {
        self.system
    }

    /// Finds the first concept in pre-order whose code matches under the
    /// system's case-sensitivity rule.
    pub fn find(&self, code: &str) -> Option<&'a Concept> {
        self.index
            .get(&*self.system.fold_code(code))
            .map(|&pos| self.flat[pos])
    }

    /// Returns true if the code exists anywhere in the forest.
    pub fn contains(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    /// Returns every concept, nested ones included, in pre-order.
    pub fn flatten(&self) -> &[&'a Concept] {
        &self.flat
    }

    /// Number of concepts in the forest.
    pub fn len(&self) -> usize {
        self.flat.len()
    }

    /// Returns true if the forest has no concepts.
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Returns true if `descendant` is nested, at any depth, under
    /// `ancestor`'s own children. A code is never its own descendant.
    pub fn is_descendant(&self, ancestor: &str, descendant: &str) -> bool {
        let Some(parent) = self.find(ancestor) else {
            return false;
        };
        preorder(&parent.children)
            .into_iter()
            .any(|c| self.system.codes_match(&c.code, descendant))
    }

    /// Returns all descendants of a code in pre-order, or an empty list if
    /// the code is unknown.
    pub fn descendants(&self, code: &str) -> Vec<&'a Concept> {
        self.find(code)
            .map(|c| preorder(&c.children))
            .unwrap_or_default()
    }
}

/// Flattens a concept forest in pre-order without recursion.
fn preorder(roots: &[Concept]) -> Vec<&Concept> {
    let mut out = Vec::new();
    let mut stack = vec![roots.iter()];

    while let Some(siblings) = stack.last_mut() {
        let Some(concept) = siblings.next() else {
            stack.pop();
            continue;
        };
        out.push(concept);
        if concept.has_children() {
            stack.push(concept.children.iter());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_concept(code: &str, children: Vec<Concept>) -> Concept {
        Concept {
            children,
            ..Concept::new(code, format!("Display {}", code))
        }
    }

    fn make_test_system(case_sensitive: bool) -> CodeSystemDefinition {
        // A1
        // A2
        //   A2a
        //     A2a1
        //   A2b
        // A3
        CodeSystemDefinition {
            url: "http://ex/cs".to_string(),
            case_sensitive,
            concept: vec![
                make_test_concept("A1", vec![]),
                make_test_concept(
                    "A2",
                    vec![
                        make_test_concept("A2a", vec![make_test_concept("A2a1", vec![])]),
                        make_test_concept("A2b", vec![]),
                    ],
                ),
                make_test_concept("A3", vec![]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_flatten_is_preorder() {
        let cs = make_test_system(true);
        let tree = ConceptTree::new(&cs);
        let codes: Vec<&str> = tree.flatten().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["A1", "A2", "A2a", "A2a1", "A2b", "A3"]);
        assert_eq!(tree.len(), cs.concept_count());
    }

    #[test]
    fn test_find_every_flattened_code() {
        let cs = make_test_system(true);
        let tree = ConceptTree::new(&cs);
        for concept in tree.flatten() {
            assert_eq!(tree.find(&concept.code).unwrap().code, concept.code);
        }
        assert!(tree.find("ZZ").is_none());
    }

    #[test]
    fn test_find_case_sensitivity() {
        let sensitive = make_test_system(true);
        let tree = ConceptTree::new(&sensitive);
        assert!(tree.find("a2a").is_none());

        let insensitive = make_test_system(false);
        let tree = ConceptTree::new(&insensitive);
        assert_eq!(tree.find("a2a").unwrap().code, "A2a");
    }

    #[test]
    fn test_find_returns_first_preorder_match() {
        let mut first = make_test_concept("DUP", vec![]);
        first.display = Some("first".to_string());
        let mut second = make_test_concept("dup", vec![]);
        second.display = Some("second".to_string());
        let cs = CodeSystemDefinition {
            case_sensitive: false,
            concept: vec![make_test_concept("P", vec![first]), second],
            ..Default::default()
        };

        let tree = ConceptTree::new(&cs);
        assert_eq!(tree.find("Dup").unwrap().display.as_deref(), Some("first"));
    }

    #[test]
    fn test_is_descendant() {
        let cs = make_test_system(true);
        let tree = ConceptTree::new(&cs);

        assert!(tree.is_descendant("A2", "A2a"));
        assert!(tree.is_descendant("A2", "A2a1"));
        assert!(!tree.is_descendant("A2a", "A2"));
        assert!(!tree.is_descendant("A2a", "A2b"));
        assert!(!tree.is_descendant("A1", "A2a"));
        assert!(!tree.is_descendant("missing", "A2a"));
    }

    #[test]
    fn test_code_is_never_its_own_descendant() {
        let cs = make_test_system(true);
        let tree = ConceptTree::new(&cs);
        for concept in tree.flatten() {
            assert!(!tree.is_descendant(&concept.code, &concept.code));
        }
    }

    #[test]
    fn test_descendants() {
        let cs = make_test_system(false);
        let tree = ConceptTree::new(&cs);
        let codes: Vec<&str> = tree.descendants("a2").iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["A2a", "A2a1", "A2b"]);
        assert!(tree.descendants("A1").is_empty());
        assert!(tree.descendants("nope").is_empty());
    }

    #[test]
    fn test_empty_system() {
        let cs = CodeSystemDefinition::default();
        let tree = ConceptTree::new(&cs);
        assert!(tree.is_empty());
        assert!(!tree.contains("A1"));
    }
}
