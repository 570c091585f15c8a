//! # terminology-types
//!
//! Type definitions for clinical terminology resources.
//!
//! This crate provides Rust type definitions for the three definition
//! resources a terminology engine resolves queries against: code systems
//! (hierarchical vocabularies), value sets (rule-based or enumerated subsets
//! of codes) and concept maps (cross-vocabulary translation tables).
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde,
//!   using the FHIR JSON field names (`caseSensitive`, `valueCode`, ...).
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use terminology_types::{CodeSystemDefinition, Concept};
//!
//! let mut parent = Concept::new("A2", "Beta");
//! parent.children.push(Concept::new("A2a", "Beta Child"));
//!
//! let cs = CodeSystemDefinition {
//!     url: "http://ex/cs".to_string(),
//!     concept: vec![Concept::new("A1", "Alpha"), parent],
//!     ..Default::default()
//! };
//!
//! assert!(cs.case_sensitive);
//! assert_eq!(cs.concept_count(), 3);
//! ```
//!
//! ## Without Serde
//!
//! ```toml
//! [dependencies]
//! terminology-types = { version = "0.1", default-features = false }
//! ```

#![warn(missing_docs)]

mod code_system;
mod concept_map;
mod enums;
mod resource;
mod value_set;

// Re-export all public types at crate root
pub use code_system::{
    CodeSystemDefinition, Coding, Concept, ConceptProperty, Designation, PropertyValue,
};
pub use concept_map::{ConceptMapDefinition, Element, Group, Target};
pub use enums::{ConceptMapRelationship, FilterOperator, PublicationStatus};
pub use resource::Resource;
pub use value_set::{Compose, Filter, Include, IncludeConcept, IncludeRule, ValueSetDefinition};
