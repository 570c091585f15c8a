//! # terminology-engine
//!
//! Query engine over code systems, value sets and concept maps.
//!
//! The engine answers six questions against caller-supplied definitions:
//! what a code means (`lookup`), whether a code exists in a code system or
//! value set (`validate_code`, `validate_code_in_value_set`), whether one
//! code subsumes another (`subsumes`), what codes a value set contains
//! (`expand`), and what a code maps to in another system (`translate`).
//!
//! Every operation is a pure function of its inputs. Definitions come from
//! a [`DefinitionStore`]; [`InMemoryStore`] loads them from a directory of
//! JSON files.
//!
//! ## Features
//!
//! - `parallel` (default): parse definition files in parallel with rayon.
//!
//! ## Usage
//!
//! ```ignore
//! use terminology_engine::{CodeSystemResolver, InMemoryStore, LoadConfig, TerminologyEngine};
//!
//! let mut store = InMemoryStore::new();
//! store.load_dir("./data", &LoadConfig::default())?;
//!
//! let cs = store.code_system("http://example.org/cs", None).unwrap();
//! let result = TerminologyEngine::new().validate_code(cs, "A1", Some("Alpha"));
//! assert!(result.valid);
//! ```

#![warn(missing_docs)]

mod engine;
mod expand;
mod filter;
mod loader;
mod store;
mod subsumes;
mod translate;
mod tree;
mod types;

pub use engine::{ConceptDetails, TerminologyEngine, ValidationResult};
pub use expand::{ExpandedConcept, Expansion, ValueSetExpander};
pub use filter::{apply_filters, FilterEvaluator};
pub use loader::{discover_definition_files, parse_definition_file, parse_definitions};
pub use store::{CodeSystemResolver, DefinitionStore, InMemoryStore};
pub use subsumes::{SubsumptionOutcome, SubsumptionResolver};
pub use translate::{has_usable_match, ConceptMapTranslator, TranslationMatch};
pub use tree::ConceptTree;
pub use types::{
    DefinitionKind, ExpansionParams, LoadConfig, LoadError, LoadResult, LoadStats, TerminologyError,
    TerminologyResult,
};

// Re-export terminology-types for convenience
pub use terminology_types;
