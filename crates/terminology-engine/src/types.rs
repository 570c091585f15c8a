//! Engine-specific error, result and configuration types.

use std::fmt;

use thiserror::Error;

/// Which kind of definition a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum DefinitionKind {
    /// A code system.
    CodeSystem,
    /// A value set.
    ValueSet,
    /// A concept map.
    ConceptMap,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CodeSystem => "CodeSystem",
            Self::ValueSet => "ValueSet",
            Self::ConceptMap => "ConceptMap",
        })
    }
}

/// Failures returned by terminology operations.
///
/// All failures are values; the engine performs no I/O and never retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerminologyError {
    /// A code system, value set or concept map could not be resolved.
    #[error("{kind} not found: {identifier}")]
    DefinitionNotFound {
        /// Kind of definition.
        kind: DefinitionKind,
        /// The URL or id that was looked up.
        identifier: String,
    },

    /// The code does not exist in the referenced code system.
    #[error("Code {code} not found in system {system}")]
    CodeNotFound {
        /// The code system URL.
        system: String,
        /// The code that was not found.
        code: String,
    },

    /// No concept map element matches the source code.
    #[error("No translation found for code {code}")]
    TranslationNotFound {
        /// The source code.
        code: String,
        /// The source system, if one was given.
        system: Option<String>,
    },

    /// A structurally required parameter was missing.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for terminology operations.
pub type TerminologyResult<T> = Result<T, TerminologyError>;

/// Errors that can occur while loading definition files.
#[derive(Error, Debug)]
pub enum LoadError {
    /// I/O error reading a definition file.
    #[error("IO error reading definition file: {0}")]
    Io(#[from] std::io::Error),

    /// A file did not contain valid definition JSON.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// The offending file.
        path: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A definition parsed but cannot be stored.
    #[error("Invalid definition in {path}: {reason}")]
    InvalidDefinition {
        /// The offending file.
        path: String,
        /// Why the definition was rejected.
        reason: String,
    },
}

/// Result type for definition loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Configuration for loading a definition directory.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Skip malformed files with a warning instead of failing the load.
    pub skip_invalid: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self { skip_invalid: true }
    }
}

impl LoadConfig {
    /// Creates a config that aborts on the first malformed file.
    pub fn strict() -> Self {
        Self {
            skip_invalid: false,
        }
    }
}

/// Statistics from loading a definition directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Definition files read.
    pub files: usize,
    /// Code systems stored.
    pub code_systems: usize,
    /// Value sets stored.
    pub value_sets: usize,
    /// Concept maps stored.
    pub concept_maps: usize,
    /// Files skipped because they could not be parsed or stored.
    pub skipped_files: usize,
}

impl LoadStats {
    /// Total number of definitions stored.
    pub fn total_definitions(&self) -> usize {
        self.code_systems + self.value_sets + self.concept_maps
    }
}

/// Text filter and pagination for an expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionParams {
    /// Case-insensitive substring matched against code or display.
    pub filter: Option<String>,
    /// Index of the first entry to return.
    pub offset: usize,
    /// Maximum entries to return; `None` returns everything from `offset`.
    pub count: Option<usize>,
}

impl ExpansionParams {
    /// Parameters for a full, unfiltered, unpaginated expansion.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns the text filter if it is non-empty.
    pub fn text_filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        assert!(LoadConfig::default().skip_invalid);
        assert!(!LoadConfig::strict().skip_invalid);
    }

    #[test]
    fn test_error_messages() {
        let err = TerminologyError::DefinitionNotFound {
            kind: DefinitionKind::ValueSet,
            identifier: "http://ex/vs".to_string(),
        };
        assert_eq!(err.to_string(), "ValueSet not found: http://ex/vs");

        let err = TerminologyError::CodeNotFound {
            system: "http://ex/cs".to_string(),
            code: "Q".to_string(),
        };
        assert_eq!(err.to_string(), "Code Q not found in system http://ex/cs");
    }

    #[test]
    fn test_empty_text_filter_is_ignored() {
        let params = ExpansionParams {
            filter: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(params.text_filter(), None);
        assert_eq!(ExpansionParams::all().text_filter(), None);
    }

    #[test]
    fn test_load_stats_total() {
        let stats = LoadStats {
            code_systems: 2,
            value_sets: 3,
            concept_maps: 1,
            ..Default::default()
        };
        assert_eq!(stats.total_definitions(), 6);
    }
}
