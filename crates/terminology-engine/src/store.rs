//! In-memory definition store.
//!
//! The engine never fetches definitions itself. Operations that need code
//! systems at expansion time take a [`CodeSystemResolver`]; the request layer
//! resolves value sets and concept maps through a [`DefinitionStore`].
//!
//! ```ignore
//! let mut store = InMemoryStore::new();
//! let stats = store.load_dir("./data", &LoadConfig::default())?;
//!
//! let cs = store.code_system("http://example.org/cs", None);
//! let vs = store.value_set_by_id("my-value-set");
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use terminology_types::{CodeSystemDefinition, ConceptMapDefinition, Resource, ValueSetDefinition};

use crate::loader::{discover_definition_files, parse_definition_file};
use crate::types::{LoadConfig, LoadResult, LoadStats};

/// Supplies code systems by canonical URL and optional version.
pub trait CodeSystemResolver {
    /// Returns the code system with this URL. Without a version, the first
    /// registered version is returned.
    fn code_system(&self, url: &str, version: Option<&str>) -> Option<&CodeSystemDefinition>;
}

/// Supplies every kind of definition. Absent definitions are `None`.
pub trait DefinitionStore: CodeSystemResolver {
    /// Returns the value set with this canonical URL.
    fn value_set_by_url(&self, url: &str) -> Option<&ValueSetDefinition>;
    /// Returns the value set with this logical id.
    fn value_set_by_id(&self, id: &str) -> Option<&ValueSetDefinition>;
    /// Returns the concept map with this canonical URL.
    fn concept_map_by_url(&self, url: &str) -> Option<&ConceptMapDefinition>;
    /// Returns the concept map with this logical id.
    fn concept_map_by_id(&self, id: &str) -> Option<&ConceptMapDefinition>;
}

fn version_matches(cs: &CodeSystemDefinition, version: Option<&str>) -> bool {
    version.map_or(true, |v| cs.version.as_deref() == Some(v))
}

impl CodeSystemResolver for [CodeSystemDefinition] {
    fn code_system(&self, url: &str, version: Option<&str>) -> Option<&CodeSystemDefinition> {
        self.iter()
            .find(|cs| cs.url == url && version_matches(cs, version))
    }
}

impl CodeSystemResolver for Vec<CodeSystemDefinition> {
    fn code_system(&self, url: &str, version: Option<&str>) -> Option<&CodeSystemDefinition> {
        self.as_slice().code_system(url, version)
    }
}

impl<R: CodeSystemResolver + ?Sized> CodeSystemResolver for &R {
    fn code_system(&self, url: &str, version: Option<&str>) -> Option<&CodeSystemDefinition> {
        (**self).code_system(url, version)
    }
}

/// HashMap-indexed store of definitions.
///
/// Code systems sharing a URL are kept per version in insertion order.
/// Value sets and concept maps are keyed by URL; inserting one with a URL
/// already present replaces the earlier definition.
#[derive(Default)]
pub struct InMemoryStore {
    /// Code systems by URL, one entry per version.
    code_systems: HashMap<String, Vec<CodeSystemDefinition>>,
    /// Value sets by URL.
    value_sets: HashMap<String, ValueSetDefinition>,
    /// Value set id to URL.
    value_set_ids: HashMap<String, String>,
    /// Concept maps by URL.
    concept_maps: HashMap<String, ConceptMapDefinition>,
    /// Concept map id to URL.
    concept_map_ids: HashMap<String, String>,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("code_systems", &self.code_system_count())
            .field("value_sets", &self.value_sets.len())
            .field("concept_maps", &self.concept_maps.len())
            .finish()
    }
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a code system. A definition with the same URL and version as an
    /// existing one replaces it in place.
    pub fn insert_code_system(&mut self, code_system: CodeSystemDefinition) {
        let versions = self.code_systems.entry(code_system.url.clone()).or_default();
        match versions
            .iter_mut()
            .find(|cs| cs.version == code_system.version)
        {
            Some(existing) => *existing = code_system,
            None => versions.push(code_system),
        }
    }

    /// Adds a value set, indexing it by URL and, if present, by id.
    pub fn insert_value_set(&mut self, value_set: ValueSetDefinition) {
        if let Some(id) = &value_set.id {
            self.value_set_ids.insert(id.clone(), value_set.url.clone());
        }
        self.value_sets.insert(value_set.url.clone(), value_set);
    }

    /// Adds a concept map, indexing it by URL and, if present, by id.
    pub fn insert_concept_map(&mut self, concept_map: ConceptMapDefinition) {
        if let Some(id) = &concept_map.id {
            self.concept_map_ids.insert(id.clone(), concept_map.url.clone());
        }
        self.concept_maps.insert(concept_map.url.clone(), concept_map);
    }

    /// Adds code systems in bulk.
    pub fn insert_code_systems(
        &mut self,
        code_systems: impl IntoIterator<Item = CodeSystemDefinition>,
    ) {
        for cs in code_systems {
            self.insert_code_system(cs);
        }
    }

    /// Adds value sets in bulk.
    pub fn insert_value_sets(&mut self, value_sets: impl IntoIterator<Item = ValueSetDefinition>) {
        for vs in value_sets {
            self.insert_value_set(vs);
        }
    }

    /// Adds concept maps in bulk.
    pub fn insert_concept_maps(
        &mut self,
        concept_maps: impl IntoIterator<Item = ConceptMapDefinition>,
    ) {
        for cm in concept_maps {
            self.insert_concept_map(cm);
        }
    }

    /// Adds resources of any kind, updating the per-kind counters in `stats`.
    pub fn insert_resources(
        &mut self,
        resources: impl IntoIterator<Item = Resource>,
        stats: &mut LoadStats,
    ) {
        for resource in resources {
            match resource {
                Resource::CodeSystem(cs) => {
                    self.insert_code_system(cs);
                    stats.code_systems += 1;
                }
                Resource::ValueSet(vs) => {
                    self.insert_value_set(vs);
                    stats.value_sets += 1;
                }
                Resource::ConceptMap(cm) => {
                    self.insert_concept_map(cm);
                    stats.concept_maps += 1;
                }
            }
        }
    }

    /// Returns the number of stored code systems, counting each version.
    pub fn code_system_count(&self) -> usize {
        self.code_systems.values().map(Vec::len).sum()
    }

    /// Returns the number of stored value sets.
    pub fn value_set_count(&self) -> usize {
        self.value_sets.len()
    }

    /// Returns the number of stored concept maps.
    pub fn concept_map_count(&self) -> usize {
        self.concept_maps.len()
    }

    /// Returns every stored concept map, ordered by URL.
    pub fn concept_maps(&self) -> Vec<&ConceptMapDefinition> {
        let mut maps: Vec<_> = self.concept_maps.values().collect();
        maps.sort_by(|a, b| a.url.cmp(&b.url));
        maps
    }

    /// Returns every version stored for a code system URL.
    pub fn code_system_versions(&self, url: &str) -> &[CodeSystemDefinition] {
        self.code_systems.get(url).map(Vec::as_slice).unwrap_or_default()
    }

    /// Loads every `*.json` definition file in a directory.
    ///
    /// Files are read in file-name order. With `skip_invalid`, files that
    /// fail to parse are logged and counted in `skipped_files`; otherwise the
    /// first failure aborts the load.
    pub fn load_dir<P: AsRef<Path>>(
        &mut self,
        path: P,
        config: &LoadConfig,
    ) -> LoadResult<LoadStats> {
        let files = discover_definition_files(&path)?;
        let parsed = files
            .into_iter()
            .map(|file| {
                let result = parse_definition_file(&file);
                (file, result)
            })
            .collect();
        self.ingest(parsed, config)
    }

    /// Loads a definition directory, parsing files in parallel with rayon.
    ///
    /// Parsed definitions are inserted in file-name order, so the resulting
    /// store is identical to one built by [`InMemoryStore::load_dir`].
    #[cfg(feature = "parallel")]
    pub fn load_dir_parallel<P: AsRef<Path>>(
        &mut self,
        path: P,
        config: &LoadConfig,
    ) -> LoadResult<LoadStats> {
        let files = discover_definition_files(&path)?;
        let parsed = files
            .into_par_iter()
            .map(|file| {
                let result = parse_definition_file(&file);
                (file, result)
            })
            .collect();
        self.ingest(parsed, config)
    }

    fn ingest(
        &mut self,
        parsed: Vec<(PathBuf, LoadResult<Vec<Resource>>)>,
        config: &LoadConfig,
    ) -> LoadResult<LoadStats> {
        let mut stats = LoadStats::default();

        for (file, result) in parsed {
            stats.files += 1;
            match result {
                Ok(resources) => self.insert_resources(resources, &mut stats),
                Err(e) if config.skip_invalid => {
                    tracing::warn!(file = %file.display(), "Skipping definition file: {}", e);
                    stats.skipped_files += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            files = stats.files,
            code_systems = stats.code_systems,
            value_sets = stats.value_sets,
            concept_maps = stats.concept_maps,
            skipped = stats.skipped_files,
            "Loaded terminology definitions"
        );

        Ok(stats)
    }
}

impl CodeSystemResolver for InMemoryStore {
    fn code_system(&self, url: &str, version: Option<&str>) -> Option<&CodeSystemDefinition> {
        self.code_systems.get(url)?.code_system(url, version)
    }
}

impl DefinitionStore for InMemoryStore {
    fn value_set_by_url(&self, url: &str) -> Option<&ValueSetDefinition> {
        self.value_sets.get(url)
    }

    fn value_set_by_id(&self, id: &str) -> Option<&ValueSetDefinition> {
        self.value_set_ids
            .get(id)
            .and_then(|url| self.value_sets.get(url))
            .filter(|vs| vs.id.as_deref() == Some(id))
    }

    fn concept_map_by_url(&self, url: &str) -> Option<&ConceptMapDefinition> {
        self.concept_maps.get(url)
    }

    fn concept_map_by_id(&self, id: &str) -> Option<&ConceptMapDefinition> {
        self.concept_map_ids
            .get(id)
            .and_then(|url| self.concept_maps.get(url))
            .filter(|cm| cm.id.as_deref() == Some(id))
    }
}
