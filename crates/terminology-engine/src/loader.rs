//! Definition file discovery and parsing.

use std::fs;
use std::path::{Path, PathBuf};

use terminology_types::Resource;

use crate::types::{LoadError, LoadResult};

/// Lists the `*.json` files directly inside a definition directory, sorted by
/// file name so loads are deterministic.
pub fn discover_definition_files<P: AsRef<Path>>(path: P) -> LoadResult<Vec<PathBuf>> {
    let path = path.as_ref();

    if !path.is_dir() {
        return Err(LoadError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_path = entry.path();
        if file_path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(file_path);
        }
    }

    files.sort();
    Ok(files)
}

/// Parses one definition file.
///
/// The file holds either a single resource object or an array of them, each
/// discriminated by `resourceType`. A resource with an empty `url` is
/// rejected since it could never be resolved.
pub fn parse_definition_file<P: AsRef<Path>>(path: P) -> LoadResult<Vec<Resource>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_definitions(&text, &path.display().to_string())
}

/// Parses definition JSON text. `origin` names the source in errors.
pub fn parse_definitions(text: &str, origin: &str) -> LoadResult<Vec<Resource>> {
    let json_error = |source| LoadError::Json {
        path: origin.to_string(),
        source,
    };

    let value: serde_json::Value = serde_json::from_str(text).map_err(json_error)?;
    let resources = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value::<Resource>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(json_error)?,
        single => vec![serde_json::from_value::<Resource>(single).map_err(json_error)?],
    };

    if let Some(resource) = resources.iter().find(|r| r.url().is_empty()) {
        return Err(LoadError::InvalidDefinition {
            path: origin.to_string(),
            reason: format!("{} has an empty url", resource.resource_type()),
        });
    }

    Ok(resources)
}
