//! Metadata resolution: base document plus optional language override.
//!
//! The override is applied as an RFC 7396 merge patch. Without an override
//! the base file is copied byte for byte.

use crate::error::{ExportError, Result};
use crate::utils;
use serde_json::{Map, Value as Json};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Apply `patch` to `target` with JSON merge-patch semantics.
///
/// - `null` members delete the key from the target.
/// - Object members merge recursively into object targets.
/// - Anything else (arrays included) replaces the target value.
pub fn merge_patch(target: &mut Json, patch: &Json) {
    let Json::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Json::Object(Map::new());
    }
    if let Json::Object(target_map) = target {
        merge_object(target_map, patch_map);
    }
}

/// Object-level half of [`merge_patch`]. Removal keeps the order of the
/// remaining keys.
pub fn merge_object(target: &mut Map<String, Json>, patch: &Map<String, Json>) {
    for (key, value) in patch {
        if value.is_null() {
            target.shift_remove(key);
        } else {
            merge_patch(target.entry(key.clone()).or_insert(Json::Null), value);
        }
    }
}

fn read_object(path: &Path) -> Result<(Vec<u8>, Map<String, Json>)> {
    let bytes = fs::read(path).map_err(|source| ExportError::MetadataRead {
        path: path.to_path_buf(),
        source,
    })?;
    let json: Json = serde_json::from_slice(&bytes).map_err(|source| ExportError::MetadataParse {
        path: path.to_path_buf(),
        source,
    })?;
    match json {
        Json::Object(map) => Ok((bytes, map)),
        _ => Err(ExportError::MetadataNotObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Resolve the metadata of one rule into `destination` and return it.
///
/// When `override_path` is a regular file, both documents are parsed and
/// the merged object is written as pretty JSON. Otherwise `base` is copied
/// verbatim. Inputs are parsed before anything is written.
pub fn resolve(base: &Path, override_path: &Path, destination: &Path) -> Result<Map<String, Json>> {
    let (base_bytes, base_map) = read_object(base)?;
    if !override_path.is_file() {
        debug!(from = %base.display(), to = %destination.display(), "copy metadata");
        utils::write_file(destination, &base_bytes)?;
        return Ok(base_map);
    }
    let (_, patch_map) = read_object(override_path)?;
    debug!(
        base = %base.display(),
        patch = %override_path.display(),
        to = %destination.display(),
        "merge metadata"
    );
    let mut merged = base_map;
    merge_object(&mut merged, &patch_map);
    let out = utils::to_pretty_json(&merged).map_err(|e| ExportError::Write {
        path: destination.to_path_buf(),
        source: e.into(),
    })?;
    utils::write_file(destination, out)?;
    Ok(merged)
}
