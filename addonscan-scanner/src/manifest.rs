//! `fabric.mod.json` decoding.
//!
//! Authors and meteor entrypoints come in several shapes in the wild. Both
//! are normalized to ordered string lists while decoding, so nothing past
//! this module sees the raw shapes.

use addonscan_fetch::GitHubApi;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::ScanError;

/// Manifest location relative to the repository root.
pub const MANIFEST_PATH: &str = "src/main/resources/fabric.mod.json";

const MANIFEST_NAME: &str = "fabric.mod.json";

// ============================================================================
// Document
// ============================================================================

/// The fields of `fabric.mod.json` the scanner reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Mod id.
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    /// Description.
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    /// Authors, normalized.
    #[serde(deserialize_with = "authors")]
    pub authors: Vec<String>,
    /// Icon path relative to `src/main/resources`.
    #[serde(deserialize_with = "lenient_string")]
    pub icon: String,
    /// Meteor entrypoints, normalized.
    #[serde(deserialize_with = "meteor_entrypoints")]
    pub entrypoints: Vec<String>,
}

impl Manifest {
    /// Decodes a manifest body.
    ///
    /// Fails if the body is not a manifest object or declares no meteor
    /// entrypoint.
    pub fn parse(body: &str) -> Result<Self, ScanError> {
        let manifest: Manifest =
            serde_json::from_str(body).map_err(|source| ScanError::InvalidDocument {
                document: MANIFEST_NAME,
                source,
            })?;

        if manifest.entrypoints.is_empty() {
            return Err(ScanError::MissingEntrypoint);
        }
        Ok(manifest)
    }

    /// First entrypoint as a source path, e.g. `com/example/Addon`.
    pub fn entrypoint_path(&self) -> String {
        self.entrypoints
            .first()
            .map(|e| e.trim().replace('.', "/"))
            .unwrap_or_default()
    }
}

/// Fetches and decodes a repository's manifest, returning it with its body.
pub async fn fetch_manifest(
    api: &GitHubApi,
    id: &str,
    branch: &str,
) -> Result<(Manifest, String), ScanError> {
    let Some(body) = api.raw(id, branch, MANIFEST_PATH).await? else {
        debug!(repo = %id, "No manifest");
        return Err(ScanError::NotAnAddon(
            "fabric.mod.json not found in expected location".to_string(),
        ));
    };

    let manifest = Manifest::parse(&body)?;
    Ok((manifest, body))
}

// ============================================================================
// Normalization
// ============================================================================

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn authors<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(normalize_authors(&Value::deserialize(deserializer)?))
}

fn meteor_entrypoints<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .get("meteor")
        .map(normalize_entrypoints)
        .unwrap_or_default())
}

/// Normalizes a string, a list of strings, or a list of `{"name": ..}`
/// objects. Anything else yields an empty list.
pub fn normalize_authors(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => map.get("name").and_then(Value::as_str).map(String::from),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalizes a string, a list, or a map whose values are strings or lists
/// of strings. Anything else yields an empty list.
pub fn normalize_entrypoints(value: &Value) -> Vec<String> {
    fn strings(items: &[Value]) -> impl Iterator<Item = String> + '_ {
        items.iter().filter_map(Value::as_str).map(String::from)
    }

    let entries: Vec<String> = match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => strings(items).collect(),
        Value::Object(map) => map
            .values()
            .flat_map(|entry| match entry {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => strings(items).collect(),
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter(|e| !e.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_authors_shapes() {
        assert_eq!(normalize_authors(&json!("solo")), vec!["solo"]);
        assert_eq!(normalize_authors(&json!(["a", "b"])), vec!["a", "b"]);
        assert_eq!(
            normalize_authors(&json!([{ "name": "a", "contact": {} }, "b", 3])),
            vec!["a", "b"]
        );
        assert!(normalize_authors(&json!(null)).is_empty());
        assert!(normalize_authors(&json!({ "name": "a" })).is_empty());
    }

    #[test]
    fn test_entrypoint_shapes() {
        assert_eq!(normalize_entrypoints(&json!("a.B")), vec!["a.B"]);
        assert_eq!(normalize_entrypoints(&json!(["a.B", 1, "c.D"])), vec!["a.B", "c.D"]);
        let mut from_map = normalize_entrypoints(&json!({ "main": "a.B", "extra": ["c.D", 2] }));
        from_map.sort();
        assert_eq!(from_map, vec!["a.B", "c.D"]);
        assert!(normalize_entrypoints(&json!([])).is_empty());
        assert!(normalize_entrypoints(&json!([""])).is_empty());
    }

    #[test]
    fn test_parse_full_manifest() {
        let body = r#"{
            "id": "my-addon",
            "name": "My Addon",
            "description": "Does things",
            "authors": [{ "name": "dev" }],
            "icon": "assets/my-addon/icon.png",
            "entrypoints": { "meteor": ["com.example.addon.Addon"], "client": ["x.Y"] }
        }"#;
        let manifest = Manifest::parse(body).unwrap();
        assert_eq!(manifest.id, "my-addon");
        assert_eq!(manifest.authors, vec!["dev"]);
        assert_eq!(manifest.entrypoints, vec!["com.example.addon.Addon"]);
        assert_eq!(manifest.entrypoint_path(), "com/example/addon/Addon");
    }

    #[test]
    fn test_parse_without_meteor_entrypoint() {
        let body = r#"{ "name": "Fabric Mod", "entrypoints": { "main": ["a.B"] } }"#;
        let err = Manifest::parse(body).unwrap_err();
        assert!(matches!(err, ScanError::MissingEntrypoint));
        assert_eq!(
            err.to_string(),
            "No meteor entrypoint found in fabric.mod.json - not a Meteor addon"
        );
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = Manifest::parse("{ not json").unwrap_err();
        assert!(matches!(err, ScanError::InvalidDocument { .. }));
    }
}
