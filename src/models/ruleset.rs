use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::RulesetError;

/// A loaded ruleset: the rule objects passed to the rewrite agent plus the
/// content hash that identifies exactly which bytes were in effect.
#[derive(Debug, Clone)]
pub struct RulesetBundle {
    /// Opaque ordered sequence of rule objects. Never inspected by the core.
    pub rules: Value,
    /// SHA-256 of the raw source bytes, reported as `catalog_version`
    pub sha: String,
    /// Source path, when the bundle came from a file
    pub path: Option<PathBuf>,
}

impl RulesetBundle {
    /// Bundle used when no source is configured or the source is unusable.
    /// Hashes the literal bytes the pipeline will use, so even an empty
    /// catalog has a stable version id.
    pub fn empty() -> Self {
        Self {
            rules: Value::Array(vec![]),
            sha: stable_hash(b"[]"),
            path: None,
        }
    }
}

/// SHA-256 hex digest of a byte sequence
pub fn stable_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Read and hash a ruleset file
pub fn load_ruleset(path: &Path) -> Result<RulesetBundle, RulesetError> {
    let raw = std::fs::read(path).map_err(|source| RulesetError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    let rules: Value =
        serde_json::from_slice(&raw).map_err(|source| RulesetError::Unparseable {
            path: path.display().to_string(),
            source,
        })?;

    Ok(RulesetBundle {
        rules,
        sha: stable_hash(&raw),
        path: Some(path.to_path_buf()),
    })
}

/// Read-only ruleset cache, loaded at most once per process lifetime.
///
/// Constructed by the hosting process and handed to the pipeline by
/// reference; a missing or broken source degrades to an empty bundle rather
/// than failing the run.
#[derive(Debug)]
pub struct RulesetCache {
    source: Option<PathBuf>,
    cell: OnceCell<RulesetBundle>,
}

impl RulesetCache {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Cache with no source: always the empty bundle.
    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    pub fn get(&self) -> &RulesetBundle {
        self.cell.get_or_init(|| match &self.source {
            Some(path) => match load_ruleset(path) {
                Ok(bundle) => {
                    debug!("Loaded ruleset from {:?} ({})", path, &bundle.sha[..12]);
                    bundle
                }
                Err(e) => {
                    warn!("Ruleset source unusable, degrading to empty: {}", e);
                    RulesetBundle::empty()
                }
            },
            None => RulesetBundle::empty(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_missing_source_degrades_to_empty() {
        let cache = RulesetCache::new(Some(PathBuf::from("/nonexistent/ruleset.json")));
        let bundle = cache.get();

        assert_eq!(bundle.rules, Value::Array(vec![]));
        assert_eq!(bundle.sha, stable_hash(b"[]"));
    }

    #[test]
    fn test_load_ruleset_hashes_raw_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let raw = br#"[{"id": "style-numbers", "title": "Spell out one through nine"}]"#;
        file.write_all(raw).unwrap();

        let bundle = load_ruleset(file.path()).unwrap();

        assert_eq!(bundle.sha, stable_hash(raw));
        assert!(bundle.rules.is_array());
        assert_eq!(bundle.rules.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_cache_loads_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();

        let cache = RulesetCache::new(Some(file.path().to_path_buf()));
        let first = cache.get().sha.clone();

        // Rewrite the file; the cache must keep serving the original bytes.
        file.write_all(b"[{}]").unwrap();
        let second = cache.get().sha.clone();

        assert_eq!(first, second);
    }

    #[test]
    fn test_unparseable_source_degrades() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();

        let cache = RulesetCache::new(Some(file.path().to_path_buf()));
        assert_eq!(cache.get().rules, Value::Array(vec![]));
    }
}
