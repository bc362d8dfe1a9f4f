//! On-disk profile store.
//!
//! One file per identity, named `profile_<label>.txt`, inside a single
//! directory. The content is a JSON object keyed by `"<prev>,<cur>"` with the
//! mean latency in seconds as the value, so files stay human-readable and are
//! decoded as inert data.

use crate::core::profile::{KeyPair, Profile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name prefix for stored profiles.
pub const PROFILE_PREFIX: &str = "profile_";

/// File name suffix for stored profiles.
pub const PROFILE_SUFFIX: &str = ".txt";

/// Errors from reading or writing stored profiles.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid profile label '{0}': must be non-empty and contain no path separators")]
    InvalidLabel(String),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed profile {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
}

/// A profile loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProfile {
    /// Full path of the file
    pub path: PathBuf,
    /// File name, e.g. `profile_alice.txt`
    pub name: String,
    pub profile: Profile,
}

/// Outcome of loading every profile in the store.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub profiles: Vec<StoredProfile>,
    /// Files that matched the naming convention but could not be loaded
    pub skipped: Vec<StoreError>,
}

/// Directory-backed profile store.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `label`'s profile.
    pub fn path_for(&self, label: &str) -> Result<PathBuf, StoreError> {
        validate_label(label)?;
        Ok(self.dir.join(file_name_for(label)))
    }

    /// List profile files in the store, sorted by name.
    pub fn list(&self) -> Result<Vec<PathBuf>, StoreError> {
        let read_err = |source| StoreError::Read {
            path: self.dir.clone(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_profile_file_name);
            if matches && path.is_file() {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Load a single profile file.
    pub fn load(&self, path: &Path) -> Result<StoredProfile, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let profile = decode(&content).map_err(|reason| StoreError::Decode {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(StoredProfile {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            profile,
        })
    }

    /// Load the profile saved under `label`.
    pub fn load_label(&self, label: &str) -> Result<StoredProfile, StoreError> {
        let path = self.path_for(label)?;
        self.load(&path)
    }

    /// Load every stored profile. Unreadable or malformed files are skipped
    /// with a warning and reported in [`LoadReport::skipped`].
    pub fn load_all(&self) -> Result<LoadReport, StoreError> {
        let mut report = LoadReport::default();

        for path in self.list()? {
            match self.load(&path) {
                Ok(stored) => report.profiles.push(stored),
                Err(e) => {
                    tracing::warn!("Skipping profile: {}", e);
                    report.skipped.push(e);
                }
            }
        }

        tracing::debug!(
            loaded = report.profiles.len(),
            skipped = report.skipped.len(),
            dir = %self.dir.display(),
            "loaded profiles"
        );
        Ok(report)
    }

    /// Save `profile` under `label`, overwriting any existing file.
    pub fn save(&self, label: &str, profile: &Profile) -> Result<PathBuf, StoreError> {
        let path = self.path_for(label)?;
        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };

        let content = encode(profile).map_err(|e| write_err(std::io::Error::other(e)))?;
        std::fs::write(&path, content).map_err(write_err)?;

        tracing::info!(pairs = profile.len(), path = %path.display(), "saved profile");
        Ok(path)
    }
}

/// Check that a label can name a file inside the store directory.
pub fn validate_label(label: &str) -> Result<(), StoreError> {
    let bad = label.is_empty()
        || label
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || std::path::is_separator(c));
    if bad {
        return Err(StoreError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

/// `profile_<label>.txt`
pub fn file_name_for(label: &str) -> String {
    format!("{PROFILE_PREFIX}{label}{PROFILE_SUFFIX}")
}

/// Extract the label from a profile file name.
pub fn label_from_file_name(name: &str) -> Option<&str> {
    name.strip_prefix(PROFILE_PREFIX)?
        .strip_suffix(PROFILE_SUFFIX)
}

fn is_profile_file_name(name: &str) -> bool {
    label_from_file_name(name).is_some()
}

/// Encode a profile as pretty-printed JSON.
pub fn encode(profile: &Profile) -> Result<String, serde_json::Error> {
    let map: BTreeMap<String, f64> = profile
        .pairs()
        .map(|(pair, latency)| (pair.to_string(), latency))
        .collect();
    serde_json::to_string_pretty(&map)
}

/// Decode and validate a profile from its JSON text.
pub fn decode(content: &str) -> Result<Profile, String> {
    let map: BTreeMap<String, f64> = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let mut profile = Profile::new();
    for (key, latency) in map {
        let pair = key.parse::<KeyPair>().map_err(|e| e.to_string())?;
        if !latency.is_finite() || latency < 0.0 {
            return Err(format!("invalid latency {latency} for pair {pair}"));
        }
        if profile.insert(pair, latency).is_some() {
            return Err(format!("duplicate key pair {pair}"));
        }
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Profile {
        [(KeyPair::new(97, 98), 0.3), (KeyPair::new(98, 97), 0.125)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name_for("alice"), "profile_alice.txt");
        assert_eq!(label_from_file_name("profile_alice.txt"), Some("alice"));
        assert_eq!(label_from_file_name("profile_.txt"), Some(""));
        assert_eq!(label_from_file_name("alice.txt"), None);
        assert_eq!(label_from_file_name("profile_alice.json"), None);
    }

    #[test]
    fn test_label_validation() {
        assert!(validate_label("alice").is_ok());
        assert!(validate_label("bob smith").is_ok());
        assert!(validate_label("").is_err());
        assert!(validate_label("../etc").is_err());
        assert!(validate_label("a\\b").is_err());
    }

    #[test]
    fn test_encode_is_readable_json() {
        let text = encode(&sample()).unwrap();
        assert!(text.contains("\"97,98\": 0.3"));
        assert!(text.contains("\"98,97\": 0.125"));
    }

    #[test]
    fn test_decode_rejects_bad_content() {
        assert!(decode("not json").is_err());
        assert!(decode("[1, 2]").is_err());
        assert!(decode(r#"{"97": 0.3}"#).is_err());
        assert!(decode(r#"{"97,98": -0.1}"#).is_err());
        assert!(decode(r#"{"97,98": "fast"}"#).is_err());
        assert!(decode(r#"{"97,98": 0.1, "97, 98": 0.2}"#).is_err());
        assert_eq!(decode("{}"), Ok(Profile::new()));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());

        let path = store.save("alice", &sample()).unwrap();
        assert_eq!(path, dir.path().join("profile_alice.txt"));

        let loaded = store.load_label("alice").unwrap();
        assert_eq!(loaded.name, "profile_alice.txt");
        assert_eq!(loaded.profile, sample());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());

        store.save("alice", &sample()).unwrap();
        let replacement: Profile = [(KeyPair::new(1, 2), 0.5)].into_iter().collect();
        store.save("alice", &replacement).unwrap();

        assert_eq!(store.load_label("alice").unwrap().profile, replacement);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_save_rejects_invalid_label() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());
        assert!(matches!(
            store.save("", &sample()),
            Err(StoreError::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path().join("missing"));
        assert!(matches!(
            store.save("alice", &sample()),
            Err(StoreError::Write { .. })
        ));
    }

    #[test]
    fn test_list_filters_by_name() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());

        store.save("bob", &sample()).unwrap();
        store.save("alice", &sample()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::write(dir.path().join("profile_carol.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("profile_dir.txt")).unwrap();

        let names: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["profile_alice.txt", "profile_bob.txt"]);
    }

    #[test]
    fn test_load_all_skips_malformed() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path());

        store.save("alice", &sample()).unwrap();
        std::fs::write(
            dir.path().join("profile_evil.txt"),
            "__import__('os').system('echo pwned')",
        )
        .unwrap();

        let report = store.load_all().unwrap();
        assert_eq!(report.profiles.len(), 1);
        assert_eq!(report.profiles[0].name, "profile_alice.txt");
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0], StoreError::Decode { .. }));
    }

    #[test]
    fn test_list_missing_dir_is_error() {
        let store = ProfileStore::new("/nonexistent/keyrhythm/store");
        assert!(matches!(store.list(), Err(StoreError::Read { .. })));
    }
}
