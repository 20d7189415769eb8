//! Local identity persistence.
//!
//! The store is a flat string-to-string map that survives restarts. Exactly one
//! key holds the remembered visitor; anything unreadable under that key is
//! treated as "nobody remembered".

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use shared::domain::Identity;
use tracing::{debug, warn};

pub const IDENTITY_STORAGE_KEY: &str = "routeVentureUser";

pub trait IdentityStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Reads the remembered identity, normalizing every failure to `None`.
pub fn load_identity(store: &dyn IdentityStore) -> Option<Identity> {
    let raw = match store.get(IDENTITY_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("identity: store read failed, continuing without identity: {err:#}");
            return None;
        }
    };

    match serde_json::from_str::<Identity>(&raw) {
        Ok(identity) => Some(identity),
        Err(err) => {
            debug!("identity: ignoring malformed stored value: {err}");
            None
        }
    }
}

pub fn save_identity(store: &dyn IdentityStore, identity: &Identity) -> Result<()> {
    let raw = serde_json::to_string(identity).context("failed to serialize identity")?;
    store.set(IDENTITY_STORAGE_KEY, &raw)
}

#[derive(Default)]
pub struct MemoryIdentityStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("identity store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("identity store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, one entry per key.
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<HashMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read identity store '{}'", self.path.display())
                })
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                debug!(
                    path = %self.path.display(),
                    "identity store is not a JSON object, starting empty: {err}"
                );
                Ok(HashMap::new())
            }
        }
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "failed to create parent directory '{}' for identity store",
                    parent.display()
                )
            })?;
        }
        let raw = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, raw).with_context(|| {
            format!("failed to write identity store '{}'", self.path.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::UserId;

    fn alex() -> Identity {
        Identity {
            id: UserId(7),
            name: "Alex".into(),
            email: "alex@example.com".into(),
        }
    }

    #[test]
    fn memory_store_round_trips_identity() {
        let store = MemoryIdentityStore::new();
        save_identity(&store, &alex()).expect("save");
        assert_eq!(load_identity(&store), Some(alex()));
    }

    #[test]
    fn malformed_value_reads_as_absent() {
        let store = MemoryIdentityStore::with_entry(IDENTITY_STORAGE_KEY, "{not json");
        assert_eq!(load_identity(&store), None);

        let store = MemoryIdentityStore::with_entry(IDENTITY_STORAGE_KEY, r#"{"id":"x"}"#);
        assert_eq!(load_identity(&store), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("identity.json");

        save_identity(&FileIdentityStore::new(&path), &alex()).expect("save");
        assert!(path.exists());

        let reopened = FileIdentityStore::new(&path);
        assert_eq!(load_identity(&reopened), Some(alex()));
    }

    #[test]
    fn file_store_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileIdentityStore::new(dir.path().join("identity.json"));
        store.set("theme", "dark").expect("set theme");
        save_identity(&store, &alex()).expect("save");

        assert_eq!(store.get("theme").expect("get"), Some("dark".to_string()));
    }

    #[test]
    fn corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("identity.json");
        fs::write(&path, "garbage").expect("write");

        assert_eq!(load_identity(&FileIdentityStore::new(&path)), None);
    }
}
