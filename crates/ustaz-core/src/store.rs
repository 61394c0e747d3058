//! Local state store: string keys to JSON payloads, whole-value writes.
//!
//! This is the persistence layer behind the session, the generated-document
//! list, and the timetable. Collections are serialized as one JSON document
//! per key, so every mutation rewrites its whole collection.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use sled::Db;

use crate::error::StorageResult;

/// Generated documents collection.
pub const KEY_DOCUMENTS: &str = "ustaz_pdfs";
/// Weekly timetable collection.
pub const KEY_SCHEDULE: &str = "schedule";
/// Bearer token for the backend API.
pub const KEY_ACCESS_TOKEN: &str = "access_token";
/// Token used by the refresh endpoint.
pub const KEY_REFRESH_TOKEN: &str = "refresh_token";
/// Signed-in user profile, JSON.
pub const KEY_USER: &str = "user";

/// Every key the assistant persists. `wipe` clears exactly these.
pub const WELL_KNOWN_KEYS: [&str; 5] = [
    KEY_DOCUMENTS,
    KEY_SCHEDULE,
    KEY_ACCESS_TOKEN,
    KEY_REFRESH_TOKEN,
    KEY_USER,
];

/// Key-value state store with whole-value writes.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Clears all well-known keys (the "clear everything" affordance).
    fn wipe(&self) -> StorageResult<()> {
        for key in WELL_KNOWN_KEYS {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Sled-backed store with a hot cache in front of the tree.
pub struct SledStore {
    db: Db,
    cache: Arc<DashMap<String, String>>,
}

impl SledStore {
    /// Opens or creates the sled tree at the given directory.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path)?;
        Ok(Self {
            db,
            cache: Arc::new(DashMap::new()),
        })
    }
}

impl StateStore for SledStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if let Some(v) = self.cache.get(key) {
            return Ok(Some(v.clone()));
        }
        let raw = self.db.get(key.as_bytes())?;
        let out = raw.map(|iv| String::from_utf8_lossy(&iv).into_owned());
        if let Some(ref value) = out {
            self.cache.insert(key.to_string(), value.clone());
        }
        Ok(out)
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        self.cache.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        self.cache.remove(key);
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    map: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.map.get(key).map(|v| v.clone()))
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.put(KEY_USER, r#"{"email":"a@b.kz"}"#).unwrap();
        assert_eq!(
            store.get(KEY_USER).unwrap().as_deref(),
            Some(r#"{"email":"a@b.kz"}"#)
        );

        store.remove(KEY_USER).unwrap();
        assert_eq!(store.get(KEY_USER).unwrap(), None);
    }

    #[test]
    fn wipe_clears_every_well_known_key() {
        let store = MemoryStore::new();
        for key in WELL_KNOWN_KEYS {
            store.put(key, "x").unwrap();
        }
        store.wipe().unwrap();
        for key in WELL_KNOWN_KEYS {
            assert_eq!(store.get(key).unwrap(), None, "{key} should be cleared");
        }
    }
}
