//! Generated-document archive with a per-document history trail.
//!
//! Documents live as one JSON list under the `ustaz_pdfs` key, newest
//! first. Saving over an existing id preserves the trail it already has
//! and appends an `updated` entry; brand-new documents start their trail
//! with a single `created` entry stamped at the document's own creation
//! time.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::StorageResult;
use crate::store::{StateStore, KEY_DOCUMENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Viewed,
    Downloaded,
    Deleted,
    Updated,
}

impl HistoryAction {
    pub fn label_kz(&self) -> &'static str {
        match self {
            HistoryAction::Created => "Жасалды",
            HistoryAction::Viewed => "Қаралды",
            HistoryAction::Downloaded => "Жүктелді",
            HistoryAction::Deleted => "Жойылды",
            HistoryAction::Updated => "Жаңартылды",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub action: HistoryAction,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HistoryEntry {
    fn sealed(action: HistoryAction, timestamp: String, details: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action,
            timestamp,
            details,
        }
    }

    fn now(action: HistoryAction, details: Option<String>) -> Self {
        Self::sealed(action, Utc::now().to_rfc3339(), details)
    }
}

/// One archived document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    /// Document kind shown in listings, e.g. a template's Kazakh name.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Rendered content, HTML or plain text.
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    /// Where the rendered PDF ended up: a file path or a remote URL.
    #[serde(rename = "blobUrl", default, skip_serializing_if = "Option::is_none")]
    pub blob_url: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl StoredDocument {
    /// Fresh document stamped now. The history trail is seeded on save.
    pub fn new(doc_type: &str, text: &str, blob_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            doc_type: doc_type.to_string(),
            text: text.to_string(),
            created_at: Utc::now().to_rfc3339(),
            blob_url,
            history: Vec::new(),
        }
    }
}

/// The archive over a [`StateStore`] key.
pub struct DocumentStore {
    store: Arc<dyn StateStore>,
}

impl DocumentStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Every archived document, newest first. A corrupt payload reads as
    /// an empty archive.
    pub fn list(&self) -> Vec<StoredDocument> {
        let raw = match self.store.get(KEY_DOCUMENTS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(target: "ustaz::store", "document archive unreadable: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(docs) => docs,
            Err(err) => {
                warn!(target: "ustaz::store", "document archive corrupt, starting empty: {err}");
                Vec::new()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<StoredDocument> {
        self.list().into_iter().find(|doc| doc.id == id)
    }

    /// Case-insensitive filter on the document kind.
    pub fn search(&self, term: &str) -> Vec<StoredDocument> {
        let needle = term.to_lowercase();
        self.list()
            .into_iter()
            .filter(|doc| doc.doc_type.to_lowercase().contains(&needle))
            .collect()
    }

    /// Saves a document, replacing any archived version with the same id.
    ///
    /// On replace, whatever trail the incoming value carried is discarded
    /// in favor of the archived one, plus a fresh `updated` entry. New
    /// documents get exactly one `created` entry at their creation time.
    pub fn save(&self, mut doc: StoredDocument) -> StorageResult<()> {
        let mut docs = self.list();
        match docs.iter().position(|existing| existing.id == doc.id) {
            Some(index) => {
                doc.history = std::mem::take(&mut docs[index].history);
                doc.history
                    .push(HistoryEntry::now(HistoryAction::Updated, None));
                docs[index] = doc;
            }
            None => {
                doc.history = vec![HistoryEntry::sealed(
                    HistoryAction::Created,
                    doc.created_at.clone(),
                    None,
                )];
                docs.insert(0, doc);
            }
        }
        self.persist(&docs)
    }

    /// Appends a trail entry. Unknown ids are a silent no-op.
    pub fn record(
        &self,
        id: &str,
        action: HistoryAction,
        details: Option<&str>,
    ) -> StorageResult<()> {
        let mut docs = self.list();
        let Some(doc) = docs.iter_mut().find(|doc| doc.id == id) else {
            return Ok(());
        };
        doc.history
            .push(HistoryEntry::now(action, details.map(|d| d.to_string())));
        self.persist(&docs)
    }

    /// Removes a document outright. There is no tombstone; callers that
    /// want a trace record a `deleted` action first.
    pub fn delete(&self, id: &str) -> StorageResult<()> {
        let docs: Vec<StoredDocument> = self
            .list()
            .into_iter()
            .filter(|doc| doc.id != id)
            .collect();
        self.persist(&docs)
    }

    fn persist(&self, docs: &[StoredDocument]) -> StorageResult<()> {
        let json = serde_json::to_string(docs)?;
        self.store.put(KEY_DOCUMENTS, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> DocumentStore {
        DocumentStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn new_documents_are_prepended_with_a_seeded_trail() {
        let archive = store();
        let first = StoredDocument::new("КТП", "first", None);
        let second = StoredDocument::new("Сабақ жоспары", "second", None);
        archive.save(first.clone()).unwrap();
        archive.save(second.clone()).unwrap();

        let docs = archive.list();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, second.id, "newest first");
        assert_eq!(docs[0].history.len(), 1);
        assert_eq!(docs[0].history[0].action, HistoryAction::Created);
        assert_eq!(
            docs[0].history[0].timestamp, docs[0].created_at,
            "the created entry is stamped at the document's creation time"
        );
    }

    #[test]
    fn resaving_preserves_the_trail_and_appends_updated() {
        let archive = store();
        let doc = StoredDocument::new("КТП", "v1", None);
        let id = doc.id.clone();
        archive.save(doc).unwrap();
        archive
            .record(&id, HistoryAction::Viewed, Some("ашылды"))
            .unwrap();

        let mut revised = archive.get(&id).unwrap();
        revised.text = "v2".to_string();
        // A tampered incoming trail must not replace the archived one.
        revised.history = Vec::new();
        archive.save(revised).unwrap();

        let stored = archive.get(&id).unwrap();
        assert_eq!(stored.text, "v2");
        let actions: Vec<HistoryAction> = stored.history.iter().map(|h| h.action).collect();
        assert_eq!(
            actions,
            vec![
                HistoryAction::Created,
                HistoryAction::Viewed,
                HistoryAction::Updated
            ],
            "prior trail survives and gains exactly one updated entry"
        );
        assert_eq!(stored.history[1].details.as_deref(), Some("ашылды"));
        assert_eq!(archive.list().len(), 1, "replace, not duplicate");
    }

    #[test]
    fn recording_on_a_missing_id_changes_nothing() {
        let archive = store();
        archive.save(StoredDocument::new("КТП", "x", None)).unwrap();
        archive
            .record("no-such-id", HistoryAction::Downloaded, None)
            .unwrap();
        let docs = archive.list();
        assert_eq!(docs[0].history.len(), 1, "only the seeded entry");
    }

    #[test]
    fn delete_removes_without_a_tombstone() {
        let archive = store();
        let doc = StoredDocument::new("КТП", "x", None);
        let id = doc.id.clone();
        archive.save(doc).unwrap();
        archive.save(StoredDocument::new("Басқа", "y", None)).unwrap();

        archive.delete(&id).unwrap();
        let docs = archive.list();
        assert_eq!(docs.len(), 1);
        assert!(docs.iter().all(|d| d.id != id));

        archive.delete("no-such-id").unwrap();
        assert_eq!(archive.list().len(), 1, "deleting a ghost is a no-op");
    }

    #[test]
    fn search_matches_the_kind_case_insensitively() {
        let archive = store();
        archive
            .save(StoredDocument::new("Сабақ жоспары", "x", None))
            .unwrap();
        archive.save(StoredDocument::new("КТП", "y", None)).unwrap();

        assert_eq!(archive.search("сабақ").len(), 1);
        assert_eq!(archive.search("ктп").len(), 1);
        assert!(archive.search("жоқ").is_empty());
    }

    #[test]
    fn corrupt_archive_reads_as_empty() {
        let backing = Arc::new(MemoryStore::new());
        backing.put(KEY_DOCUMENTS, "{broken json").unwrap();
        let archive = DocumentStore::new(backing);
        assert!(archive.list().is_empty());

        // The next save overwrites the corrupt payload.
        archive.save(StoredDocument::new("КТП", "x", None)).unwrap();
        assert_eq!(archive.list().len(), 1);
    }
}
