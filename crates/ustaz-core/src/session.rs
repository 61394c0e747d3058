//! Session state: bearer tokens and the signed-in profile.
//!
//! A `Session` is an explicit handle over a [`StateStore`], shared by the
//! API client and the auth flow. Demo sessions carry a sentinel token that
//! the backend rejects; callers treat them as offline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageResult;
use crate::store::{StateStore, KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_USER};

/// Sentinel stored as the access token of an offline demo session.
pub const DEMO_TOKEN: &str = "demo-token";

/// Profile persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserProfile {
    /// Minimal profile derived from a sign-in email. The display name is
    /// the local part of the address.
    pub fn from_email(email: &str) -> Self {
        let full_name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            email: email.to_string(),
            full_name,
            phone: None,
            school_id: None,
            class_id: None,
            role: None,
        }
    }
}

/// Token and profile storage shared across the client.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn StateStore>,
}

impl Session {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn StateStore> {
        Arc::clone(&self.store)
    }

    /// Current bearer token, if any. Storage failures read as signed out.
    pub fn access_token(&self) -> Option<String> {
        match self.store.get(KEY_ACCESS_TOKEN) {
            Ok(token) => token,
            Err(err) => {
                warn!(target: "ustaz::session", "access token unreadable: {err}");
                None
            }
        }
    }

    pub fn refresh_token(&self) -> Option<String> {
        match self.store.get(KEY_REFRESH_TOKEN) {
            Ok(token) => token,
            Err(err) => {
                warn!(target: "ustaz::session", "refresh token unreadable: {err}");
                None
            }
        }
    }

    pub fn set_access_token(&self, token: &str) -> StorageResult<()> {
        self.store.put(KEY_ACCESS_TOKEN, token)
    }

    pub fn set_refresh_token(&self, token: &str) -> StorageResult<()> {
        self.store.put(KEY_REFRESH_TOKEN, token)
    }

    /// Marks this session as an offline demo session.
    pub fn start_demo(&self) -> StorageResult<()> {
        self.store.put(KEY_ACCESS_TOKEN, DEMO_TOKEN)
    }

    pub fn is_demo(&self) -> bool {
        self.access_token().as_deref() == Some(DEMO_TOKEN)
    }

    /// Drops the access token alone. With no token the stored profile
    /// stops being honored.
    pub fn clear_access_token(&self) -> StorageResult<()> {
        self.store.remove(KEY_ACCESS_TOKEN)
    }

    /// Drops both tokens, keeping the profile.
    pub fn clear_tokens(&self) -> StorageResult<()> {
        self.store.remove(KEY_ACCESS_TOKEN)?;
        self.store.remove(KEY_REFRESH_TOKEN)
    }

    /// Drops tokens and profile.
    pub fn clear(&self) -> StorageResult<()> {
        self.clear_tokens()?;
        self.store.remove(KEY_USER)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> StorageResult<()> {
        let json = serde_json::to_string(profile)?;
        self.store.put(KEY_USER, &json)
    }

    /// Stored profile, honored only while a token is present. A corrupt
    /// payload reads as signed out.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.access_token()?;
        let raw = match self.store.get(KEY_USER) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(target: "ustaz::session", "profile unreadable: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(target: "ustaz::session", "profile payload corrupt: {err}");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn session() -> Session {
        Session::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn profile_is_hidden_without_a_token() {
        let s = session();
        s.save_profile(&UserProfile::from_email("aigerim@mektep.kz"))
            .unwrap();
        assert!(s.current_user().is_none(), "no token, no user");

        s.set_access_token("tok").unwrap();
        let user = s.current_user().expect("token present");
        assert_eq!(user.full_name, "aigerim");
    }

    #[test]
    fn demo_sentinel_is_detected() {
        let s = session();
        assert!(!s.is_demo());
        s.start_demo().unwrap();
        assert!(s.is_demo());
        assert_eq!(s.access_token().as_deref(), Some(DEMO_TOKEN));
    }

    #[test]
    fn clear_removes_tokens_and_profile() {
        let s = session();
        s.set_access_token("tok").unwrap();
        s.set_refresh_token("ref").unwrap();
        s.save_profile(&UserProfile::from_email("a@b.kz")).unwrap();

        s.clear().unwrap();
        assert!(s.access_token().is_none());
        assert!(s.refresh_token().is_none());
        assert!(s.current_user().is_none());
    }

    #[test]
    fn corrupt_profile_reads_as_signed_out() {
        let store = Arc::new(MemoryStore::new());
        store.put(KEY_USER, "{not json").unwrap();
        store.put(KEY_ACCESS_TOKEN, "tok").unwrap();
        let s = Session::new(store);
        assert!(s.current_user().is_none());
    }
}
