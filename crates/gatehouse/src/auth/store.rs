//! Credential storage.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::error::StoreError;

/// Keys held by a credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// The short-lived bearer token.
    AccessToken,
    /// The token exchanged for new access tokens.
    RefreshToken,
}

impl CredentialKey {
    /// All keys, in a stable order.
    pub const ALL: [CredentialKey; 2] = [CredentialKey::AccessToken, CredentialKey::RefreshToken];

    /// The storage name of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "access_token",
            CredentialKey::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage for session tokens.
///
/// Only the API client writes through this interface. Implementations need
/// no cross-call transactions; the client never issues two refresh writes at
/// the same time.
pub trait CredentialStore: Send + Sync {
    /// Read a stored value.
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing an absent key is not an error.
    fn clear(&self, key: CredentialKey) -> Result<(), StoreError>;

    /// Remove every stored credential.
    fn clear_all(&self) -> Result<(), StoreError> {
        for key in CredentialKey::ALL {
            self.clear(key)?;
        }
        Ok(())
    }
}

/// Process-local credential store.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<CredentialKey, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a session.
    pub fn with_tokens(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(CredentialKey::AccessToken, access_token.into());
        if let Some(refresh) = refresh_token {
            values.insert(CredentialKey::RefreshToken, refresh);
        }
        Self {
            values: RwLock::new(values),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key, value.to_string());
        Ok(())
    }

    fn clear(&self, key: CredentialKey) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(&key);
        Ok(())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let keys: Vec<_> = values.keys().map(CredentialKey::as_str).collect();
        f.debug_struct("MemoryStore").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let store = MemoryStore::new();
        assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);

        store.set(CredentialKey::AccessToken, "a1").unwrap();
        assert_eq!(
            store.get(CredentialKey::AccessToken).unwrap().as_deref(),
            Some("a1")
        );

        store.clear(CredentialKey::AccessToken).unwrap();
        assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);
    }

    #[test]
    fn clear_all_removes_both_tokens() {
        let store = MemoryStore::with_tokens("a1", Some("r1".to_string()));
        store.clear_all().unwrap();
        assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);
        assert_eq!(store.get(CredentialKey::RefreshToken).unwrap(), None);
    }

    #[test]
    fn debug_lists_keys_not_values() {
        let store = MemoryStore::with_tokens("secret-access", None);
        let debug = format!("{:?}", store);
        assert!(debug.contains("access_token"));
        assert!(!debug.contains("secret-access"));
    }
}
