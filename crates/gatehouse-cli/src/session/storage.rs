//! File-backed credential store and the signed-in user's profile.
//!
//! Tokens live in `session.json` under the user's data directory, readable by
//! the owner only. The library writes through [`FileCredentialStore`] when it
//! signs in or refreshes, so the next invocation starts with fresh tokens.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use gatehouse::api::User;
use gatehouse::error::StoreError;
use gatehouse::{CredentialKey, CredentialStore};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const SESSION_FILE: &str = "session.json";
const PROFILE_FILE: &str = "profile.json";

/// Stored session data.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl StoredSession {
    fn slot(&mut self, key: CredentialKey) -> &mut Option<String> {
        match key {
            CredentialKey::AccessToken => &mut self.access_token,
            CredentialKey::RefreshToken => &mut self.refresh_token,
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Get the data directory, creating it if needed.
fn data_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "gatehouse").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.to_path_buf())
}

/// Credential store backed by a JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Open the store in the user's data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(data_dir()?.join(SESSION_FILE)))
    }

    /// Open a store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<StoredSession, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
                message: format!("{}: {e}", self.path.display()),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }

    fn write(&self, session: &StoredSession) -> Result<(), StoreError> {
        if session.is_empty() {
            return remove(&self.path);
        }
        let json = serde_json::to_string_pretty(session).map_err(|e| StoreError::Io {
            message: e.to_string(),
        })?;
        write_private(&self.path, &json).map_err(|e| io_error(&self.path, e))
    }

    fn update(&self, apply: impl FnOnce(&mut StoredSession)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut session = self.read()?;
        apply(&mut session);
        self.write(&session)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read()?.slot(key).take())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.update(|session| *session.slot(key) = Some(value.to_string()))
    }

    fn clear(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.update(|session| *session.slot(key) = None)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        remove(&self.path)
    }
}

/// Save the signed-in user for `whoami`.
pub fn save_profile(user: &User) -> Result<()> {
    let path = data_dir()?.join(PROFILE_FILE);
    let json = serde_json::to_string_pretty(user)?;
    write_private(&path, &json).context("Failed to write profile file")
}

/// Load the signed-in user, if any.
pub fn load_profile() -> Result<Option<User>> {
    let path = data_dir()?.join(PROFILE_FILE);

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read profile file")?;
    let user = serde_json::from_str(&json).context("Invalid profile file")?;
    Ok(Some(user))
}

/// Forget the signed-in user.
pub fn clear_profile() -> Result<()> {
    let path = data_dir()?.join(PROFILE_FILE);
    remove(&path).context("Failed to remove profile file")
}

fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

fn remove(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, e)),
    }
}

fn io_error(path: &Path, err: io::Error) -> StoreError {
    StoreError::Io {
        message: format!("{}: {err}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::at(dir.path().join(SESSION_FILE));
        assert_eq!(store.get(CredentialKey::AccessToken).unwrap(), None);
    }

    #[test]
    fn tokens_persist_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);

        let store = FileCredentialStore::at(&path);
        store.set(CredentialKey::AccessToken, "T1").unwrap();
        store.set(CredentialKey::RefreshToken, "R1").unwrap();

        let reopened = FileCredentialStore::at(&path);
        assert_eq!(
            reopened.get(CredentialKey::AccessToken).unwrap().as_deref(),
            Some("T1")
        );
        assert_eq!(
            reopened.get(CredentialKey::RefreshToken).unwrap().as_deref(),
            Some("R1")
        );
    }

    #[test]
    fn clearing_last_token_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        let store = FileCredentialStore::at(&path);

        store.set(CredentialKey::AccessToken, "T1").unwrap();
        store.clear(CredentialKey::AccessToken).unwrap();
        assert!(!path.exists());

        store.set(CredentialKey::RefreshToken, "R1").unwrap();
        store.clear_all().unwrap();
        assert!(!path.exists());
        store.clear_all().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        fs::write(&path, "not json").unwrap();

        let store = FileCredentialStore::at(&path);
        assert!(matches!(
            store.get(CredentialKey::AccessToken),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        FileCredentialStore::at(&path)
            .set(CredentialKey::AccessToken, "T1")
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
