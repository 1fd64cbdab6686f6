//! Credential persistence boundary
//!
//! The controller is the only reader and writer of the store; everything
//! else sees credentials through `AuthController`. The trait is an async
//! key-value surface so host environments can plug in whatever durable
//! storage they have (extension storage, OS keychain, a file). This crate
//! ships `FileCredentialStore`, a JSON file written atomically via temp
//! file + rename with 0600 permissions, writes serialized by a tokio Mutex.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::sync::Mutex;
use tracing::{debug, info};

/// Store keys. Layout is fixed: hosts that bring their own store must
/// persist exactly these names.
pub mod keys {
    /// Current access token.
    pub const TOKEN: &str = "token";
    /// Refresh token, present only when the provider issued one.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Expiry as decimal unix epoch-millis.
    pub const TOKEN_EXPIRY: &str = "token_expiry";
    /// PKCE verifier, present only while a login flow is in flight.
    pub const CODE_VERIFIER: &str = "code_verifier";

    pub const ALL: &[&str] = &[TOKEN, REFRESH_TOKEN, TOKEN_EXPIRY, CODE_VERIFIER];
}

/// A store operation failed. The controller treats an unacknowledged write
/// as failed; it never assumes persistence succeeded.
#[derive(Debug, thiserror::Error)]
#[error("credential store failure: {0}")]
pub struct StorageError(pub String);

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Asynchronous key-value persistence for credential data.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn CredentialStore>`).
pub trait CredentialStore: Send + Sync {
    /// Fetch the requested keys. Absent keys are simply missing from the
    /// returned map, not an error.
    fn get(
        &self,
        keys: &'static [&'static str],
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<String, String>>> + Send + '_>>;

    /// Write the given entries, replacing existing values.
    fn set(
        &self,
        entries: Vec<(&'static str, String)>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Delete the given keys. Deleting an absent key is not an error.
    fn remove(
        &self,
        keys: &'static [&'static str],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// File-backed credential store.
///
/// The file is a flat JSON object of the keys above. All writes go through
/// atomic temp-file + rename to prevent corruption on crash; the Mutex
/// serializes writers so request-time and background refresh never
/// interleave partial states.
pub struct FileCredentialStore {
    path: PathBuf,
    state: Mutex<HashMap<String, String>>,
}

impl FileCredentialStore {
    /// Load the store from the given file path.
    ///
    /// If the file doesn't exist, starts empty and creates it so future
    /// loads skip the cold-start path.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| StorageError(format!("reading credential file: {e}")))?;
            let entries: HashMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| StorageError(format!("parsing credential file: {e}")))?;
            info!(path = %path.display(), entries = entries.len(), "loaded credential file");
            entries
        } else {
            info!(path = %path.display(), "credential file not found, starting empty");
            let entries = HashMap::new();
            write_atomic(&path, &entries).await?;
            entries
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(
        &self,
        keys: &'static [&'static str],
    ) -> Pin<Box<dyn Future<Output = Result<HashMap<String, String>>> + Send + '_>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(keys
                .iter()
                .filter_map(|&k| state.get(k).map(|v| (k.to_string(), v.clone())))
                .collect())
        })
    }

    fn set(
        &self,
        entries: Vec<(&'static str, String)>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            for (key, value) in entries {
                state.insert(key.to_string(), value);
            }
            write_atomic(&self.path, &state).await
        })
    }

    fn remove(
        &self,
        keys: &'static [&'static str],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let mut changed = false;
            for &key in keys {
                changed |= state.remove(key).is_some();
            }
            if changed {
                write_atomic(&self.path, &state).await?;
            }
            Ok(())
        })
    }
}

/// Write entries to the file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Sets 0600 permissions (unix) since the file contains OAuth
/// tokens.
async fn write_atomic(path: &Path, data: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| StorageError(format!("serializing credentials: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| StorageError("credential path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".credentials.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| StorageError(format!("writing temp credential file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| StorageError(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| StorageError(format!("renaming temp credential file: {e}")))?;

    debug!(path = %path.display(), "persisted credentials");
    Ok(())
}
