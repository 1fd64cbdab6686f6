//! Spotify OAuth session management
//!
//! Owns the credential lifecycle: acquire via the Authorization-Code+PKCE
//! flow, persist, validate expiry, and transparently refresh. The
//! `AuthController` is the single public surface — resource-API clients
//! call `access_token()` before each authenticated request, UI layers call
//! `login()`/`logout()` and either poll `current_state()` or `subscribe()`.
//!
//! Credential lifecycle:
//! 1. `AuthController::initialize` hydrates state from the credential store
//! 2. `login()` generates a PendingAuthorization, persists the verifier,
//!    and hands the authorization URL to the host's redirect launcher
//! 3. The redirect's code is exchanged for tokens, the credential persisted
//! 4. `access_token()` serves from cache until the renewal skew, then
//!    refreshes once (concurrent callers coalesce onto that refresh)
//! 5. `spawn_refresh_task` renews proactively so most expiries are handled
//!    before a request needs the token

pub mod config;
pub mod controller;
pub mod credential;
pub mod error;
pub mod launcher;
mod metrics;
pub mod refresh;
pub mod store;

pub use config::AuthConfig;
pub use controller::AuthController;
pub use credential::{AuthState, Credential, PendingAuthorization};
pub use error::{Error, Result};
pub use launcher::{LaunchOutcome, RedirectFlowLauncher};
pub use refresh::spawn_refresh_task;
pub use store::{CredentialStore, FileCredentialStore, StorageError, keys};
