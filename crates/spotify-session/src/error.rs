//! Error types for session operations

use crate::store::StorageError;

/// Errors from login, refresh, and token access.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No credential and no way to renew one. This is an expected terminal
    /// condition, not an exceptional path: callers respond by prompting the
    /// user to log in again.
    #[error("re-authentication required")]
    ReauthRequired,

    /// The `state` echoed on the redirect does not match the pending
    /// authorization. Always a hard failure.
    #[error("redirect state does not match pending authorization")]
    StateMismatch,

    /// The user dismissed the authorization flow.
    #[error("authorization flow cancelled")]
    LauncherCancelled,

    #[error("redirect flow launcher failed: {0}")]
    Launcher(String),

    /// The redirect completed but carried no authorization code.
    #[error("redirect carried no authorization code")]
    MissingCode,

    /// The pending authorization aged past its TTL before the redirect
    /// completed.
    #[error("pending authorization expired before the redirect completed")]
    StalePending,

    /// A newer `login()` replaced this flow's pending authorization while
    /// the redirect was outstanding.
    #[error("another login superseded this authorization flow")]
    Superseded,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Protocol(#[from] spotify_auth::Error),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
