//! Credential and pending-authorization types
//!
//! `Credential` is the durable outcome of a completed flow; a
//! `PendingAuthorization` exists only between `login()` and the terminal
//! outcome of the code exchange. Both keep their secrets in
//! `common::Secret` so Debug output and log lines never leak them.

use std::time::Duration;

use common::Secret;
use spotify_auth::constants::{STATE_LENGTH, VERIFIER_LENGTH};
use spotify_auth::pkce;

/// An access credential with an absolute expiry.
///
/// `expires_at` is a unix timestamp in milliseconds: the moment the access
/// token becomes unusable. Computed at storage time from the token
/// endpoint's `expires_in` delta plus the current time.
#[derive(Debug, Clone)]
pub struct Credential {
    access_token: Secret<String>,
    refresh_token: Option<Secret<String>>,
    expires_at: u64,
}

impl Credential {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_at: u64) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.map(Secret::new),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose()
    }

    /// Refresh token, if the provider issued one. Absent means expiry
    /// forces re-login: the credential cannot be silently renewed.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|t| t.expose().as_str())
    }

    /// Expiration as unix timestamp in milliseconds.
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Whether the credential must be renewed before use.
    ///
    /// True once `now >= expires_at - skew`. The skew keeps a token from
    /// being handed out so close to expiry that it dies mid-request.
    pub fn renewal_due(&self, now_millis: u64, skew: Duration) -> bool {
        now_millis + skew.as_millis() as u64 >= self.expires_at
    }
}

/// In-flight authorization flow secrets.
///
/// Exactly zero or one exists at a time; starting a new login discards any
/// prior one. The verifier is persisted under the `code_verifier` store key
/// for the duration of the redirect round-trip; `state` and `created_at`
/// live with the controller.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub state: String,
    code_verifier: Secret<String>,
    pub code_challenge: String,
    pub created_at: u64,
}

impl PendingAuthorization {
    /// Generate fresh flow secrets: CSRF state, code verifier, and the
    /// S256 challenge derived from the verifier.
    pub fn generate(now_millis: u64) -> Result<Self, spotify_auth::Error> {
        let state = pkce::random_string(STATE_LENGTH)?;
        let code_verifier = pkce::random_string(VERIFIER_LENGTH)?;
        let code_challenge = pkce::compute_challenge(&code_verifier);
        Ok(Self {
            state,
            code_verifier: code_verifier.into(),
            code_challenge,
            created_at: now_millis,
        })
    }

    pub fn code_verifier(&self) -> &str {
        self.code_verifier.expose()
    }

    /// Whether the flow has aged past its TTL. A stale flow is discarded
    /// rather than resumed: the authorization server will have expired the
    /// consent session long ago.
    pub fn is_stale(&self, now_millis: u64, ttl: Duration) -> bool {
        now_millis.saturating_sub(self.created_at) >= ttl.as_millis() as u64
    }
}

/// Derived session state, published to subscribers. Never persisted: the
/// store holds only the serialized credential/verifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    LoggingIn,
    LoggedIn,
    Refreshing,
}

impl AuthState {
    /// Status label for logging and health reporting.
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::LoggedOut => "logged_out",
            AuthState::LoggingIn => "logging_in",
            AuthState::LoggedIn => "logged_in",
            AuthState::Refreshing => "refreshing",
        }
    }
}
