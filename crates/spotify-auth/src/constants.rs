//! Spotify OAuth constants
//!
//! Public endpoints and flow parameters for the Spotify accounts service.
//! None of these are secrets; the client id identifies a public PKCE
//! application and comes from configuration, not from this module.

/// Authorization endpoint (interactive browser consent).
pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.spotify.com/authorize";

/// Token endpoint for code exchange and token refresh.
pub const TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";

/// Scopes required for playback-state reads.
pub const DEFAULT_SCOPES: &[&str] = &["user-read-playback-state", "user-read-currently-playing"];

/// Length of the CSRF `state` value sent on the authorization URL.
pub const STATE_LENGTH: usize = 16;

/// Length of the PKCE code verifier. RFC 7636 allows 43-128 characters.
pub const VERIFIER_LENGTH: usize = 64;
