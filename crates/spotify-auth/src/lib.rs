//! Spotify OAuth protocol library
//!
//! Provides PKCE secret generation, authorization-URL construction, and
//! token exchange/refresh against the Spotify accounts service. This crate
//! is the protocol leaf: it has no storage and no flow orchestration — the
//! session crate drives it — so it can be tested and used independently.
//!
//! Credential flow:
//! 1. Controller calls `pkce::random_string()` for state and verifier,
//!    then `pkce::compute_challenge()`
//! 2. User authorizes via `authorize::build_authorization_url()`
//! 3. Controller calls `TokenExchangeClient::exchange_code()` with the
//!    authorization code returned on the redirect
//! 4. `TokenExchangeClient::refresh()` renews the access token before
//!    expiry for as long as a refresh token is held

pub mod authorize;
pub mod constants;
pub mod error;
pub mod pkce;
pub mod token;

pub use authorize::build_authorization_url;
pub use constants::*;
pub use error::{Error, Result};
pub use pkce::{compute_challenge, random_string};
pub use token::{TokenExchangeClient, TokenResponse};
