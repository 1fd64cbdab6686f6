//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults. The client id is
//! a public PKCE identifier, not a secret, so it may live in the TOML
//! directly; `SPOTIFY_CLIENT_ID` overrides it when set. Endpoints default
//! to the Spotify accounts service and are overridable so tests can point
//! the controller at a local mock.

use std::path::Path;
use std::time::Duration;

use common::{Error, Result};
use serde::Deserialize;
use spotify_auth::constants::{AUTHORIZE_ENDPOINT, DEFAULT_SCOPES, TOKEN_ENDPOINT};

/// Auth flow configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_authorize_endpoint")]
    pub authorize_endpoint: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    /// How long before expiry a credential counts as renewal-due.
    #[serde(default = "default_renewal_skew_secs")]
    pub renewal_skew_secs: u64,
    /// How long a pending authorization stays resumable.
    #[serde(default = "default_pending_ttl_secs")]
    pub pending_ttl_secs: u64,
    /// Request timeout for token endpoint calls.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

fn default_authorize_endpoint() -> String {
    AUTHORIZE_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    TOKEN_ENDPOINT.to_string()
}

fn default_renewal_skew_secs() -> u64 {
    300
}

fn default_pending_ttl_secs() -> u64 {
    600
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl AuthConfig {
    /// Construct a config with defaults for everything but the two
    /// host-specific values. Programmatic alternative to `load`.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: default_scopes(),
            authorize_endpoint: default_authorize_endpoint(),
            token_endpoint: default_token_endpoint(),
            renewal_skew_secs: default_renewal_skew_secs(),
            pending_ttl_secs: default_pending_ttl_secs(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Load configuration from a TOML file, then overlay environment
    /// variables.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AuthConfig = toml::from_str(&contents)?;
        config.apply_env_overlay(std::env::var("SPOTIFY_CLIENT_ID").ok());
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overlay(&mut self, client_id: Option<String>) {
        if let Some(id) = client_id.filter(|id| !id.trim().is_empty()) {
            self.client_id = id;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config("client_id must not be empty".into()));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(Error::Config("redirect_uri must not be empty".into()));
        }
        Ok(())
    }

    pub fn renewal_skew(&self) -> Duration {
        Duration::from_secs(self.renewal_skew_secs)
    }

    pub fn pending_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_toml_gets_defaults() {
        let file = write_config(
            r#"
            client_id = "abc123"
            redirect_uri = "https://example.org/callback"
            "#,
        );
        let config = AuthConfig::load(file.path()).unwrap();
        assert_eq!(config.client_id, "abc123");
        assert_eq!(config.authorize_endpoint, AUTHORIZE_ENDPOINT);
        assert_eq!(config.token_endpoint, TOKEN_ENDPOINT);
        assert_eq!(config.renewal_skew_secs, 300);
        assert_eq!(config.pending_ttl_secs, 600);
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(
            config.scopes,
            vec!["user-read-playback-state", "user-read-currently-playing"]
        );
    }

    #[test]
    fn explicit_values_override_defaults() {
        let file = write_config(
            r#"
            client_id = "abc123"
            redirect_uri = "https://example.org/callback"
            scopes = ["user-read-private"]
            renewal_skew_secs = 60
            token_endpoint = "http://localhost:9999/token"
            "#,
        );
        let config = AuthConfig::load(file.path()).unwrap();
        assert_eq!(config.scopes, vec!["user-read-private"]);
        assert_eq!(config.renewal_skew_secs, 60);
        assert_eq!(config.token_endpoint, "http://localhost:9999/token");
    }

    #[test]
    fn env_overlay_wins_over_file_value() {
        let mut config = AuthConfig::new("file-id", "https://example.org/callback");
        config.apply_env_overlay(Some("env-id".into()));
        assert_eq!(config.client_id, "env-id");
    }

    #[test]
    fn blank_env_value_is_ignored() {
        let mut config = AuthConfig::new("file-id", "https://example.org/callback");
        config.apply_env_overlay(Some("  ".into()));
        assert_eq!(config.client_id, "file-id");
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let file = write_config(
            r#"
            client_id = ""
            redirect_uri = "https://example.org/callback"
            "#,
        );
        let err = AuthConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("client_id"), "got: {err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AuthConfig::load(Path::new("/nonexistent/auth.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let file = write_config("client_id = [not valid");
        let err = AuthConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn duration_accessors() {
        let config = AuthConfig::new("abc", "https://example.org/callback");
        assert_eq!(config.renewal_skew(), Duration::from_secs(300));
        assert_eq!(config.pending_ttl(), Duration::from_secs(600));
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }
}
