//! OAuth token exchange and refresh
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (initial flow completion)
//! 2. Token refresh (request-time and proactive renewal)
//!
//! Both operations POST `application/x-www-form-urlencoded` bodies to the
//! token endpoint with different grant types. Neither is retried here: an
//! authorization code is single-use by provider contract, so a rejected
//! exchange requires a fresh login, and refresh retry policy belongs to
//! the caller.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time; the caller
/// converts it to an absolute unix millisecond timestamp when storing the
/// credential. `refresh_token` is optional: Spotify returns one on code
/// exchange and may omit it on refresh, in which case the previously
/// issued refresh token remains valid.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
}

/// Client for the token endpoint.
///
/// Owns a `reqwest::Client` with a bounded request timeout so a stalled
/// endpoint surfaces as `Error::Timeout` instead of hanging a login or
/// refresh indefinitely.
pub struct TokenExchangeClient {
    http: reqwest::Client,
    token_endpoint: String,
    client_id: String,
    redirect_uri: String,
}

impl TokenExchangeClient {
    /// Create a client for the given endpoint and public client id.
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("building HTTP client: {e}")))?;
        Ok(Self {
            http,
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
        })
    }

    /// Exchange an authorization code for tokens.
    ///
    /// Second step of the PKCE flow: the user authorized in the browser
    /// and the redirect carried the authorization code. The code verifier
    /// proves this client initiated the flow. Never re-send a code after
    /// a provider rejection — it has been consumed.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Result<TokenResponse> {
        debug!("exchanging authorization code");
        self.post_form(&[
            ("client_id", self.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code_verifier", verifier),
        ])
        .await
    }

    /// Refresh an access token using a refresh token.
    ///
    /// The response may carry a rotated refresh token; the caller must
    /// honor it and discard the old one when present.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        debug!("refreshing access token");
        self.post_form(&[
            ("client_id", self.client_id.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn post_form(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(params)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(map_transport)?;
        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|e| Error::MalformedResponse(e.to_string()))
    }
}

fn map_transport(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout
    } else {
        Error::Http(format!("token endpoint request failed: {e}"))
    }
}
