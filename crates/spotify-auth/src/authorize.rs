//! Authorization-URL construction
//!
//! Assembles the browser consent URL from the client id, scopes, redirect
//! URI, CSRF state, and PKCE challenge. Pure function: no network, no
//! storage. All query parameters go through `Url::query_pairs_mut`, which
//! applies standard percent-encoding.

use url::Url;

use crate::error::{Error, Result};

/// Build the full authorization URL with all required OAuth parameters.
///
/// Scopes are space-joined in the order provided. The `state` parameter is
/// an opaque value the caller generates for CSRF protection; the
/// authorization server returns it unchanged on the redirect.
pub fn build_authorization_url(
    authorize_endpoint: &str,
    client_id: &str,
    scopes: &[String],
    redirect_uri: &str,
    state: &str,
    code_challenge: &str,
) -> Result<Url> {
    let mut url = Url::parse(authorize_endpoint)
        .map_err(|e| Error::InvalidEndpoint(format!("{authorize_endpoint}: {e}")))?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("scope", &scopes.join(" "))
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", state)
        .append_pair("code_challenge_method", "S256")
        .append_pair("code_challenge", code_challenge);

    Ok(url)
}
