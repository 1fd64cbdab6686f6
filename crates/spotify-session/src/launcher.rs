//! Redirect flow boundary
//!
//! The interactive half of the authorization flow happens in a browser
//! context this crate does not own: a browser-extension identity API, a
//! desktop deep-link handler, a loopback listener. `RedirectFlowLauncher`
//! is that boundary. A launch resolves exactly once; there is no retry of
//! the same launch — a fresh `login()` starts a fresh flow.

use std::future::Future;
use std::pin::Pin;

use url::Url;

use crate::error::{Error, Result};

/// Terminal outcome of one redirect flow.
#[derive(Debug, Clone)]
pub enum LaunchOutcome {
    /// The flow reached the redirect URI; the full redirect URL, query
    /// string included.
    Redirected(String),
    /// The user dismissed the flow without completing it.
    Cancelled,
    /// The launcher itself failed (window blocked, handler crashed).
    Failed(String),
}

/// Opens the authorization URL in an interactive context outside this
/// crate's control and resolves exactly once.
///
/// Uses a `Pin<Box<dyn Future>>` return type for dyn-compatibility
/// (`Arc<dyn RedirectFlowLauncher>`). Dropping the returned future cancels
/// the flow as far as this crate is concerned; whatever browser UI the
/// host opened is the host's to clean up.
pub trait RedirectFlowLauncher: Send + Sync {
    fn launch(
        &self,
        authorization_url: &str,
    ) -> Pin<Box<dyn Future<Output = LaunchOutcome> + Send + '_>>;
}

/// Query parameters the authorization server may put on the redirect.
#[derive(Debug, Default)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Extract `code`, `state`, and `error` from a redirect URL.
pub fn parse_redirect(redirect_url: &str) -> Result<RedirectParams> {
    let url = Url::parse(redirect_url)
        .map_err(|e| Error::Launcher(format!("unparseable redirect URL: {e}")))?;

    let mut params = RedirectParams::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => params.code = Some(value.into_owned()),
            "state" => params.state = Some(value.into_owned()),
            "error" => params.error = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(params)
}
