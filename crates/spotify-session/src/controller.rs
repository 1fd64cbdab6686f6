//! Auth controller state machine
//!
//! One `AuthController` instance per process owns the session state;
//! everything needing credentials gets the controller injected and calls
//! `access_token()`. The session lives behind a tokio Mutex, which is what
//! serializes conflicting operations: concurrent `access_token()` callers
//! queue on the lock while one of them refreshes, then read the renewed
//! credential without a second token-endpoint call.
//!
//! The lock is NOT held across the interactive redirect flow — a login can
//! sit in the browser for minutes, and `access_token()`/`logout()` must
//! stay responsive meanwhile. A completing flow re-acquires the lock and
//! checks that its pending authorization is still the current one; if a
//! newer `login()` replaced it, the completion is discarded.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};
use url::Url;

use spotify_auth::TokenExchangeClient;
use spotify_auth::authorize::build_authorization_url;

use crate::config::AuthConfig;
use crate::credential::{AuthState, Credential, PendingAuthorization};
use crate::error::{Error, Result};
use crate::launcher::{LaunchOutcome, RedirectFlowLauncher, parse_redirect};
use crate::metrics;
use crate::store::{CredentialStore, StorageError, keys};

/// In-memory session state. `Refreshing` is not a variant here: a refresh
/// happens entirely under the session lock and is only visible through the
/// published `AuthState`.
enum Session {
    LoggedOut,
    LoggingIn(PendingAuthorization),
    LoggedIn(Credential),
}

impl Session {
    fn state(&self) -> AuthState {
        match self {
            Session::LoggedOut => AuthState::LoggedOut,
            Session::LoggingIn(_) => AuthState::LoggingIn,
            Session::LoggedIn(_) => AuthState::LoggedIn,
        }
    }
}

/// Orchestrates the credential lifecycle. Sole public surface of the
/// session crate; sole reader and writer of the credential store.
pub struct AuthController {
    config: AuthConfig,
    tokens: TokenExchangeClient,
    store: Arc<dyn CredentialStore>,
    launcher: Arc<dyn RedirectFlowLauncher>,
    session: Mutex<Session>,
    state_tx: watch::Sender<AuthState>,
}

impl AuthController {
    /// Construct the controller and hydrate state from the store.
    ///
    /// An orphaned `code_verifier` from a login that died with a previous
    /// process is discarded: its paired `state` did not survive, so the
    /// flow can never complete. A persisted token is trusted; a missing or
    /// garbled expiry makes it renewal-due immediately rather than
    /// trusting an unknown lifetime.
    pub async fn initialize(
        config: AuthConfig,
        store: Arc<dyn CredentialStore>,
        launcher: Arc<dyn RedirectFlowLauncher>,
    ) -> Result<Self> {
        let tokens = TokenExchangeClient::new(
            config.token_endpoint.clone(),
            config.client_id.clone(),
            config.redirect_uri.clone(),
            config.http_timeout(),
        )?;

        let persisted = store.get(keys::ALL).await?;
        if persisted.contains_key(keys::CODE_VERIFIER) {
            info!("discarding pending authorization left by a previous session");
            store.remove(&[keys::CODE_VERIFIER]).await?;
        }

        let session = match persisted.get(keys::TOKEN) {
            Some(token) => {
                let expires_at = persisted
                    .get(keys::TOKEN_EXPIRY)
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(0);
                Session::LoggedIn(Credential::new(
                    token.clone(),
                    persisted.get(keys::REFRESH_TOKEN).cloned(),
                    expires_at,
                ))
            }
            None => Session::LoggedOut,
        };

        info!(state = session.state().label(), "auth controller initialized");
        let (state_tx, _) = watch::channel(session.state());
        Ok(Self {
            config,
            tokens,
            store,
            launcher,
            session: Mutex::new(session),
            state_tx,
        })
    }

    /// Run one full authorization flow: generate flow secrets, hand the
    /// authorization URL to the host's launcher, and exchange the code
    /// carried by the redirect.
    ///
    /// Starting a login discards any prior pending authorization and any
    /// persisted credential. Every failure reverts to `LoggedOut`; the
    /// authorization code is never re-sent, so a failed exchange requires
    /// calling `login()` again.
    pub async fn login(&self) -> Result<()> {
        let (auth_url, flow_state) = self.begin_login().await?;

        // Interactive flow; the session lock is not held here.
        let outcome = self.launcher.launch(auth_url.as_str()).await;

        match self.complete_login(&flow_state, outcome).await {
            Ok(()) => {
                metrics::record_login("completed");
                Ok(())
            }
            Err(e) => {
                metrics::record_login(login_outcome_label(&e));
                Err(e)
            }
        }
    }

    async fn begin_login(&self) -> Result<(Url, String)> {
        let mut session = self.session.lock().await;
        if matches!(*session, Session::LoggingIn(_)) {
            debug!("superseding pending authorization with a new login");
        }

        let pending = PendingAuthorization::generate(now_millis())?;
        let auth_url = build_authorization_url(
            &self.config.authorize_endpoint,
            &self.config.client_id,
            &self.config.scopes,
            &self.config.redirect_uri,
            &pending.state,
            &pending.code_challenge,
        )?;

        // A new flow invalidates whatever came before it: prior credential
        // keys and any earlier verifier both go before the new verifier
        // lands, so the store never mixes material from two attempts.
        if let Err(e) = self.persist_verifier(&pending).await {
            *session = Session::LoggedOut;
            self.publish(AuthState::LoggedOut);
            return Err(e.into());
        }

        let flow_state = pending.state.clone();
        *session = Session::LoggingIn(pending);
        self.publish(AuthState::LoggingIn);
        info!("login flow started");
        Ok((auth_url, flow_state))
    }

    async fn complete_login(&self, flow_state: &str, outcome: LaunchOutcome) -> Result<()> {
        let mut session = self.session.lock().await;

        // A newer login() may have replaced the pending authorization while
        // this flow sat in the browser. If so, this completion is dead:
        // return without touching the newer flow's state or verifier.
        let pending = match &*session {
            Session::LoggingIn(p) if p.state == flow_state => p.clone(),
            _ => {
                debug!("authorization flow superseded, discarding completion");
                return Err(Error::Superseded);
            }
        };

        let redirect_url = match outcome {
            LaunchOutcome::Redirected(url) => url,
            LaunchOutcome::Cancelled => {
                debug!("authorization flow cancelled by user");
                self.abandon_login(&mut session).await;
                return Err(Error::LauncherCancelled);
            }
            LaunchOutcome::Failed(message) => {
                warn!(error = %message, "redirect flow launcher failed");
                self.abandon_login(&mut session).await;
                return Err(Error::Launcher(message));
            }
        };

        if pending.is_stale(now_millis(), self.config.pending_ttl()) {
            warn!("pending authorization aged past TTL, discarding");
            self.abandon_login(&mut session).await;
            return Err(Error::StalePending);
        }

        let params = match parse_redirect(&redirect_url) {
            Ok(params) => params,
            Err(e) => {
                self.abandon_login(&mut session).await;
                return Err(e);
            }
        };

        if let Some(provider_error) = params.error {
            self.abandon_login(&mut session).await;
            return if provider_error == "access_denied" {
                debug!("user denied authorization");
                Err(Error::LauncherCancelled)
            } else {
                warn!(error = %provider_error, "authorization server returned an error");
                Err(Error::Launcher(provider_error))
            };
        }

        match params.state.as_deref() {
            Some(echoed) if echoed == pending.state => {}
            echoed => {
                warn!(
                    expected = %pending.state,
                    received = echoed.unwrap_or("<none>"),
                    "redirect state mismatch"
                );
                self.abandon_login(&mut session).await;
                return Err(Error::StateMismatch);
            }
        }

        let Some(code) = params.code else {
            self.abandon_login(&mut session).await;
            return Err(Error::MissingCode);
        };

        let response = match self.tokens.exchange_code(&code, pending.code_verifier()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "authorization code exchange failed");
                self.abandon_login(&mut session).await;
                return Err(Error::Protocol(e));
            }
        };

        let expires_at = now_millis() + response.expires_in * 1000;
        let credential = Credential::new(response.access_token, response.refresh_token, expires_at);

        if let Err(e) = self.persist_credential(&credential).await {
            *session = Session::LoggedOut;
            self.publish(AuthState::LoggedOut);
            return Err(e.into());
        }

        info!("login flow completed");
        *session = Session::LoggedIn(credential);
        self.publish(AuthState::LoggedIn);
        Ok(())
    }

    /// The access token for an authenticated request.
    ///
    /// Serves from cache while the credential is outside the renewal skew.
    /// Once renewal is due, refreshes under the session lock — concurrent
    /// callers wait on the lock and then read the renewed credential, so N
    /// callers produce exactly one refresh. Never returns a token past its
    /// expiry.
    pub async fn access_token(&self) -> Result<String> {
        let mut session = self.session.lock().await;
        let credential = match &*session {
            Session::LoggedOut | Session::LoggingIn(_) => {
                metrics::record_reauth_required();
                return Err(Error::ReauthRequired);
            }
            Session::LoggedIn(credential) => credential.clone(),
        };

        if !credential.renewal_due(now_millis(), self.config.renewal_skew()) {
            return Ok(credential.access_token().to_string());
        }

        self.renew_locked(&mut session, &credential).await
    }

    /// Renew the credential if it is inside the renewal skew and holds a
    /// refresh token. Returns whether a refresh ran. Used by the
    /// background refresh task; shares the session lock with
    /// `access_token()`, so the two can never double-refresh.
    pub async fn renew_if_due(&self) -> Result<bool> {
        let mut session = self.session.lock().await;
        let credential = match &*session {
            Session::LoggedIn(credential) => credential.clone(),
            _ => return Ok(false),
        };

        if credential.refresh_token().is_none()
            || !credential.renewal_due(now_millis(), self.config.renewal_skew())
        {
            return Ok(false);
        }

        self.renew_locked(&mut session, &credential).await.map(|_| true)
    }

    async fn renew_locked(&self, session: &mut Session, credential: &Credential) -> Result<String> {
        let Some(refresh_token) = credential.refresh_token() else {
            debug!("credential expired with no refresh token");
            if let Err(e) = self.store.remove(&[keys::TOKEN, keys::TOKEN_EXPIRY]).await {
                warn!(error = %e, "failed to clear expired credential");
            }
            *session = Session::LoggedOut;
            self.publish(AuthState::LoggedOut);
            metrics::record_reauth_required();
            return Err(Error::ReauthRequired);
        };

        self.publish(AuthState::Refreshing);
        match self.tokens.refresh(refresh_token).await {
            Ok(response) => {
                let expires_at = now_millis() + response.expires_in * 1000;
                if response.refresh_token.is_some() {
                    debug!("refresh token rotated");
                }
                // Honor a rotated refresh token; keep the old one when the
                // provider didn't send a replacement.
                let refresh = response
                    .refresh_token
                    .or_else(|| credential.refresh_token().map(String::from));
                let renewed = Credential::new(response.access_token, refresh, expires_at);

                if let Err(e) = self.persist_credential(&renewed).await {
                    *session = Session::LoggedOut;
                    self.publish(AuthState::LoggedOut);
                    return Err(e.into());
                }

                info!("access token refreshed");
                metrics::record_refresh("succeeded");
                let token = renewed.access_token().to_string();
                *session = Session::LoggedIn(renewed);
                self.publish(AuthState::LoggedIn);
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, reverting to logged out");
                metrics::record_refresh("failed");
                if let Err(remove_err) = self.store.remove(keys::ALL).await {
                    warn!(error = %remove_err, "failed to clear credential after refresh failure");
                }
                *session = Session::LoggedOut;
                self.publish(AuthState::LoggedOut);
                Err(Error::Protocol(e))
            }
        }
    }

    /// Drop the credential and clear every persisted key.
    pub async fn logout(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        self.store.remove(keys::ALL).await?;
        *session = Session::LoggedOut;
        self.publish(AuthState::LoggedOut);
        info!("logged out");
        Ok(())
    }

    /// Current session state (pull-based access for UI layers).
    pub fn current_state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state changes (push-based access for UI layers).
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    async fn persist_verifier(
        &self,
        pending: &PendingAuthorization,
    ) -> std::result::Result<(), StorageError> {
        self.store.remove(keys::ALL).await?;
        self.store
            .set(vec![(keys::CODE_VERIFIER, pending.code_verifier().to_string())])
            .await
    }

    /// Persist a credential, clearing the in-flight verifier first so the
    /// store never holds a flow's verifier alongside the credential it
    /// produced.
    async fn persist_credential(&self, credential: &Credential) -> std::result::Result<(), StorageError> {
        self.store.remove(&[keys::CODE_VERIFIER]).await?;
        let mut entries = vec![
            (keys::TOKEN, credential.access_token().to_string()),
            (keys::TOKEN_EXPIRY, credential.expires_at().to_string()),
        ];
        if let Some(refresh) = credential.refresh_token() {
            entries.push((keys::REFRESH_TOKEN, refresh.to_string()));
        }
        self.store.set(entries).await
    }

    /// Discard the pending authorization and revert to logged out. Cleanup
    /// failures are logged, not surfaced: the primary failure that got us
    /// here is what the caller needs to see.
    async fn abandon_login(&self, session: &mut Session) {
        if let Err(e) = self.store.remove(&[keys::CODE_VERIFIER]).await {
            warn!(error = %e, "failed to clear pending verifier");
        }
        *session = Session::LoggedOut;
        self.publish(AuthState::LoggedOut);
    }

    fn publish(&self, state: AuthState) {
        self.state_tx.send_replace(state);
    }
}

fn login_outcome_label(error: &Error) -> &'static str {
    match error {
        Error::LauncherCancelled => "cancelled",
        Error::StateMismatch => "state_mismatch",
        Error::Superseded => "superseded",
        _ => "failed",
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
