//! Proactive background token renewal
//!
//! Spawns a periodic task that renews the credential when it enters the
//! renewal skew, so most expiries are handled before a request needs the
//! token. The task calls the controller's renew-if-due path, which shares
//! the session lock with `access_token()` — the two can never race into a
//! second token-endpoint call.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::controller::AuthController;

/// Spawn a background task that renews the credential before expiry.
///
/// Runs every `interval`. When the controller is logged out or the
/// credential is still fresh, a cycle is a no-op. Failures are logged and
/// left for the next cycle or the next `access_token()` caller; nothing is
/// retried in a tight loop here.
///
/// Returns a `JoinHandle` for the spawned task; abort it on shutdown.
pub fn spawn_refresh_task(
    controller: Arc<AuthController>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Skip the immediate first tick — state was just hydrated
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match controller.renew_if_due().await {
                Ok(true) => debug!("background renewal refreshed the credential"),
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "background renewal failed, will retry next cycle");
                }
            }
        }
    })
}
