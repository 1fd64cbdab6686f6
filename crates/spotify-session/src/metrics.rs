//! Session metrics
//!
//! Counters for the auth lifecycle:
//!
//! - `auth_logins_total` (counter): label `outcome`
//! - `auth_refreshes_total` (counter): label `outcome`
//! - `auth_reauth_required_total` (counter)
//!
//! This crate only records against the `metrics` facade; hosts that want
//! exposition install their own recorder. Without one, these are no-ops.

/// Record a completed login attempt with its outcome label.
pub(crate) fn record_login(outcome: &str) {
    metrics::counter!("auth_logins_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a completed refresh attempt with its outcome label.
pub(crate) fn record_refresh(outcome: &str) {
    metrics::counter!("auth_refreshes_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record that a caller was told to re-authenticate.
pub(crate) fn record_reauth_required() {
    metrics::counter!("auth_reauth_required_total").increment(1);
}
