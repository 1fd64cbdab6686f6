//! Error types for OAuth protocol operations

/// Errors from PKCE generation, URL construction, and token endpoint calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The OS secure-random source is unavailable. Fatal, non-retryable.
    #[error("secure random source unavailable: {0}")]
    SecretGeneration(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// Non-2xx response from the token endpoint.
    #[error("token endpoint returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// 2xx response that lacks `access_token` or is not valid JSON.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("token endpoint request timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl Error {
    /// Whether a caller may reasonably retry the operation.
    ///
    /// 429 and 5xx provider responses and timeouts are retryable; 4xx
    /// rejections, malformed responses, and secret-generation failures
    /// are not. Retries happen in the caller layer, never inside this
    /// crate: an authorization code is single-use, and re-sending one
    /// after a rejection would fail at the provider.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Provider { status, .. } => *status == 429 || *status >= 500,
            Error::Timeout => true,
            _ => false,
        }
    }
}

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        assert!(
            Error::Provider {
                status: 429,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            Error::Provider {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(Error::Timeout.is_retryable());
    }

    #[test]
    fn client_rejections_are_not_retryable() {
        assert!(
            !Error::Provider {
                status: 400,
                body: "invalid_grant".into()
            }
            .is_retryable()
        );
        assert!(!Error::MalformedResponse("missing access_token".into()).is_retryable());
        assert!(!Error::SecretGeneration("entropy pool closed".into()).is_retryable());
    }

    #[test]
    fn provider_error_display_includes_status_and_body() {
        let err = Error::Provider {
            status: 400,
            body: r#"{"error":"invalid_grant"}"#.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"), "got: {msg}");
        assert!(msg.contains("invalid_grant"), "got: {msg}");
    }
}
