//! Shared configuration/IO error type

use thiserror::Error;

/// Error for configuration loading and other shared plumbing.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using the shared Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_carries_message() {
        let err = Error::Config("client_id must not be empty".into());
        assert_eq!(
            err.to_string(),
            "configuration error: client_id must not be empty"
        );
    }

    #[test]
    fn io_error_converts() {
        let err: Error =
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file").into();
        assert!(err.to_string().starts_with("I/O error:"), "got: {err}");
    }

    #[test]
    fn toml_error_converts() {
        let parse = toml::from_str::<toml::Value>("not = = valid").unwrap_err();
        let err: Error = parse.into();
        assert!(err.to_string().starts_with("TOML parse error:"), "got: {err}");
    }
}
