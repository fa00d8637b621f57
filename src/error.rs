//! Error handling for the dashboard

use laundry_admin_auth::AuthError;
use laundry_admin_postgrest::PostgrestError;
use laundry_admin_realtime::RealtimeError;
use thiserror::Error;

/// Unified error type for the dashboard
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{}", .0.message())]
    Database(#[from] PostgrestError),

    #[error("Realtime error: {0}")]
    Realtime(#[from] RealtimeError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Login rejected; the message carries the accepted credentials hint
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    pub fn config<T: std::fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_shows_api_message() {
        let err: Error = PostgrestError::InvalidParameters("bad filter".to_string()).into();
        assert_eq!(err.to_string(), PostgrestError::InvalidParameters("bad filter".to_string()).message());
    }

    #[test]
    fn test_auth_error_is_transparent() {
        let err: Error = AuthError::ApiError("Email not confirmed".to_string()).into();
        assert_eq!(err.to_string(), "Email not confirmed");
    }
}
