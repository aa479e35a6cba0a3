use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that can occur when using the Supabase client.
#[derive(Error, Debug)]
pub enum SupabaseError {
    /// Client construction failed (missing or malformed URL or API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Header name or value rejected by the HTTP layer
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response returned by a backend service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Auth API failure or missing session
    #[error("Authentication error: {0}")]
    Auth(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// WebSocket protocol error (connection failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Realtime channel error (subscription failed, invalid topic, etc.)
    #[error("Channel error: {0}")]
    Channel(String),

    /// Operation timed out
    #[error("Timeout error")]
    Timeout,

    /// Attempted a realtime operation while not connected to the server
    #[error("Not connected")]
    NotConnected,
}

impl SupabaseError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for SupabaseError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for SupabaseError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// Convenience type alias for `Result<T, SupabaseError>`.
pub type Result<T> = std::result::Result<T, SupabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn fail() -> Result<()> {
        Err(SupabaseError::config("err"))
    }

    #[test]
    fn test_config_error_is_matchable() {
        match fail() {
            Err(SupabaseError::Config(message)) => assert_eq!(message, "err"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_display() {
        let err = SupabaseError::Api {
            status: 404,
            message: "relation does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "API error (404): relation does not exist");
    }

    #[test]
    fn test_invalid_header_value_conversion() {
        let err: SupabaseError = reqwest::header::HeaderValue::from_str("bad\nvalue")
            .unwrap_err()
            .into();
        assert!(matches!(err, SupabaseError::InvalidHeader(_)));
    }
}
