#[cfg(feature = "server")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
#[cfg(feature = "server")]
use serde_json::json;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhoisError {
    #[error("whois: target is empty")]
    EmptyTarget,

    #[error("whois: no whois server found for target: {0}")]
    NoServerFound(String),

    #[error("whois: connect to whois server {server} failed: {source}")]
    Connect {
        server: String,
        #[source]
        source: io::Error,
    },

    #[error("whois: send to whois server {server} failed: {source}")]
    Send {
        server: String,
        #[source]
        source: io::Error,
    },

    #[error("whois: read from whois server {server} failed: {source}")]
    Read {
        server: String,
        #[source]
        source: io::Error,
    },

    #[error("whois: response from whois server {server} exceeds {limit} bytes")]
    ResponseTooLarge { server: String, limit: usize },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl WhoisError {
    /// True when a network stage failed because its deadline expired.
    pub fn is_timeout(&self) -> bool {
        match self {
            WhoisError::Connect { source, .. }
            | WhoisError::Send { source, .. }
            | WhoisError::Read { source, .. } => source.kind() == io::ErrorKind::TimedOut,
            _ => false,
        }
    }

    /// Short label used for error metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WhoisError::EmptyTarget => "empty_target",
            WhoisError::NoServerFound(_) => "no_server_found",
            _ if self.is_timeout() => "timeout",
            WhoisError::Connect { .. } => "connect",
            WhoisError::Send { .. } => "send",
            WhoisError::Read { .. } => "read",
            WhoisError::ResponseTooLarge { .. } => "response_too_large",
            WhoisError::ConfigError(_) => "config",
        }
    }
}

/// Builds the `TimedOut` error recorded when a socket deadline expires.
pub(crate) fn deadline_elapsed(stage: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{} deadline exceeded", stage))
}

#[cfg(feature = "server")]
impl IntoResponse for WhoisError {
    fn into_response(self) -> Response {
        let status = match &self {
            WhoisError::EmptyTarget => StatusCode::BAD_REQUEST,
            WhoisError::NoServerFound(_) => StatusCode::NOT_FOUND,
            e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            WhoisError::Connect { .. }
            | WhoisError::Send { .. }
            | WhoisError::Read { .. }
            | WhoisError::ResponseTooLarge { .. } => StatusCode::BAD_GATEWAY,
            WhoisError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let error_message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
