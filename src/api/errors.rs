use std::fmt::Display;

use serde::Deserialize;
use thiserror::Error;

/// How a backend call failed.
///
/// Only two broad classes matter to callers: the request never got a response (`Network`), or
/// the server answered with a failure. `Unauthorized` is split out because it also invalidates
/// the stored session token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request failed with status code 401")]
    Unauthorized {
        message: Option<String>
    },
    #[error("Request failed with status code {status}")]
    Server {
        status: u16,
        message: Option<String>
    },
    #[error("Invalid response body: {0}")]
    Decode(String)
}

impl ApiError {
    pub fn network(error: impl Display) -> Self {
        Self::Network(error.to_string())
    }

    pub fn decode(error: impl Display) -> Self {
        Self::Decode(error.to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: Some(message.into()) }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Server { status: 400, message: Some(message.into()) }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Server { status: 404, message: Some(message.into()) }
    }

    /// Classifies a non-success response, pulling a human readable message out of the body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body);

        if status == 401 {
            Self::Unauthorized { message }
        } else {
            Self::Server { status, message }
        }
    }

    /// The message the server attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Server { message, .. } => message.as_deref(),
            Self::Network(_) | Self::Decode(_) => None
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>
}

#[derive(Deserialize)]
struct ErrorEntry {
    msg: String
}

/// Checks `errors[0].msg`, then `message`, then `msg`.
fn extract_message(body: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(body).ok()?;

    body.errors.into_iter().next().map(|entry| entry.msg)
        .or(body.message)
        .or(body.msg)
}
