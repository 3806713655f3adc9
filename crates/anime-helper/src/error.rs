//! Error taxonomy for tool operations.
//!
//! Every failure inside a tool is a [`ToolError`]; at the tool boundary it
//! is rendered into an [`ErrorEnvelope`](crate::envelope::ErrorEnvelope)
//! with one of the codes `TIMEOUT`, `UPSTREAM_<status>`, `BAD_REQUEST` or
//! `UNEXPECTED`.

use crate::api::TransportError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// The final attempt timed out
    #[error("Upstream timed out")]
    Timeout,

    /// Upstream answered with a non-success status.
    /// `status` is 0 when the status is unknown.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Caller-supplied arguments are insufficient or invalid
    #[error("{0}")]
    BadRequest(String),

    /// GraphQL-level `errors` list, serialized
    #[error("{0}")]
    GraphQl(String),

    /// Anything else, including payloads that fail to decode
    #[error("{0}")]
    Unexpected(String),
}

impl ToolError {
    pub fn upstream(status: u16, url: &str) -> Self {
        let kind = if (400..500).contains(&status) {
            "Client Error"
        } else {
            "Server Error"
        };
        ToolError::Upstream {
            status,
            message: format!("{} {} for url: {}", status, kind, url),
        }
    }

    /// Envelope code for this failure
    pub fn code(&self) -> String {
        match self {
            ToolError::Timeout => "TIMEOUT".to_string(),
            ToolError::Upstream { status, .. } => format!("UPSTREAM_{}", status),
            ToolError::BadRequest(_) => "BAD_REQUEST".to_string(),
            ToolError::GraphQl(_) | ToolError::Unexpected(_) => "UNEXPECTED".to_string(),
        }
    }
}

impl From<TransportError> for ToolError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout => ToolError::Timeout,
            TransportError::Status { status } => ToolError::Upstream {
                status,
                message: e.to_string(),
            },
            TransportError::Network(message) => ToolError::Unexpected(message),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        ToolError::Unexpected(format!("Malformed upstream payload: {}", e))
    }
}
