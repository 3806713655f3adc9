//! Response envelopes shared by every tool.
//!
//! Success bodies are flattened under a `schemaVersion` marker; failures use
//! [`ErrorEnvelope`]. Callers tell the two apart by the `error` key.

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::SCHEMA_VERSION;
use tracing::warn;

/// Successful response: `{schemaVersion, ...body}`
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    #[serde(rename = "schemaVersion")]
    pub schema_version: &'static str,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn new(body: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            body,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub source: String,
}

/// Failure response: `{schemaVersion, error: {code, message, source}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
    pub error: ErrorBody,
}

impl ErrorEnvelope {
    pub fn new(source: &str, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                source: source.to_string(),
            },
        }
    }

    pub fn from_error(source: &str, error: &ToolError) -> Self {
        Self::new(source, error.code(), error.to_string())
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "schemaVersion": self.schema_version,
            "error": {
                "code": self.error.code,
                "message": self.error.message,
                "source": self.error.source,
            }
        })
    }
}

/// Render a tool outcome as JSON, success or failure.
///
/// `source` names the catalog (or component) blamed in the error envelope.
pub fn respond<T: Serialize>(source: &str, outcome: Result<T, ToolError>) -> Value {
    match outcome {
        Ok(body) => match serde_json::to_value(Envelope::new(body)) {
            Ok(value) => value,
            Err(e) => ErrorEnvelope::new(source, "UNEXPECTED", e.to_string()).to_value(),
        },
        Err(e) => {
            warn!(source, code = %e.code(), error = %e, "Tool call failed");
            ErrorEnvelope::from_error(source, &e).to_value()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Body {
        cleared: usize,
    }

    #[test]
    fn test_success_is_flattened_and_stamped() {
        let value = respond("anilist", Ok(Body { cleared: 3 }));
        assert_eq!(value, json!({"schemaVersion": "1.0.0", "cleared": 3}));
    }

    #[test]
    fn test_failure_envelope_shape() {
        let value = respond::<Body>("jikan", Err(ToolError::upstream(404, "https://x")));
        assert_eq!(value["schemaVersion"], "1.0.0");
        assert_eq!(value["error"]["code"], "UPSTREAM_404");
        assert_eq!(value["error"]["source"], "jikan");
        assert_eq!(value["error"]["message"], "404 Client Error for url: https://x");
    }

    #[test]
    fn test_error_envelope_round_trips_through_value() {
        let envelope = ErrorEnvelope::new("router", "BAD_REQUEST", "Empty text");
        let parsed: ErrorEnvelope = serde_json::from_value(envelope.to_value()).unwrap();
        assert_eq!(parsed, envelope);
    }
}
