//! Response envelope and typed payload views for the Recoup API.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::ApiError;

/// Outcome of one API call once both the transport status and the body's
/// `status` discriminator have been checked.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ApiReply {
    Success(Envelope),
    Failure { status: StatusCode, message: String },
}

impl ApiReply {
    /// Classify a parsed body. A non-2xx status or `"status": "error"` is a failure.
    pub(crate) fn interpret(status: StatusCode, body: Value) -> Self {
        let flagged = body.get("status").and_then(Value::as_str) == Some("error");
        if status.is_success() && !flagged {
            Self::Success(Envelope(body))
        } else {
            Self::Failure {
                status,
                message: failure_message(status, &body),
            }
        }
    }

    pub(crate) fn into_result(self) -> Result<Envelope, ApiError> {
        match self {
            Self::Success(envelope) => Ok(envelope),
            Self::Failure { status, message } => Err(ApiError::Rejected { status, message }),
        }
    }
}

/// Message priority: `error`, then `message`, then the status code.
fn failure_message(status: StatusCode, body: &Value) -> String {
    ["error", "message"]
        .into_iter()
        .find_map(|key| {
            body.get(key)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
        })
        .map_or_else(
            || format!("Request failed: {}", status.as_u16()),
            str::to_string,
        )
}

/// Top-level JSON body of a successful reply.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Envelope(Value);

impl Envelope {
    pub(crate) const fn as_value(&self) -> &Value {
        &self.0
    }

    pub(crate) fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Array payload under `key`; missing, `null`, or non-array values yield no rows.
    pub(crate) fn collection(&self, key: &str) -> Vec<Value> {
        match self.field(key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Decode the payload stored under `key` (absent decodes as `null`).
    pub(crate) fn decode<T: DeserializeOwned>(&self, key: &'static str) -> Result<T, ApiError> {
        let value = self.field(key).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|source| ApiError::UnexpectedShape { field: key, source })
    }

    /// Decode the whole envelope into a typed view.
    pub(crate) fn decode_body<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.0.clone()).map_err(|source| ApiError::UnexpectedShape {
            field: "body",
            source,
        })
    }
}

/// Identifiers are kept as raw JSON so numeric ids print like table cells.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountIdentity {
    #[serde(rename = "accountId")]
    pub(crate) account_id: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedChat {
    pub(crate) id: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SandboxRecord {
    #[serde(rename = "sandboxId")]
    pub(crate) sandbox_id: Value,
}

/// Server-defined analysis configuration. Every field tolerates `null`.
#[derive(Debug, Deserialize)]
pub(crate) struct Preset {
    #[serde(default)]
    pub(crate) name: Value,
    #[serde(default)]
    pub(crate) description: Value,
    #[serde(default, rename = "requiresAudio")]
    pub(crate) requires_audio: Value,
    #[serde(default, rename = "responseFormat")]
    pub(crate) response_format: Value,
}

impl Preset {
    pub(crate) fn format_tag(&self) -> &'static str {
        if self.response_format.as_str() == Some("json") {
            "(JSON)"
        } else {
            "(text)"
        }
    }

    pub(crate) fn needs_audio(&self) -> bool {
        self.requires_audio.as_bool().unwrap_or(false)
    }
}

/// Result of `/api/music/analyze`; `report` wins over `response` when present.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnalysisReply {
    #[serde(default)]
    pub(crate) report: Option<Value>,
    #[serde(default)]
    pub(crate) response: Option<Value>,
    #[serde(default)]
    pub(crate) elapsed_seconds: Option<Value>,
}
