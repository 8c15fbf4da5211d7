//! Shared HTTP client, error types, and the reply classification for the CLI.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::{ApiReply, Envelope};

pub(crate) const HEADER_API_KEY: &str = "x-api-key";

/// Exit status for every reported failure.
pub(crate) const FAILURE_EXIT_CODE: i32 = 1;

/// CLI-level error type to distinguish local validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Failure(_) => FAILURE_EXIT_CODE,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Failure(_) => "failure",
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ApiError> for CliError {
    fn from(error: ApiError) -> Self {
        Self::failure(error)
    }
}

/// Failures raised while talking to the Recoup API.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    /// The server answered with a non-2xx status or an error envelope.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    /// The request never produced a response.
    #[error("request to {path} failed")]
    Transport {
        path: String,
        source: reqwest::Error,
    },
    /// A successful response carried a body that is not JSON.
    #[error("invalid JSON in response from {path}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
    /// The envelope did not have the shape this command expects.
    #[error("unexpected `{field}` in response")]
    UnexpectedShape {
        field: &'static str,
        source: serde_json::Error,
    },
    /// A request path could not be resolved against the base URL.
    #[error("invalid request path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

/// Application context passed to command handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppContext {
    pub(crate) api: ApiClient,
}

/// Authenticated client bound to one base URL.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client whose every request carries the API key and a JSON content type.
    pub(crate) fn new(config: &ApiConfig) -> CliResult<Self> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose())
            .map_err(|_| CliError::validation("API key contains invalid characters"))?;
        api_key.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(HEADER_API_KEY, api_key);
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Resolve `path` against the base URL. Query entries with empty values are dropped.
    pub(crate) fn endpoint(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| ApiError::InvalidPath {
                path: path.to_string(),
                reason: err.to_string(),
            })?;

        let retained: Vec<_> = query
            .unwrap_or_default()
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        if !retained.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in retained {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    pub(crate) async fn get(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<Envelope, ApiError> {
        let url = self.endpoint(path, query)?;
        tracing::debug!(method = "GET", %url, "sending request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        classify_reply(path, response).await
    }

    pub(crate) async fn post<B>(&self, path: &str, body: &B) -> Result<Envelope, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path, None)?;
        tracing::debug!(method = "POST", %url, "sending request");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        classify_reply(path, response).await
    }
}

/// Parse a response body and classify it into an envelope or an `ApiError`.
async fn classify_reply(path: &str, response: reqwest::Response) -> Result<Envelope, ApiError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(body) => body,
        Err(_) if !status.is_success() => Value::Null,
        Err(source) => {
            return Err(ApiError::Decode {
                path: path.to_string(),
                source,
            });
        }
    };

    let reply = ApiReply::interpret(status, body);
    match &reply {
        ApiReply::Success(_) => tracing::debug!(path, status = status.as_u16(), "request succeeded"),
        ApiReply::Failure { message, .. } => {
            tracing::debug!(path, status = status.as_u16(), %message, "request rejected");
        }
    }
    reply.into_result()
}
