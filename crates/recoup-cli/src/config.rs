//! Credential and endpoint resolution.

use std::fmt::{self, Debug, Formatter};

use reqwest::Url;

use crate::client::{CliError, CliResult};

pub(crate) const API_KEY_ENV: &str = "RECOUP_API_KEY";
pub(crate) const API_URL_ENV: &str = "RECOUP_API_URL";
pub(crate) const DEFAULT_API_URL: &str = "https://recoup-api.vercel.app";

/// Static API key sent with every request.
#[derive(Clone)]
pub(crate) struct ApiKey(String);

impl ApiKey {
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("ApiKey(***)")
    }
}

/// Connection settings resolved once per process.
#[derive(Debug, Clone)]
pub(crate) struct ApiConfig {
    pub(crate) base_url: Url,
    pub(crate) api_key: ApiKey,
}

impl ApiConfig {
    /// Resolve settings from flag/environment values. Empty values count as unset.
    pub(crate) fn resolve(api_key: Option<&str>, api_url: Option<&str>) -> CliResult<Self> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| CliError::validation(missing_api_key_message()))?;

        let raw_url = api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL);
        let base_url = parse_url(raw_url).map_err(CliError::validation)?;

        Ok(Self {
            base_url,
            api_key: ApiKey(api_key.to_string()),
        })
    }
}

fn missing_api_key_message() -> String {
    format!(
        "{API_KEY_ENV} environment variable is not set.\nSet it with: export {API_KEY_ENV}=your-api-key"
    )
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid API URL '{input}': {err}"))
}
