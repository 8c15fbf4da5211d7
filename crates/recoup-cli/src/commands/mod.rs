//! Command handlers grouped by API resource.
//!
//! Every tabular listing is described by a static [`Listing`] and rendered by
//! [`handle_listing`]; resource modules only add their filters.

use std::io::Write;

use crate::client::{AppContext, CliResult};
use crate::output::{Column, OutputFormat, print_json, print_table};

pub(crate) mod accounts;
pub(crate) mod artists;
pub(crate) mod chats;
pub(crate) mod music;
pub(crate) mod organizations;
pub(crate) mod sandboxes;

/// A `GET` endpoint whose envelope carries an array rendered as a table.
#[derive(Debug)]
pub(crate) struct Listing {
    pub(crate) path: &'static str,
    pub(crate) collection: &'static str,
    pub(crate) columns: &'static [Column],
}

pub(crate) const ARTISTS: Listing = Listing {
    path: "/api/artists",
    collection: "artists",
    columns: &[
        Column::new("account_id", "ID"),
        Column::new("name", "NAME"),
        Column::new("label", "LABEL"),
    ],
};

pub(crate) const CHATS: Listing = Listing {
    path: "/api/chats",
    collection: "chats",
    columns: &[
        Column::new("id", "ID"),
        Column::new("topic", "TOPIC"),
        Column::new("updated_at", "UPDATED"),
    ],
};

pub(crate) const ORGANIZATIONS: Listing = Listing {
    path: "/api/organizations",
    collection: "organizations",
    columns: &[
        Column::new("organization_id", "ID"),
        Column::new("organization_name", "NAME"),
    ],
};

pub(crate) const SANDBOXES: Listing = Listing {
    path: "/api/sandboxes",
    collection: "sandboxes",
    columns: &[
        Column::new("sandboxId", "ID"),
        Column::new("sandboxStatus", "STATUS"),
        Column::new("createdAt", "CREATED"),
    ],
};

/// Fetch a listing and print its collection as JSON or as a table.
pub(crate) async fn handle_listing(
    ctx: &AppContext,
    listing: &Listing,
    query: Option<&[(&str, &str)]>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let envelope = ctx.api.get(listing.path, query).await?;
    let rows = envelope.collection(listing.collection);
    tracing::debug!(path = listing.path, rows = rows.len(), "listing fetched");

    match format {
        OutputFormat::Json => print_json(out, &rows),
        OutputFormat::Table => print_table(out, &rows, listing.columns),
    }
}

/// Flag values that are empty strings count as not supplied.
pub(crate) fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use httpmock::MockServer;

    use crate::client::{ApiClient, AppContext};
    use crate::config::ApiConfig;

    pub(crate) const TEST_KEY: &str = "test-key";

    pub(crate) fn context_for(server: &MockServer) -> AppContext {
        context_at(&server.base_url())
    }

    pub(crate) fn context_at(base_url: &str) -> AppContext {
        let config = ApiConfig::resolve(Some(TEST_KEY), Some(base_url)).expect("valid config");
        AppContext {
            api: ApiClient::new(&config).expect("client builds"),
        }
    }

    pub(crate) fn rendered(out: Vec<u8>) -> String {
        String::from_utf8(out).expect("output is utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{context_for, rendered};
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn listing_with_missing_collection_prints_sentinel() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/chats");
            then.status(200).json_body(json!({"status": "success"}));
        });

        let mut out = Vec::new();
        handle_listing(&context_for(&server), &CHATS, None, OutputFormat::Table, &mut out)
            .await
            .expect("listing succeeds");
        assert_eq!(rendered(out), "No results.\n");
    }

    #[tokio::test]
    async fn listing_json_prints_collection_only() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/chats");
            then.status(200).json_body(json!({
                "status": "success",
                "chats": [{"id": "c1", "topic": "Hello", "extra": 1}]
            }));
        });

        let mut out = Vec::new();
        handle_listing(&context_for(&server), &CHATS, None, OutputFormat::Json, &mut out)
            .await
            .expect("listing succeeds");
        let printed: serde_json::Value =
            serde_json::from_str(&rendered(out)).expect("valid JSON");
        assert_eq!(printed, json!([{"id": "c1", "topic": "Hello", "extra": 1}]));
    }

    #[test]
    fn empty_flags_are_not_supplied() {
        assert_eq!(supplied(Some(String::new())), None);
        assert_eq!(supplied(None), None);
        assert_eq!(supplied(Some("x".into())), Some("x".to_string()));
    }
}
