use std::io::Write;

use crate::cli::ArtistListArgs;
use crate::client::{AppContext, CliResult};
use crate::commands::{ARTISTS, handle_listing};
use crate::output::OutputFormat;

/// List artists, optionally narrowed to an organization or account.
pub(crate) async fn handle_artist_list(
    ctx: &AppContext,
    args: ArtistListArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut filters = Vec::new();
    if let Some(org) = args.org.as_deref() {
        filters.push(("org_id", org));
    }
    if let Some(account) = args.account.as_deref() {
        filters.push(("account_id", account));
    }

    // Unfiltered listings send no parameter mapping at all.
    let query = (!filters.is_empty()).then_some(filters.as_slice());
    handle_listing(ctx, &ARTISTS, query, format, out).await
}
