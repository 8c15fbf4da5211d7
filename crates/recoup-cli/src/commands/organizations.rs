use std::io::Write;

use crate::cli::OrganizationListArgs;
use crate::client::{AppContext, CliResult};
use crate::commands::{ORGANIZATIONS, handle_listing};
use crate::output::OutputFormat;

/// List organizations. Unlike other listings, a parameter mapping is always
/// passed, even when it holds no filters.
pub(crate) async fn handle_organization_list(
    ctx: &AppContext,
    args: OrganizationListArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let mut params = Vec::new();
    if let Some(account) = args.account.as_deref().filter(|account| !account.is_empty()) {
        params.push(("account_id", account));
    }

    handle_listing(ctx, &ORGANIZATIONS, Some(params.as_slice()), format, out).await
}
