use std::io::Write;

use crate::client::{AppContext, CliResult};
use crate::models::AccountIdentity;
use crate::output::{OutputFormat, cell_text, print_json, write_line};

const ACCOUNT_ID_PATH: &str = "/api/accounts/id";

/// Print the account behind the configured API key.
pub(crate) async fn handle_whoami(
    ctx: &AppContext,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let envelope = ctx.api.get(ACCOUNT_ID_PATH, None).await?;

    match format {
        OutputFormat::Json => print_json(out, envelope.as_value()),
        OutputFormat::Table => {
            let identity: AccountIdentity = envelope.decode_body()?;
            write_line(out, &cell_text(Some(&identity.account_id)))
        }
    }
}
