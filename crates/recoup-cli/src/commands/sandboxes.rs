use std::io::Write;

use serde::Serialize;

use crate::cli::SandboxCreateArgs;
use crate::client::{AppContext, CliResult};
use crate::commands::{SANDBOXES, handle_listing, supplied};
use crate::models::SandboxRecord;
use crate::output::{OutputFormat, cell_text, print_json, write_line};

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub(crate) struct SandboxCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) command: Option<String>,
}

pub(crate) async fn handle_sandbox_list(
    ctx: &AppContext,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    handle_listing(ctx, &SANDBOXES, None, format, out).await
}

/// Create a sandbox and report every sandbox the server returns.
pub(crate) async fn handle_sandbox_create(
    ctx: &AppContext,
    args: SandboxCreateArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let request = SandboxCreateRequest {
        command: supplied(args.command),
    };
    let envelope = ctx.api.post(SANDBOXES.path, &request).await?;

    match format {
        OutputFormat::Json => print_json(out, &envelope.collection(SANDBOXES.collection)),
        OutputFormat::Table => {
            let sandboxes: Option<Vec<SandboxRecord>> = envelope.decode("sandboxes")?;
            for sandbox in sandboxes.unwrap_or_default() {
                let id = cell_text(Some(&sandbox.sandbox_id));
                write_line(out, &format!("Created sandbox: {id}"))?;
            }
            Ok(())
        }
    }
}
