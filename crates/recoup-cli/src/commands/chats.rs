use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::cli::ChatCreateArgs;
use crate::client::{AppContext, CliResult};
use crate::commands::{CHATS, handle_listing, supplied};
use crate::models::CreatedChat;
use crate::output::{OutputFormat, cell_text, print_json, write_line};

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub(crate) struct ChatCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) topic: Option<String>,
    #[serde(rename = "artistId", skip_serializing_if = "Option::is_none")]
    pub(crate) artist_id: Option<String>,
}

impl From<ChatCreateArgs> for ChatCreateRequest {
    fn from(args: ChatCreateArgs) -> Self {
        Self {
            topic: supplied(args.name),
            artist_id: supplied(args.artist),
        }
    }
}

pub(crate) async fn handle_chat_list(
    ctx: &AppContext,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    handle_listing(ctx, &CHATS, None, format, out).await
}

pub(crate) async fn handle_chat_create(
    ctx: &AppContext,
    args: ChatCreateArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let request = ChatCreateRequest::from(args);
    let envelope = ctx.api.post(CHATS.path, &request).await?;

    match format {
        OutputFormat::Json => print_json(out, envelope.field("chat").unwrap_or(&Value::Null)),
        OutputFormat::Table => {
            let chat: CreatedChat = envelope.decode("chat")?;
            write_line(out, &format!("Created chat: {}", cell_text(Some(&chat.id))))
        }
    }
}
