//! Command-line parsing and dispatch for the Recoup CLI.

use std::io::{self, Write};

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use recoup_telemetry::{LoggingConfig, init_logging};
use tracing::Instrument;

use crate::client::{ApiClient, AppContext, CliError, CliResult, FAILURE_EXIT_CODE};
use crate::commands::accounts::handle_whoami;
use crate::commands::artists::handle_artist_list;
use crate::commands::chats::{handle_chat_create, handle_chat_list};
use crate::commands::music::{handle_music_analyze, handle_music_presets};
use crate::commands::organizations::handle_organization_list;
use crate::commands::sandboxes::{handle_sandbox_create, handle_sandbox_list};
use crate::config::{API_KEY_ENV, API_URL_ENV, ApiConfig};
use crate::output::{OutputFormat, print_error};

/// Parses CLI arguments, executes the requested command, and reports any
/// failure on standard error. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_usage(&err),
    };
    if let Err(err) = init_logging(&LoggingConfig::default()) {
        eprintln!("warning: {err}");
    }

    let command_name = command_label(&cli.command);
    let span = tracing::info_span!("command", name = command_name);
    let result = dispatch(cli).instrument(span).await;

    match result {
        Ok(()) => {
            tracing::debug!(command = command_name, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(
                command = command_name,
                kind = err.kind(),
                exit_code,
                "command failed"
            );
            print_error(&err.display_message());
            exit_code
        }
    }
}

/// Print clap's own output; help and version succeed, every usage error fails with 1.
fn report_usage(err: &clap::Error) -> i32 {
    if let Err(io_err) = err.print() {
        eprintln!("Error: {io_err}");
    }
    if err.use_stderr() {
        FAILURE_EXIT_CODE
    } else {
        0
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let config = ApiConfig::resolve(cli.api_key.as_deref(), cli.api_url.as_deref())?;
    let ctx = AppContext {
        api: ApiClient::new(&config)?,
    };
    let format = OutputFormat::from_json_flag(cli.json);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&ctx, cli.command, format, &mut out).await?;
    out.flush()
        .map_err(|err| CliError::failure(anyhow!("failed to flush output: {err}")))
}

/// Route one parsed command to its handler.
pub(crate) async fn execute(
    ctx: &AppContext,
    command: Command,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    match command {
        Command::Whoami => handle_whoami(ctx, format, out).await,
        Command::Artists(ArtistsCommand::List(args)) => {
            handle_artist_list(ctx, args, format, out).await
        }
        Command::Chats(chats) => match chats {
            ChatsCommand::List => handle_chat_list(ctx, format, out).await,
            ChatsCommand::Create(args) => handle_chat_create(ctx, args, format, out).await,
        },
        Command::Organizations(OrganizationsCommand::List(args)) => {
            handle_organization_list(ctx, args, format, out).await
        }
        Command::Sandboxes(sandboxes) => match sandboxes {
            SandboxesCommand::List => handle_sandbox_list(ctx, format, out).await,
            SandboxesCommand::Create(args) => handle_sandbox_create(ctx, args, format, out).await,
        },
        Command::Music(music) => match music {
            MusicCommand::Analyze(args) => handle_music_analyze(ctx, args, format, out).await,
            MusicCommand::Presets => handle_music_presets(ctx, format, out).await,
        },
    }
}

#[derive(Parser)]
#[command(name = "recoup", version, about = "Recoup platform CLI")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = API_URL_ENV,
        help = "Base URL of the Recoup API"
    )]
    pub(crate) api_url: Option<String>,
    #[arg(
        long,
        global = true,
        env = API_KEY_ENV,
        hide_env_values = true,
        help = "API key used to authenticate requests"
    )]
    pub(crate) api_key: Option<String>,
    #[arg(long, global = true, help = "Output as JSON")]
    pub(crate) json: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show the current authenticated account
    Whoami,
    /// Manage artists
    #[command(subcommand)]
    Artists(ArtistsCommand),
    /// Manage chats
    #[command(subcommand)]
    Chats(ChatsCommand),
    /// Manage organizations
    #[command(subcommand)]
    #[command(alias = "orgs")]
    Organizations(OrganizationsCommand),
    /// Manage sandboxes
    #[command(subcommand)]
    Sandboxes(SandboxesCommand),
    /// Music analysis tools
    #[command(subcommand)]
    Music(MusicCommand),
}

#[derive(Subcommand)]
pub(crate) enum ArtistsCommand {
    /// List artists for the current account
    List(ArtistListArgs),
}

#[derive(Subcommand)]
pub(crate) enum ChatsCommand {
    /// List chats for the current account
    List,
    /// Create a new chat
    Create(ChatCreateArgs),
}

#[derive(Subcommand)]
pub(crate) enum OrganizationsCommand {
    /// List organizations for the current account
    List(OrganizationListArgs),
}

#[derive(Subcommand)]
pub(crate) enum SandboxesCommand {
    /// List sandboxes for the current account
    List,
    /// Create a new sandbox
    Create(SandboxCreateArgs),
}

#[derive(Subcommand)]
pub(crate) enum MusicCommand {
    /// Analyze music using a preset or custom prompt
    Analyze(MusicAnalyzeArgs),
    /// List available analysis presets
    Presets,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ArtistListArgs {
    #[arg(long = "org", value_name = "ID", help = "Filter by organization")]
    pub(crate) org: Option<String>,
    #[arg(long = "account", value_name = "ID", help = "Filter by account")]
    pub(crate) account: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ChatCreateArgs {
    #[arg(long = "name", value_name = "TOPIC", help = "Chat topic")]
    pub(crate) name: Option<String>,
    #[arg(long = "artist", value_name = "ID", help = "Artist ID")]
    pub(crate) artist: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OrganizationListArgs {
    #[arg(long = "account", value_name = "ID", help = "Filter by account")]
    pub(crate) account: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SandboxCreateArgs {
    #[arg(long = "command", value_name = "CMD", help = "Command to run in sandbox")]
    pub(crate) command: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct MusicAnalyzeArgs {
    #[arg(help = "Custom text prompt (omit when using --preset)")]
    pub(crate) prompt: Option<String>,
    #[arg(
        long,
        value_name = "NAME",
        help = "Use a curated analysis preset (e.g. catalog_metadata, full_report)"
    )]
    pub(crate) preset: Option<String>,
    #[arg(
        long = "audio",
        value_name = "URL",
        help = "Public URL to an audio file (MP3, WAV, FLAC)"
    )]
    pub(crate) audio: Option<String>,
    #[arg(
        long = "max-tokens",
        value_name = "N",
        allow_hyphen_values = true,
        help = "Max tokens to generate (default 512)"
    )]
    pub(crate) max_tokens: Option<String>,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Whoami => "whoami",
        Command::Artists(ArtistsCommand::List(_)) => "artists_list",
        Command::Chats(ChatsCommand::List) => "chats_list",
        Command::Chats(ChatsCommand::Create(_)) => "chats_create",
        Command::Organizations(OrganizationsCommand::List(_)) => "organizations_list",
        Command::Sandboxes(SandboxesCommand::List) => "sandboxes_list",
        Command::Sandboxes(SandboxesCommand::Create(_)) => "sandboxes_create",
        Command::Music(MusicCommand::Analyze(_)) => "music_analyze",
        Command::Music(MusicCommand::Presets) => "music_presets",
    }
}
