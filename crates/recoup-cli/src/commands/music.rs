//! Music analysis commands: free-form or preset analysis, and preset discovery.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::cli::MusicAnalyzeArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::supplied;
use crate::models::{AnalysisReply, Preset};
use crate::output::{OutputFormat, cell_text, format_json, print_json, write_lines};

const ANALYZE_PATH: &str = "/api/music/analyze";
const PRESETS_PATH: &str = "/api/music/presets";
const BANNER_WIDTH: usize = 50;
/// Stands in for the elapsed time when the server omits it.
const UNKNOWN_ELAPSED: &str = "?";

pub(crate) const MISSING_INPUT_MESSAGE: &str = "Provide a prompt or use --preset <name>. Run 'recoup music presets' to see available presets.";

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub(crate) struct AnalyzeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_new_tokens: Option<i64>,
}

impl TryFrom<MusicAnalyzeArgs> for AnalyzeRequest {
    type Error = CliError;

    fn try_from(args: MusicAnalyzeArgs) -> CliResult<Self> {
        let request = Self {
            preset: supplied(args.preset),
            prompt: supplied(args.prompt),
            audio_url: supplied(args.audio),
            max_new_tokens: args
                .max_tokens
                .as_deref()
                .and_then(leading_integer)
                .filter(|tokens| *tokens != 0),
        };
        if request.prompt.is_none() && request.preset.is_none() {
            return Err(CliError::validation(MISSING_INPUT_MESSAGE));
        }
        Ok(request)
    }
}

/// Read the integer prefix of `text` (`"256"`, `" 12px"`, `"-3"`); `None` when there is none.
fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let sign_len = trimmed.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

/// Run an analysis. Input is validated before any request is made.
pub(crate) async fn handle_music_analyze(
    ctx: &AppContext,
    args: MusicAnalyzeArgs,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let request = AnalyzeRequest::try_from(args)?;
    let envelope = ctx.api.post(ANALYZE_PATH, &request).await?;

    match format {
        OutputFormat::Json => print_json(out, envelope.as_value()),
        OutputFormat::Table => {
            let reply: AnalysisReply = envelope.decode_body()?;
            write_lines(out, &render_analysis(&reply)?)
        }
    }
}

pub(crate) async fn handle_music_presets(
    ctx: &AppContext,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    let envelope = ctx.api.get(PRESETS_PATH, None).await?;

    match format {
        OutputFormat::Json => print_json(out, &envelope.collection("presets")),
        OutputFormat::Table => {
            let presets: Option<Vec<Preset>> = envelope.decode("presets")?;
            write_lines(out, &render_presets(&presets.unwrap_or_default()))
        }
    }
}

/// Lay out an analysis: report sections, structured response, or plain text.
pub(crate) fn render_analysis(reply: &AnalysisReply) -> CliResult<Vec<String>> {
    let mut lines = Vec::new();
    let elapsed = match &reply.elapsed_seconds {
        Some(seconds) if !seconds.is_null() => cell_text(Some(seconds)),
        _ => UNKNOWN_ELAPSED.to_string(),
    };

    if let Some(Value::Object(sections)) = &reply.report {
        let banner = "=".repeat(BANNER_WIDTH);
        for (name, content) in sections {
            lines.push(String::new());
            lines.push(banner.clone());
            lines.push(format!("  {}", section_title(name)));
            lines.push(banner.clone());
            lines.push(match content {
                Value::String(text) => text.clone(),
                other => format_json(other)?,
            });
        }
        lines.push(String::new());
        lines.push(format!("({elapsed}s total)"));
        return Ok(lines);
    }

    match &reply.response {
        Some(Value::String(text)) => lines.push(text.clone()),
        other => lines.push(format_json(other.as_ref().unwrap_or(&Value::Null))?),
    }
    lines.push(String::new());
    lines.push(format!("({elapsed}s)"));
    Ok(lines)
}

fn section_title(name: &str) -> String {
    name.to_uppercase().replace('_', " ")
}

pub(crate) fn render_presets(presets: &[Preset]) -> Vec<String> {
    presets
        .iter()
        .flat_map(|preset| {
            let audio = if preset.needs_audio() {
                " [requires audio]"
            } else {
                ""
            };
            [
                format!(
                    "  {} {}{audio}",
                    cell_text(Some(&preset.name)),
                    preset.format_tag()
                ),
                format!("    {}", cell_text(Some(&preset.description))),
                String::new(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context_at, context_for, rendered};
    use httpmock::prelude::*;
    use serde_json::json;

    fn analyze_args(prompt: Option<&str>, preset: Option<&str>) -> MusicAnalyzeArgs {
        MusicAnalyzeArgs {
            prompt: prompt.map(str::to_string),
            preset: preset.map(str::to_string),
            ..MusicAnalyzeArgs::default()
        }
    }

    fn reply(value: Value) -> AnalysisReply {
        serde_json::from_value(value).expect("analysis reply")
    }

    #[tokio::test]
    async fn analyze_without_prompt_or_preset_makes_no_request() {
        // Nothing listens here; reaching the network would yield a transport failure.
        let ctx = context_at("http://127.0.0.1:9");
        let mut out = Vec::new();

        let err = handle_music_analyze(
            &ctx,
            MusicAnalyzeArgs::default(),
            OutputFormat::Table,
            &mut out,
        )
        .await
        .expect_err("input is required");

        assert!(matches!(&err, CliError::Validation(message) if message == MISSING_INPUT_MESSAGE));
        assert_eq!(err.exit_code(), 1);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn analyze_sends_prompt() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(ANALYZE_PATH)
                .json_body(json!({"prompt": "What genre is this?"}));
            then.status(200).json_body(json!({
                "status": "success",
                "response": "This is jazz music.",
                "elapsed_seconds": 3.2
            }));
        });

        let mut out = Vec::new();
        handle_music_analyze(
            &context_for(&server),
            analyze_args(Some("What genre is this?"), None),
            OutputFormat::Table,
            &mut out,
        )
        .await
        .expect("analysis succeeds");

        mock.assert();
        assert_eq!(rendered(out), "This is jazz music.\n\n(3.2s)\n");
    }

    #[tokio::test]
    async fn analyze_sends_preset_audio_and_tokens() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path(ANALYZE_PATH).json_body(json!({
                "preset": "catalog_metadata",
                "audio_url": "https://example.com/song.mp3",
                "max_new_tokens": 256
            }));
            then.status(200).json_body(json!({
                "status": "success",
                "preset": "catalog_metadata",
                "response": {"genre": "pop", "tempo_bpm": 96},
                "elapsed_seconds": 10.0
            }));
        });

        let mut out = Vec::new();
        handle_music_analyze(
            &context_for(&server),
            MusicAnalyzeArgs {
                prompt: None,
                preset: Some("catalog_metadata".into()),
                audio: Some("https://example.com/song.mp3".into()),
                max_tokens: Some("256".into()),
            },
            OutputFormat::Table,
            &mut out,
        )
        .await
        .expect("analysis succeeds");

        mock.assert();
        assert_eq!(
            rendered(out),
            "{\n  \"genre\": \"pop\",\n  \"tempo_bpm\": 96\n}\n\n(10s)\n"
        );
    }

    #[tokio::test]
    async fn analyze_json_prints_whole_envelope() {
        let body = json!({
            "status": "success",
            "response": "Jazz in Bb major.",
            "elapsed_seconds": 3.0
        });
        let server = MockServer::start_async().await;
        let served = body.clone();
        server.mock(move |when, then| {
            when.method(POST).path(ANALYZE_PATH);
            then.status(200).json_body(served);
        });

        let mut out = Vec::new();
        handle_music_analyze(
            &context_for(&server),
            analyze_args(Some("Describe this."), None),
            OutputFormat::Json,
            &mut out,
        )
        .await
        .expect("analysis succeeds");

        let printed: Value = serde_json::from_str(&rendered(out)).expect("valid JSON");
        assert_eq!(printed, body);
    }

    #[tokio::test]
    async fn analyze_failure_is_reported() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(ANALYZE_PATH);
            then.status(503)
                .json_body(json!({"status": "error", "error": "Service Unavailable"}));
        });

        let mut out = Vec::new();
        let err = handle_music_analyze(
            &context_for(&server),
            analyze_args(Some("Describe this."), None),
            OutputFormat::Table,
            &mut out,
        )
        .await
        .expect_err("service unavailable");
        assert_eq!(err.display_message(), "Service Unavailable");
    }

    #[test]
    fn report_sections_print_under_banners() {
        let lines = render_analysis(&reply(json!({
            "report": {
                "catalog_metadata": {"genre": "pop"},
                "lyrical_themes": "Love and loss."
            },
            "elapsed_seconds": 42.5
        })))
        .expect("rendered");

        let banner = "=".repeat(50);
        assert_eq!(
            lines,
            vec![
                String::new(),
                banner.clone(),
                "  CATALOG METADATA".to_string(),
                banner.clone(),
                "{\n  \"genre\": \"pop\"\n}".to_string(),
                String::new(),
                banner.clone(),
                "  LYRICAL THEMES".to_string(),
                banner,
                "Love and loss.".to_string(),
                String::new(),
                "(42.5s total)".to_string(),
            ]
        );
    }

    #[test]
    fn missing_response_and_elapsed_still_print_both_lines() {
        let lines = render_analysis(&reply(json!({"status": "success"}))).expect("rendered");
        assert_eq!(
            lines,
            vec!["null".to_string(), String::new(), "(?s)".to_string()]
        );

        let lines = render_analysis(&reply(json!({"report": {}}))).expect("rendered");
        assert_eq!(lines, vec![String::new(), "(?s total)".to_string()]);
    }

    #[test]
    fn max_tokens_keeps_the_integer_prefix() {
        assert_eq!(leading_integer("256"), Some(256));
        assert_eq!(leading_integer("  12px"), Some(12));
        assert_eq!(leading_integer("-3"), Some(-3));
        assert_eq!(leading_integer("+7"), Some(7));
        assert_eq!(leading_integer("abc"), None);
        assert_eq!(leading_integer("--1"), None);
        assert_eq!(leading_integer(""), None);

        let request = AnalyzeRequest::try_from(MusicAnalyzeArgs {
            max_tokens: Some("abc".into()),
            ..analyze_args(Some("Describe"), None)
        })
        .expect("prompt is enough");
        assert_eq!(request.max_new_tokens, None);

        let request = AnalyzeRequest::try_from(MusicAnalyzeArgs {
            max_tokens: Some("300 tokens".into()),
            ..analyze_args(Some("Describe"), None)
        })
        .expect("prompt is enough");
        assert_eq!(request.max_new_tokens, Some(300));
    }

    #[test]
    fn empty_flags_do_not_count_as_input() {
        let args = MusicAnalyzeArgs {
            prompt: Some(String::new()),
            preset: Some(String::new()),
            audio: Some("https://example.com/a.mp3".into()),
            max_tokens: Some("0".into()),
        };
        assert!(AnalyzeRequest::try_from(args).is_err());

        let request = AnalyzeRequest::try_from(MusicAnalyzeArgs {
            max_tokens: Some("0".into()),
            ..analyze_args(Some("Describe"), None)
        })
        .expect("prompt is enough");
        assert_eq!(
            serde_json::to_value(&request).expect("serializes"),
            json!({"prompt": "Describe"})
        );
    }

    #[tokio::test]
    async fn presets_list_names_tags_and_descriptions() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path(PRESETS_PATH);
            then.status(200).json_body(json!({
                "status": "success",
                "presets": [
                    {"name": "catalog_metadata", "description": "Catalog enrichment", "requiresAudio": true, "responseFormat": "json"},
                    {"name": "describe", "description": "Free-form description", "requiresAudio": false, "responseFormat": "text"}
                ]
            }));
        });

        let mut out = Vec::new();
        handle_music_presets(&context_for(&server), OutputFormat::Table, &mut out)
            .await
            .expect("presets succeed");

        mock.assert();
        assert_eq!(
            rendered(out),
            "  catalog_metadata (JSON) [requires audio]\n    Catalog enrichment\n\n  describe (text)\n    Free-form description\n\n"
        );
    }

    #[tokio::test]
    async fn presets_json_prints_array() {
        let presets = json!([{"name": "catalog_metadata", "description": "Catalog enrichment"}]);
        let server = MockServer::start_async().await;
        let served = json!({"status": "success", "presets": presets.clone()});
        server.mock(move |when, then| {
            when.method(GET).path(PRESETS_PATH);
            then.status(200).json_body(served);
        });

        let mut out = Vec::new();
        handle_music_presets(&context_for(&server), OutputFormat::Json, &mut out)
            .await
            .expect("presets succeed");

        let printed: Value = serde_json::from_str(&rendered(out)).expect("valid JSON");
        assert_eq!(printed, presets);
    }

    #[tokio::test]
    async fn presets_tolerate_null_fields_and_numbers() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(PRESETS_PATH);
            then.status(200).json_body(json!({
                "status": "success",
                "presets": [
                    {"name": "p", "description": null, "requiresAudio": null, "responseFormat": null},
                    {"name": 5, "description": "Numbered"}
                ]
            }));
        });

        let mut out = Vec::new();
        handle_music_presets(&context_for(&server), OutputFormat::Table, &mut out)
            .await
            .expect("null fields do not fail the listing");

        assert_eq!(
            rendered(out),
            "  p (text)\n    \n\n  5 (text)\n    Numbered\n\n"
        );
    }
}
