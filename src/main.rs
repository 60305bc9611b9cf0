//! chat-transcript: render exported chat messages into a standalone HTML page.
//!
//! Reads a JSON array of canonical messages, groups and formats them, and
//! writes either to an explicit file or into the transcript archive.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

use chat_transcript::archive::{ArchiveJob, TranscriptWriter};
use chat_transcript::config::{self, Settings};
use chat_transcript::model::{messages_from_json, CanonicalMessage};
use chat_transcript::transcript::{escape_html, render_html, TranscriptOptions};
use chat_transcript::validation::{ensure_chronological, validate_channel_name};

#[derive(Parser)]
#[command(name = "chat-transcript")]
#[command(about = "Render chat message exports as HTML transcripts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a messages JSON file
    Render {
        /// JSON array of messages, oldest first
        messages: PathBuf,
        /// Output file (default: the archive directory)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Footer text appended after the last message
        #[arg(long)]
        footer: Option<String>,
        /// Redact email addresses and drop mailto links
        #[arg(long)]
        remove_emails: bool,
        /// JSON object mapping user ids to role labels
        #[arg(long)]
        roles: Option<PathBuf>,
        /// Channel name shown in the header
        #[arg(long)]
        channel: Option<String>,
    },
    /// Print the settings file location and its contents
    ShowConfig,
    /// Update persisted defaults
    SetConfig {
        #[arg(long)]
        footer: Option<String>,
        #[arg(long)]
        remove_emails: Option<bool>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

const PAGE_STYLE: &str = r#"
body { margin: 0; background: #313338; color: #dbdee1; font-family: "gg sans", "Noto Sans", Helvetica, Arial, sans-serif; font-size: 16px; }
.chat-channel-header { display: flex; gap: 8px; padding: 12px 16px; border-bottom: 1px solid #1f2023; font-weight: 600; color: #f2f3f5; }
.chat-messages { padding: 16px 0; }
.chat-date-separator { display: flex; align-items: center; margin: 24px 16px 8px; font-size: 12px; font-weight: 600; color: #949ba4; }
.chat-date-separator-line { flex: 1; height: 1px; background: #3f4147; }
.chat-date-separator-text { padding: 0 8px; }
.chat-message { padding: 2px 16px; }
.chat-message-group-start { margin-top: 16px; }
.chat-message-row { display: flex; }
.chat-message-gutter { width: 56px; flex-shrink: 0; }
.chat-avatar, .chat-avatar-fallback { width: 40px; height: 40px; border-radius: 50%; }
.chat-avatar-fallback { display: flex; align-items: center; justify-content: center; color: #fff; font-weight: 600; }
.chat-compact-timestamp, .chat-message-timestamp { font-size: 11px; color: #949ba4; }
.chat-message-author { font-weight: 600; margin-right: 4px; }
.chat-message-role { font-size: 12px; color: #949ba4; margin-right: 4px; }
.chat-bot-badge { background: #5865f2; color: #fff; font-size: 10px; border-radius: 3px; padding: 0 4px; margin-right: 4px; }
.chat-message-edited { font-size: 10px; color: #949ba4; }
.chat-reply, .chat-interaction { display: flex; gap: 4px; align-items: center; margin-left: 56px; font-size: 14px; color: #b5bac1; }
.chat-reply-avatar, .chat-interaction-avatar { width: 16px; height: 16px; border-radius: 50%; }
.chat-reply-username, .chat-interaction-username { font-weight: 600; }
.chat-heading { font-weight: 700; margin: 8px 0 4px; }
.chat-h1 { font-size: 24px; } .chat-h2 { font-size: 20px; } .chat-h3 { font-size: 16px; }
.chat-blockquote { display: flex; } .chat-blockquote-bar { width: 4px; border-radius: 4px; background: #4e5058; margin-right: 8px; }
.chat-inline-code, .chat-code-block { background: #2b2d31; border-radius: 4px; font-family: Consolas, monospace; }
.chat-code-block { padding: 8px; white-space: pre-wrap; }
.chat-spoiler { background: #1e1f22; color: transparent; border-radius: 3px; }
.chat-spoiler:hover { color: inherit; }
.chat-mention { background: rgba(88, 101, 242, 0.3); color: #c9cdfb; border-radius: 3px; padding: 0 2px; }
.chat-link { color: #00a8fc; text-decoration: none; }
.chat-custom-emoji { width: 22px; height: 22px; vertical-align: bottom; }
.chat-timestamp { background: rgba(255, 255, 255, 0.06); border-radius: 3px; padding: 0 2px; }
.chat-embed { display: flex; max-width: 520px; margin-top: 4px; background: #2b2d31; border-radius: 4px; }
.chat-embed-color-bar { width: 4px; border-radius: 4px 0 0 4px; }
.chat-embed-content { padding: 8px 16px 16px 12px; }
.chat-embed-title { font-weight: 600; }
.chat-embed-fields { display: flex; flex-wrap: wrap; gap: 8px; }
.chat-embed-field { flex-basis: 100%; } .chat-embed-field.inline { flex-basis: 30%; }
.chat-embed-footer { font-size: 12px; color: #b5bac1; margin-top: 8px; }
.chat-embed-image, .chat-attachment-image, .chat-media-gallery-img { max-width: 100%; border-radius: 4px; }
.chat-file-attachment { display: flex; gap: 8px; align-items: center; padding: 10px; background: #2b2d31; border: 1px solid #1e1f22; border-radius: 8px; max-width: 432px; }
.chat-action-row { display: flex; gap: 8px; margin-top: 4px; }
.chat-button { border: none; border-radius: 3px; padding: 2px 16px; color: #fff; background: #4e5058; font-size: 14px; }
.chat-button-1 { background: #5865f2; } .chat-button-3 { background: #248046; } .chat-button-4 { background: #da373c; }
.chat-container { display: flex; background: #2b2d31; border-radius: 8px; max-width: 520px; }
.chat-container-accent { width: 4px; border-radius: 8px 0 0 8px; }
.chat-container-content { padding: 16px; }
.chat-separator { border-top: 1px solid #3f4147; margin: 8px 0; }
.chat-separator-large { margin: 16px 0; }
.chat-transcript-footer { padding: 16px; text-align: center; font-size: 12px; color: #949ba4; border-top: 1px solid #3f4147; }
"#;

fn page_shell(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        PAGE_STYLE,
        body
    )
}

fn read_messages(path: &Path) -> anyhow::Result<Vec<CanonicalMessage>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let messages = messages_from_json(&json)
        .with_context(|| format!("failed to parse messages in {}", path.display()))?;
    ensure_chronological(&messages)?;
    Ok(messages)
}

fn read_roles(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid roles file {}", path.display()))
}

fn render(
    settings: &Settings,
    messages_path: &Path,
    out: Option<PathBuf>,
    footer: Option<String>,
    remove_emails: bool,
    roles: Option<PathBuf>,
    channel: Option<String>,
) -> anyhow::Result<()> {
    let messages = read_messages(messages_path)?;
    tracing::info!(count = messages.len(), path = %messages_path.display(), "loaded messages");

    let mut options: TranscriptOptions = settings.defaults.clone();
    if footer.is_some() {
        options.footer_text = footer;
    }
    options.remove_emails |= remove_emails;
    if let Some(roles) = roles {
        options.user_roles.extend(read_roles(&roles)?);
    }
    if let Some(channel) = channel {
        if let Err(e) = validate_channel_name(&channel) {
            bail!("invalid channel name {:?}: {}", channel, e);
        }
        options.channel_name = Some(channel.trim_start_matches('#').to_string());
    }

    let channel_name = options
        .channel_name
        .clone()
        .unwrap_or_else(|| "channel".to_string());
    let fragment = render_html(&messages, &options);
    let page = page_shell(&format!("#{}", channel_name), &fragment);

    match out {
        Some(path) => {
            fs::write(&path, page).with_context(|| format!("failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
        None => {
            let Some(root) = settings.resolved_output_dir() else {
                bail!("no output directory: pass --out or set one with set-config --output-dir");
            };
            let name = messages
                .last()
                .map(|m| m.created_at.with_timezone(&Local))
                .unwrap_or_else(|| Utc::now().with_timezone(&Local))
                .format("%Y-%m-%d")
                .to_string();

            let writer = TranscriptWriter::new(&root)?;
            writer.submit(ArchiveJob {
                channel: channel_name,
                name,
                html: page,
            })?;
            let report = writer.finish()?;
            if let Some((name, e)) = report.failed.into_iter().next() {
                return Err(e).with_context(|| format!("failed to archive transcript {}", name));
            }
            for path in report.written {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = config::load_settings().context("failed to load settings")?;

    match cli.command {
        Commands::Render {
            messages,
            out,
            footer,
            remove_emails,
            roles,
            channel,
        } => render(&settings, &messages, out, footer, remove_emails, roles, channel)?,
        Commands::ShowConfig => {
            match config::settings_path() {
                Some(path) => println!("Settings file: {}", path.display()),
                None => println!("Settings file: unavailable"),
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Commands::SetConfig {
            footer,
            remove_emails,
            output_dir,
        } => {
            let mut settings = settings;
            if let Some(footer) = footer {
                settings.defaults.footer_text = Some(footer).filter(|f| !f.is_empty());
            }
            if let Some(remove) = remove_emails {
                settings.defaults.remove_emails = remove;
            }
            if let Some(dir) = output_dir {
                settings.output_dir = Some(dir);
            }
            config::save_settings(&settings).context("failed to save settings")?;
            tracing::info!("settings saved");
        }
    }
    Ok(())
}
