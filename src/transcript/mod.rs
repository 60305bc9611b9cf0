//! Transcript assembly: grouped messages, rendered bodies, date separators
//! and the serialized HTML fragment.
//!
//! The output is a fragment only. Wrapping it in a page with a stylesheet is
//! left to the caller (see the `chat-transcript` binary).

mod assemble;
mod html;
mod redact;

use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::markup::{Document, UserMap};
use crate::model::{Attachment, CanonicalMessage, Component, Embed};

pub use assemble::{assemble, assemble_in, dedup_structural, user_map_from, REPLY_PREVIEW_CHARS};
pub use html::{escape_html, format_file_size, HtmlWriter};
pub use redact::{redact_emails, EMAIL_REDACTION};

/// Options for one transcript render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptOptions {
    /// Replace email addresses and drop `mailto:` links.
    pub remove_emails: bool,
    /// Text of a trailing footer block.
    pub footer_text: Option<String>,
    /// User id -> role label shown beside the author name.
    pub user_roles: HashMap<String, String>,
    /// Channel name shown in the transcript header.
    pub channel_name: Option<String>,
}

/// Quoted message shown above a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyPreview {
    pub author_name: String,
    pub avatar_url: Option<String>,
    pub text: String,
}

/// "<user> used /<command>" line above interaction responses.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionHeader {
    pub user_name: String,
    pub avatar_url: Option<String>,
    pub command: Option<String>,
}

/// Attachments split by how they are displayed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentGroups<'a> {
    pub images: Vec<&'a Attachment>,
    pub videos: Vec<&'a Attachment>,
    pub audio: Vec<&'a Attachment>,
    pub files: Vec<&'a Attachment>,
}

impl AttachmentGroups<'_> {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty() && self.audio.is_empty() && self.files.is_empty()
    }
}

/// Everything needed to display one message.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage<'a> {
    pub message: &'a CanonicalMessage,
    pub is_group_start: bool,
    pub date_key: String,
    pub author_name: String,
    pub author_color: String,
    pub avatar_color: String,
    pub avatar_initial: String,
    pub role_label: Option<String>,
    /// `10/17/2026 3:05 PM`, shown in the group header.
    pub full_timestamp: String,
    /// `3:05 PM`, shown beside continuation messages.
    pub compact_timestamp: String,
    pub reply: Option<ReplyPreview>,
    pub interaction: Option<InteractionHeader>,
    pub body: Document,
    pub edited: bool,
    pub attachments: AttachmentGroups<'a>,
    pub embeds: Vec<&'a Embed>,
    pub components: Vec<&'a Component>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptNode<'a> {
    DateSeparator { date_key: String, label: String },
    Message(Box<RenderedMessage<'a>>),
    Footer(String),
}

/// Ordered transcript, in the same order as the input messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript<'a> {
    pub nodes: Vec<TranscriptNode<'a>>,
    pub user_map: UserMap,
    pub channel_name: Option<String>,
}

impl<'a> Transcript<'a> {
    pub fn messages(&self) -> impl Iterator<Item = &RenderedMessage<'a>> {
        self.nodes.iter().filter_map(|node| match node {
            TranscriptNode::Message(m) => Some(m.as_ref()),
            _ => None,
        })
    }

    pub fn date_separators(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.iter().filter_map(|node| match node {
            TranscriptNode::DateSeparator { date_key, label } => Some((date_key.as_str(), label.as_str())),
            _ => None,
        })
    }

    pub fn footer(&self) -> Option<&str> {
        self.nodes.iter().find_map(|node| match node {
            TranscriptNode::Footer(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Serialize every node, footer included, without post-processing.
    pub fn to_html_in<Tz: TimeZone>(&self, tz: &Tz, now: DateTime<Utc>) -> String
    where
        Tz::Offset: Display,
    {
        self.serialize_in(tz, now, false)
    }

    /// Body, optionally redacted, then the footer. The footer is never redacted.
    fn serialize_in<Tz: TimeZone>(&self, tz: &Tz, now: DateTime<Utc>, remove_emails: bool) -> String
    where
        Tz::Offset: Display,
    {
        let mut writer = HtmlWriter::new(tz, now, Some(&self.user_map));
        let mut html = writer.transcript_body(self);
        if remove_emails {
            html = redact_emails(&html);
        }
        if let Some(footer) = self.footer() {
            html.push_str(&writer.footer(footer));
        }
        html
    }

    pub fn to_html(&self) -> String {
        self.to_html_in(&Local, Utc::now())
    }
}

/// Assemble, serialize and post-process a transcript using calendar days in `tz`.
///
/// With `remove_emails`, email addresses in the serialized body are redacted
/// and `mailto:` links removed. The footer is appended afterwards.
pub fn render_html_in<Tz: TimeZone>(
    messages: &[CanonicalMessage],
    options: &TranscriptOptions,
    tz: &Tz,
    now: DateTime<Utc>,
) -> String
where
    Tz::Offset: Display,
{
    let transcript = assemble_in(messages, options, tz, now);
    let html = transcript.serialize_in(tz, now, options.remove_emails);

    tracing::info!(
        messages = messages.len(),
        bytes = html.len(),
        redacted = options.remove_emails,
        "rendered transcript"
    );
    html
}

/// [`render_html_in`] in the local time zone at the current time.
pub fn render_html(messages: &[CanonicalMessage], options: &TranscriptOptions) -> String {
    render_html_in(messages, options, &Local, Utc::now())
}
