//! HTML fragment serializer for assembled transcripts.
//!
//! Every element carries a `chat-` class; the stylesheet lives with the page
//! shell. Block elements produced from message bodies carry their document
//! key as `data-key`.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use super::{AttachmentGroups, RenderedMessage, Transcript, TranscriptNode};
use crate::markup::{BlockItem, BlockNode, Document, DocumentBuilder, InlineRun, TimestampStyle, UserMap};
use crate::model::{
    Attachment, Button, Component, Embed, MediaItem, PartialEmoji, SectionAccessory,
    SeparatorSpacing, StringSelect, Thumbnail, BUTTON_STYLE_LINK,
};
use crate::palette;

const EMOJI_CDN: &str = "https://cdn.discordapp.com/emojis";

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-readable size: `512 B`, `1.5 KB`, `2.25 MB`. Empty when unknown.
pub fn format_file_size(bytes: Option<u64>) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    match bytes {
        None | Some(0) => String::new(),
        Some(b) if b < KB => format!("{} B", b),
        Some(b) if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
        Some(b) => format!("{:.2} MB", b as f64 / MB as f64),
    }
}

fn emoji_url(id: &str, animated: bool, size: u32) -> String {
    let ext = if animated { "gif" } else { "webp" };
    format!("{}/{}.{}?size={}", EMOJI_CDN, escape_html(id), ext, size)
}

fn link_open(url: &str, class: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"{}\">",
        escape_html(url),
        class
    )
}

/// Serializes transcript nodes. Timestamps render in `tz` relative to `now`.
///
/// Embed and component text is parsed on the fly, so the writer keeps its own
/// [`DocumentBuilder`].
pub struct HtmlWriter<'a, Tz: TimeZone> {
    tz: &'a Tz,
    now: DateTime<Utc>,
    user_map: Option<&'a UserMap>,
    docs: DocumentBuilder,
}

impl<'a, Tz: TimeZone> HtmlWriter<'a, Tz>
where
    Tz::Offset: Display,
{
    pub fn new(tz: &'a Tz, now: DateTime<Utc>, user_map: Option<&'a UserMap>) -> Self {
        Self {
            tz,
            now,
            user_map,
            docs: DocumentBuilder::new(),
        }
    }

    /// Channel view with date separators and messages. Footer nodes are
    /// skipped; see [`HtmlWriter::footer`].
    pub fn transcript_body(&mut self, transcript: &Transcript<'_>) -> String {
        let mut out = String::from("<div class=\"chat-channel-view\">");
        out.push_str("<div class=\"chat-channel-header\"><span class=\"chat-channel-header-icon\">#</span>");
        out.push_str(&format!(
            "<span class=\"chat-channel-header-name\">{}</span></div>",
            escape_html(transcript.channel_name.as_deref().unwrap_or("channel"))
        ));
        out.push_str("<div class=\"chat-messages\">");

        for node in &transcript.nodes {
            match node {
                TranscriptNode::DateSeparator { date_key, label } => {
                    out.push_str(&date_separator(date_key, label));
                }
                TranscriptNode::Message(message) => out.push_str(&self.message(message)),
                TranscriptNode::Footer(_) => {}
            }
        }

        out.push_str("</div></div>");
        out
    }

    pub fn footer(&self, text: &str) -> String {
        format!("<div class=\"chat-transcript-footer\">{}</div>", escape_html(text))
    }

    pub fn message(&mut self, rendered: &RenderedMessage<'_>) -> String {
        let mut class = String::from("chat-message");
        if rendered.is_group_start {
            class.push_str(" chat-message-group-start");
        }
        if rendered.reply.is_some() {
            class.push_str(" chat-message-has-reply");
        }
        if rendered.interaction.is_some() {
            class.push_str(" chat-message-has-interaction");
        }

        let mut out = format!(
            "<div class=\"{}\" data-date-key=\"{}\">",
            class,
            escape_html(&rendered.date_key)
        );

        if let Some(reply) = &rendered.reply {
            out.push_str("<div class=\"chat-reply\"><div class=\"chat-reply-spine\"></div>");
            match &reply.avatar_url {
                Some(url) => out.push_str(&format!(
                    "<img src=\"{}\" alt=\"\" class=\"chat-reply-avatar\">",
                    escape_html(url)
                )),
                None => out.push_str("<div class=\"chat-reply-avatar-fallback\"></div>"),
            }
            out.push_str(&format!(
                "<span class=\"chat-reply-username\">{}</span><span class=\"chat-reply-text\">{}</span></div>",
                escape_html(&reply.author_name),
                escape_html(&reply.text)
            ));
        }

        if let Some(header) = &rendered.interaction {
            out.push_str("<div class=\"chat-interaction\">");
            if let Some(url) = &header.avatar_url {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"\" class=\"chat-interaction-avatar\">",
                    escape_html(url)
                ));
            }
            out.push_str(&format!(
                "<span class=\"chat-interaction-username\">{}</span><span class=\"chat-interaction-label\"> used </span>",
                escape_html(&header.user_name)
            ));
            if let Some(command) = &header.command {
                out.push_str(&format!(
                    "<span class=\"chat-interaction-command\">/{}</span>",
                    escape_html(command)
                ));
            }
            out.push_str("</div>");
        }

        out.push_str("<div class=\"chat-message-row\"><div class=\"chat-message-gutter\">");
        if rendered.is_group_start {
            match &rendered.message.author.avatar_url {
                Some(url) => out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" class=\"chat-avatar\">",
                    escape_html(url),
                    escape_html(&rendered.message.author.username)
                )),
                None => out.push_str(&format!(
                    "<div class=\"chat-avatar-fallback\" style=\"background-color: {}\">{}</div>",
                    rendered.avatar_color,
                    escape_html(&rendered.avatar_initial)
                )),
            }
        } else {
            out.push_str(&format!(
                "<span class=\"chat-compact-timestamp\">{}</span>",
                escape_html(&rendered.compact_timestamp)
            ));
        }
        out.push_str("</div><div class=\"chat-message-content\">");

        if rendered.is_group_start {
            out.push_str(&self.message_header(rendered));
        }

        if !rendered.body.is_empty() {
            out.push_str("<div class=\"chat-message-text\">");
            out.push_str(&self.document(&rendered.body));
            if rendered.edited {
                out.push_str("<span class=\"chat-message-edited\"> (edited)</span>");
            }
            out.push_str("</div>");
        }

        out.push_str(&attachments(&rendered.attachments));

        if !rendered.embeds.is_empty() {
            out.push_str("<div class=\"chat-message-embeds\">");
            for embed in &rendered.embeds {
                out.push_str(&self.embed(embed));
            }
            out.push_str("</div>");
        }

        if !rendered.components.is_empty() {
            out.push_str("<div class=\"chat-components\">");
            for component in &rendered.components {
                out.push_str(&self.component(component));
            }
            out.push_str("</div>");
        }

        out.push_str("</div></div></div>");
        out
    }

    fn message_header(&self, rendered: &RenderedMessage<'_>) -> String {
        let mut out = format!(
            "<div class=\"chat-message-header\"><span class=\"chat-message-author\" style=\"color: {}\">{}</span>",
            rendered.author_color,
            escape_html(&rendered.author_name)
        );
        if let Some(role) = &rendered.role_label {
            out.push_str(&format!(
                "<span class=\"chat-message-role\">({})</span>",
                escape_html(role)
            ));
        }
        if rendered.message.is_bot {
            out.push_str("<span class=\"chat-bot-badge\">BOT</span>");
        }
        out.push_str(&format!(
            "<span class=\"chat-message-timestamp\">{}</span></div>",
            escape_html(&rendered.full_timestamp)
        ));
        out
    }

    /// Block sequence of one document, one `<br>` per recorded line break.
    pub fn document(&self, doc: &Document) -> String {
        let mut out = String::new();

        for node in doc.nodes() {
            let key = escape_html(&node.key);
            let block = match &node.item {
                BlockItem::Block(block) => block,
                BlockItem::LineBreak => {
                    out.push_str("<br>");
                    continue;
                }
            };
            match block {
                BlockNode::Paragraph(runs) => {
                    out.push_str(&format!(
                        "<span class=\"chat-line\" data-key=\"{}\">{}</span>",
                        key,
                        self.runs(runs)
                    ));
                }
                BlockNode::Heading { level, runs } => {
                    out.push_str(&format!(
                        "<div class=\"chat-heading chat-h{}\" data-key=\"{}\">{}</div>",
                        level,
                        key,
                        self.runs(runs)
                    ));
                }
                BlockNode::BlockQuote(lines) => {
                    let content: Vec<String> = lines.iter().map(|line| self.runs(line)).collect();
                    out.push_str(&format!(
                        "<div class=\"chat-blockquote\" data-key=\"{}\"><div class=\"chat-blockquote-bar\"></div><div class=\"chat-blockquote-content\">{}</div></div>",
                        key,
                        content.join("<br>")
                    ));
                }
                BlockNode::CodeBlock { language, code } => {
                    out.push_str(&format!("<pre class=\"chat-code-block\" data-key=\"{}\"", key));
                    if !language.is_empty() {
                        out.push_str(&format!(" data-language=\"{}\"", escape_html(language)));
                    }
                    out.push_str(&format!("><code>{}</code></pre>", escape_html(code)));
                }
            }
        }

        out
    }

    pub fn runs(&self, runs: &[InlineRun]) -> String {
        runs.iter().map(|run| self.run(run)).collect()
    }

    fn run(&self, run: &InlineRun) -> String {
        match run {
            InlineRun::Text(text) => escape_html(text),
            InlineRun::BoldItalic(children) => {
                format!("<strong><em>{}</em></strong>", self.runs(children))
            }
            InlineRun::Bold(children) => format!("<strong>{}</strong>", self.runs(children)),
            InlineRun::Italic(children) => format!("<em>{}</em>", self.runs(children)),
            InlineRun::Underline(children) => format!("<u>{}</u>", self.runs(children)),
            InlineRun::Strikethrough(children) => format!("<s>{}</s>", self.runs(children)),
            InlineRun::Spoiler(children) => {
                format!("<span class=\"chat-spoiler\">{}</span>", self.runs(children))
            }
            InlineRun::InlineCode(code) => {
                format!("<code class=\"chat-inline-code\">{}</code>", escape_html(code))
            }
            InlineRun::Link { label, url } => {
                format!("{}{}</a>", link_open(url, "chat-link"), escape_html(label))
            }
            InlineRun::RawUrl(url) => format!("{}{}</a>", link_open(url, "chat-link"), escape_html(url)),
            InlineRun::UserMention { user_id, resolved_name } => format!(
                "<span class=\"chat-mention\" data-user-id=\"{}\">&lt;@{}&gt;</span>",
                escape_html(user_id),
                escape_html(resolved_name.as_deref().unwrap_or(user_id))
            ),
            InlineRun::ChannelMention { channel_id } => format!(
                "<span class=\"chat-mention chat-channel-mention\" data-channel-id=\"{}\"><span class=\"chat-mention-icon\">#</span>channel</span>",
                escape_html(channel_id)
            ),
            InlineRun::RoleMention { role_id } => format!(
                "<span class=\"chat-mention chat-role-mention\" data-role-id=\"{}\">@role</span>",
                escape_html(role_id)
            ),
            InlineRun::EveryoneMention(scope) => {
                format!("<span class=\"chat-mention\">@{}</span>", scope.as_str())
            }
            InlineRun::CustomEmoji { name, id, animated } => {
                let alt = escape_html(&format!(":{}:", name));
                format!(
                    "<img src=\"{}&amp;quality=lossless\" alt=\"{}\" title=\"{}\" class=\"chat-custom-emoji\">",
                    emoji_url(id, *animated, 48),
                    alt,
                    alt
                )
            }
            InlineRun::Timestamp { unix_seconds, style } => {
                let full = TimestampStyle::LongDateTime.render(*unix_seconds, self.tz, self.now);
                let shown = style.render(*unix_seconds, self.tz, self.now);
                format!(
                    "<span class=\"chat-timestamp\" title=\"{}\">{}</span>",
                    escape_html(&full),
                    escape_html(&shown)
                )
            }
        }
    }

    /// Parse and serialize embed or component text with the writer's user map.
    fn markup(&mut self, text: &str) -> String {
        let doc = self.docs.build(text, self.user_map);
        self.document(&doc)
    }

    fn embed(&mut self, embed: &Embed) -> String {
        let mut out = format!(
            "<div class=\"chat-embed\"><div class=\"chat-embed-color-bar\" style=\"background-color: {}\"></div><div class=\"chat-embed-content\">",
            palette::embed_color(embed.color)
        );

        if let Some(thumbnail) = &embed.thumbnail {
            out.push_str(&format!(
                "<div class=\"chat-embed-thumbnail\">{}<img src=\"{}\" alt=\"Thumbnail\"></a></div>",
                link_open(&thumbnail.url, "chat-embed-thumbnail-link"),
                escape_html(&thumbnail.url)
            ));
        }

        if let Some(author) = &embed.author {
            out.push_str("<div class=\"chat-embed-author\">");
            if let Some(icon) = &author.icon_url {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"\" class=\"chat-embed-author-icon\">",
                    escape_html(icon)
                ));
            }
            match &author.url {
                Some(url) => out.push_str(&format!(
                    "{}{}</a>",
                    link_open(url, "chat-embed-author-name"),
                    escape_html(&author.name)
                )),
                None => out.push_str(&format!(
                    "<span class=\"chat-embed-author-name\">{}</span>",
                    escape_html(&author.name)
                )),
            }
            out.push_str("</div>");
        }

        if let Some(title) = &embed.title {
            out.push_str("<div class=\"chat-embed-title\">");
            match &embed.url {
                Some(url) => out.push_str(&format!(
                    "{}{}</a>",
                    link_open(url, "chat-link"),
                    escape_html(title)
                )),
                None => out.push_str(&escape_html(title)),
            }
            out.push_str("</div>");
        }

        if let Some(description) = &embed.description {
            let body = self.markup(description);
            out.push_str(&format!("<div class=\"chat-embed-description\">{}</div>", body));
        }

        if !embed.fields.is_empty() {
            out.push_str("<div class=\"chat-embed-fields\">");
            for field in &embed.fields {
                let value = self.markup(&field.value);
                out.push_str(&format!(
                    "<div class=\"chat-embed-field{}\"><div class=\"chat-embed-field-name\">{}</div><div class=\"chat-embed-field-value\">{}</div></div>",
                    if field.inline { " inline" } else { "" },
                    escape_html(&field.name),
                    value
                ));
            }
            out.push_str("</div>");
        }

        if let Some(image) = &embed.image {
            out.push_str(&format!(
                "<div class=\"chat-embed-image-container\">{}<img src=\"{}\" alt=\"Embed image\" class=\"chat-embed-image\"></a></div>",
                link_open(&image.url, "chat-embed-image-link"),
                escape_html(&image.url)
            ));
        }

        if let Some(url) = embed.video.as_ref().and_then(|v| v.url.as_ref()) {
            out.push_str(&format!(
                "<div class=\"chat-embed-video-container\"><video src=\"{}\" controls preload=\"metadata\" class=\"chat-embed-video\"></video></div>",
                escape_html(url)
            ));
        }

        if embed.footer.is_some() || embed.timestamp.is_some() {
            out.push_str("<div class=\"chat-embed-footer\">");
            if let Some(footer) = &embed.footer {
                if let Some(icon) = &footer.icon_url {
                    out.push_str(&format!(
                        "<img src=\"{}\" alt=\"\" class=\"chat-embed-footer-icon\">",
                        escape_html(icon)
                    ));
                }
                out.push_str(&format!(
                    "<span class=\"chat-embed-footer-text\">{}</span>",
                    escape_html(&footer.text)
                ));
            }
            if let Some(at) = &embed.timestamp {
                if embed.footer.is_some() {
                    out.push_str("<span class=\"chat-embed-footer-separator\"> \u{2022} </span>");
                }
                let shown = at.with_timezone(self.tz).format("%b %-d, %Y %-I:%M %p").to_string();
                out.push_str(&format!(
                    "<span class=\"chat-embed-footer-timestamp\">{}</span>",
                    escape_html(&shown)
                ));
            }
            out.push_str("</div>");
        }

        out.push_str("</div></div>");
        out
    }

    fn component(&mut self, component: &Component) -> String {
        match component {
            Component::ActionRow(children) => {
                let mut out = String::from("<div class=\"chat-action-row\">");
                for child in children {
                    match child {
                        Component::Button(button) => out.push_str(&button_html(button)),
                        Component::StringSelect(select) => out.push_str(&select_html(select)),
                        _ => {}
                    }
                }
                out.push_str("</div>");
                out
            }
            Component::Button(button) => button_html(button),
            Component::StringSelect(select) => select_html(select),
            Component::TextDisplay(content) => {
                format!("<div class=\"chat-text-display\">{}</div>", self.markup(content))
            }
            Component::Section { texts, accessory } => {
                let mut out = String::from("<div class=\"chat-section\"><div class=\"chat-section-text\">");
                for text in texts {
                    let body = self.markup(text);
                    out.push_str(&format!("<div class=\"chat-section-text-item\">{}</div>", body));
                }
                out.push_str("</div>");
                if let Some(accessory) = accessory {
                    out.push_str("<div class=\"chat-section-accessory\">");
                    match accessory {
                        SectionAccessory::Button(button) => out.push_str(&button_html(button)),
                        SectionAccessory::Thumbnail(thumbnail) => out.push_str(&thumbnail_html(thumbnail)),
                    }
                    out.push_str("</div>");
                }
                out.push_str("</div>");
                out
            }
            Component::Thumbnail(thumbnail) => thumbnail_html(thumbnail),
            Component::MediaGallery(items) => media_gallery_html(items),
            Component::File { url, spoiler } => {
                let filename = url
                    .split(['?', '#'])
                    .next()
                    .and_then(|path| path.rsplit('/').next())
                    .filter(|name| !name.is_empty())
                    .unwrap_or("file");
                let ext = filename
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_uppercase())
                    .unwrap_or_default();
                file_card(url, filename, &ext, None, *spoiler)
            }
            Component::Separator { divider, spacing } => {
                let spacing = match spacing {
                    SeparatorSpacing::Small => "chat-separator-small",
                    SeparatorSpacing::Large => "chat-separator-large",
                };
                let base = if *divider { "chat-separator" } else { "chat-separator-spacing" };
                format!("<div class=\"{} {}\"></div>", base, spacing)
            }
            Component::Container {
                accent_color,
                spoiler,
                components,
            } => {
                let mut out = format!(
                    "<div class=\"chat-container{}\">",
                    if *spoiler { " chat-container-spoiler" } else { "" }
                );
                if let Some(color) = accent_color {
                    out.push_str(&format!(
                        "<div class=\"chat-container-accent\" style=\"background-color: {}\"></div>",
                        palette::hex_color(*color)
                    ));
                }
                out.push_str("<div class=\"chat-container-content\">");
                for child in components {
                    out.push_str(&self.component(child));
                }
                out.push_str("</div>");
                if *spoiler {
                    out.push_str("<div class=\"chat-spoiler-overlay\">SPOILER</div>");
                }
                out.push_str("</div>");
                out
            }
            Component::Unsupported(_) => String::new(),
        }
    }
}

fn date_separator(date_key: &str, label: &str) -> String {
    format!(
        "<div class=\"chat-date-separator\" data-date-key=\"{}\"><div class=\"chat-date-separator-line\"></div><span class=\"chat-date-separator-text\">{}</span><div class=\"chat-date-separator-line\"></div></div>",
        escape_html(date_key),
        escape_html(label)
    )
}

fn emoji_html(emoji: &PartialEmoji) -> String {
    let inner = match (&emoji.id, &emoji.name) {
        (Some(id), name) => format!(
            "<img src=\"{}\" alt=\"{}\" class=\"chat-button-emoji-img\">",
            emoji_url(id, emoji.animated, 20),
            escape_html(name.as_deref().unwrap_or(""))
        ),
        (None, Some(name)) => escape_html(name),
        (None, None) => String::new(),
    };
    format!("<span class=\"chat-button-emoji\">{}</span>", inner)
}

fn button_html(button: &Button) -> String {
    let class = format!("chat-button chat-button-{}", button.style);
    let mut content = button.emoji.as_ref().map(emoji_html).unwrap_or_default();
    content.push_str(&escape_html(button.label.as_deref().unwrap_or("")));

    match &button.url {
        Some(url) if button.style == BUTTON_STYLE_LINK => format!(
            "{}{}</a>",
            link_open(url, &format!("{} chat-button-link", class)),
            content
        ),
        _ => format!(
            "<button class=\"{}\"{}>{}</button>",
            class,
            if button.disabled { " disabled" } else { "" },
            content
        ),
    }
}

fn select_html(select: &StringSelect) -> String {
    format!(
        "<div class=\"chat-select-wrapper\"><div class=\"chat-select{}\"><span class=\"chat-select-text\">{}</span></div></div>",
        if select.disabled { " disabled" } else { "" },
        escape_html(select.placeholder.as_deref().unwrap_or("Make a selection"))
    )
}

fn thumbnail_html(thumbnail: &Thumbnail) -> String {
    let mut out = format!(
        "<div class=\"chat-thumbnail{}\"><img src=\"{}\" alt=\"{}\" class=\"chat-thumbnail-img\">",
        if thumbnail.spoiler { " chat-thumbnail-spoiler" } else { "" },
        escape_html(&thumbnail.url),
        escape_html(thumbnail.description.as_deref().unwrap_or(""))
    );
    if thumbnail.spoiler {
        out.push_str("<div class=\"chat-spoiler-overlay\">SPOILER</div>");
    }
    out.push_str("</div>");
    out
}

fn media_gallery_html(items: &[MediaItem]) -> String {
    let grid = match items.len() {
        1 => "chat-media-gallery-1",
        2 => "chat-media-gallery-2",
        _ => "chat-media-gallery-multi",
    };
    let mut out = format!("<div class=\"chat-media-gallery {}\">", grid);
    for (i, item) in items.iter().enumerate() {
        let alt = item
            .description
            .clone()
            .unwrap_or_else(|| format!("Media {}", i + 1));
        out.push_str(&format!(
            "<div class=\"chat-media-gallery-item{}\">{}<img src=\"{}\" alt=\"{}\" class=\"chat-media-gallery-img\"></a>",
            if item.spoiler { " chat-media-gallery-spoiler" } else { "" },
            link_open(&item.url, "chat-media-gallery-link"),
            escape_html(&item.url),
            escape_html(&alt)
        ));
        if item.spoiler {
            out.push_str("<div class=\"chat-spoiler-overlay\">SPOILER</div>");
        }
        out.push_str("</div>");
    }
    out.push_str("</div>");
    out
}

fn file_card(url: &str, filename: &str, ext: &str, size: Option<u64>, spoiler: bool) -> String {
    let mut out = format!(
        "<div class=\"chat-file-attachment{}\"><div class=\"chat-file-icon\" data-ext=\"{}\">{}</div><div class=\"chat-file-info\">{}{}</a>",
        if spoiler { " chat-file-spoiler" } else { "" },
        escape_html(ext),
        escape_html(ext),
        link_open(url, "chat-file-name"),
        escape_html(filename)
    );
    let size = format_file_size(size);
    if !size.is_empty() {
        out.push_str(&format!("<span class=\"chat-file-size\">{}</span>", size));
    }
    out.push_str(&format!(
        "</div>{}Download</a></div>",
        link_open(url, "chat-file-download")
    ));
    out
}

fn attachments(groups: &AttachmentGroups<'_>) -> String {
    if groups.is_empty() {
        return String::new();
    }
    let mut out = String::new();

    if !groups.images.is_empty() {
        let grid = match groups.images.len() {
            1 => "chat-image-single",
            2 => "chat-image-grid-2",
            3 => "chat-image-grid-3",
            _ => "chat-image-grid-4",
        };
        out.push_str(&format!(
            "<div class=\"chat-message-attachments\"><div class=\"chat-image-grid {}\">",
            grid
        ));
        for image in &groups.images {
            out.push_str(&image_html(image));
        }
        out.push_str("</div></div>");
    }

    if !groups.videos.is_empty() {
        out.push_str("<div class=\"chat-message-attachments\">");
        for video in &groups.videos {
            out.push_str(&format!(
                "<div class=\"chat-video-wrapper\"><video src=\"{}\" controls preload=\"metadata\" class=\"chat-attachment-video\"><source src=\"{}\" type=\"{}\"></video></div>",
                escape_html(&video.url),
                escape_html(&video.url),
                escape_html(video.content_type.as_deref().unwrap_or("video/mp4"))
            ));
        }
        out.push_str("</div>");
    }

    if !groups.audio.is_empty() {
        out.push_str("<div class=\"chat-message-attachments\">");
        for audio in &groups.audio {
            out.push_str(&format!(
                "<div class=\"chat-audio-wrapper\"><div class=\"chat-audio-file-info\">{}{}</a>",
                link_open(&audio.url, "chat-audio-filename"),
                escape_html(&audio.filename)
            ));
            let size = format_file_size(audio.size);
            if !size.is_empty() {
                out.push_str(&format!("<span class=\"chat-audio-size\">{}</span>", size));
            }
            out.push_str(&format!(
                "</div><audio src=\"{}\" controls preload=\"metadata\" class=\"chat-attachment-audio\"></audio></div>",
                escape_html(&audio.url)
            ));
        }
        out.push_str("</div>");
    }

    if !groups.files.is_empty() {
        out.push_str("<div class=\"chat-message-attachments\">");
        for file in &groups.files {
            out.push_str(&file_card(
                &file.url,
                &file.filename,
                &file.extension_label(),
                file.size,
                file.spoiler,
            ));
        }
        out.push_str("</div>");
    }

    out
}

fn image_html(image: &Attachment) -> String {
    let mut out = format!(
        "{}<img src=\"{}\" alt=\"{}\" class=\"chat-attachment-image{}\">",
        link_open(&image.url, "chat-image-wrapper"),
        escape_html(&image.url),
        escape_html(&image.filename),
        if image.spoiler { " chat-spoiler-image" } else { "" }
    );
    if image.spoiler {
        out.push_str("<div class=\"chat-spoiler-overlay\">SPOILER</div>");
    }
    out.push_str("</a>");
    out
}
