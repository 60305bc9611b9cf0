//! Canonical, vendor-neutral message records consumed by the transcript core.
//!
//! These are read-only inputs. The JSON shape matches what the upstream
//! converter emits: message-level fields are camelCase, embed and component
//! fields keep the snake_case names of the chat service payloads.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Author or referenced user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "avatarURL")]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            display_name: String::new(),
            avatar_url: None,
        }
    }

    /// Display name if set, otherwise the username.
    pub fn shown_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

/// Pointer to the message being replied to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReference {
    pub message_id: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub content: Option<String>,
    /// Whether the referenced message carried attachments.
    #[serde(default)]
    pub attachments: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionKind {
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
}

/// Slash-command (or other interaction) that produced the message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// File attached to a message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub spoiler: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    File,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav", "flac", "m4a"];

impl Attachment {
    /// Classify by MIME type, falling back to the URL's extension.
    pub fn kind(&self) -> AttachmentKind {
        if let Some(ct) = self.content_type.as_deref() {
            if ct.starts_with("image/") {
                return AttachmentKind::Image;
            }
            if ct.starts_with("video/") {
                return AttachmentKind::Video;
            }
            if ct.starts_with("audio/") {
                return AttachmentKind::Audio;
            }
        }

        let ext = url_extension(&self.url);
        let is = |list: &[&str]| ext.as_deref().is_some_and(|e| list.contains(&e));
        if is(IMAGE_EXTENSIONS) {
            AttachmentKind::Image
        } else if is(VIDEO_EXTENSIONS) {
            AttachmentKind::Video
        } else if is(AUDIO_EXTENSIONS) {
            AttachmentKind::Audio
        } else {
            AttachmentKind::File
        }
    }

    /// Upper-cased extension of the filename, empty when there is none.
    pub fn extension_label(&self) -> String {
        match self.filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_uppercase(),
            None => String::new(),
        }
    }
}

/// Lower-cased extension of a URL path, ignoring any query string.
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    last.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

// ============================================================================
// Embeds
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedVideo {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedProvider {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub footer: Option<EmbedFooter>,
    #[serde(default)]
    pub image: Option<EmbedImage>,
    #[serde(default)]
    pub thumbnail: Option<EmbedImage>,
    #[serde(default)]
    pub video: Option<EmbedVideo>,
    #[serde(default)]
    pub provider: Option<EmbedProvider>,
    #[serde(default)]
    pub author: Option<EmbedAuthor>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PartialEmoji {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub animated: bool,
}

/// Button style as sent by the service: 1 primary, 2 secondary, 3 success,
/// 4 danger, 5 link, 6 premium.
pub const BUTTON_STYLE_LINK: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub style: u8,
    pub label: Option<String>,
    pub emoji: Option<PartialEmoji>,
    pub url: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emoji: Option<PartialEmoji>,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringSelect {
    pub placeholder: Option<String>,
    pub options: Vec<SelectOption>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub url: String,
    pub description: Option<String>,
    pub spoiler: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionAccessory {
    Button(Button),
    Thumbnail(Thumbnail),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub spoiler: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorSpacing {
    Small,
    Large,
}

/// Interactive or layout component attached to a message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawComponent")]
pub enum Component {
    ActionRow(Vec<Component>),
    Button(Button),
    StringSelect(StringSelect),
    Section {
        texts: Vec<String>,
        accessory: Option<SectionAccessory>,
    },
    TextDisplay(String),
    Thumbnail(Thumbnail),
    MediaGallery(Vec<MediaItem>),
    File {
        url: String,
        spoiler: bool,
    },
    Separator {
        divider: bool,
        spacing: SeparatorSpacing,
    },
    Container {
        accent_color: Option<u32>,
        spoiler: bool,
        components: Vec<Component>,
    },
    /// A `type` this crate does not render. Kept so the rest of the message
    /// still loads.
    Unsupported(u8),
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    url: String,
}

/// Flat wire shape of every component kind, discriminated by `type`.
#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    components: Vec<RawComponent>,
    #[serde(default)]
    style: Option<u8>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    emoji: Option<PartialEmoji>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    options: Vec<SelectOption>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    accessory: Option<Box<RawComponent>>,
    #[serde(default)]
    media: Option<MediaRef>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    spoiler: bool,
    #[serde(default)]
    items: Vec<MediaItem>,
    #[serde(default)]
    file: Option<MediaRef>,
    #[serde(default)]
    divider: Option<bool>,
    #[serde(default)]
    spacing: Option<u8>,
    #[serde(default)]
    accent_color: Option<u32>,
}

impl RawComponent {
    fn into_button(self) -> Button {
        Button {
            style: self.style.unwrap_or(2),
            label: self.label,
            emoji: self.emoji,
            url: self.url,
            disabled: self.disabled,
        }
    }

    fn into_thumbnail(self) -> Thumbnail {
        Thumbnail {
            url: self.media.map(|m| m.url).or(self.url).unwrap_or_default(),
            description: self.description,
            spoiler: self.spoiler,
        }
    }
}

fn convert_children(raw: Vec<RawComponent>) -> Vec<Component> {
    raw.into_iter().map(Component::from).collect()
}

impl From<RawComponent> for Component {
    fn from(raw: RawComponent) -> Self {
        match raw.kind {
            1 => Component::ActionRow(convert_children(raw.components)),
            2 => Component::Button(raw.into_button()),
            3 => Component::StringSelect(StringSelect {
                placeholder: raw.placeholder,
                options: raw.options,
                disabled: raw.disabled,
            }),
            9 => {
                let texts = raw
                    .components
                    .into_iter()
                    .filter_map(|c| c.content)
                    .collect();
                let accessory = match raw.accessory {
                    Some(acc) if acc.kind == 2 => Some(SectionAccessory::Button(acc.into_button())),
                    Some(acc) if acc.kind == 11 => {
                        Some(SectionAccessory::Thumbnail(acc.into_thumbnail()))
                    }
                    Some(acc) => {
                        tracing::debug!(kind = acc.kind, "skipping unsupported section accessory");
                        None
                    }
                    None => None,
                };
                Component::Section { texts, accessory }
            }
            10 => Component::TextDisplay(raw.content.unwrap_or_default()),
            11 => Component::Thumbnail(raw.into_thumbnail()),
            12 => Component::MediaGallery(raw.items),
            13 => Component::File {
                url: raw.file.map(|f| f.url).or(raw.url).unwrap_or_default(),
                spoiler: raw.spoiler,
            },
            14 => Component::Separator {
                divider: raw.divider.unwrap_or(true),
                spacing: if raw.spacing == Some(2) {
                    SeparatorSpacing::Large
                } else {
                    SeparatorSpacing::Small
                },
            },
            17 => Component::Container {
                accent_color: raw.accent_color,
                spoiler: raw.spoiler,
                components: convert_children(raw.components),
            },
            other => {
                tracing::debug!(kind = other, "skipping unsupported component");
                Component::Unsupported(other)
            }
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// A chat message as handed to the transcript core.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMessage {
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reference: Option<MessageReference>,
    #[serde(default)]
    pub interaction: Option<Interaction>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub is_bot: bool,
    /// Role color of the author as a 24-bit RGB integer.
    #[serde(default)]
    pub author_role_color: Option<u32>,
}

impl CanonicalMessage {
    pub fn new(author: User, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            author,
            content: content.into(),
            created_at,
            edited_at: None,
            reference: None,
            interaction: None,
            attachments: Vec::new(),
            embeds: Vec::new(),
            components: Vec::new(),
            is_bot: false,
            author_role_color: None,
        }
    }

    pub fn with_reference(mut self, reference: MessageReference) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = Some(interaction);
        self
    }
}

/// Parse a JSON array of messages.
pub fn messages_from_json(json: &str) -> serde_json::Result<Vec<CanonicalMessage>> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(url: &str, content_type: Option<&str>) -> Attachment {
        Attachment {
            url: url.to_string(),
            filename: url.rsplit('/').next().unwrap_or(url).to_string(),
            size: None,
            content_type: content_type.map(str::to_string),
            width: None,
            height: None,
            spoiler: false,
        }
    }

    #[test]
    fn test_attachment_kind() {
        assert_eq!(attachment("https://cdn/x.bin", Some("image/png")).kind(), AttachmentKind::Image);
        assert_eq!(attachment("https://cdn/clip.MP4?ex=1", None).kind(), AttachmentKind::Video);
        assert_eq!(attachment("https://cdn/song.flac", None).kind(), AttachmentKind::Audio);
        assert_eq!(attachment("https://cdn/notes.txt", None).kind(), AttachmentKind::File);
        assert_eq!(attachment("https://cdn/noext", None).kind(), AttachmentKind::File);
    }

    #[test]
    fn test_extension_label() {
        assert_eq!(attachment("https://cdn/report.pdf", None).extension_label(), "PDF");
        assert_eq!(attachment("https://cdn/README", None).extension_label(), "");
    }

    #[test]
    fn test_message_from_json() {
        let json = r#"[{
            "author": {"id": "1", "username": "alice", "displayName": "Alice", "avatarURL": "https://a/1.png"},
            "content": "hi <@2>",
            "createdAt": "2026-10-17T12:00:00Z",
            "reference": {"messageId": "9", "content": "earlier"},
            "interaction": {"type": "APPLICATION_COMMAND", "name": "ping"},
            "embeds": [{"title": "T", "color": 16711680, "fields": [{"name": "a", "value": "b"}]}],
            "components": [{"type": 1, "components": [{"type": 2, "style": 5, "label": "Go", "url": "https://x"}]}],
            "isBot": true,
            "authorRoleColor": 255
        }]"#;
        let messages = messages_from_json(json).unwrap();
        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert_eq!(msg.author.shown_name(), "Alice");
        assert!(msg.is_bot);
        assert_eq!(msg.author_role_color, Some(255));
        assert_eq!(msg.reference.as_ref().unwrap().message_id, "9");
        assert_eq!(msg.interaction.as_ref().unwrap().kind, InteractionKind::ApplicationCommand);
        assert_eq!(msg.embeds[0].fields.len(), 1);
        match &msg.components[0] {
            Component::ActionRow(children) => match &children[0] {
                Component::Button(button) => {
                    assert_eq!(button.style, BUTTON_STYLE_LINK);
                    assert_eq!(button.url.as_deref(), Some("https://x"));
                }
                other => panic!("expected button, got {:?}", other),
            },
            other => panic!("expected action row, got {:?}", other),
        }
    }

    #[test]
    fn test_v2_components_from_json() {
        let json = r#"[
            {"type": 17, "accent_color": 65280, "components": [
                {"type": 10, "content": "**hello**"},
                {"type": 14, "divider": false, "spacing": 2},
                {"type": 9, "components": [{"type": 10, "content": "side"}],
                 "accessory": {"type": 11, "media": {"url": "https://img/t.png"}}}
            ]},
            {"type": 13, "file": {"url": "https://cdn/a/report.pdf"}}
        ]"#;
        let components: Vec<Component> = serde_json::from_str(json).unwrap();
        match &components[0] {
            Component::Container { accent_color, components, .. } => {
                assert_eq!(*accent_color, Some(65280));
                assert_eq!(components[0], Component::TextDisplay("**hello**".into()));
                assert_eq!(
                    components[1],
                    Component::Separator { divider: false, spacing: SeparatorSpacing::Large }
                );
                match &components[2] {
                    Component::Section { texts, accessory: Some(SectionAccessory::Thumbnail(t)) } => {
                        assert_eq!(texts, &vec!["side".to_string()]);
                        assert_eq!(t.url, "https://img/t.png");
                    }
                    other => panic!("expected section, got {:?}", other),
                }
            }
            other => panic!("expected container, got {:?}", other),
        }
        assert_eq!(
            components[1],
            Component::File { url: "https://cdn/a/report.pdf".into(), spoiler: false }
        );
    }

    #[test]
    fn test_unknown_component_type_degrades() {
        let json = r#"[{
            "author": {"id": "1", "username": "alice"},
            "content": "still here",
            "createdAt": "2026-10-17T12:00:00Z",
            "components": [
                {"type": 1, "components": [{"type": 5}, {"type": 2, "label": "Ok"}]},
                {"type": 9, "components": [{"type": 10, "content": "t"}], "accessory": {"type": 99}}
            ]
        }]"#;
        let messages = messages_from_json(json).unwrap();
        assert_eq!(messages[0].content, "still here");
        match &messages[0].components[0] {
            Component::ActionRow(children) => {
                assert_eq!(children[0], Component::Unsupported(5));
                assert!(matches!(children[1], Component::Button(_)));
            }
            other => panic!("expected action row, got {:?}", other),
        }
        match &messages[0].components[1] {
            Component::Section { texts, accessory } => {
                assert_eq!(texts, &vec!["t".to_string()]);
                assert!(accessory.is_none());
            }
            other => panic!("expected section, got {:?}", other),
        }
    }

    #[test]
    fn test_shown_name_falls_back_to_username() {
        let user = User::new("7", "bob");
        assert_eq!(user.shown_name(), "bob");
    }
}
