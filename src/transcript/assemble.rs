//! Per-message rendering and transcript assembly.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::debug;

use super::{
    AttachmentGroups, InteractionHeader, RenderedMessage, ReplyPreview, Transcript,
    TranscriptNode, TranscriptOptions,
};
use crate::grouping::{date_separator_label, group_in, local_date, GroupedMessage};
use crate::markup::{DocumentBuilder, UserMap};
use crate::model::{Attachment, AttachmentKind, CanonicalMessage, Interaction, MessageReference};
use crate::palette;

/// Longest reply preview, in characters, before it is cut with "...".
pub const REPLY_PREVIEW_CHARS: usize = 150;

/// Author id -> username for every message author, used for mention display.
pub fn user_map_from(messages: &[CanonicalMessage]) -> UserMap {
    let mut map = UserMap::new();
    for message in messages {
        map.insert(message.author.id.clone(), message.author.username.clone());
    }
    map
}

/// First occurrence of each structurally distinct item, in order.
pub fn dedup_structural<T: PartialEq>(items: &[T]) -> Vec<&T> {
    let mut kept: Vec<&T> = Vec::with_capacity(items.len());
    for item in items {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    kept
}

/// Build the transcript for messages ascending by `created_at`, using
/// calendar days in `tz` and `now` for "Today"/"Yesterday" labels.
pub fn assemble_in<'a, Tz: TimeZone>(
    messages: &'a [CanonicalMessage],
    options: &TranscriptOptions,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Transcript<'a>
where
    Tz::Offset: Display,
{
    let user_map = user_map_from(messages);
    let today = local_date(&now, tz);
    let mut builder = DocumentBuilder::new();
    let mut nodes = Vec::with_capacity(messages.len() + 2);
    let mut last_date_key: Option<String> = None;

    for grouped in group_in(messages, tz) {
        if last_date_key.as_deref() != Some(grouped.date_key.as_str()) {
            let date = local_date(&grouped.message.created_at, tz);
            nodes.push(TranscriptNode::DateSeparator {
                date_key: grouped.date_key.clone(),
                label: date_separator_label(date, today),
            });
            last_date_key = Some(grouped.date_key.clone());
        }

        let rendered = render_message(grouped, options, &user_map, &mut builder, tz);
        nodes.push(TranscriptNode::Message(Box::new(rendered)));
    }

    if let Some(footer) = options.footer_text.as_ref().filter(|f| !f.is_empty()) {
        nodes.push(TranscriptNode::Footer(footer.clone()));
    }

    debug!(
        messages = messages.len(),
        nodes = nodes.len(),
        "assembled transcript"
    );

    Transcript {
        nodes,
        user_map,
        channel_name: options.channel_name.clone(),
    }
}

/// [`assemble_in`] in the local time zone at the current time.
pub fn assemble<'a>(messages: &'a [CanonicalMessage], options: &TranscriptOptions) -> Transcript<'a> {
    assemble_in(messages, options, &Local, Utc::now())
}

fn render_message<'a, Tz: TimeZone>(
    grouped: GroupedMessage<'a>,
    options: &TranscriptOptions,
    user_map: &UserMap,
    builder: &mut DocumentBuilder,
    tz: &Tz,
) -> RenderedMessage<'a>
where
    Tz::Offset: Display,
{
    let message = grouped.message;
    let created = message.created_at.with_timezone(tz);

    let embeds = dedup_structural(&message.embeds);
    let components = dedup_structural(&message.components);
    let dropped = (message.embeds.len() - embeds.len()) + (message.components.len() - components.len());
    if dropped > 0 {
        debug!(author = %message.author.id, dropped, "suppressed duplicate embeds/components");
    }

    RenderedMessage {
        message,
        is_group_start: grouped.is_group_start,
        date_key: grouped.date_key,
        author_name: message.author.shown_name().to_string(),
        author_color: palette::author_color(message.author_role_color),
        avatar_color: palette::avatar_color(&message.author.id),
        avatar_initial: palette::initial(&message.author.username),
        role_label: options.user_roles.get(&message.author.id).cloned(),
        full_timestamp: created.format("%m/%d/%Y %-I:%M %p").to_string(),
        compact_timestamp: created.format("%-I:%M %p").to_string(),
        reply: message.reference.as_ref().map(reply_preview),
        interaction: message.interaction.as_ref().map(interaction_header),
        body: builder.build(&message.content, Some(user_map)),
        edited: message.edited_at.is_some(),
        attachments: classify_attachments(&message.attachments),
        embeds,
        components,
    }
}

fn reply_preview(reference: &MessageReference) -> ReplyPreview {
    let author_name = reference
        .author
        .as_ref()
        .map(|a| a.shown_name())
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown User")
        .to_string();

    let text = match reference.content.as_deref().filter(|c| !c.is_empty()) {
        Some(content) => truncate_preview(content),
        None if reference.attachments => "Click to see attachment".to_string(),
        None => "Original message was deleted".to_string(),
    };

    ReplyPreview {
        author_name,
        avatar_url: reference.author.as_ref().and_then(|a| a.avatar_url.clone()),
        text,
    }
}

fn truncate_preview(content: &str) -> String {
    match content.char_indices().nth(REPLY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

fn interaction_header(interaction: &Interaction) -> InteractionHeader {
    InteractionHeader {
        user_name: interaction
            .user
            .as_ref()
            .map(|u| u.shown_name())
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown")
            .to_string(),
        avatar_url: interaction.user.as_ref().and_then(|u| u.avatar_url.clone()),
        command: interaction.name.clone(),
    }
}

fn classify_attachments(attachments: &[Attachment]) -> AttachmentGroups<'_> {
    let mut groups = AttachmentGroups::default();
    for attachment in attachments {
        match attachment.kind() {
            AttachmentKind::Image => groups.images.push(attachment),
            AttachmentKind::Video => groups.videos.push(attachment),
            AttachmentKind::Audio => groups.audio.push(attachment),
            AttachmentKind::File => groups.files.push(attachment),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{BlockNode, InlineRun};
    use crate::model::{Embed, User};
    use chrono::FixedOffset;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, d, h, m, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        at(17, 18, 0)
    }

    fn msg(id: &str, name: &str, content: &str, created_at: DateTime<Utc>) -> CanonicalMessage {
        CanonicalMessage::new(User::new(id, name), content, created_at)
    }

    #[test]
    fn test_user_map_from_authors() {
        let messages = vec![msg("1", "alice", "", at(17, 1, 0)), msg("2", "bob", "", at(17, 2, 0))];
        let map = user_map_from(&messages);
        assert_eq!(map.get("1").map(String::as_str), Some("alice"));
        assert_eq!(map.get("2").map(String::as_str), Some("bob"));
    }

    #[test]
    fn test_mentions_resolve_through_authors() {
        let messages = vec![
            msg("1", "alice", "hello", at(17, 1, 0)),
            msg("2", "bob", "hi <@1>", at(17, 1, 1)),
        ];
        let transcript = assemble_in(&messages, &TranscriptOptions::default(), &Utc, now());
        let bob = transcript.messages().nth(1).unwrap();
        assert_eq!(
            bob.body.blocks().next(),
            Some(&BlockNode::Paragraph(vec![
                InlineRun::text("hi "),
                InlineRun::UserMention {
                    user_id: "1".into(),
                    resolved_name: Some("alice".into())
                },
            ]))
        );
    }

    #[test]
    fn test_date_separators_follow_date_changes() {
        let messages = vec![
            msg("1", "alice", "a", at(15, 10, 0)),
            msg("1", "alice", "b", at(16, 10, 0)),
            msg("1", "alice", "c", at(16, 10, 1)),
            msg("1", "alice", "d", at(17, 9, 0)),
        ];
        let transcript = assemble_in(&messages, &TranscriptOptions::default(), &Utc, now());
        let separators: Vec<(&str, &str)> = transcript.date_separators().collect();
        assert_eq!(
            separators,
            vec![
                ("2026-10-15", "October 15, 2026"),
                ("2026-10-16", "Yesterday"),
                ("2026-10-17", "Today"),
            ]
        );
        assert_eq!(transcript.messages().count(), 4);
        assert!(matches!(transcript.nodes[0], TranscriptNode::DateSeparator { .. }));
    }

    #[test]
    fn test_separator_uses_same_calendar_as_grouping() {
        // 22:30 UTC on the 16th is already the 17th at UTC+3.
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let messages = vec![msg("1", "alice", "late", at(16, 22, 30))];
        let transcript = assemble_in(&messages, &TranscriptOptions::default(), &tz, now());
        let separators: Vec<(&str, &str)> = transcript.date_separators().collect();
        assert_eq!(separators, vec![("2026-10-17", "Today")]);
    }

    #[test]
    fn test_role_label_and_footer() {
        let mut options = TranscriptOptions::default();
        options.user_roles.insert("1".into(), "Moderator".into());
        options.footer_text = Some("Exported by support".into());
        let messages = vec![msg("1", "alice", "hi", at(17, 1, 0))];
        let transcript = assemble_in(&messages, &options, &Utc, now());
        let first = transcript.messages().next().unwrap();
        assert_eq!(first.role_label.as_deref(), Some("Moderator"));
        assert_eq!(transcript.footer(), Some("Exported by support"));
        assert!(matches!(transcript.nodes.last(), Some(TranscriptNode::Footer(_))));
    }

    #[test]
    fn test_timestamps_and_header_fields() {
        let mut message = msg("1", "alice", "hi", at(17, 15, 5));
        message.author_role_color = Some(0xff0000);
        message.edited_at = Some(at(17, 15, 6));
        let messages = vec![message];
        let transcript = assemble_in(&messages, &TranscriptOptions::default(), &Utc, now());
        let first = transcript.messages().next().unwrap();
        assert_eq!(first.full_timestamp, "10/17/2026 3:05 PM");
        assert_eq!(first.compact_timestamp, "3:05 PM");
        assert_eq!(first.author_color, "#ff0000");
        assert_eq!(first.avatar_initial, "A");
        assert!(first.edited);
    }

    #[test]
    fn test_reply_preview_text() {
        let long = "x".repeat(200);
        let reference = MessageReference {
            message_id: "9".into(),
            channel_id: None,
            guild_id: None,
            author: Some(User::new("2", "bob")),
            content: Some(long),
            attachments: false,
        };
        let preview = reply_preview(&reference);
        assert_eq!(preview.author_name, "bob");
        assert_eq!(preview.text.chars().count(), REPLY_PREVIEW_CHARS + 3);
        assert!(preview.text.ends_with("..."));

        let deleted = MessageReference {
            author: None,
            content: None,
            ..reference.clone()
        };
        let preview = reply_preview(&deleted);
        assert_eq!(preview.author_name, "Unknown User");
        assert_eq!(preview.text, "Original message was deleted");

        let with_files = MessageReference {
            attachments: true,
            ..deleted
        };
        assert_eq!(reply_preview(&with_files).text, "Click to see attachment");
    }

    #[test]
    fn test_duplicate_embeds_are_suppressed() {
        let mut message = msg("1", "alice", "", at(17, 1, 0));
        let embed = Embed {
            title: Some("Same".into()),
            ..Embed::default()
        };
        let other = Embed {
            title: Some("Other".into()),
            ..Embed::default()
        };
        message.embeds = vec![embed.clone(), other, embed];
        let messages = vec![message];
        let transcript = assemble_in(&messages, &TranscriptOptions::default(), &Utc, now());
        let first = transcript.messages().next().unwrap();
        let titles: Vec<&str> = first.embeds.iter().filter_map(|e| e.title.as_deref()).collect();
        assert_eq!(titles, vec!["Same", "Other"]);
    }

    #[test]
    fn test_attachments_are_classified() {
        let mut message = msg("1", "alice", "", at(17, 1, 0));
        for (url, ct) in [
            ("https://cdn/a.png", None),
            ("https://cdn/b.bin", Some("video/webm")),
            ("https://cdn/c.mp3", None),
            ("https://cdn/d.zip", None),
        ] {
            message.attachments.push(Attachment {
                url: url.into(),
                filename: url.rsplit('/').next().unwrap().into(),
                size: Some(10),
                content_type: ct.map(str::to_string),
                width: None,
                height: None,
                spoiler: false,
            });
        }
        let groups = classify_attachments(&message.attachments);
        assert_eq!(groups.images.len(), 1);
        assert_eq!(groups.videos.len(), 1);
        assert_eq!(groups.audio.len(), 1);
        assert_eq!(groups.files.len(), 1);
    }

    #[test]
    fn test_dedup_structural_keeps_first_order() {
        assert_eq!(dedup_structural(&[3, 1, 3, 2, 1]), vec![&3, &1, &2]);
    }
}
