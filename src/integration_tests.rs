//! Integration tests for chat-transcript
//!
//! These tests run whole message exports through parsing, grouping,
//! assembly, serialization and post-processing.

#[cfg(test)]
mod integration_tests {
    use crate::markup::{build, format, BlockNode, InlineRun};
    use crate::model::{messages_from_json, CanonicalMessage, MessageReference, User};
    use crate::transcript::{assemble_in, render_html_in, TranscriptNode, TranscriptOptions, EMAIL_REDACTION};
    use crate::validation::ensure_chronological;
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 18, 0, 0).unwrap()
    }

    fn msg(author: &str, content: &str, created_at: DateTime<Utc>) -> CanonicalMessage {
        CanonicalMessage::new(User::new(author, author), content, created_at)
    }

    /// Same input always gives the same runs.
    #[test]
    fn test_format_is_deterministic() {
        let text = "**a** _b_ <@1> <t:1792249509:R> https://x.io ||s||";
        assert_eq!(format(text, None), format(text, None));
        assert_eq!(build(text, None), build(text, None));
    }

    /// Malformed tokens keep their delimiters as text.
    #[test]
    fn test_malformed_tokens_degrade() {
        assert_eq!(format("<@abc>", None), vec![InlineRun::text("<@abc>")]);
        assert_eq!(format("<:wave:>", None), vec![InlineRun::text(":wave:")]);
        assert_eq!(format("**open", None), vec![InlineRun::text("**open")]);
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            format("**a *b* c**", None),
            vec![InlineRun::Bold(vec![
                InlineRun::text("a "),
                InlineRun::Italic(vec![InlineRun::text("b")]),
                InlineRun::text(" c"),
            ])]
        );
        assert_eq!(
            format("***x***", None),
            vec![InlineRun::BoldItalic(vec![InlineRun::text("x")])]
        );
        assert_eq!(
            format("`**not bold**`", None),
            vec![InlineRun::InlineCode("**not bold**".into())]
        );
    }

    #[test]
    fn test_heading_quote_paragraph() {
        let doc = build("# Title\n> quoted\n> more\nplain", None);
        let blocks: Vec<&BlockNode> = doc.blocks().collect();
        assert_eq!(
            blocks,
            vec![
                &BlockNode::Heading {
                    level: 1,
                    runs: vec![InlineRun::text("Title")]
                },
                &BlockNode::BlockQuote(vec![
                    vec![InlineRun::text("quoted")],
                    vec![InlineRun::text("more")],
                ]),
                &BlockNode::Paragraph(vec![InlineRun::text("plain")]),
            ]
        );
    }

    #[test]
    fn test_grouping_in_transcript() {
        let reply = MessageReference {
            message_id: "m1".into(),
            channel_id: None,
            guild_id: None,
            author: Some(User::new("alice", "alice")),
            content: Some("one".into()),
            attachments: false,
        };
        let messages = vec![
            msg("alice", "one", Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()),
            msg("alice", "two", Utc.with_ymd_and_hms(2026, 10, 17, 12, 1, 0).unwrap()),
            msg("alice", "three", Utc.with_ymd_and_hms(2026, 10, 17, 12, 2, 0).unwrap()),
            msg("alice", "re", Utc.with_ymd_and_hms(2026, 10, 17, 12, 2, 30).unwrap())
                .with_reference(reply),
        ];
        let transcript = assemble_in(&messages, &TranscriptOptions::default(), &Utc, now());
        let starts: Vec<bool> = transcript.messages().map(|m| m.is_group_start).collect();
        assert_eq!(starts, vec![true, false, false, true]);
        assert_eq!(
            transcript.messages().nth(3).and_then(|m| m.reply.as_ref()).map(|r| r.text.as_str()),
            Some("one")
        );
    }

    /// 23 hours apart across midnight: new date key, new group, separator.
    #[test]
    fn test_midnight_crossing() {
        let messages = vec![
            msg("alice", "late", Utc.with_ymd_and_hms(2026, 10, 15, 23, 30, 0).unwrap()),
            msg("alice", "next", Utc.with_ymd_and_hms(2026, 10, 16, 22, 30, 0).unwrap()),
        ];
        let transcript = assemble_in(&messages, &TranscriptOptions::default(), &Utc, now());

        let kinds: Vec<&str> = transcript
            .nodes
            .iter()
            .map(|n| match n {
                TranscriptNode::DateSeparator { .. } => "sep",
                TranscriptNode::Message(_) => "msg",
                TranscriptNode::Footer(_) => "footer",
            })
            .collect();
        assert_eq!(kinds, vec!["sep", "msg", "sep", "msg"]);

        let rendered: Vec<_> = transcript.messages().collect();
        assert_ne!(rendered[0].date_key, rendered[1].date_key);
        assert!(rendered[1].is_group_start);

        let labels: Vec<&str> = transcript.date_separators().map(|(_, label)| label).collect();
        assert_eq!(labels, vec!["October 15, 2026", "Yesterday"]);
    }

    #[test]
    fn test_remove_emails_end_to_end() {
        let messages = vec![
            msg("alice", "mail a@b.com please", Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()),
            msg(
                "alice",
                "or [the desk](mailto:desk@corp.io) today",
                Utc.with_ymd_and_hms(2026, 10, 17, 12, 1, 0).unwrap(),
            ),
        ];
        let options = TranscriptOptions {
            remove_emails: true,
            footer_text: Some("ops@corp.io keeps this log".into()),
            ..TranscriptOptions::default()
        };
        let html = render_html_in(&messages, &options, &Utc, now());

        assert!(html.contains(&format!("mail {} please", EMAIL_REDACTION)));
        assert!(!html.contains("a@b.com"));
        assert!(!html.contains("mailto:"));
        assert!(!html.contains("the desk"));
        // The footer is appended after redaction.
        assert!(html.ends_with(
            "<div class=\"chat-transcript-footer\">ops@corp.io keeps this log</div>"
        ));
    }

    #[test]
    fn test_emails_kept_without_option() {
        let messages = vec![msg("alice", "a@b.com", Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap())];
        let html = render_html_in(&messages, &TranscriptOptions::default(), &Utc, now());
        assert!(html.contains("a@b.com"));
    }

    #[test]
    fn test_json_export_to_html() {
        let json = r#"[
            {"author": {"id": "1", "username": "alice"}, "content": "hi <@2>", "createdAt": "2026-10-17T12:00:00Z"},
            {"author": {"id": "2", "username": "bob"}, "content": ">>> quoted\n# not a heading", "createdAt": "2026-10-17T12:00:30Z",
             "embeds": [{"title": "Dup"}, {"title": "Dup"}]}
        ]"#;
        let messages = messages_from_json(json).unwrap();
        ensure_chronological(&messages).unwrap();

        let html = render_html_in(&messages, &TranscriptOptions::default(), &Utc, now());
        assert!(html.contains("data-user-id=\"2\">&lt;@bob&gt;</span>"));
        assert!(html.contains("chat-blockquote"));
        assert!(!html.contains("chat-heading"));
        assert_eq!(html.matches("chat-embed-title").count(), 1);
        assert_eq!(html.matches("chat-date-separator-text").count(), 1);
        assert!(html.contains(">Today</span>"));
    }
}
