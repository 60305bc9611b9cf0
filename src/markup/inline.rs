//! Inline chat markup parser.
//!
//! Turns one line of message text into typed runs. Matching works over an
//! ordered list of patterns: on every step each pattern is searched from the
//! cursor, the earliest match wins and ties go to the pattern listed first.
//! Emphasis-like patterns re-enter the parser on their inner text.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::timestamp::TimestampStyle;

/// User id -> display name, used to resolve `<@id>` mentions.
pub type UserMap = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionScope {
    Everyone,
    Here,
}

impl MentionScope {
    pub fn as_str(self) -> &'static str {
        match self {
            MentionScope::Everyone => "everyone",
            MentionScope::Here => "here",
        }
    }
}

/// One typed span of formatted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineRun {
    Text(String),
    BoldItalic(Vec<InlineRun>),
    Bold(Vec<InlineRun>),
    Italic(Vec<InlineRun>),
    Underline(Vec<InlineRun>),
    Strikethrough(Vec<InlineRun>),
    Spoiler(Vec<InlineRun>),
    InlineCode(String),
    Link { label: String, url: String },
    UserMention { user_id: String, resolved_name: Option<String> },
    ChannelMention { channel_id: String },
    RoleMention { role_id: String },
    EveryoneMention(MentionScope),
    CustomEmoji { name: String, id: String, animated: bool },
    Timestamp { unix_seconds: i64, style: TimestampStyle },
    RawUrl(String),
}

impl InlineRun {
    pub fn text(s: impl Into<String>) -> Self {
        InlineRun::Text(s.into())
    }

    /// Text a reader would see, with markup stripped.
    pub fn plain_text(&self) -> String {
        match self {
            InlineRun::Text(s) | InlineRun::InlineCode(s) | InlineRun::RawUrl(s) => s.clone(),
            InlineRun::BoldItalic(children)
            | InlineRun::Bold(children)
            | InlineRun::Italic(children)
            | InlineRun::Underline(children)
            | InlineRun::Strikethrough(children)
            | InlineRun::Spoiler(children) => plain_text(children),
            InlineRun::Link { label, .. } => label.clone(),
            InlineRun::UserMention { user_id, resolved_name } => {
                format!("@{}", resolved_name.as_deref().unwrap_or(user_id))
            }
            InlineRun::ChannelMention { .. } => "#channel".to_string(),
            InlineRun::RoleMention { .. } => "@role".to_string(),
            InlineRun::EveryoneMention(scope) => format!("@{}", scope.as_str()),
            InlineRun::CustomEmoji { name, .. } => format!(":{}:", name),
            InlineRun::Timestamp { unix_seconds, style } => {
                format!("<t:{}:{}>", unix_seconds, style.as_char())
            }
        }
    }
}

/// Concatenated plain text of a run sequence.
pub fn plain_text(runs: &[InlineRun]) -> String {
    runs.iter().map(InlineRun::plain_text).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    InlineCode,
    MaskedLink,
    AnimatedEmoji,
    StaticEmoji,
    Timestamp,
    UserMention,
    ChannelMention,
    RoleMention,
    Everyone,
    BareUrl,
    BoldItalic,
    Bold,
    Underline,
    ItalicStar,
    ItalicUnderscore,
    Strikethrough,
    Spoiler,
}

struct InlinePattern {
    kind: PatternKind,
    regex: Regex,
}

impl InlinePattern {
    fn new(kind: PatternKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("inline pattern is valid"),
        }
    }

    /// Earliest acceptable match starting at or after `start`.
    fn find_at<'t>(&self, text: &'t str, mut start: usize) -> Option<Captures<'t>> {
        loop {
            let caps = self.regex.captures_at(text, start)?;
            let whole = caps.get(0)?;
            if self.accepts(text, whole.start(), whole.end()) {
                return Some(caps);
            }
            // Guarded patterns open with an ASCII delimiter, so +1 stays on a char boundary.
            start = whole.start() + 1;
            if start >= text.len() {
                return None;
            }
        }
    }

    /// Neighbour checks the regex crate cannot express as look-around.
    fn accepts(&self, text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        match self.kind {
            PatternKind::ItalicStar => {
                !matches!(before, Some('*' | '\\')) && after != Some('*')
            }
            PatternKind::ItalicUnderscore => {
                let is_word = |c: char| c.is_alphanumeric() || c == '_';
                !before.is_some_and(|c| c == '\\' || is_word(c)) && !after.is_some_and(is_word)
            }
            _ => true,
        }
    }
}

/// Highest priority first.
static PATTERNS: Lazy<Vec<InlinePattern>> = Lazy::new(|| {
    use PatternKind::*;
    vec![
        InlinePattern::new(InlineCode, r"`([^`]+)`"),
        InlinePattern::new(MaskedLink, r"\[([^\]]+)\]\(((?:https?://|mailto:)[^)]+)\)"),
        InlinePattern::new(AnimatedEmoji, r"<a:([A-Za-z0-9_]+):([0-9]*)>"),
        InlinePattern::new(StaticEmoji, r"<:([A-Za-z0-9_]+):([0-9]*)>"),
        InlinePattern::new(Timestamp, r"<t:([0-9]+)(?::([tTdDfFR]))?>"),
        InlinePattern::new(UserMention, r"<@!?([0-9]+)>"),
        InlinePattern::new(ChannelMention, r"<#([0-9]+)>"),
        InlinePattern::new(RoleMention, r"<@&([0-9]+)>"),
        InlinePattern::new(Everyone, r"@(everyone|here)\b"),
        InlinePattern::new(BareUrl, r#"https?://[^\s<>\])"]+"#),
        InlinePattern::new(BoldItalic, r"\*\*\*(.+?)\*\*\*"),
        InlinePattern::new(Bold, r"\*\*(.+?)\*\*"),
        InlinePattern::new(Underline, r"__(.+?)__"),
        InlinePattern::new(ItalicStar, r"\*([^*\n]+?)\*"),
        InlinePattern::new(ItalicUnderscore, r"_([^_\n]+?)_"),
        InlinePattern::new(Strikethrough, r"~~(.+?)~~"),
        InlinePattern::new(Spoiler, r"\|\|(.+?)\|\|"),
    ]
});

/// Parse one segment of text into inline runs.
///
/// Never fails: anything no pattern claims comes back as [`InlineRun::Text`].
pub fn format(text: &str, user_map: Option<&UserMap>) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let mut best: Option<(PatternKind, Captures<'_>)> = None;
        let mut best_start = usize::MAX;

        for pattern in PATTERNS.iter() {
            let Some(caps) = pattern.find_at(text, pos) else {
                continue;
            };
            let start = caps.get(0).map_or(usize::MAX, |m| m.start());
            if start < best_start {
                best_start = start;
                best = Some((pattern.kind, caps));
                if start == pos {
                    // Nothing later in the list can beat a match at the cursor.
                    break;
                }
            }
        }

        let Some((kind, caps)) = best else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        if whole.start() > pos {
            push_text(&mut runs, &text[pos..whole.start()]);
        }
        match build_run(kind, &caps, user_map) {
            InlineRun::Text(s) => push_text(&mut runs, &s),
            run => runs.push(run),
        }
        pos = whole.end();
    }

    if pos < text.len() {
        push_text(&mut runs, &text[pos..]);
    }

    runs
}

/// Append text, merging with a preceding text run.
fn push_text(runs: &mut Vec<InlineRun>, s: &str) {
    if s.is_empty() {
        return;
    }
    if let Some(InlineRun::Text(last)) = runs.last_mut() {
        last.push_str(s);
    } else {
        runs.push(InlineRun::Text(s.to_string()));
    }
}

fn group<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn build_run(kind: PatternKind, caps: &Captures<'_>, user_map: Option<&UserMap>) -> InlineRun {
    let inner = |i: usize| format(group(caps, i), user_map);
    match kind {
        PatternKind::InlineCode => InlineRun::InlineCode(group(caps, 1).to_string()),
        PatternKind::MaskedLink => InlineRun::Link {
            label: group(caps, 1).to_string(),
            url: group(caps, 2).to_string(),
        },
        PatternKind::AnimatedEmoji | PatternKind::StaticEmoji => {
            let name = group(caps, 1);
            let id = group(caps, 2);
            if id.is_empty() {
                InlineRun::Text(format!(":{}:", name))
            } else {
                InlineRun::CustomEmoji {
                    name: name.to_string(),
                    id: id.to_string(),
                    animated: kind == PatternKind::AnimatedEmoji,
                }
            }
        }
        PatternKind::Timestamp => match group(caps, 1).parse::<i64>() {
            Ok(unix_seconds) => InlineRun::Timestamp {
                unix_seconds,
                style: group(caps, 2)
                    .chars()
                    .next()
                    .and_then(TimestampStyle::from_char)
                    .unwrap_or_default(),
            },
            Err(_) => InlineRun::Text(group(caps, 0).to_string()),
        },
        PatternKind::UserMention => {
            let user_id = group(caps, 1).to_string();
            let resolved_name = user_map.and_then(|m| m.get(&user_id)).cloned();
            InlineRun::UserMention {
                user_id,
                resolved_name,
            }
        }
        PatternKind::ChannelMention => InlineRun::ChannelMention {
            channel_id: group(caps, 1).to_string(),
        },
        PatternKind::RoleMention => InlineRun::RoleMention {
            role_id: group(caps, 1).to_string(),
        },
        PatternKind::Everyone => InlineRun::EveryoneMention(if group(caps, 1) == "here" {
            MentionScope::Here
        } else {
            MentionScope::Everyone
        }),
        PatternKind::BareUrl => InlineRun::RawUrl(group(caps, 0).to_string()),
        PatternKind::BoldItalic => InlineRun::BoldItalic(inner(1)),
        PatternKind::Bold => InlineRun::Bold(inner(1)),
        PatternKind::Underline => InlineRun::Underline(inner(1)),
        PatternKind::ItalicStar | PatternKind::ItalicUnderscore => InlineRun::Italic(inner(1)),
        PatternKind::Strikethrough => InlineRun::Strikethrough(inner(1)),
        PatternKind::Spoiler => InlineRun::Spoiler(inner(1)),
    }
}
