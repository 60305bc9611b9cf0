//! Block-level segmentation: code fences, quotes, headings and lines.

use once_cell::sync::Lazy;
use regex::Regex;

use super::inline::{format, InlineRun, UserMap};

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_]*)\n?(.*?)```").expect("code fence regex is valid")
});

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.+)$").expect("heading regex is valid"));

/// One structural unit of a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockNode {
    Paragraph(Vec<InlineRun>),
    Heading { level: u8, runs: Vec<InlineRun> },
    /// One run sequence per quoted line.
    BlockQuote(Vec<Vec<InlineRun>>),
    CodeBlock { language: String, code: String },
}

impl BlockNode {
    /// Short tag used when keying nodes.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            BlockNode::Paragraph(_) => "ln",
            BlockNode::Heading { .. } => "h",
            BlockNode::BlockQuote(_) => "bq",
            BlockNode::CodeBlock { .. } => "cb",
        }
    }
}

/// Segmenter output: a block, or a line break between source lines.
///
/// Breaks follow every paragraph or blank line that is not the last line of
/// its span, so `"a\n\nb"` keeps two of them. Headings and quotes are
/// blocks of their own and take none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockItem {
    Block(BlockNode),
    LineBreak,
}

/// A slice of the raw message: either fenced code or everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Text(&'a str),
    Code { language: &'a str, code: &'a str },
}

/// Pull fenced code blocks out of `text`, keeping the surrounding text in
/// original order. Empty text between fences is dropped.
pub fn split_code_fences(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in CODE_FENCE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::Text(&text[last..whole.start()]));
        }
        spans.push(Span::Code {
            language: caps.get(1).map_or("", |m| m.as_str()),
            code: caps.get(2).map_or("", |m| m.as_str()),
        });
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::Text(&text[last..]));
    }

    spans
}

/// Segment a span that contains no code fences into block nodes.
///
/// `"> "` lines accumulate into one quote; a `">>> "` line swallows every
/// remaining line of the span, including lines that would otherwise be
/// headings.
pub fn segment(text: &str, user_map: Option<&UserMap>) -> Vec<BlockNode> {
    segment_items(text, user_map)
        .into_iter()
        .filter_map(|item| match item {
            BlockItem::Block(block) => Some(block),
            BlockItem::LineBreak => None,
        })
        .collect()
}

/// [`segment`] with the line breaks kept in place.
pub fn segment_items(text: &str, user_map: Option<&UserMap>) -> Vec<BlockItem> {
    let mut items = Vec::new();
    if text.is_empty() {
        return items;
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut quote: Vec<&str> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = line.strip_prefix("> ") {
            quote.push(rest);
            continue;
        }
        if let Some(rest) = line.strip_prefix(">>> ") {
            quote.push(rest);
            quote.extend_from_slice(&lines[i + 1..]);
            flush_quote(&mut items, &mut quote, user_map);
            return items;
        }

        flush_quote(&mut items, &mut quote, user_map);

        if let Some(caps) = HEADING_RE.captures(line) {
            let level = caps.get(1).map_or(1, |m| m.len()) as u8;
            let runs = format(caps.get(2).map_or("", |m| m.as_str()), user_map);
            items.push(BlockItem::Block(BlockNode::Heading { level, runs }));
            continue;
        }

        if !line.is_empty() {
            items.push(BlockItem::Block(BlockNode::Paragraph(format(line, user_map))));
        }
        if i + 1 < lines.len() {
            items.push(BlockItem::LineBreak);
        }
    }

    flush_quote(&mut items, &mut quote, user_map);
    items
}

fn flush_quote(items: &mut Vec<BlockItem>, quote: &mut Vec<&str>, user_map: Option<&UserMap>) {
    if quote.is_empty() {
        return;
    }
    let lines = quote.drain(..).map(|line| format(line, user_map)).collect();
    items.push(BlockItem::Block(BlockNode::BlockQuote(lines)));
}
