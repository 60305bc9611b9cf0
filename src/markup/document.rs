//! Whole-message document building.

use super::block::{segment_items, split_code_fences, BlockItem, BlockNode, Span};
use super::inline::UserMap;

/// A block or line break together with its identity key inside one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    pub key: String,
    pub item: BlockItem,
}

impl DocumentNode {
    pub fn block(&self) -> Option<&BlockNode> {
        match &self.item {
            BlockItem::Block(block) => Some(block),
            BlockItem::LineBreak => None,
        }
    }
}

/// Ordered, immutable result of parsing one message body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    nodes: Vec<DocumentNode>,
}

impl Document {
    pub fn nodes(&self) -> &[DocumentNode] {
        &self.nodes
    }

    /// Blocks in source order, line breaks skipped.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockNode> {
        self.nodes.iter().filter_map(DocumentNode::block)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds documents, numbering nodes with a counter that restarts on every
/// [`DocumentBuilder::build`] call. Each builder is independent, so separate
/// renders never share key state.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    next_key: usize,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self, content: &str, user_map: Option<&UserMap>) -> Document {
        self.next_key = 0;

        let mut nodes = Vec::new();
        for span in split_code_fences(content) {
            match span {
                Span::Code { language, code } => {
                    nodes.push(self.keyed(BlockItem::Block(BlockNode::CodeBlock {
                        language: language.to_string(),
                        code: code.to_string(),
                    })));
                }
                Span::Text(text) => {
                    for item in segment_items(text, user_map) {
                        nodes.push(self.keyed(item));
                    }
                }
            }
        }

        Document { nodes }
    }

    fn keyed(&mut self, item: BlockItem) -> DocumentNode {
        let tag = match &item {
            BlockItem::Block(block) => block.kind_tag(),
            BlockItem::LineBreak => "br",
        };
        let key = format!("{}-{}", tag, self.next_key);
        self.next_key += 1;
        DocumentNode { key, item }
    }
}

/// Parse a full message body with a fresh builder.
pub fn build(content: &str, user_map: Option<&UserMap>) -> Document {
    DocumentBuilder::new().build(content, user_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::inline::InlineRun;

    #[test]
    fn test_empty_content() {
        assert!(build("", None).is_empty());
    }

    #[test]
    fn test_code_block_interleaving() {
        let doc = build("# Intro\n```py\nprint(1)\n```\nafter **x**", None);
        let blocks: Vec<&BlockNode> = doc.blocks().collect();
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[0], BlockNode::Heading { level: 1, .. }));
        assert_eq!(
            blocks[1],
            &BlockNode::CodeBlock {
                language: "py".into(),
                code: "print(1)\n".into()
            }
        );
        assert_eq!(
            blocks[2],
            &BlockNode::Paragraph(vec![
                InlineRun::text("after "),
                InlineRun::Bold(vec![InlineRun::text("x")]),
            ])
        );
    }

    #[test]
    fn test_code_block_contents_are_not_parsed() {
        let doc = build("```\n**raw** <@1>\n```", None);
        assert_eq!(
            doc.blocks().next(),
            Some(&BlockNode::CodeBlock {
                language: String::new(),
                code: "**raw** <@1>\n".into()
            })
        );
    }

    #[test]
    fn test_keys_reset_per_build() {
        let mut builder = DocumentBuilder::new();
        let first = builder.build("a\nb", None);
        let second = builder.build("a\nb", None);
        assert_eq!(first, second);
        let keys: Vec<&str> = second.nodes().iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["ln-0", "br-1", "ln-2"]);
    }

    #[test]
    fn test_keys_follow_source_order() {
        let doc = build("> q\n```x```\n## h", None);
        let keys: Vec<&str> = doc.nodes().iter().map(|n| n.key.as_str()).collect();
        // The blank line after the fence keeps its break.
        assert_eq!(keys, vec!["bq-0", "cb-1", "br-2", "h-3"]);
    }
}
