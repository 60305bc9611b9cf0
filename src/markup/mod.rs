//! Chat markup parsing: inline runs, block segmentation and documents.

mod block;
mod document;
mod inline;
mod timestamp;

pub use block::{segment, segment_items, split_code_fences, BlockItem, BlockNode, Span};
pub use document::{build, Document, DocumentBuilder, DocumentNode};
pub use inline::{format, plain_text, InlineRun, MentionScope, UserMap};
pub use timestamp::TimestampStyle;
