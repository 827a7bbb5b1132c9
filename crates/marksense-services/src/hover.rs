//! Tag hover.
//!
//! The tree finds the element under the cursor; a short re-scan from that
//! element's start (or end) tag then recovers the exact span of the tag
//! name, which the tree does not keep. Documentation comes from the
//! [`TagRegistry`].

use marksense_parser::HtmlDocument;
use marksense_scanner::{Scanner, TokenType};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::tags::TagRegistry;
use crate::TextDocument;

/// Byte range `[start, end)` in the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Markdown hover content anchored at a tag name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hover {
    pub content: String,
    pub range: TextRange,
}

/// Which tag of an element the cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSide {
    Start,
    End,
}

impl TagSide {
    fn token_type(self) -> TokenType {
        match self {
            TagSide::Start => TokenType::StartTag,
            TagSide::End => TokenType::EndTag,
        }
    }

    fn label(self, tag: &str) -> String {
        match self {
            TagSide::Start => format!("<{tag}>"),
            TagSide::End => format!("</{tag}>"),
        }
    }
}

/// Resolves hovers against an ordered tag registry.
#[derive(Debug, Clone, Copy)]
pub struct HoverResolver<'r> {
    registry: &'r TagRegistry,
}

impl<'r> HoverResolver<'r> {
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self { registry }
    }

    /// Hover for the tag name under `offset`, if it has documentation.
    pub fn hover(
        &self,
        document: &TextDocument,
        tree: &HtmlDocument,
        offset: usize,
    ) -> Option<Hover> {
        let node = tree.node(tree.find_node_at(offset)?);
        if node.tag.is_empty() {
            return None;
        }

        let (side, tag_start) = match node.end_tag_start {
            Some(end_tag_start) if offset >= end_tag_start => (TagSide::End, end_tag_start),
            _ => (TagSide::Start, node.start),
        };
        let Some(range) = tag_name_range(&document.text, tag_start, offset, side.token_type())
        else {
            trace!(offset, tag = %node.tag, ?side, "cursor is not on the tag name");
            return None;
        };

        let documentation = self
            .registry
            .find_documentation(&document.language_id, &node.tag)?;
        trace!(offset, tag = %node.tag, ?side, ?range, "resolved tag hover");
        Some(Hover {
            content: hover_markdown(&side.label(&node.tag), &documentation),
            range,
        })
    }
}

/// Span of the tag-name token of kind `expected` that touches
/// `target_offset`, scanning forward from `start_offset`.
///
/// The scan stops at the first token ending at or after the target, so its
/// cost is bounded by the distance from the tag start to the cursor.
pub fn tag_name_range(
    text: &str,
    start_offset: usize,
    target_offset: usize,
    expected: TokenType,
) -> Option<TextRange> {
    let mut scanner = Scanner::with_offset(text, start_offset);
    let mut token = scanner.scan();
    while token != TokenType::Eos
        && (scanner.token_end() < target_offset
            || (scanner.token_end() == target_offset && token != expected))
    {
        token = scanner.scan();
    }
    (token == expected && target_offset <= scanner.token_end())
        .then(|| TextRange::new(scanner.token_offset(), scanner.token_end()))
}

fn hover_markdown(label: &str, documentation: &str) -> String {
    ["```html", label, "```", documentation].join("\n")
}
