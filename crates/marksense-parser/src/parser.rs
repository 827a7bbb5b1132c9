//! Tree builder for markup documents.
//!
//! Consumes a single scanner pass and builds an [`HtmlDocument`]. The builder
//! keeps a cursor on the innermost open element instead of recursing, so
//! nesting depth never grows the call stack. It never fails: unmatched end
//! tags are ignored and elements still open at the end run to the document
//! end.

use marksense_scanner::{is_void_element, Scanner, TokenType};
use tracing::debug;

use crate::ast::{HtmlDocument, Node, NodeId};

/// Markup tree builder.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    text_len: usize,
    doc: HtmlDocument,
    /// Innermost open element.
    current: Option<NodeId>,
    /// Offset of the last `<`, waiting for its tag name.
    pending_start: Option<usize>,
    /// Set between a start tag name and its `>` / `/>`.
    in_start_tag: bool,
    pending_attribute: Option<String>,
    end_tag_start: usize,
    /// Element matched by an end tag name, waiting for the end tag's `>`.
    pending_close: Option<NodeId>,
    last_token_end: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given text.
    pub fn new(text: &'a str) -> Self {
        Self {
            scanner: Scanner::new(text),
            text_len: text.len(),
            doc: HtmlDocument::default(),
            current: None,
            pending_start: None,
            in_start_tag: false,
            pending_attribute: None,
            end_tag_start: 0,
            pending_close: None,
            last_token_end: 0,
        }
    }

    /// Parse text into an element tree.
    pub fn parse(text: &str) -> HtmlDocument {
        Parser::new(text).parse_document()
    }

    /// Run the scanner to the end and return the finished tree.
    pub fn parse_document(mut self) -> HtmlDocument {
        loop {
            let token = self.scanner.scan();
            if token == TokenType::Eos {
                break;
            }
            if self.pending_close.is_some()
                && !matches!(
                    token,
                    TokenType::Whitespace | TokenType::Unknown | TokenType::EndTagClose
                )
            {
                // the end tag was abandoned before its `>`
                self.finish_pending_close(self.last_token_end);
            }
            self.handle(token);
            self.last_token_end = self.scanner.token_end();
        }

        if self.pending_close.is_some() {
            self.finish_pending_close(self.text_len);
        }
        let text_len = self.text_len;
        while let Some(id) = self.current {
            let node = self.node_mut(id);
            node.end = text_len;
            node.closed = false;
            self.current = node.parent;
        }

        debug!(nodes = self.doc.len(), roots = self.doc.roots.len(), "parsed document");
        self.doc
    }

    fn handle(&mut self, token: TokenType) {
        match token {
            TokenType::StartTagOpen => {
                self.pending_start = Some(self.scanner.token_offset());
                self.in_start_tag = false;
            }
            TokenType::StartTag => {
                let start = self
                    .pending_start
                    .take()
                    .unwrap_or_else(|| self.scanner.token_offset());
                self.open_element(self.scanner.token_text(), start);
            }
            TokenType::StartTagClose => {
                if !self.in_start_tag {
                    return;
                }
                self.in_start_tag = false;
                let end = self.scanner.token_end();
                if let Some(id) = self.current {
                    let node = self.node_mut(id);
                    node.end = end;
                    node.start_tag_end = Some(end);
                    if is_void_element(&node.tag) {
                        node.closed = true;
                        self.current = node.parent;
                    }
                }
            }
            TokenType::StartTagSelfClose => {
                if !self.in_start_tag {
                    return;
                }
                self.in_start_tag = false;
                let end = self.scanner.token_end();
                if let Some(id) = self.current {
                    let node = self.node_mut(id);
                    node.end = end;
                    node.start_tag_end = Some(end);
                    node.closed = true;
                    self.current = node.parent;
                }
            }
            TokenType::EndTagOpen => {
                self.in_start_tag = false;
                self.end_tag_start = self.scanner.token_offset();
            }
            TokenType::EndTag => self.match_end_tag(self.scanner.token_text()),
            TokenType::EndTagClose => {
                if self.pending_close.is_some() {
                    self.finish_pending_close(self.scanner.token_end());
                }
            }
            TokenType::AttributeName => {
                if !self.in_start_tag {
                    return;
                }
                let name = self.scanner.token_text().to_string();
                if let Some(id) = self.current {
                    self.node_mut(id)
                        .attributes
                        .get_or_insert_with(Default::default)
                        .insert(name.clone(), None);
                    self.pending_attribute = Some(name);
                }
            }
            TokenType::AttributeValue => {
                if !self.in_start_tag {
                    return;
                }
                let value = self.scanner.token_text().to_string();
                if let (Some(id), Some(name)) = (self.current, self.pending_attribute.take()) {
                    if let Some(attributes) = self.node_mut(id).attributes.as_mut() {
                        attributes.insert(name, Some(value));
                    }
                }
            }
            _ => {}
        }
    }

    fn open_element(&mut self, tag: &str, start: usize) {
        let id = NodeId(self.doc.nodes.len());
        self.doc
            .nodes
            .push(Node::new(tag, start, self.text_len, self.current));
        match self.current {
            Some(parent) => self.node_mut(parent).children.push(id),
            None => self.doc.roots.push(id),
        }
        self.current = Some(id);
        self.in_start_tag = true;
        self.pending_attribute = None;
    }

    /// Close intermediate elements up to the nearest open element named
    /// `tag`. An end tag without such an element changes nothing.
    fn match_end_tag(&mut self, tag: &str) {
        let mut candidate = self.current;
        while let Some(id) = candidate {
            if self.doc.node(id).is_same_tag(tag) {
                break;
            }
            candidate = self.doc.node(id).parent;
        }
        let Some(target) = candidate else {
            debug!(tag, offset = self.end_tag_start, "ignoring unmatched end tag");
            return;
        };

        let end_tag_start = self.end_tag_start;
        while let Some(id) = self.current {
            if id == target {
                break;
            }
            let node = self.node_mut(id);
            node.end = end_tag_start;
            node.closed = false;
            self.current = node.parent;
        }
        let node = self.node_mut(target);
        node.closed = true;
        node.end_tag_start = Some(end_tag_start);
        self.pending_close = Some(target);
    }

    fn finish_pending_close(&mut self, end: usize) {
        let Some(id) = self.pending_close.take() else {
            return;
        };
        let node = self.node_mut(id);
        node.end = end;
        self.current = node.parent;
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.doc.nodes[id.0]
    }
}
