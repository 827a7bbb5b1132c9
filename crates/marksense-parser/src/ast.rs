//! Element tree for markup documents.
//!
//! Nodes live in a flat arena owned by [`HtmlDocument`] and refer to each
//! other through [`NodeId`] indices, so parent links never own anything.

use std::collections::BTreeMap;

/// Index of a node inside its [`HtmlDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One markup element.
///
/// Offsets are byte offsets into the parsed text. `start` is the offset of the
/// `<` that opens the start tag and `end` is one past the last byte of the
/// element (its end tag, its self-close, or the document end when left open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Tag name as written in the source.
    pub tag: String,
    pub start: usize,
    pub end: usize,
    /// End of the start tag's `>` or `/>`, if it was seen.
    pub start_tag_end: Option<usize>,
    /// Offset of the `</` of the matching end tag, if there is one.
    pub end_tag_start: Option<usize>,
    /// Whether the element was closed explicitly (end tag, self-close, void).
    pub closed: bool,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Attribute name to raw value (quotes included); `None` for valueless
    /// attributes such as `disabled`. Absent when the tag has no attributes.
    pub attributes: Option<BTreeMap<String, Option<String>>>,
}

impl Node {
    pub(crate) fn new(tag: &str, start: usize, end: usize, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            start,
            end,
            start_tag_end: None,
            end_tag_start: None,
            closed: false,
            children: Vec::new(),
            parent,
            attributes: None,
        }
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.children.last().copied()
    }

    /// Compare tag names ignoring ASCII case.
    pub fn is_same_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .flat_map(|attrs| attrs.keys().map(String::as_str))
            .collect()
    }

    /// `Some(None)` for a valueless attribute, `None` if it is not set.
    pub fn attribute(&self, name: &str) -> Option<Option<&str>> {
        self.attributes
            .as_ref()?
            .get(name)
            .map(|value| value.as_deref())
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset > self.start && offset <= self.end
    }
}

/// A parsed document: the node arena plus the ordered root elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlDocument {
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: Vec<NodeId>,
}

impl HtmlDocument {
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All nodes in document (pre-)order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Innermost node containing `offset`.
    ///
    /// A node contains the offsets after its opening `<` up to and including
    /// its end, so a cursor right after `</div>` still finds the `div`.
    pub fn find_node_at(&self, offset: usize) -> Option<NodeId> {
        let mut found = None;
        let mut siblings = self.roots.as_slice();
        loop {
            let Some(candidate) = self.last_starting_before(siblings, offset) else {
                return found;
            };
            let node = self.node(candidate);
            if !node.contains(offset) {
                return found;
            }
            found = Some(candidate);
            siblings = &node.children;
        }
    }

    /// Deepest node that starts before `offset` and either contains it or
    /// ends right before it.
    pub fn find_node_before(&self, offset: usize) -> Option<NodeId> {
        let mut found = None;
        let mut siblings = self.roots.as_slice();
        loop {
            let Some(candidate) = self.last_starting_before(siblings, offset) else {
                return found;
            };
            let node = self.node(candidate);
            let descend = offset < node.end
                || node
                    .last_child()
                    .is_some_and(|last| self.node(last).end == node.end);
            if !descend {
                return Some(candidate);
            }
            found = Some(candidate);
            siblings = &node.children;
        }
    }

    fn last_starting_before(&self, siblings: &[NodeId], offset: usize) -> Option<NodeId> {
        let idx = siblings.partition_point(|&id| self.node(id).start < offset);
        idx.checked_sub(1).map(|i| siblings[i])
    }
}
