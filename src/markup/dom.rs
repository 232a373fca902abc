//! Arena-backed working tree built during the scan.
//!
//! Nodes live in a flat `Vec`; parents are referenced by index and used
//! only for walking back up while scanning, never for ownership. The
//! finished tree is converted into the detached [`Document`] output and
//! dropped.
//!
//! [`Document`]: super::Document

use super::scan::ParsedTag;
use super::tag::Tag;
use super::ParseError;

pub(crate) type NodeId = usize;

/// Structural kind of a working-tree node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Root,
    List { ordered: bool },
    ListItem,
    Pre,
    Code,
    Paragraph,
    Heading { level: u8 },
    Text { content: String },
}

#[derive(Clone, Debug)]
pub(crate) struct DomNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// The tag that opened this node; `None` for Root and Text.
    pub open: Option<ParsedTag>,
    /// Recorded when the node is closed.
    pub close: Option<ParsedTag>,
}

pub(crate) struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![DomNode {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                open: None,
                close: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id]
    }

    pub fn is_list(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::List { .. })
    }

    /// Open a new element under `parent` and descend into it.
    pub fn open_element(&mut self, parent: NodeId, open: ParsedTag) -> Result<NodeId, ParseError> {
        let kind = match open.tag() {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::OrderedList => NodeKind::List { ordered: true },
            Tag::UnorderedList => NodeKind::List { ordered: false },
            Tag::ListItem => NodeKind::ListItem,
            Tag::Pre => NodeKind::Pre,
            Tag::Code => NodeKind::Code,
            heading => match heading.heading_level() {
                Some(level) => NodeKind::Heading { level },
                // Root/InnerText have no markup name and cannot be scanned.
                None => unreachable!("pseudo-tag scanned from input"),
            },
        };
        self.check_adoption(parent, &kind)?;
        Ok(self.push_node(parent, kind, Some(open)))
    }

    /// Attach a freestanding text run as a child of `parent`.
    pub fn push_text(&mut self, parent: NodeId, content: String) -> Result<NodeId, ParseError> {
        let kind = NodeKind::Text { content };
        self.check_adoption(parent, &kind)?;
        Ok(self.push_node(parent, kind, None))
    }

    /// Record `close` on the node and ascend to its parent.
    pub fn close_element(&mut self, id: NodeId, close: ParsedTag) -> Result<NodeId, ParseError> {
        let node = &self.nodes[id];
        let open_tag = match node.open {
            Some(open) => open.tag(),
            None => return Err(ParseError::InvalidNesting("close tag with no open element")),
        };
        if open_tag != close.tag() {
            return Err(ParseError::InvalidNesting("close tag does not match open element"));
        }
        if matches!(node.kind, NodeKind::Pre) && node.children.len() != 1 {
            return Err(ParseError::InvalidNesting("pre must contain exactly one code block"));
        }
        let parent = node.parent;
        self.nodes[id].close = Some(close);
        // Root has no open tag, so the parent always exists here.
        parent.ok_or(ParseError::InvalidNesting("close tag with no open element"))
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind, open: Option<ParsedTag>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(DomNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            open,
            close: None,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Structural rules: which children a node kind may adopt.
    fn check_adoption(&self, parent: NodeId, child: &NodeKind) -> Result<(), ParseError> {
        let node = &self.nodes[parent];
        match node.kind {
            NodeKind::Root | NodeKind::ListItem | NodeKind::Heading { .. } => {
                if matches!(child, NodeKind::ListItem) {
                    return Err(ParseError::InvalidNesting("list item outside a list"));
                }
            }
            NodeKind::List { .. } => {
                if !matches!(child, NodeKind::ListItem) {
                    return Err(ParseError::InvalidNesting("list may only contain list items"));
                }
            }
            NodeKind::Pre => {
                if !matches!(child, NodeKind::Code) {
                    return Err(ParseError::InvalidNesting("pre may only contain a code block"));
                }
                if !node.children.is_empty() {
                    return Err(ParseError::InvalidNesting("second child under pre"));
                }
            }
            NodeKind::Code => {
                if !matches!(child, NodeKind::Text { .. }) {
                    return Err(ParseError::InvalidNesting("code may only contain text"));
                }
                if !node.children.is_empty() {
                    return Err(ParseError::InvalidNesting("second child under code"));
                }
            }
            NodeKind::Paragraph => {
                if !matches!(child, NodeKind::Text { .. }) {
                    return Err(ParseError::InvalidNesting("paragraph may only contain text"));
                }
                if !node.children.is_empty() {
                    return Err(ParseError::InvalidNesting("second child under paragraph"));
                }
            }
            NodeKind::Text { .. } => {
                return Err(ParseError::InvalidNesting("text nodes have no children"));
            }
        }
        Ok(())
    }
}
