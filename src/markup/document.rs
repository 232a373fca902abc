//! Detached output tree produced from the working arena.

use super::dom::{DomTree, NodeId, NodeKind};

/// Immutable document tree ready for rendering.
///
/// Mirrors the working tree but carries plain text instead of source
/// spans. `Unhandled` is the caller-side fallback wrapping input the
/// parser rejected; the parser itself never produces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Document {
    Root(Vec<Document>),
    OrderedList(Vec<Document>),
    UnorderedList(Vec<Document>),
    /// Content of a single list item.
    ListNode(Vec<Document>),
    Heading { level: u8, children: Vec<Document> },
    CodeBlock(String),
    Paragraph(String),
    Text(String),
    Unhandled(String),
}

impl Document {
    /// Count of text-bearing leaves (Text, Paragraph, CodeBlock,
    /// Unhandled), used by rendering for layout sizing.
    pub fn text_leaves(&self) -> usize {
        match self {
            Document::Root(children)
            | Document::OrderedList(children)
            | Document::UnorderedList(children)
            | Document::ListNode(children)
            | Document::Heading { children, .. } => {
                children.iter().map(Document::text_leaves).sum()
            }
            Document::CodeBlock(_)
            | Document::Paragraph(_)
            | Document::Text(_)
            | Document::Unhandled(_) => 1,
        }
    }
}

/// Convert an arena node into its output form.
///
/// Returns `None` for nodes with nothing to render: a freestanding run
/// that is exactly one newline, an empty paragraph or code block, or a
/// heading with no surviving children.
pub(crate) fn build(tree: &DomTree, id: NodeId) -> Option<Document> {
    let node = tree.node(id);
    match &node.kind {
        NodeKind::Root => Some(Document::Root(build_children(tree, &node.children))),
        NodeKind::List { ordered } => {
            let items = build_children(tree, &node.children);
            if *ordered {
                Some(Document::OrderedList(items))
            } else {
                Some(Document::UnorderedList(items))
            }
        }
        NodeKind::ListItem => Some(Document::ListNode(build_children(tree, &node.children))),
        NodeKind::Pre => {
            // Structure guarantees the single child is the code block.
            let child = *node.children.first()?;
            build(tree, child)
        }
        NodeKind::Code => inner_text(tree, node.children.first())
            .map(|text| Document::CodeBlock(text.replace("&quot;", "\""))),
        NodeKind::Paragraph => inner_text(tree, node.children.first()).map(Document::Paragraph),
        NodeKind::Heading { level } => {
            let children = build_children(tree, &node.children);
            if children.is_empty() {
                None
            } else {
                Some(Document::Heading { level: *level, children })
            }
        }
        NodeKind::Text { content } => {
            // A lone stray newline from source formatting renders nothing;
            // any other whitespace-only run is kept.
            if content.is_empty() || content == "\n" {
                None
            } else {
                Some(Document::Text(content.clone()))
            }
        }
    }
}

fn build_children(tree: &DomTree, children: &[NodeId]) -> Vec<Document> {
    children.iter().filter_map(|id| build(tree, *id)).collect()
}

fn inner_text(tree: &DomTree, child: Option<&NodeId>) -> Option<String> {
    match &tree.node(*child?).kind {
        NodeKind::Text { content } => Some(content.clone()),
        _ => None,
    }
}
