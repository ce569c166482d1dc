//! Renderable node kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Line, Span};

/// Kind of a structural node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Line,
    Span,
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::Line => f.write_str("Line"),
            BlockType::Span => f.write_str("Span"),
        }
    }
}

/// Identifier of a node within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    pub page_id: usize,
    pub block_id: usize,
    pub block_type: BlockType,
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/page/{}/{}/{}",
            self.page_id, self.block_type, self.block_id
        )
    }
}

/// Anything that assembles into inline markup.
///
/// `children` are the node's rendered-in-order descendants and
/// `parent_structure` the ids of its ancestors. Node kinds that do not
/// need either simply ignore them.
pub trait Renderable {
    fn render(&self, children: &[Node], parent_structure: &[BlockId]) -> String;
}

/// A structural node of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Line(Line),
    Span(Span),
}

impl Node {
    pub fn block_type(&self) -> BlockType {
        match self {
            Node::Line(_) => BlockType::Line,
            Node::Span(_) => BlockType::Span,
        }
    }

    pub fn page_id(&self) -> usize {
        match self {
            Node::Line(line) => line.page_id,
            Node::Span(span) => span.page_id,
        }
    }
}

impl Renderable for Node {
    fn render(&self, children: &[Node], parent_structure: &[BlockId]) -> String {
        match self {
            Node::Line(line) => line.render(children, parent_structure),
            Node::Span(span) => span.render(children, parent_structure),
        }
    }
}

impl Renderable for Line {
    /// Children's markup joined by single spaces; children that render
    /// to nothing are skipped.
    fn render(&self, children: &[Node], parent_structure: &[BlockId]) -> String {
        children
            .iter()
            .map(|child| child.render(&[], parent_structure))
            .filter(|markup| !markup.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
