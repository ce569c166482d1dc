//! Markup for a whole page, one line per row.

use crate::model::{BlockId, BlockType, Node, PageLines, Renderable};

/// Render every line of a page through its spans.
///
/// Lines with no visible markup are left out.
pub fn page_markup(page: &PageLines) -> String {
    page.iter()
        .enumerate()
        .map(|(index, (line, spans))| {
            let parent = [BlockId {
                page_id: line.page_id,
                block_id: index,
                block_type: BlockType::Line,
            }];
            let children: Vec<Node> = spans.iter().cloned().map(Node::Span).collect();
            line.render(&children, &parent)
        })
        .filter(|markup| !markup.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
