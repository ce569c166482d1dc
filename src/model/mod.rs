//! Line and span model for extracted page text.
//!
//! Spans are the smallest styled unit of text. Lines carry geometry only;
//! the spans belonging to a line live in an index-aligned list next to it
//! (see [`PageLines`]).

mod format;
mod line;
mod node;
mod polygon;
mod span;

pub use format::{FormatSet, TextFormat};
pub use line::{Line, PageLines};
pub use node::{BlockId, BlockType, Node, Renderable};
pub use polygon::{BBox, PolygonBox};
pub use span::Span;

#[cfg(test)]
pub(crate) use span::sample_span;
