//! Line type and the per-page line/span pairing.

use serde::{Deserialize, Serialize};

use super::{PolygonBox, Span};

/// A geometric line of text in reading order.
///
/// Lines carry no spans of their own; see [`PageLines`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Bounding polygon in page space
    pub polygon: PolygonBox,

    /// Page index (0-based)
    pub page_id: usize,
}

/// Lines of one page with their index-aligned span lists.
///
/// `spans[i]` holds the spans of `lines[i]`, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLines {
    pub lines: Vec<Line>,
    pub spans: Vec<Vec<Span>>,
}

impl PageLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line with its spans.
    pub fn push(&mut self, line: Line, spans: Vec<Span>) {
        self.lines.push(line);
        self.spans.push(spans);
    }

    /// Iterate lines paired with their spans.
    pub fn iter(&self) -> impl Iterator<Item = (&Line, &[Span])> {
        self.lines
            .iter()
            .zip(self.spans.iter().map(Vec::as_slice))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of spans across all lines.
    pub fn span_count(&self) -> usize {
        self.spans.iter().map(Vec::len).sum()
    }

    /// Check if the page has no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::span::sample_span;

    #[test]
    fn test_page_lines_alignment() {
        let mut page = PageLines::new();
        let line = Line {
            polygon: PolygonBox::from_bbox([0.0, 0.0, 100.0, 12.0]),
            page_id: 0,
        };
        page.push(line.clone(), vec![sample_span("a", &[]), sample_span("b", &[])]);
        page.push(line, Vec::new());

        assert_eq!(page.line_count(), 2);
        assert_eq!(page.span_count(), 2);
        let counts: Vec<usize> = page.iter().map(|(_, spans)| spans.len()).collect();
        assert_eq!(counts, vec![2, 0]);
    }
}
