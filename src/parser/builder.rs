//! Raw page records to lines and spans.

use crate::model::{Line, PageLines, PolygonBox, Span};

use super::backend::{PageRecord, RawSpan};
use super::font_format::classify;

/// Build the lines and index-aligned span lists of one page.
///
/// Every raw line becomes a [`Line`], even if none of its spans survive.
/// Spans whose text is empty once trimmed are dropped. Reading order is the
/// engine's.
pub fn build_page_lines(record: &PageRecord) -> PageLines {
    let mut page = PageLines::new();

    for block in &record.blocks {
        for raw_line in &block.lines {
            let spans = raw_line
                .spans
                .iter()
                .filter_map(|raw| build_span(raw, record.page))
                .collect();

            let line = Line {
                polygon: PolygonBox::from_bbox(raw_line.bbox),
                page_id: record.page,
            };
            page.push(line, spans);
        }
    }

    page
}

/// Build a span, or `None` for whitespace-only text.
fn build_span(raw: &RawSpan, page_id: usize) -> Option<Span> {
    let text = raw.text.trim();
    if text.is_empty() {
        return None;
    }

    Some(Span {
        text: text.to_string(),
        font: raw.font.name.clone(),
        font_weight: raw.font.weight,
        font_size: raw.font.size,
        minimum_position: raw.char_start_idx,
        maximum_position: raw.char_end_idx,
        polygon: PolygonBox::from_bbox(raw.bbox),
        page_id,
        formats: classify(raw.font.flags, &raw.font.name),
        url: None,
        anchor: None,
        ignore_for_output: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextFormat;
    use crate::parser::backend::{FontDescriptor, RawBlock, RawLine};

    fn raw_span(text: &str, font: &str, flags: u32, start: usize) -> RawSpan {
        RawSpan {
            bbox: [10.0, 20.0, 50.0, 32.0],
            text: text.to_string(),
            font: FontDescriptor {
                name: font.to_string(),
                flags,
                weight: 400.0,
                size: 12.0,
            },
            char_start_idx: start,
            char_end_idx: start + text.chars().count().saturating_sub(1),
        }
    }

    fn record(lines: Vec<Vec<RawSpan>>) -> PageRecord {
        PageRecord {
            page: 3,
            bbox: [0.0, 0.0, 612.0, 792.0],
            blocks: vec![RawBlock {
                bbox: [0.0, 0.0, 612.0, 792.0],
                lines: lines
                    .into_iter()
                    .map(|spans| RawLine {
                        bbox: [10.0, 20.0, 300.0, 32.0],
                        spans,
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_builds_trimmed_classified_spans() {
        let page = build_page_lines(&record(vec![vec![
            raw_span("  Title ", "Times-Bold", 34, 0),
            raw_span("body", "Times", 34, 9),
        ]]));

        assert_eq!(page.line_count(), 1);
        let spans = &page.spans[0];
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Title");
        assert!(spans[0].bold());
        assert!(spans[0].has_format(TextFormat::Plain));
        assert_eq!(spans[0].page_id, 3);
        assert_eq!(spans[1].minimum_position, 9);
        assert_eq!(spans[1].maximum_position, 12);
        assert_eq!(spans[1].polygon.bbox(), [10.0, 20.0, 50.0, 32.0]);
    }

    #[test]
    fn test_whitespace_spans_dropped_but_line_kept() {
        let page = build_page_lines(&record(vec![
            vec![raw_span("   ", "Times", 32, 0)],
            vec![raw_span("text", "Times", 32, 4)],
        ]));

        assert_eq!(page.line_count(), 2);
        assert!(page.spans[0].is_empty());
        assert_eq!(page.spans[1].len(), 1);
        assert_eq!(page.lines[0].page_id, 3);
    }

    #[test]
    fn test_offsets_keep_order() {
        let page = build_page_lines(&record(vec![vec![raw_span("abc", "Times", 0, 5)]]));
        let span = &page.spans[0][0];
        assert!(span.minimum_position <= span.maximum_position);
        assert_eq!(span.char_len(), 3);
    }

    #[test]
    fn test_empty_record() {
        let page = build_page_lines(&PageRecord {
            page: 0,
            bbox: [0.0; 4],
            blocks: Vec::new(),
        });
        assert!(page.is_empty());
    }
}
