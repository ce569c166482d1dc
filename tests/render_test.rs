//! Integration tests for span and page rendering.

use pdflines::model::{BlockId, BlockType, FormatSet, Line, Node, PageLines, PolygonBox, Span};
use pdflines::render::{page_markup, render_span, to_json};
use pdflines::{JsonFormat, Renderable, TextFormat};

fn span(text: &str, formats: &[TextFormat]) -> Span {
    Span {
        text: text.to_string(),
        font: "Times".to_string(),
        font_weight: 400.0,
        font_size: 10.0,
        minimum_position: 0,
        maximum_position: text.chars().count().saturating_sub(1),
        polygon: PolygonBox::from_bbox([0.0, 0.0, 50.0, 10.0]),
        page_id: 2,
        formats: formats.iter().copied().collect::<FormatSet>(),
        url: None,
        anchor: None,
        ignore_for_output: false,
    }
}

fn line() -> Line {
    Line {
        polygon: PolygonBox::from_bbox([0.0, 0.0, 500.0, 10.0]),
        page_id: 2,
    }
}

#[test]
fn test_spec_examples() {
    assert_eq!(render_span(&span("hello-\nworld", &[])), "helloworld");
    assert_eq!(render_span(&span("foo\n", &[])), "foo ");
    assert_eq!(
        render_span(&span("both", &[TextFormat::Italic, TextFormat::Bold])),
        "<i>both</i>"
    );
}

#[test]
fn test_escape_happens_after_hyphen_join() {
    assert_eq!(
        render_span(&span("R&D-\nteam <b>\n", &[TextFormat::Plain])),
        "R&amp;Dteam &lt;b&gt; "
    );
}

#[test]
fn test_node_dispatch() {
    let children = vec![
        Node::Span(span("a", &[TextFormat::Bold])),
        Node::Span(span("b", &[TextFormat::Plain])),
    ];
    let parent = [BlockId {
        page_id: 2,
        block_id: 0,
        block_type: BlockType::Line,
    }];

    let line_node = Node::Line(line());
    assert_eq!(line_node.render(&children, &parent), "<b>a</b> b");
    assert_eq!(children[0].render(&[], &parent), "<b>a</b>");
    assert_eq!(parent[0].to_string(), "/page/2/Line/0");
}

#[test]
fn test_page_markup_and_json() {
    let mut page = PageLines::new();
    page.push(
        line(),
        vec![
            span("E", &[TextFormat::Math]),
            span("=", &[TextFormat::Plain]),
            span("mc", &[TextFormat::Math]).with_anchor("eq-1"),
        ],
    );
    page.push(line(), vec![span("see", &[]).with_url("#eq-1")]);

    assert_eq!(
        page_markup(&page),
        "<math display='inline'>E</math> = <math display='inline'>mc</math>\n<a href='#eq-1'>see</a>"
    );

    let json = to_json(&page, JsonFormat::Compact).unwrap();
    assert!(json.contains("\"anchor\":\"eq-1\""));
    assert!(json.contains("\"url\":\"#eq-1\""));
    assert!(json.contains("\"math\""));
}

#[test]
fn test_node_serde_tag() {
    let json = serde_json::to_string(&Node::Line(line())).unwrap();
    assert!(json.starts_with("{\"type\":\"line\""));
}
