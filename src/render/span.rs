//! Inline markup for a single span.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{BlockId, Node, Renderable, Span};

static BLANK_LINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\n\s){3,}").expect("blank line pattern is valid"));

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Render a span as inline markup.
///
/// Line breaks at the edges are dropped (a trailing one becomes a space
/// unless the text ends in a hyphen), hyphenated breaks are joined, the
/// text is escaped and normalized, and at most one wrapper is applied, by
/// priority: italic, bold, math, link with anchor, link, anchor.
pub fn render_span(span: &Span) -> String {
    if span.ignore_for_output {
        return String::new();
    }

    let without_trailing = span.text.trim_end_matches(is_line_break);
    let had_trailing = without_trailing.len() != span.text.len();

    let mut text = without_trailing
        .trim_start_matches(is_line_break)
        .to_string();
    if had_trailing && !text.ends_with('-') {
        text.push(' ');
    }

    let text = text.replace("-\n", "");
    let text = cleanup_text(&escape_markup(&text));
    wrap(span, text)
}

fn wrap(span: &Span, text: String) -> String {
    if span.italic() {
        format!("<i>{}</i>", text)
    } else if span.bold() {
        format!("<b>{}</b>", text)
    } else if span.math() {
        format!("<math display='inline'>{}</math>", text)
    } else {
        match (&span.url, &span.anchor) {
            (Some(url), Some(anchor)) => {
                format!("<span id='{}'><a href='{}'>{}</a></span>", anchor, url, text)
            }
            (Some(url), None) => format!("<a href='{}'>{}</a>", url, text),
            (None, Some(anchor)) => format!("<span id='{}'>{}</span>", anchor, text),
            (None, None) => text,
        }
    }
}

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Collapse long runs of blank lines and replace non-breaking spaces.
pub fn cleanup_text(text: &str) -> String {
    BLANK_LINE_RUN
        .replace_all(text, "\n\n")
        .replace('\u{a0}', " ")
}

impl Renderable for Span {
    /// Spans have no children; both arguments are ignored.
    fn render(&self, _children: &[Node], _parent_structure: &[BlockId]) -> String {
        render_span(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{sample_span, TextFormat};

    fn plain(text: &str) -> Span {
        sample_span(text, &[TextFormat::Plain])
    }

    #[test]
    fn test_hyphenated_break_is_joined() {
        assert_eq!(render_span(&plain("hello-\nworld")), "helloworld");
    }

    #[test]
    fn test_trailing_newline_becomes_space() {
        assert_eq!(render_span(&plain("foo\n")), "foo ");
        assert_eq!(render_span(&plain("foo\r\n\n")), "foo ");
    }

    #[test]
    fn test_trailing_hyphen_keeps_no_space() {
        assert_eq!(render_span(&plain("hyphen-\n")), "hyphen-");
    }

    #[test]
    fn test_leading_newlines_stripped() {
        assert_eq!(render_span(&plain("\n\rtext")), "text");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            render_span(&plain("a < b & \"c\" 'd'")),
            "a &lt; b &amp; &quot;c&quot; &#x27;d&#x27;"
        );
    }

    #[test]
    fn test_cleanup_text() {
        assert_eq!(cleanup_text("a\n \n \n b"), "a\n\nb");
        assert_eq!(cleanup_text("a\n\nb"), "a\n\nb");
        assert_eq!(cleanup_text("non\u{a0}breaking"), "non breaking");
    }

    #[test]
    fn test_italic_wins_over_bold() {
        let span = sample_span("x", &[TextFormat::Bold, TextFormat::Italic]);
        assert_eq!(render_span(&span), "<i>x</i>");
    }

    #[test]
    fn test_bold_wins_over_math() {
        let span = sample_span("x", &[TextFormat::Bold, TextFormat::Math]);
        assert_eq!(render_span(&span), "<b>x</b>");
        let span = sample_span("x", &[TextFormat::Math]);
        assert_eq!(render_span(&span), "<math display='inline'>x</math>");
    }

    #[test]
    fn test_link_wrappers() {
        let both = plain("see").with_url("#sec-2").with_anchor("ref-1");
        assert_eq!(
            render_span(&both),
            "<span id='ref-1'><a href='#sec-2'>see</a></span>"
        );
        assert_eq!(
            render_span(&plain("see").with_url("#sec-2")),
            "<a href='#sec-2'>see</a>"
        );
        assert_eq!(
            render_span(&plain("see").with_anchor("ref-1")),
            "<span id='ref-1'>see</span>"
        );
    }

    #[test]
    fn test_format_beats_link() {
        let span = sample_span("x", &[TextFormat::Italic]).with_url("https://example.com");
        assert_eq!(render_span(&span), "<i>x</i>");
    }

    #[test]
    fn test_ignored_span_renders_empty() {
        let mut span = plain("hidden");
        span.ignore_for_output = true;
        assert_eq!(render_span(&span), "");
    }

    #[test]
    fn test_empty_format_set_renders_unwrapped() {
        assert_eq!(render_span(&sample_span("sym", &[])), "sym");
    }

    #[test]
    fn test_renderable_ignores_context() {
        let span = plain("ctx");
        let children = vec![Node::Span(plain("child"))];
        assert_eq!(span.render(&children, &[]), "ctx");
    }
}
