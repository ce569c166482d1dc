//! Span type.

use serde::{Deserialize, Serialize};

use super::{FormatSet, PolygonBox, TextFormat};

/// A run of text sharing one font, with its page geometry and format tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content (trimmed by the builder)
    pub text: String,

    /// Font name as reported by the decoding engine
    pub font: String,

    /// Font weight (400 = regular, 700 = bold)
    pub font_weight: f32,

    /// Font size in points
    pub font_size: f32,

    /// Offset of the first character in the page's character stream
    pub minimum_position: usize,

    /// Offset of the last character in the page's character stream
    pub maximum_position: usize,

    /// Bounding polygon in page space
    pub polygon: PolygonBox,

    /// Page index (0-based)
    pub page_id: usize,

    /// Semantic format tags
    pub formats: FormatSet,

    /// Hyperlink target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Anchor identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,

    /// Skip this span when rendering markup
    #[serde(default)]
    pub ignore_for_output: bool,
}

impl Span {
    /// Attach a hyperlink target.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach an anchor identifier.
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Check whether the span carries a format tag.
    pub fn has_format(&self, format: TextFormat) -> bool {
        self.formats.contains(&format)
    }

    pub fn bold(&self) -> bool {
        self.has_format(TextFormat::Bold)
    }

    pub fn italic(&self) -> bool {
        self.has_format(TextFormat::Italic)
    }

    pub fn math(&self) -> bool {
        self.has_format(TextFormat::Math)
    }

    /// Format tags with an empty set read as `{plain}`.
    pub fn effective_formats(&self) -> FormatSet {
        if self.formats.is_empty() {
            FormatSet::from([TextFormat::Plain])
        } else {
            self.formats.clone()
        }
    }

    /// Number of characters the span covers in the page stream.
    pub fn char_len(&self) -> usize {
        self.maximum_position.saturating_sub(self.minimum_position) + 1
    }
}

#[cfg(test)]
pub(crate) fn sample_span(text: &str, formats: &[TextFormat]) -> Span {
    Span {
        text: text.to_string(),
        font: "Helvetica".to_string(),
        font_weight: 400.0,
        font_size: 12.0,
        minimum_position: 0,
        maximum_position: text.chars().count().saturating_sub(1),
        polygon: PolygonBox::from_bbox([0.0, 0.0, 10.0, 12.0]),
        page_id: 0,
        formats: formats.iter().copied().collect(),
        url: None,
        anchor: None,
        ignore_for_output: false,
    }
}
