//! JSON rendering for extracted lines and spans.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a page (or any model value) to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{sample_span, Line, PageLines, PolygonBox, TextFormat};

    fn page() -> PageLines {
        let mut page = PageLines::new();
        page.push(
            Line {
                polygon: PolygonBox::from_bbox([0.0, 0.0, 100.0, 12.0]),
                page_id: 0,
            },
            vec![sample_span("Hello", &[TextFormat::Bold])],
        );
        page
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&page(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"lines\""));
        assert!(json.contains("\"Hello\""));
        assert!(json.contains("\"bold\""));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&page(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines
    }

    #[test]
    fn test_round_trip_page() {
        let original = page();
        let json = to_json(&original, JsonFormat::Compact).unwrap();
        let parsed: PageLines = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }
}
