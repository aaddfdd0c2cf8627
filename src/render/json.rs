//! JSON rendering of structured documents.

use crate::error::{Error, Result};
use crate::model::StructuredDocument;

/// Output formatting for JSON rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Human-readable, indented
    #[default]
    Pretty,
    /// Single-line, no insignificant whitespace
    Compact,
}

/// Render a document to JSON in the given format.
pub fn to_json(document: &StructuredDocument, format: JsonFormat) -> Result<String> {
    let rendered = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(document),
        JsonFormat::Compact => serde_json::to_string(document),
    };
    rendered.map_err(|e| Error::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentItem;

    fn sample() -> StructuredDocument {
        let mut doc = StructuredDocument::new("sample.pdf");
        doc.info.pages = 1;
        doc.content.push(ContentItem::Paragraph {
            page: 1,
            section: "Intro".to_string(),
            subsection: String::new(),
            text: "Hello".to_string(),
        });
        doc
    }

    #[test]
    fn test_pretty_is_indented() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"type\": \"paragraph\""));
    }

    #[test]
    fn test_compact_is_single_line() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_roundtrip() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        let back: StructuredDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
