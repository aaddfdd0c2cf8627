//! Output content items.

use serde::{Deserialize, Serialize};

/// One unit of extracted content, tagged with the section context that was
/// active when its source block was encountered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// A paragraph of body text (headings are also emitted as paragraphs)
    Paragraph {
        /// Page number (1-indexed)
        page: u32,
        /// Active section title ("" before the first heading)
        section: String,
        /// Active sub-section title ("" when none)
        subsection: String,
        /// Normalized paragraph text
        text: String,
    },

    /// A reconstructed table
    Table {
        /// Page number (1-indexed)
        page: u32,
        /// Active section title
        section: String,
        /// Active sub-section title
        subsection: String,
        /// Row-major cell grid with a constant column count
        rows: Vec<Vec<String>>,
    },

    /// A chart or figure with a contextual description
    Chart {
        /// Page number (1-indexed)
        page: u32,
        /// Active section title
        section: String,
        /// Active sub-section title
        subsection: String,
        /// Caption-derived or generic description
        description: String,
    },
}

impl ContentItem {
    /// Page number of the item.
    pub fn page(&self) -> u32 {
        match self {
            ContentItem::Paragraph { page, .. }
            | ContentItem::Table { page, .. }
            | ContentItem::Chart { page, .. } => *page,
        }
    }

    /// Active section title.
    pub fn section(&self) -> &str {
        match self {
            ContentItem::Paragraph { section, .. }
            | ContentItem::Table { section, .. }
            | ContentItem::Chart { section, .. } => section,
        }
    }

    /// Active sub-section title.
    pub fn subsection(&self) -> &str {
        match self {
            ContentItem::Paragraph { subsection, .. }
            | ContentItem::Table { subsection, .. }
            | ContentItem::Chart { subsection, .. } => subsection,
        }
    }

    /// Check if this item is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, ContentItem::Paragraph { .. })
    }

    /// Check if this item is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, ContentItem::Table { .. })
    }

    /// Check if this item is a chart.
    pub fn is_chart(&self) -> bool {
        matches!(self, ContentItem::Chart { .. })
    }

    /// Plain text carried by the item (cell texts joined for tables).
    pub fn plain_text(&self) -> String {
        match self {
            ContentItem::Paragraph { text, .. } => text.clone(),
            ContentItem::Table { rows, .. } => rows
                .iter()
                .map(|r| r.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
            ContentItem::Chart { description, .. } => description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_tags() {
        let item = ContentItem::Paragraph {
            page: 1,
            section: "Intro".to_string(),
            subsection: String::new(),
            text: "Hello".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "paragraph");
        assert_eq!(json["page"], 1);
        assert_eq!(json["section"], "Intro");
        assert_eq!(json["subsection"], "");
        assert_eq!(json["text"], "Hello");
    }

    #[test]
    fn test_table_serialization() {
        let item = ContentItem::Table {
            page: 2,
            section: String::new(),
            subsection: String::new(),
            rows: vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ],
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "table");
        assert_eq!(json["rows"][1][0], "c");
    }

    #[test]
    fn test_plain_text() {
        let item = ContentItem::Table {
            page: 1,
            section: String::new(),
            subsection: String::new(),
            rows: vec![vec!["a".to_string(), "b".to_string()]],
        };
        assert_eq!(item.plain_text(), "a\tb");
    }

    #[test]
    fn test_roundtrip() {
        let item = ContentItem::Chart {
            page: 3,
            section: "Results".to_string(),
            subsection: "Q3".to_string(),
            description: "Chart/Image 1 - revenue by region".to_string(),
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: ContentItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
