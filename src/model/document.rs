//! Document-level types.

use serde::{Deserialize, Serialize};

use super::ContentItem;

/// The final page-ordered hierarchical document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Document-level metadata
    #[serde(rename = "document")]
    pub info: DocumentInfo,

    /// Content items ordered by (page ascending, in-page reading order)
    pub content: Vec<ContentItem>,
}

impl StructuredDocument {
    /// Create an empty document for the given source name.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            info: DocumentInfo {
                pages: 0,
                source: source.into(),
                chars: None,
                words: None,
            },
            content: Vec::new(),
        }
    }

    /// Number of pages the document was extracted from.
    pub fn page_count(&self) -> u32 {
        self.info.pages
    }

    /// Check if the document has no content items.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Items belonging to the given page (1-indexed).
    pub fn page_items(&self, page: u32) -> impl Iterator<Item = &ContentItem> {
        self.content.iter().filter(move |i| i.page() == page)
    }

    /// Plain text of all items, page order.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|i| i.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Total number of pages processed
    pub pages: u32,

    /// Source filename
    pub source: String,

    /// Total character count of extracted text (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chars: Option<u64>,

    /// Total word count of extracted text (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<u64>,
}
