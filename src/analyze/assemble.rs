//! Document assembly: collect per-page items into the final document.

use crate::error::{Error, Result};
use crate::model::{ContentItem, StructuredDocument};

/// Builds a [`StructuredDocument`] from per-page item batches.
///
/// Pages must be pushed in strictly ascending order starting at 1; a batch
/// out of sequence is rejected with [`Error::PageOutOfOrder`]. An empty batch
/// still advances the page counter, so failed pages keep their slot.
pub struct DocumentBuilder {
    document: StructuredDocument,
    next_page: u32,
}

impl DocumentBuilder {
    /// Start a document for the given source name.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            document: StructuredDocument::new(source),
            next_page: 1,
        }
    }

    /// Append one page's items. `page` is 1-indexed and must equal the next
    /// expected page number.
    pub fn push_page(&mut self, page: u32, items: Vec<ContentItem>) -> Result<()> {
        if page != self.next_page {
            return Err(Error::PageOutOfOrder {
                expected: self.next_page,
                got: page,
            });
        }
        debug_assert!(items.iter().all(|i| i.page() == page));
        self.document.content.extend(items);
        self.next_page += 1;
        Ok(())
    }

    /// Finish the document, filling in page and text counts.
    pub fn finish(mut self) -> StructuredDocument {
        self.document.info.pages = self.next_page - 1;

        let mut chars: u64 = 0;
        let mut words: u64 = 0;
        for item in &self.document.content {
            let text = item.plain_text();
            chars += text.chars().count() as u64;
            words += text.split_whitespace().count() as u64;
        }
        self.document.info.chars = Some(chars);
        self.document.info.words = Some(words);
        self.document
    }
}
