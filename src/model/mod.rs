//! Output data model: content items and the assembled document.

mod document;
mod item;

pub use document::{DocumentInfo, StructuredDocument};
pub use item::ContentItem;
