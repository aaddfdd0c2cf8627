//! # pdftree
//!
//! Structured content extraction for PDF documents.
//!
//! pdftree decodes a PDF's page primitives, groups them into visual blocks,
//! classifies each block as a paragraph, table, or chart, infers the running
//! section hierarchy from typography, and assembles everything into a
//! page-ordered hierarchical document ready for JSON serialization.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdftree::{parse_file, render};
//!
//! fn main() -> pdftree::Result<()> {
//!     let doc = parse_file("report.pdf")?;
//!
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Content classification**: paragraphs, tables, and charts/figures
//! - **Section hierarchy**: headings inferred from font-size typography
//! - **Table reconstruction**: ruled grids and whitespace-aligned columns
//! - **Resilient extraction**: a broken page degrades to an empty page
//! - **Parallel processing**: Rayon-backed extraction for multi-page files

pub mod analyze;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use analyze::{AnalyzeOptions, DocumentAnalyzer};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes, PdfFormat};
pub use error::{Error, Result};
pub use extract::{LopdfSource, Primitive, PrimitiveSource};
pub use model::{ContentItem, DocumentInfo, StructuredDocument};
pub use render::JsonFormat;

use std::path::Path;

/// Parse a PDF file into a structured document.
///
/// # Example
///
/// ```no_run
/// use pdftree::parse_file;
///
/// let doc = parse_file("report.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<StructuredDocument> {
    parse_file_with_options(path, AnalyzeOptions::default())
}

/// Parse a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdftree::{parse_file_with_options, AnalyzeOptions};
///
/// let options = AnalyzeOptions::new().with_max_pages(50).sequential();
/// let doc = parse_file_with_options("report.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: AnalyzeOptions,
) -> Result<StructuredDocument> {
    detect::detect_format_from_path(&path)?;
    let source = LopdfSource::open(path)?;
    DocumentAnalyzer::with_options(options).analyze(&source)
}

/// Parse a PDF from bytes.
///
/// `name` is recorded as the document source in the output.
pub fn parse_bytes(data: &[u8], name: &str) -> Result<StructuredDocument> {
    parse_bytes_with_options(data, name, AnalyzeOptions::default())
}

/// Parse a PDF from bytes with custom options.
pub fn parse_bytes_with_options(
    data: &[u8],
    name: &str,
    options: AnalyzeOptions,
) -> Result<StructuredDocument> {
    detect::detect_format_from_bytes(data)?;
    let source = LopdfSource::from_bytes(data, name)?;
    DocumentAnalyzer::with_options(options).analyze(&source)
}

/// Extract the plain text of every content item in page order.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(doc.plain_text())
}

/// Parse a PDF file and render it to JSON in one step.
///
/// # Example
///
/// ```no_run
/// use pdftree::{to_json, JsonFormat};
///
/// let json = to_json("report.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("output.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}
