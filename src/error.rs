//! Error types for the pdftree library.

use std::io;
use thiserror::Error;

/// Result type alias for pdftree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structured extraction.
///
/// Only the input-level variants (`Io`, `UnknownFormat`, `UnsupportedVersion`,
/// `PdfParse`, `Encrypted`) abort a run. A single page failing to decode
/// surfaces as `Extraction` and is recovered by substituting an empty page.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing the PDF document structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A single page's content stream could not be decoded.
    #[error("Extraction failed on page {page}: {reason}")]
    Extraction {
        /// Page number (1-indexed)
        page: u32,
        /// Underlying failure description
        reason: String,
    },

    /// Pages were supplied to the assembler out of order.
    #[error("Page {got} supplied out of order (expected page {expected})")]
    PageOutOfOrder {
        /// The page number the assembler expected next
        expected: u32,
        /// The page number it received
        got: u32,
    },

    /// Error serializing the output document.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl Error {
    /// Whether this error can be recovered by skipping the affected page.
    pub fn is_page_recoverable(&self) -> bool {
        matches!(self, Error::Extraction { .. })
    }
}
