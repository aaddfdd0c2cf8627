//! Layout analysis pipeline: primitives in, classified content items out.
//!
//! The stages run in a fixed order. [`BlockSegmenter`] groups a page's
//! primitives into visual blocks, [`FontProfile`] ranks font sizes for
//! heading detection, [`ContentClassifier`] assigns each block a class,
//! [`TableReconstructor`] turns tabular blocks into cell grids,
//! [`SectionTracker`] maintains the running heading context, and
//! [`DocumentBuilder`] enforces page order while assembling the result.
//! [`DocumentAnalyzer`] drives them all.

mod assemble;
mod classify;
mod engine;
mod fonts;
mod normalize;
mod options;
mod section;
mod segment;
mod table;

pub use assemble::DocumentBuilder;
pub use classify::{BlockClass, ContentClassifier};
pub use engine::DocumentAnalyzer;
pub use fonts::FontProfile;
pub use normalize::TextNormalizer;
pub use options::{AnalyzeOptions, HeadingConfig, SegmenterConfig, TableConfig};
pub use section::SectionTracker;
pub use segment::{Block, BlockKind, BlockSegmenter, Line};
pub use table::{TableOutcome, TableReconstructor};
