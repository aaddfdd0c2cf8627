//! Primitive extraction: page content decoded into positioned primitives.

mod primitive;
mod source;

pub use primitive::{BBox, FontInfo, ImageRef, Orientation, Primitive, RuleSegment, TextRun};
pub use source::{decode_text_simple, LopdfSource, PrimitiveSource};
