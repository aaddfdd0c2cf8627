//! Positioned page primitives produced by a [`PrimitiveSource`].
//!
//! A primitive is one decoded content item — a text run, a rule segment, or
//! an image reference — with a bounding box in PDF user space (y grows
//! upward). Primitives are immutable once extracted.
//!
//! [`PrimitiveSource`]: super::PrimitiveSource

/// An axis-aligned bounding box in PDF user-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Bottom edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box, normalizing so x0 <= x1 and y0 <= y1.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Box width.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal center.
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical center.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether a point lies inside the box (inclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Whether the two boxes overlap.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }
}

/// Font metadata attached to a text run at extraction time.
///
/// Units are whatever the extractor exposes (points for the lopdf backend);
/// the classifier only ever compares sizes within a page, so the absolute
/// scale does not matter.
#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    /// Font size in source units
    pub size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub name: String,
    /// Whether the font appears to be bold
    pub bold: bool,
    /// Whether the font appears to be italic
    pub italic: bool,
}

impl FontInfo {
    /// Create font info, inferring bold/italic from the base font name.
    pub fn new(size: f32, name: impl Into<String>) -> Self {
        let name = name.into();
        let lower = name.to_lowercase();
        let bold =
            lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let italic = lower.contains("italic") || lower.contains("oblique");
        Self {
            size,
            name,
            bold,
            italic,
        }
    }
}

/// A positioned run of text with font metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// The decoded text content
    pub text: String,
    /// Bounding box of the run
    pub bbox: BBox,
    /// Font metadata
    pub font: FontInfo,
}

impl TextRun {
    /// Create a text run. The bounding box is derived from the baseline
    /// origin, an estimated advance width, and the font's ascent/descent.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font: FontInfo) -> Self {
        let bbox = BBox::new(x, y - font.size * 0.2, x + width, y + font.size * 0.8);
        Self {
            text: text.into(),
            bbox,
            font,
        }
    }

    /// Left edge of the run (start-x used for alignment analysis).
    pub fn x(&self) -> f32 {
        self.bbox.x0
    }

    /// Baseline-ish vertical anchor (bottom of the box plus descent).
    pub fn y(&self) -> f32 {
        self.bbox.y0 + self.font.size * 0.2
    }
}

/// Orientation of a rule segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Mostly horizontal stroke
    Horizontal,
    /// Mostly vertical stroke
    Vertical,
}

/// A stroked line or thin filled rectangle, used for table grid detection.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSegment {
    /// Bounding box of the segment
    pub bbox: BBox,
    /// Dominant orientation
    pub orientation: Orientation,
}

impl RuleSegment {
    /// Create a rule segment from endpoints, deriving the orientation from
    /// the dominant extent.
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let bbox = BBox::new(x0, y0, x1, y1);
        let orientation = if bbox.width() >= bbox.height() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        Self { bbox, orientation }
    }

    /// Whether this segment crosses the other at roughly a right angle.
    pub fn intersects_rule(&self, other: &RuleSegment) -> bool {
        self.orientation != other.orientation && self.bbox.intersects(&other.bbox)
    }
}

/// A reference to an embedded image placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    /// Placement box on the page
    pub bbox: BBox,
    /// XObject resource name (e.g., "Im1")
    pub name: String,
}

/// One decoded page content item.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A positioned run of text
    Text(TextRun),
    /// A rule/line segment
    Rule(RuleSegment),
    /// An embedded image placement
    Image(ImageRef),
}

impl Primitive {
    /// Bounding box of the primitive.
    pub fn bbox(&self) -> BBox {
        match self {
            Primitive::Text(t) => t.bbox,
            Primitive::Rule(r) => r.bbox,
            Primitive::Image(i) => i.bbox,
        }
    }

    /// Check if this primitive is a text run.
    pub fn is_text(&self) -> bool {
        matches!(self, Primitive::Text(_))
    }

    /// Check if this primitive is a rule segment.
    pub fn is_rule(&self) -> bool {
        matches!(self, Primitive::Rule(_))
    }

    /// Check if this primitive is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Primitive::Image(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_normalizes() {
        let b = BBox::new(10.0, 20.0, 5.0, 8.0);
        assert_eq!(b.x0, 5.0);
        assert_eq!(b.x1, 10.0);
        assert_eq!(b.y0, 8.0);
        assert_eq!(b.y1, 20.0);
    }

    #[test]
    fn test_bbox_union_and_contains() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 20.0, 8.0);
        let u = a.union(&b);
        assert_eq!(u.x1, 20.0);
        assert!(u.contains(15.0, 7.0));
        assert!(!a.contains(15.0, 7.0));
    }

    #[test]
    fn test_font_info_bold_detection() {
        let f = FontInfo::new(12.0, "Helvetica-Bold");
        assert!(f.bold);
        assert!(!f.italic);

        let f = FontInfo::new(12.0, "Times-Oblique");
        assert!(!f.bold);
        assert!(f.italic);
    }

    #[test]
    fn test_rule_orientation() {
        let h = RuleSegment::from_points(0.0, 100.0, 200.0, 100.5);
        assert_eq!(h.orientation, Orientation::Horizontal);

        let v = RuleSegment::from_points(50.0, 0.0, 50.5, 300.0);
        assert_eq!(v.orientation, Orientation::Vertical);

        assert!(h.intersects_rule(&v));
    }

    #[test]
    fn test_rules_same_orientation_never_intersect() {
        let a = RuleSegment::from_points(0.0, 100.0, 200.0, 100.0);
        let b = RuleSegment::from_points(0.0, 100.0, 200.0, 100.0);
        assert!(!a.intersects_rule(&b));
    }

    #[test]
    fn test_text_run_anchor() {
        let run = TextRun::new("Hi", 10.0, 700.0, 12.0, FontInfo::new(10.0, "Helvetica"));
        assert_eq!(run.x(), 10.0);
        assert!((run.y() - 700.0).abs() < 0.01);
    }
}
