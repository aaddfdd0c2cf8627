//! Primitive extraction backends.
//!
//! [`PrimitiveSource`] is the seam between the core engine and the concrete
//! PDF library: it yields, per page, an ordered sequence of positioned
//! primitives. [`LopdfSource`] is the production implementation backed by
//! `lopdf`; tests drive the engine through scripted sources instead.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

use super::primitive::{BBox, FontInfo, ImageRef, Primitive, RuleSegment, TextRun};

/// Abstract interface for per-page primitive extraction.
///
/// Page indices are 0-based. `extract_page` has no shared mutable state, so
/// callers may run it speculatively or in parallel across pages.
pub trait PrimitiveSource: Sync {
    /// Total number of pages in the document.
    fn page_count(&self) -> usize;

    /// Extract the ordered primitives of page `index` (0-based).
    ///
    /// Fails with [`Error::Extraction`] when the page is undecodable; callers
    /// are expected to substitute an empty page rather than abort.
    fn extract_page(&self, index: usize) -> Result<Vec<Primitive>>;

    /// Display name of the source (typically the input filename).
    fn source_name(&self) -> &str;
}

/// Concrete [`PrimitiveSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
    name: String,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc, name })
    }

    /// Load from an in-memory byte slice.
    pub fn from_bytes(data: &[u8], name: impl Into<String>) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self {
            doc,
            name: name.into(),
        })
    }

    /// PDF version string of the loaded document.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        let pages = self.doc.get_pages();
        let page_num = index as u32 + 1;
        pages.get(&page_num).copied().ok_or(Error::Extraction {
            page: page_num,
            reason: format!("page index {} out of range ({} pages)", index, pages.len()),
        })
    }

    /// Get the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(c) => c,
            // A page without a Contents entry is a legal blank page.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return s
                        .decompressed_content()
                        .map_err(|e| Error::PdfParse(e.to_string()));
                }
                Err(Error::PdfParse("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Check whether a named XObject on the page is an image.
    fn is_image_xobject(&self, page_id: ObjectId, name: &[u8]) -> bool {
        let Ok(page_dict) = self.doc.get_dictionary(page_id) else {
            return false;
        };
        let Ok(res) = page_dict.get(b"Resources") else {
            return false;
        };
        let res_dict = match res {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        };
        let Some(res_dict) = res_dict else {
            return false;
        };
        let Ok(xobjects) = res_dict.get(b"XObject") else {
            return false;
        };
        let xobj_dict = match xobjects {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        };
        let Some(xobj_dict) = xobj_dict else {
            return false;
        };
        let Some(obj) = xobj_dict.get(name).ok() else {
            return false;
        };
        let Ok(obj_ref) = obj.as_reference() else {
            return false;
        };
        if let Ok(Object::Stream(stream)) = self.doc.get_object(obj_ref) {
            return stream
                .dict
                .get(b"Subtype")
                .ok()
                .and_then(|s| s.as_name().ok())
                .map(|n| n == b"Image")
                .unwrap_or(false);
        }
        false
    }

    /// Walk a page's content stream and collect primitives in stream order.
    fn walk_content(&self, page_id: ObjectId, content: &[u8]) -> Result<Vec<Primitive>> {
        let lopdf_fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let fonts = base_font_names(&lopdf_fonts);

        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut primitives = Vec::new();
        let mut gs = GraphicsState::default();
        let mut gs_stack: Vec<GraphicsState> = Vec::new();
        let mut path = PathBuilder::default();

        let mut current_font_name: Vec<u8> = Vec::new();
        let mut current_font = String::new();
        let mut current_font_size: f32 = 12.0;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        for op in content.operations {
            match op.operator.as_str() {
                // Graphics state
                "q" => gs_stack.push(gs.clone()),
                "Q" => {
                    if let Some(prev) = gs_stack.pop() {
                        gs = prev;
                    }
                }
                "cm" => {
                    if op.operands.len() >= 6 {
                        let m: Vec<f32> = op.operands.iter().filter_map(get_number).collect();
                        if m.len() >= 6 {
                            gs.concat(m[0], m[1], m[2], m[3], m[4], m[5]);
                        }
                    }
                }

                // Path construction
                "m" => {
                    if op.operands.len() >= 2 {
                        let x = get_number(&op.operands[0]).unwrap_or(0.0);
                        let y = get_number(&op.operands[1]).unwrap_or(0.0);
                        path.move_to(gs.apply(x, y));
                    }
                }
                "l" => {
                    if op.operands.len() >= 2 {
                        let x = get_number(&op.operands[0]).unwrap_or(0.0);
                        let y = get_number(&op.operands[1]).unwrap_or(0.0);
                        path.line_to(gs.apply(x, y));
                    }
                }
                "re" => {
                    if op.operands.len() >= 4 {
                        let nums: Vec<f32> = op.operands.iter().filter_map(get_number).collect();
                        if nums.len() >= 4 {
                            path.rect(
                                gs.apply(nums[0], nums[1]),
                                gs.apply(nums[0] + nums[2], nums[1] + nums[3]),
                            );
                        }
                    }
                }
                // Painting: flush pending segments as rules
                "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    primitives.extend(path.take_rules().into_iter().map(Primitive::Rule));
                }
                "n" => path.clear(),

                // XObject placement
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        if self.is_image_xobject(page_id, name) {
                            // Image space is the unit square mapped by the CTM.
                            let (x0, y0) = gs.apply(0.0, 0.0);
                            let (x1, y1) = gs.apply(1.0, 1.0);
                            primitives.push(Primitive::Image(ImageRef {
                                bbox: BBox::new(x0, y0, x1, y1),
                                name: String::from_utf8_lossy(name).to_string(),
                            }));
                        }
                    }
                }

                // Text
                "BT" => {
                    in_text_block = true;
                    text_matrix = TextMatrix::default();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_name) = &op.operands[0] {
                            current_font_name = font_name.clone();
                            current_font = fonts
                                .get(font_name.as_slice())
                                .cloned()
                                .unwrap_or_else(|| {
                                    String::from_utf8_lossy(font_name.as_slice()).to_string()
                                });
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = op.operands.first().and_then(get_number) {
                        text_matrix.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            text_matrix.leading = -ty;
                        }
                        text_matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let m: Vec<f32> = op.operands.iter().filter_map(get_number).collect();
                        if m.len() >= 6 {
                            text_matrix.set(m[0], m[1], m[2], m[3], m[4], m[5]);
                        }
                    }
                }
                "T*" => text_matrix.next_line(),
                "Tj" | "TJ" => {
                    if in_text_block {
                        let text = self.decode_show_text(page_id, &current_font_name, &op);
                        self.push_text_run(
                            &mut primitives,
                            text,
                            &text_matrix,
                            current_font_size,
                            &current_font,
                        );
                    }
                }
                "'" | "\"" => {
                    text_matrix.next_line();
                    if in_text_block {
                        let text_idx = if op.operator == "\"" { 2 } else { 0 };
                        if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                            let text = self.decode_bytes(page_id, &current_font_name, bytes);
                            self.push_text_run(
                                &mut primitives,
                                text,
                                &text_matrix,
                                current_font_size,
                                &current_font,
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(primitives)
    }

    fn push_text_run(
        &self,
        primitives: &mut Vec<Primitive>,
        text: String,
        matrix: &TextMatrix,
        font_size: f32,
        font_name: &str,
    ) {
        if text.trim().is_empty() {
            return;
        }
        let (x, y) = matrix.position();
        let size = font_size * matrix.scale();
        // Advance width is estimated from the glyph count; the layout stages
        // only use it for gap checks, not exact metrics.
        let width = text.chars().count() as f32 * size * 0.5;
        primitives.push(Primitive::Text(TextRun::new(
            text,
            x,
            y,
            width,
            FontInfo::new(size, font_name),
        )));
    }

    /// Decode the string operand(s) of a Tj/TJ operator.
    fn decode_show_text(
        &self,
        page_id: ObjectId,
        font_name: &[u8],
        op: &lopdf::content::Operation,
    ) -> String {
        if op.operator == "TJ" {
            // TJ: array of strings and kerning adjustments in 1/1000 text
            // space units. Large negative adjustments act as word spaces.
            let Some(Object::Array(arr)) = op.operands.first() else {
                return String::new();
            };
            let mut combined = String::new();
            let space_threshold = 200.0;
            for item in arr {
                match item {
                    Object::String(bytes, _) => {
                        combined.push_str(&self.decode_bytes(page_id, font_name, bytes));
                    }
                    Object::Integer(n) => {
                        if -(*n as f32) > space_threshold && needs_space(&combined) {
                            combined.push(' ');
                        }
                    }
                    Object::Real(n) => {
                        if -n > space_threshold && needs_space(&combined) {
                            combined.push(' ');
                        }
                    }
                    _ => {}
                }
            }
            combined
        } else {
            match op.operands.first() {
                Some(Object::String(bytes, _)) => self.decode_bytes(page_id, font_name, bytes),
                _ => String::new(),
            }
        }
    }

    /// Decode a text byte sequence using the font's encoding, with a simple
    /// fallback when the font or encoding is unavailable.
    fn decode_bytes(&self, page_id: ObjectId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page_id) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }
}

impl PrimitiveSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn extract_page(&self, index: usize) -> Result<Vec<Primitive>> {
        let page_num = index as u32 + 1;
        let page_id = self.page_id(index)?;
        let content = self.page_content(page_id).map_err(|e| Error::Extraction {
            page: page_num,
            reason: e.to_string(),
        })?;
        self.walk_content(page_id, &content)
            .map_err(|e| Error::Extraction {
                page: page_num,
                reason: e.to_string(),
            })
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Build the resource-name → base-font-name map for a page.
fn base_font_names(fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>) -> BTreeMap<Vec<u8>, String> {
    let mut map = BTreeMap::new();
    for (name, font) in fonts {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        map.insert(name.clone(), base_font);
    }
    map
}

fn needs_space(combined: &str) -> bool {
    !combined.is_empty() && !combined.ends_with(' ') && !combined.ends_with('\u{00A0}')
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    // Try UTF-8
    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Current transformation matrix plus the graphics state stack entry.
#[derive(Debug, Clone)]
struct GraphicsState {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl GraphicsState {
    /// Concatenate `cm` operands onto the CTM.
    fn concat(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        let (sa, sb, sc, sd, se, sf) = (self.a, self.b, self.c, self.d, self.e, self.f);
        self.a = a * sa + b * sc;
        self.b = a * sb + b * sd;
        self.c = c * sa + d * sc;
        self.d = c * sb + d * sd;
        self.e = e * sa + f * sc + se;
        self.f = e * sb + f * sd + sf;
    }

    /// Map a point from path space to device space.
    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Accumulates path segments until a painting operator flushes them.
///
/// Only near-axis-aligned straight segments survive as rules; curves and
/// diagonal strokes are decorative and get dropped.
#[derive(Debug, Default)]
struct PathBuilder {
    current: Option<(f32, f32)>,
    segments: Vec<RuleSegment>,
}

impl PathBuilder {
    const AXIS_TOLERANCE: f32 = 2.0;

    fn move_to(&mut self, p: (f32, f32)) {
        self.current = Some(p);
    }

    fn line_to(&mut self, p: (f32, f32)) {
        if let Some((x0, y0)) = self.current {
            let (x1, y1) = p;
            let axis_aligned = (y1 - y0).abs() <= Self::AXIS_TOLERANCE
                || (x1 - x0).abs() <= Self::AXIS_TOLERANCE;
            if axis_aligned {
                self.segments.push(RuleSegment::from_points(x0, y0, x1, y1));
            }
        }
        self.current = Some(p);
    }

    /// A rectangle contributes its four borders; thin rectangles collapse to
    /// a single rule (the common way cell borders are drawn).
    fn rect(&mut self, p0: (f32, f32), p1: (f32, f32)) {
        let bbox = BBox::new(p0.0, p0.1, p1.0, p1.1);
        if bbox.height() <= Self::AXIS_TOLERANCE || bbox.width() <= Self::AXIS_TOLERANCE {
            self.segments
                .push(RuleSegment::from_points(bbox.x0, bbox.y0, bbox.x1, bbox.y1));
            return;
        }
        self.segments
            .push(RuleSegment::from_points(bbox.x0, bbox.y0, bbox.x1, bbox.y0));
        self.segments
            .push(RuleSegment::from_points(bbox.x0, bbox.y1, bbox.x1, bbox.y1));
        self.segments
            .push(RuleSegment::from_points(bbox.x0, bbox.y0, bbox.x0, bbox.y1));
        self.segments
            .push(RuleSegment::from_points(bbox.x1, bbox.y0, bbox.x1, bbox.y1));
    }

    fn take_rules(&mut self) -> Vec<RuleSegment> {
        self.current = None;
        std::mem::take(&mut self.segments)
    }

    fn clear(&mut self) {
        self.current = None;
        self.segments.clear();
    }
}

/// Text matrix for tracking position in content streams.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    #[allow(clippy::too_many_arguments)]
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.f -= self.leading * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
