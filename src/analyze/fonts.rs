//! Page-level font statistics for heading detection.

use std::collections::HashMap;

use crate::extract::TextRun;

/// Font usage profile built from the text runs of a page (or document).
///
/// The body size is the most common size by character count; any size
/// meaningfully above it is a heading size. Heading sizes are ranked
/// largest-first, so rank 1 is the top of the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct FontProfile {
    /// Character counts keyed by size in tenths of a point
    histogram: HashMap<i32, usize>,
    /// Bold character counts per size key
    bold_histogram: HashMap<i32, usize>,
    /// Most common font size (the body text size)
    body_size: f32,
    /// Whether the body text itself is bold
    body_bold: bool,
    /// Distinct sizes above the body size, sorted descending
    heading_sizes: Vec<f32>,
}

impl FontProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a run into the histogram, weighted by character count.
    pub fn add_run(&mut self, run: &TextRun) {
        let chars = run.text.chars().count();
        if chars == 0 {
            return;
        }
        let key = size_key(run.font.size);
        *self.histogram.entry(key).or_insert(0) += chars;
        if run.font.bold {
            *self.bold_histogram.entry(key).or_insert(0) += chars;
        }
    }

    /// Compute body size and the heading size ladder from the histogram.
    pub fn analyze(&mut self, size_delta: f32) {
        let Some((&body_key, &body_count)) =
            self.histogram.iter().max_by_key(|(_, count)| **count)
        else {
            return;
        };

        self.body_size = body_key as f32 / 10.0;
        self.body_bold = self
            .bold_histogram
            .get(&body_key)
            .map(|&bold| bold * 2 > body_count)
            .unwrap_or(false);

        let mut sizes: Vec<f32> = self
            .histogram
            .keys()
            .map(|&k| k as f32 / 10.0)
            .filter(|&s| s >= self.body_size + size_delta)
            .collect();
        sizes.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        sizes.dedup();
        self.heading_sizes = sizes;
    }

    /// The dominant (body) font size. Zero when no text was seen.
    pub fn body_size(&self) -> f32 {
        self.body_size
    }

    /// Whether the body text is predominantly bold.
    pub fn body_bold(&self) -> bool {
        self.body_bold
    }

    /// Distinct heading sizes, largest first.
    pub fn heading_sizes(&self) -> &[f32] {
        &self.heading_sizes
    }

    /// Heading rank for a font size, 1 = largest heading size seen.
    ///
    /// Returns `None` when the size is not a heading size. A bold run at body
    /// size (when the body is not bold) ranks below every size-based heading.
    pub fn heading_rank(&self, size: f32, bold: bool) -> Option<u8> {
        for (i, &heading_size) in self.heading_sizes.iter().enumerate() {
            if size >= heading_size - 0.5 {
                return Some((i + 1) as u8);
            }
        }
        if bold && !self.body_bold && (size - self.body_size).abs() < 0.5 {
            return Some(self.heading_sizes.len() as u8 + 1);
        }
        None
    }
}

fn size_key(size: f32) -> i32 {
    (size * 10.0) as i32
}
