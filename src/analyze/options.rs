//! Analysis options and tuning knobs.

/// Options for a document analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Maximum number of pages to process (0 = unlimited). Guard against
    /// pathological documents causing unbounded memory growth.
    pub max_pages: usize,

    /// Whether to extract page primitives in parallel ahead of the
    /// sequential classification pass.
    pub parallel: bool,

    /// Minimum cleaned-text length for a paragraph to be emitted.
    pub min_paragraph_chars: usize,

    /// Block segmentation tuning
    pub segmenter: SegmenterConfig,

    /// Table detection/reconstruction tuning
    pub table: TableConfig,

    /// Heading candidate tuning
    pub heading: HeadingConfig,
}

impl AnalyzeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page-count guard.
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = max;
        self
    }

    /// Disable parallel extraction.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the minimum paragraph length.
    pub fn with_min_paragraph_chars(mut self, chars: usize) -> Self {
        self.min_paragraph_chars = chars;
        self
    }

    /// Replace the segmenter configuration.
    pub fn with_segmenter(mut self, config: SegmenterConfig) -> Self {
        self.segmenter = config;
        self
    }

    /// Replace the table configuration.
    pub fn with_table(mut self, config: TableConfig) -> Self {
        self.table = config;
        self
    }

    /// Replace the heading configuration.
    pub fn with_heading(mut self, config: HeadingConfig) -> Self {
        self.heading = config;
        self
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_pages: 0,
            parallel: true,
            min_paragraph_chars: 10,
            segmenter: SegmenterConfig::default(),
            table: TableConfig::default(),
            heading: HeadingConfig::default(),
        }
    }
}

/// Block segmenter configuration.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Y tolerance for grouping runs into a line (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Block break threshold as a multiple of the median line height
    pub gap_factor: f32,
    /// Left-margin shift (points) that starts a new block
    pub margin_tolerance: f32,
    /// Font size change (points) that starts a new block
    pub font_shift: f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            y_tolerance_factor: 0.3,
            gap_factor: 1.6,
            margin_tolerance: 20.0,
            font_shift: 1.0,
        }
    }
}

/// Table detection and reconstruction configuration.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Minimum rows for columnar-alignment table detection
    pub min_rows: usize,
    /// Minimum columns to consider a block tabular
    pub min_columns: usize,
    /// Maximum columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping runs into table rows (fraction of font size;
    /// tighter than the segmenter's)
    pub y_tolerance_factor: f32,
    /// Minimum fraction of rows a start-x position must recur in to count as
    /// a column edge
    pub min_alignment_ratio: f32,
    /// Minimum gap between column edges (points)
    pub min_column_gap: f32,
    /// Bucket width (points) when clustering start-x positions
    pub edge_bucket: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_rows: 3,
            min_columns: 2,
            max_columns: 8,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.5,
            min_column_gap: 15.0,
            edge_bucket: 5.0,
        }
    }
}

/// Heading candidate configuration.
#[derive(Debug, Clone)]
pub struct HeadingConfig {
    /// Minimum size lead over the body font (points) for size-based headings
    pub size_delta: f32,
    /// Maximum number of lines a heading block may have
    pub max_lines: usize,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            size_delta: 1.5,
            max_lines: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = AnalyzeOptions::new()
            .with_max_pages(100)
            .sequential()
            .with_min_paragraph_chars(0);

        assert_eq!(options.max_pages, 100);
        assert!(!options.parallel);
        assert_eq!(options.min_paragraph_chars, 0);
    }

    #[test]
    fn test_defaults() {
        let options = AnalyzeOptions::default();
        assert_eq!(options.max_pages, 0);
        assert!(options.parallel);
        assert_eq!(options.min_paragraph_chars, 10);
        assert_eq!(options.table.min_columns, 2);
    }
}
