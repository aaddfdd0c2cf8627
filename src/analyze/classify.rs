//! Block classification: paragraph, table, or chart.
//!
//! Rules are ordered and the first match wins: image blocks are charts,
//! rule-grid blocks are tables, columnar-aligned text blocks are tables,
//! and everything else is a paragraph.

use super::fonts::FontProfile;
use super::options::{HeadingConfig, TableConfig};
use super::segment::{Block, BlockKind};
use super::table::{block_start_xs, column_edges};

/// The content class assigned to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockClass {
    /// Body text
    Paragraph,
    /// Tabular data
    Table,
    /// Chart or figure
    Chart,
}

/// Classifies segmented blocks.
pub struct ContentClassifier {
    table: TableConfig,
    heading: HeadingConfig,
}

impl ContentClassifier {
    pub fn new(table: TableConfig, heading: HeadingConfig) -> Self {
        Self { table, heading }
    }

    /// Classify a block. First matching rule wins.
    pub fn classify(&self, block: &Block) -> BlockClass {
        if block.kind == BlockKind::Image {
            return BlockClass::Chart;
        }
        if block.kind == BlockKind::Grid {
            return BlockClass::Table;
        }
        if self.is_columnar(block) {
            return BlockClass::Table;
        }
        BlockClass::Paragraph
    }

    /// Heading rank of a text block, if it is a heading candidate.
    ///
    /// A candidate is a short text block whose dominant font the profile
    /// ranks above body text. Grid and image blocks are never headings.
    pub fn heading_rank(&self, block: &Block, profile: &FontProfile) -> Option<u8> {
        if block.kind != BlockKind::Text {
            return None;
        }
        if block.lines.is_empty() || block.lines.len() > self.heading.max_lines {
            return None;
        }
        profile.heading_rank(block.dominant_font_size(), block.dominant_bold())
    }

    /// Whether a text block shows recurring multi-column alignment.
    ///
    /// Two-row blocks qualify only with an extra column of evidence, so a
    /// caption-and-date pair does not turn into a table.
    fn is_columnar(&self, block: &Block) -> bool {
        let rows = block.lines.len();
        if rows < 2 {
            return false;
        }
        // A table needs more than one run on most lines.
        let multi_run_lines = block.lines.iter().filter(|l| l.runs.len() >= 2).count();
        if multi_run_lines * 2 < rows {
            return false;
        }

        let edges = column_edges(&block_start_xs(block), &self.table).len();
        if edges < self.table.min_columns || edges > self.table.max_columns {
            return false;
        }
        rows >= self.table.min_rows || edges > self.table.min_columns
    }
}
