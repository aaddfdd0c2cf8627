//! Table reconstruction: turn a tabular block into a row-major cell grid.
//!
//! Row boundaries come from horizontal rules when the block has a rule grid,
//! otherwise from tight baseline clustering. Column boundaries come from
//! vertical rules, otherwise from recurring start-x alignment across rows.
//! Every emitted row is padded (or merged) to the modal column count.

use crate::extract::{Orientation, TextRun};

use super::normalize::TextNormalizer;
use super::options::TableConfig;
use super::segment::{Block, Line};

/// Tolerance (points) when deduplicating rule positions.
const RULE_POSITION_TOLERANCE: f32 = 2.0;

/// Outcome of reconstructing a tabular block.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOutcome {
    /// A real table: at least two rows or two columns
    Table(Vec<Vec<String>>),
    /// The grid collapsed to a single cell; emit its text as a paragraph
    Degenerate(String),
}

/// Reconstructs cell grids from blocks the classifier marked tabular.
pub struct TableReconstructor {
    config: TableConfig,
    normalizer: TextNormalizer,
}

impl TableReconstructor {
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            normalizer: TextNormalizer::new(),
        }
    }

    /// Reconstruct the cell grid of a tabular block.
    pub fn reconstruct(&self, block: &Block) -> TableOutcome {
        let runs: Vec<&TextRun> = block.runs().collect();
        if runs.is_empty() {
            return TableOutcome::Degenerate(String::new());
        }

        let rows = self.row_bands(block, &runs);
        let columns = self.column_bands(block, &runs);

        let mut grid: Vec<Vec<String>> = Vec::new();
        for row_runs in &rows {
            let mut cells: Vec<Vec<&TextRun>> = vec![Vec::new(); columns.len()];
            for &run in row_runs {
                let col = column_index(&columns, run.x());
                cells[col].push(run);
            }
            let row: Vec<String> = cells
                .into_iter()
                .map(|mut cell| {
                    cell.sort_by(|a, b| {
                        a.x().partial_cmp(&b.x()).unwrap_or(std::cmp::Ordering::Equal)
                    });
                    let joined = cell
                        .iter()
                        .map(|r| r.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    self.normalizer.normalize(&joined)
                })
                .collect();
            grid.push(row);
        }

        grid.retain(|row| row.iter().any(|c| !c.is_empty()));

        if grid.len() <= 1 && grid.first().map(|r| r.iter().filter(|c| !c.is_empty()).count() <= 1).unwrap_or(true) {
            let text = grid
                .into_iter()
                .flatten()
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            return TableOutcome::Degenerate(text);
        }

        normalize_widths(&mut grid);

        if grid.len() == 1 && grid[0].len() == 1 {
            return TableOutcome::Degenerate(grid.remove(0).remove(0));
        }

        TableOutcome::Table(grid)
    }

    /// Partition runs into row groups, top to bottom.
    fn row_bands<'a>(&self, block: &Block, runs: &[&'a TextRun]) -> Vec<Vec<&'a TextRun>> {
        let mut rule_ys: Vec<f32> = block
            .rules
            .iter()
            .filter(|r| r.orientation == Orientation::Horizontal)
            .map(|r| r.bbox.center_y())
            .collect();
        dedup_positions(&mut rule_ys);

        if rule_ys.len() >= 2 {
            // Bands between consecutive horizontal rules.
            rule_ys.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
            let mut bands: Vec<Vec<&TextRun>> = vec![Vec::new(); rule_ys.len() - 1];
            let mut orphans: Vec<&TextRun> = Vec::new();
            for &run in runs {
                let y = run.y();
                match rule_ys.windows(2).position(|w| y <= w[0] && y >= w[1]) {
                    Some(i) => bands[i].push(run),
                    None => orphans.push(run),
                }
            }
            // Text above the first rule (a header row drawn outside the grid)
            // becomes its own leading band.
            if !orphans.is_empty() {
                bands.insert(0, orphans);
            }
            bands.retain(|b| !b.is_empty());
            return bands;
        }

        // No usable rules: tight baseline clustering.
        let mut sorted: Vec<&TextRun> = runs.to_vec();
        sorted.sort_by(|a, b| b.y().partial_cmp(&a.y()).unwrap_or(std::cmp::Ordering::Equal));
        let mut bands: Vec<(f32, Vec<&TextRun>)> = Vec::new();
        for run in sorted {
            let tolerance = run.font.size.max(1.0) * self.config.y_tolerance_factor;
            match bands.iter_mut().find(|(y, _)| (*y - run.y()).abs() <= tolerance) {
                Some((_, band)) => band.push(run),
                None => bands.push((run.y(), vec![run])),
            }
        }
        bands.into_iter().map(|(_, band)| band).collect()
    }

    /// Column edge x-positions, left to right.
    fn column_bands(&self, block: &Block, runs: &[&TextRun]) -> Vec<f32> {
        let mut rule_xs: Vec<f32> = block
            .rules
            .iter()
            .filter(|r| r.orientation == Orientation::Vertical)
            .map(|r| r.bbox.center_x())
            .collect();
        dedup_positions(&mut rule_xs);

        if rule_xs.len() >= 2 {
            rule_xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            // n vertical rules bound n-1 columns; keep the left edges.
            rule_xs.pop();
            return rule_xs;
        }

        let lines: Vec<Vec<f32>> = group_start_xs(runs, self.config.y_tolerance_factor);
        let edges = column_edges(&lines, &self.config);
        if edges.len() >= self.config.min_columns {
            edges
        } else {
            // Single-column fallback.
            vec![runs
                .iter()
                .map(|r| r.x())
                .fold(f32::INFINITY, f32::min)]
        }
    }
}

/// Cluster per-line start-x positions into recurring column edges.
///
/// `lines` holds the start-x of each run, grouped by line. An edge must recur
/// in at least `min_alignment_ratio` of the lines and sit at least
/// `min_column_gap` from its left neighbor.
pub fn column_edges(lines: &[Vec<f32>], config: &TableConfig) -> Vec<f32> {
    if lines.is_empty() {
        return Vec::new();
    }

    let mut counts: std::collections::HashMap<i32, usize> = std::collections::HashMap::new();
    for line in lines {
        let mut seen: Vec<i32> = line
            .iter()
            .map(|&x| (x / config.edge_bucket).round() as i32)
            .collect();
        seen.sort_unstable();
        seen.dedup();
        for bucket in seen {
            *counts.entry(bucket).or_insert(0) += 1;
        }
    }

    let min_lines = ((lines.len() as f32) * config.min_alignment_ratio).ceil() as usize;
    let min_lines = min_lines.max(2);
    let mut edges: Vec<f32> = counts
        .into_iter()
        .filter(|(_, count)| *count >= min_lines)
        .map(|(bucket, _)| bucket as f32 * config.edge_bucket)
        .collect();
    edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // Merge edges closer than the minimum column gap.
    let mut merged: Vec<f32> = Vec::new();
    for edge in edges {
        match merged.last() {
            Some(&last) if edge - last < config.min_column_gap => {}
            _ => merged.push(edge),
        }
    }
    merged
}

/// Group run start-x values by line for alignment analysis.
pub fn group_start_xs(runs: &[&TextRun], y_tolerance_factor: f32) -> Vec<Vec<f32>> {
    let mut bands: Vec<(f32, Vec<f32>)> = Vec::new();
    for run in runs {
        let tolerance = run.font.size.max(1.0) * y_tolerance_factor;
        match bands.iter_mut().find(|(y, _)| (*y - run.y()).abs() <= tolerance) {
            Some((_, xs)) => xs.push(run.x()),
            None => bands.push((run.y(), vec![run.x()])),
        }
    }
    bands.into_iter().map(|(_, xs)| xs).collect()
}

/// Start-x values per line of an already-segmented block.
pub fn block_start_xs(block: &Block) -> Vec<Vec<f32>> {
    block
        .lines
        .iter()
        .map(|line: &Line| line.runs.iter().map(|r| r.x()).collect())
        .collect()
}

/// Index of the column an x-position falls into.
fn column_index(edges: &[f32], x: f32) -> usize {
    let mut index = 0;
    for (i, &edge) in edges.iter().enumerate() {
        if x + RULE_POSITION_TOLERANCE >= edge {
            index = i;
        }
    }
    index
}

/// Pad or merge rows so every row has the modal column count.
fn normalize_widths(grid: &mut Vec<Vec<String>>) {
    let mut counts: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();
    for row in grid.iter() {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    let Some((&width, _)) = counts.iter().max_by_key(|(_, c)| **c) else {
        return;
    };

    for row in grid.iter_mut() {
        while row.len() > width {
            let extra = row.pop().unwrap_or_default();
            if let Some(last) = row.last_mut() {
                if !extra.is_empty() {
                    if !last.is_empty() {
                        last.push(' ');
                    }
                    last.push_str(&extra);
                }
            }
        }
        while row.len() < width {
            row.push(String::new());
        }
    }
}

fn dedup_positions(positions: &mut Vec<f32>) {
    positions.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    positions.dedup_by(|a, b| (*a - *b).abs() <= RULE_POSITION_TOLERANCE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::options::SegmenterConfig;
    use crate::analyze::segment::BlockSegmenter;
    use crate::extract::{FontInfo, Primitive, RuleSegment};

    fn text(t: &str, x: f32, y: f32) -> Primitive {
        let width = t.chars().count() as f32 * 5.0;
        Primitive::Text(TextRun::new(
            t.to_string(),
            x,
            y,
            width,
            FontInfo::new(10.0, "Helvetica"),
        ))
    }

    fn segment_one(primitives: Vec<Primitive>) -> Block {
        let mut blocks = BlockSegmenter::new(SegmenterConfig::default()).segment(primitives);
        assert_eq!(blocks.len(), 1);
        blocks.remove(0)
    }

    #[test]
    fn test_columnar_block_reconstructs() {
        let block = segment_one(vec![
            text("Name", 72.0, 700.0),
            text("Price", 200.0, 700.0),
            text("Apple", 72.0, 688.0),
            text("1.20", 200.0, 688.0),
            text("Banana", 72.0, 676.0),
            text("0.80", 200.0, 676.0),
        ]);
        let outcome = TableReconstructor::new(TableConfig::default()).reconstruct(&block);
        let TableOutcome::Table(rows) = outcome else {
            panic!("expected a table");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["Name", "Price"]);
        assert_eq!(rows[2], vec!["Banana", "0.80"]);
    }

    #[test]
    fn test_ruled_grid_reconstructs() {
        let block = segment_one(vec![
            Primitive::Rule(RuleSegment::from_points(70.0, 710.0, 300.0, 710.0)),
            Primitive::Rule(RuleSegment::from_points(70.0, 680.0, 300.0, 680.0)),
            Primitive::Rule(RuleSegment::from_points(70.0, 650.0, 300.0, 650.0)),
            Primitive::Rule(RuleSegment::from_points(70.0, 650.0, 70.0, 710.0)),
            Primitive::Rule(RuleSegment::from_points(180.0, 650.0, 180.0, 710.0)),
            Primitive::Rule(RuleSegment::from_points(300.0, 650.0, 300.0, 710.0)),
            text("Item", 75.0, 692.0),
            text("Qty", 185.0, 692.0),
            text("Bolt", 75.0, 662.0),
            text("40", 185.0, 662.0),
        ]);
        let outcome = TableReconstructor::new(TableConfig::default()).reconstruct(&block);
        let TableOutcome::Table(rows) = outcome else {
            panic!("expected a table");
        };
        assert_eq!(rows, vec![vec!["Item", "Qty"], vec!["Bolt", "40"]]);
    }

    #[test]
    fn test_ragged_rows_padded_to_modal_width() {
        let block = segment_one(vec![
            text("A", 72.0, 700.0),
            text("B", 200.0, 700.0),
            text("C", 320.0, 700.0),
            text("D", 72.0, 688.0),
            text("E", 200.0, 688.0),
            text("F", 320.0, 688.0),
            text("G", 72.0, 676.0),
            text("H", 200.0, 676.0),
        ]);
        let outcome = TableReconstructor::new(TableConfig::default()).reconstruct(&block);
        let TableOutcome::Table(rows) = outcome else {
            panic!("expected a table");
        };
        assert!(rows.iter().all(|r| r.len() == 3));
        assert_eq!(rows[2], vec!["G", "H", ""]);
    }

    #[test]
    fn test_single_cell_is_degenerate() {
        let block = segment_one(vec![
            Primitive::Rule(RuleSegment::from_points(70.0, 710.0, 300.0, 710.0)),
            Primitive::Rule(RuleSegment::from_points(70.0, 650.0, 300.0, 650.0)),
            Primitive::Rule(RuleSegment::from_points(70.0, 650.0, 70.0, 710.0)),
            Primitive::Rule(RuleSegment::from_points(300.0, 650.0, 300.0, 710.0)),
            text("just a framed note", 80.0, 680.0),
        ]);
        let outcome = TableReconstructor::new(TableConfig::default()).reconstruct(&block);
        assert_eq!(
            outcome,
            TableOutcome::Degenerate("just a framed note".to_string())
        );
    }

    #[test]
    fn test_empty_block_is_degenerate_empty() {
        let reconstructor = TableReconstructor::new(TableConfig::default());
        let block = segment_one(vec![text("x", 72.0, 700.0)]);
        // Strip the runs out by reconstructing an empty clone via rules only.
        let mut empty = block.clone();
        empty.lines.clear();
        assert_eq!(
            reconstructor.reconstruct(&empty),
            TableOutcome::Degenerate(String::new())
        );
    }

    #[test]
    fn test_column_edges_recurring_alignment() {
        let config = TableConfig::default();
        let lines = vec![
            vec![72.0, 200.0, 320.0],
            vec![72.0, 201.0, 320.0],
            vec![73.0, 199.0, 321.0],
        ];
        let edges = column_edges(&lines, &config);
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn test_column_edges_rejects_sporadic_positions() {
        let config = TableConfig::default();
        let lines = vec![
            vec![72.0],
            vec![72.0, 250.0],
            vec![72.0],
            vec![72.0],
            vec![72.0],
        ];
        let edges = column_edges(&lines, &config);
        assert_eq!(edges, vec![70.0]);
    }
}
