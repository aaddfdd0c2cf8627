//! Block segmentation: group page primitives into visual blocks.
//!
//! Text runs are first gathered into lines by baseline proximity, then lines
//! into blocks by vertical gap, left-margin shift, and font-size change.
//! Rule segments that form a crossing grid claim the text inside them as a
//! single grid block; each placed image becomes its own block. Block order
//! follows reading order (top to bottom, then left to right).

use crate::extract::{BBox, ImageRef, Orientation, Primitive, RuleSegment, TextRun};

use super::options::SegmenterConfig;

/// Padding applied around rule endpoints when testing connectivity, to absorb
/// coordinate jitter from the content stream.
const RULE_JOIN_TOLERANCE: f32 = 3.0;

/// Minimum width for a stray horizontal rule to act as a block separator.
const SEPARATOR_MIN_WIDTH: f32 = 40.0;

/// What kind of visual block this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Free-flowing text lines
    Text,
    /// Text enclosed by a crossing rule grid
    Grid,
    /// A placed image
    Image,
}

/// One line of text: runs sharing a baseline, ordered left to right.
#[derive(Debug, Clone)]
pub struct Line {
    /// Runs in left-to-right order
    pub runs: Vec<TextRun>,
    /// Baseline anchor
    pub y: f32,
}

impl Line {
    fn new(run: TextRun) -> Self {
        let y = run.y();
        Self {
            runs: vec![run],
            y,
        }
    }

    fn push(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    fn finish(&mut self) {
        self.runs
            .sort_by(|a, b| a.x().partial_cmp(&b.x()).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Left edge of the line.
    pub fn x(&self) -> f32 {
        self.runs
            .iter()
            .map(|r| r.x())
            .fold(f32::INFINITY, f32::min)
    }

    /// Dominant font size, weighted by character count.
    pub fn font_size(&self) -> f32 {
        let mut best = (0usize, 0.0f32);
        for run in &self.runs {
            let chars = run.text.chars().count();
            if chars > best.0 {
                best = (chars, run.font.size);
            }
        }
        best.1
    }

    /// Whether the majority of the line's characters are bold.
    pub fn is_bold(&self) -> bool {
        let (bold, total) = self.runs.iter().fold((0usize, 0usize), |(b, t), run| {
            let chars = run.text.chars().count();
            (b + if run.font.bold { chars } else { 0 }, t + chars)
        });
        total > 0 && bold * 2 > total
    }

    /// Bounding box over all runs.
    pub fn bbox(&self) -> BBox {
        let mut iter = self.runs.iter();
        let first = iter.next().map(|r| r.bbox).unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        iter.fold(first, |acc, r| acc.union(&r.bbox))
    }

    /// Line text with spaces inserted at visual gaps between runs.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut prev_end: Option<f32> = None;
        for run in &self.runs {
            if let Some(end) = prev_end {
                let gap = run.x() - end;
                let char_width = run.font.size * 0.5;
                let last = out.chars().last();
                let spaceless = last.map(is_spaceless_script).unwrap_or(false)
                    && run.text.chars().next().map(is_spaceless_script).unwrap_or(false);
                if gap > char_width * 0.25 && !out.ends_with(' ') && !spaceless {
                    out.push(' ');
                }
            }
            out.push_str(&run.text);
            prev_end = Some(run.bbox.x1);
        }
        out
    }
}

/// A segmented visual block.
#[derive(Debug, Clone)]
pub struct Block {
    /// Block kind
    pub kind: BlockKind,
    /// Text lines in reading order (empty for image blocks)
    pub lines: Vec<Line>,
    /// Rules enclosing a grid block (empty otherwise)
    pub rules: Vec<RuleSegment>,
    /// The placed image for image blocks
    pub image: Option<ImageRef>,
    /// Bounding box over everything in the block
    pub bbox: BBox,
}

impl Block {
    fn from_lines(lines: Vec<Line>) -> Self {
        let bbox = lines
            .iter()
            .map(|l| l.bbox())
            .reduce(|a, b| a.union(&b))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        Self {
            kind: BlockKind::Text,
            lines,
            rules: Vec::new(),
            image: None,
            bbox,
        }
    }

    fn grid(lines: Vec<Line>, rules: Vec<RuleSegment>, bbox: BBox) -> Self {
        Self {
            kind: BlockKind::Grid,
            lines,
            rules,
            image: None,
            bbox,
        }
    }

    fn from_image(image: ImageRef) -> Self {
        let bbox = image.bbox;
        Self {
            kind: BlockKind::Image,
            lines: Vec::new(),
            rules: Vec::new(),
            image: Some(image),
            bbox,
        }
    }

    /// All text runs in the block, line order.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.lines.iter().flat_map(|l| l.runs.iter())
    }

    /// Line texts paired with each line's left edge.
    pub fn line_texts(&self) -> Vec<(String, f32)> {
        self.lines.iter().map(|l| (l.text(), l.x())).collect()
    }

    /// Dominant font size over the block, weighted by character count.
    pub fn dominant_font_size(&self) -> f32 {
        let mut best = (0usize, 0.0f32);
        for run in self.runs() {
            let chars = run.text.chars().count();
            if chars > best.0 {
                best = (chars, run.font.size);
            }
        }
        best.1
    }

    /// Whether the majority of the block's characters are bold.
    pub fn dominant_bold(&self) -> bool {
        let (bold, total) = self.runs().fold((0usize, 0usize), |(b, t), run| {
            let chars = run.text.chars().count();
            (b + if run.font.bold { chars } else { 0 }, t + chars)
        });
        total > 0 && bold * 2 > total
    }

    fn has_text(&self) -> bool {
        self.runs().any(|r| !r.text.trim().is_empty())
    }
}

/// Groups page primitives into blocks.
pub struct BlockSegmenter {
    config: SegmenterConfig,
}

impl BlockSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segment a page's primitives into ordered blocks.
    ///
    /// An empty primitive list yields no blocks.
    pub fn segment(&self, primitives: Vec<Primitive>) -> Vec<Block> {
        let mut runs = Vec::new();
        let mut rules = Vec::new();
        let mut images = Vec::new();
        for primitive in primitives {
            match primitive {
                Primitive::Text(run) => {
                    if !run.text.trim().is_empty() {
                        runs.push(run);
                    }
                }
                Primitive::Rule(rule) => rules.push(rule),
                Primitive::Image(image) => images.push(image),
            }
        }

        let mut blocks = Vec::new();

        // Rule grids claim their enclosed text before line flow runs.
        let (grid_regions, loose_rules) = cluster_grids(rules);
        let mut flow_runs = Vec::new();
        let mut grid_runs: Vec<Vec<TextRun>> = vec![Vec::new(); grid_regions.len()];
        'run: for run in runs {
            let center = run.bbox.center_x();
            let middle = run.bbox.center_y();
            for (i, region) in grid_regions.iter().enumerate() {
                if region.bbox.contains(center, middle) {
                    grid_runs[i].push(run);
                    continue 'run;
                }
            }
            flow_runs.push(run);
        }

        for (region, runs) in grid_regions.into_iter().zip(grid_runs) {
            let lines = group_lines(runs, self.config.y_tolerance_factor);
            blocks.push(Block::grid(lines, region.rules, region.bbox));
        }

        for image in images {
            blocks.push(Block::from_image(image));
        }

        let separators: Vec<f32> = loose_rules
            .iter()
            .filter(|r| {
                r.orientation == Orientation::Horizontal && r.bbox.width() >= SEPARATOR_MIN_WIDTH
            })
            .map(|r| r.bbox.center_y())
            .collect();

        let lines = group_lines(flow_runs, self.config.y_tolerance_factor);
        blocks.extend(self.flow_blocks(lines, &separators));

        blocks.retain(|b| b.kind == BlockKind::Image || b.has_text());

        blocks.sort_by(|a, b| {
            b.bbox
                .y1
                .partial_cmp(&a.bbox.y1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.bbox
                        .x0
                        .partial_cmp(&b.bbox.x0)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });
        blocks
    }

    /// Split ordered lines into blocks at vertical gaps, margin shifts, font
    /// changes, and separator rules.
    fn flow_blocks(&self, lines: Vec<Line>, separators: &[f32]) -> Vec<Block> {
        let mut blocks = Vec::new();
        if lines.is_empty() {
            return blocks;
        }

        let heights: Vec<f32> = lines.iter().map(|l| l.font_size()).collect();
        let median_height = median(&heights).max(1.0);

        let mut current: Vec<Line> = Vec::new();
        for line in lines {
            if let Some(prev) = current.last() {
                if self.should_break(prev, &line, median_height, separators) {
                    blocks.push(Block::from_lines(std::mem::take(&mut current)));
                }
            }
            current.push(line);
        }
        if !current.is_empty() {
            blocks.push(Block::from_lines(current));
        }
        blocks
    }

    fn should_break(
        &self,
        prev: &Line,
        next: &Line,
        median_height: f32,
        separators: &[f32],
    ) -> bool {
        let gap = prev.y - next.y;
        let threshold = median_height.max(prev.font_size()) * self.config.gap_factor;
        if gap > threshold {
            return true;
        }

        if (next.x() - prev.x()).abs() > self.config.margin_tolerance {
            return true;
        }

        if (next.font_size() - prev.font_size()).abs() > self.config.font_shift {
            return true;
        }

        separators
            .iter()
            .any(|&y| y < prev.y && y > next.y)
    }
}

/// Group runs into lines by baseline proximity, returning lines top-down.
fn group_lines(mut runs: Vec<TextRun>, y_tolerance_factor: f32) -> Vec<Line> {
    runs.sort_by(|a, b| {
        b.y()
            .partial_cmp(&a.y())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut lines: Vec<Line> = Vec::new();
    for run in runs {
        let tolerance = run.font.size.max(1.0) * y_tolerance_factor;
        match lines
            .iter_mut()
            .find(|line| (line.y - run.y()).abs() <= tolerance)
        {
            Some(line) => line.push(run),
            None => lines.push(Line::new(run)),
        }
    }

    for line in &mut lines {
        line.finish();
    }
    lines.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal));
    lines
}

/// A connected component of crossing rules that forms a table-like grid.
struct GridRegion {
    rules: Vec<RuleSegment>,
    bbox: BBox,
}

/// Cluster rules into connected components; components with at least two
/// horizontal and two vertical crossing members become grid regions, the
/// rest are returned as loose rules.
fn cluster_grids(rules: Vec<RuleSegment>) -> (Vec<GridRegion>, Vec<RuleSegment>) {
    let n = rules.len();
    let mut component: Vec<usize> = (0..n).collect();

    fn find(component: &mut Vec<usize>, i: usize) -> usize {
        let mut root = i;
        while component[root] != root {
            root = component[root];
        }
        let mut cur = i;
        while component[cur] != root {
            let next = component[cur];
            component[cur] = root;
            cur = next;
        }
        root
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let a = expand(&rules[i].bbox, RULE_JOIN_TOLERANCE);
            let b = expand(&rules[j].bbox, RULE_JOIN_TOLERANCE);
            if a.intersects(&b) {
                let ri = find(&mut component, i);
                let rj = find(&mut component, j);
                component[ri] = rj;
            }
        }
    }

    let mut groups: std::collections::HashMap<usize, Vec<RuleSegment>> =
        std::collections::HashMap::new();
    for (i, rule) in rules.into_iter().enumerate() {
        let root = find(&mut component, i);
        groups.entry(root).or_default().push(rule);
    }

    let mut regions = Vec::new();
    let mut loose = Vec::new();
    for (_, members) in groups {
        let horizontal = members
            .iter()
            .filter(|r| r.orientation == Orientation::Horizontal)
            .count();
        let vertical = members.len() - horizontal;
        let crossing = members.iter().enumerate().any(|(i, a)| {
            members
                .iter()
                .skip(i + 1)
                .any(|b| a.intersects_rule(b))
        });

        if horizontal >= 2 && vertical >= 2 && crossing {
            let bbox = members
                .iter()
                .map(|r| r.bbox)
                .reduce(|a, b| a.union(&b))
                .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
            regions.push(GridRegion {
                rules: members,
                bbox,
            });
        } else {
            loose.extend(members);
        }
    }

    (regions, loose)
}

fn expand(bbox: &BBox, by: f32) -> BBox {
    BBox {
        x0: bbox.x0 - by,
        y0: bbox.y0 - by,
        x1: bbox.x1 + by,
        y1: bbox.y1 + by,
    }
}

fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted[sorted.len() / 2]
}

fn is_spaceless_script(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'   // Hiragana/Katakana
        | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
        | '\u{AC00}'..='\u{D7AF}' // Hangul Syllables
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FontInfo;

    fn text(t: &str, x: f32, y: f32, size: f32) -> Primitive {
        let width = t.chars().count() as f32 * size * 0.5;
        Primitive::Text(TextRun::new(t.to_string(), x, y, width, FontInfo::new(size, "Helvetica")))
    }

    fn segmenter() -> BlockSegmenter {
        BlockSegmenter::new(SegmenterConfig::default())
    }

    #[test]
    fn test_empty_page() {
        assert!(segmenter().segment(vec![]).is_empty());
    }

    #[test]
    fn test_whitespace_only_discarded() {
        let blocks = segmenter().segment(vec![text("   ", 72.0, 700.0, 10.0)]);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_adjacent_lines_one_block() {
        let blocks = segmenter().segment(vec![
            text("first line of text", 72.0, 700.0, 10.0),
            text("second line of text", 72.0, 688.0, 10.0),
        ]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 2);
    }

    #[test]
    fn test_large_gap_splits_blocks() {
        let blocks = segmenter().segment(vec![
            text("first paragraph", 72.0, 700.0, 10.0),
            text("second paragraph", 72.0, 620.0, 10.0),
        ]);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_font_change_splits_blocks() {
        let blocks = segmenter().segment(vec![
            text("Heading", 72.0, 700.0, 16.0),
            text("body follows on the next line", 72.0, 686.0, 10.0),
        ]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].dominant_font_size(), 16.0);
    }

    #[test]
    fn test_margin_shift_splits_blocks() {
        let blocks = segmenter().segment(vec![
            text("left column text here", 72.0, 700.0, 10.0),
            text("indented quotation text", 140.0, 688.0, 10.0),
        ]);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_runs_on_same_baseline_join() {
        let blocks = segmenter().segment(vec![
            text("Hello", 72.0, 700.0, 10.0),
            text("world", 110.0, 700.5, 10.0),
        ]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[0].lines[0].text(), "Hello world");
    }

    #[test]
    fn test_image_becomes_block() {
        let blocks = segmenter().segment(vec![Primitive::Image(ImageRef {
            bbox: BBox::new(100.0, 400.0, 300.0, 550.0),
            name: "Im1".to_string(),
        })]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Image);
    }

    #[test]
    fn test_rule_grid_claims_text() {
        // 3x3 grid of rules around two rows of two cells.
        let mut primitives = vec![
            Primitive::Rule(RuleSegment::from_points(100.0, 600.0, 300.0, 600.0)),
            Primitive::Rule(RuleSegment::from_points(100.0, 570.0, 300.0, 570.0)),
            Primitive::Rule(RuleSegment::from_points(100.0, 540.0, 300.0, 540.0)),
            Primitive::Rule(RuleSegment::from_points(100.0, 540.0, 100.0, 600.0)),
            Primitive::Rule(RuleSegment::from_points(200.0, 540.0, 200.0, 600.0)),
            Primitive::Rule(RuleSegment::from_points(300.0, 540.0, 300.0, 600.0)),
        ];
        primitives.push(text("a", 110.0, 580.0, 10.0));
        primitives.push(text("b", 210.0, 580.0, 10.0));
        primitives.push(text("c", 110.0, 550.0, 10.0));
        primitives.push(text("d", 210.0, 550.0, 10.0));
        primitives.push(text("outside the grid entirely", 100.0, 700.0, 10.0));

        let blocks = segmenter().segment(primitives);
        let grid: Vec<_> = blocks.iter().filter(|b| b.kind == BlockKind::Grid).collect();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].lines.len(), 2);
        assert_eq!(grid[0].rules.len(), 6);

        let flow: Vec<_> = blocks.iter().filter(|b| b.kind == BlockKind::Text).collect();
        assert_eq!(flow.len(), 1);
    }

    #[test]
    fn test_reading_order() {
        let blocks = segmenter().segment(vec![
            text("bottom paragraph", 72.0, 100.0, 10.0),
            text("top paragraph", 72.0, 700.0, 10.0),
        ]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines[0].text(), "top paragraph");
        assert_eq!(blocks[1].lines[0].text(), "bottom paragraph");
    }

    #[test]
    fn test_separator_rule_splits_blocks() {
        let blocks = segmenter().segment(vec![
            text("above the rule line", 72.0, 700.0, 10.0),
            Primitive::Rule(RuleSegment::from_points(72.0, 694.0, 400.0, 694.0)),
            text("below the rule line", 72.0, 688.0, 10.0),
        ]);
        assert_eq!(blocks.len(), 2);
    }
}
