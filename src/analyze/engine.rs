//! The analysis engine: drives extraction, segmentation, classification,
//! section tracking, and assembly for a whole document.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::Result;
use crate::extract::{Primitive, PrimitiveSource};
use crate::model::{ContentItem, StructuredDocument};

use super::assemble::DocumentBuilder;
use super::classify::{BlockClass, ContentClassifier};
use super::fonts::FontProfile;
use super::normalize::TextNormalizer;
use super::options::AnalyzeOptions;
use super::section::SectionTracker;
use super::segment::{Block, BlockSegmenter};
use super::table::{TableOutcome, TableReconstructor};

/// Maximum vertical distance (points) between an image and the paragraph
/// below it for the paragraph to be used as the chart's caption.
const CAPTION_PROXIMITY: f32 = 50.0;

/// Maximum caption length carried into a chart description.
const CAPTION_SNIPPET_CHARS: usize = 100;

/// Analyzes a primitive source into a structured document.
///
/// Page extraction may run in parallel; classification and section tracking
/// are strictly sequential in page order, because the section context of an
/// item depends on every heading before it.
pub struct DocumentAnalyzer {
    options: AnalyzeOptions,
    segmenter: BlockSegmenter,
    classifier: ContentClassifier,
    reconstructor: TableReconstructor,
    normalizer: TextNormalizer,
}

impl DocumentAnalyzer {
    /// Create an analyzer with default options.
    pub fn new() -> Self {
        Self::with_options(AnalyzeOptions::default())
    }

    /// Create an analyzer with the given options.
    pub fn with_options(options: AnalyzeOptions) -> Self {
        Self {
            segmenter: BlockSegmenter::new(options.segmenter.clone()),
            classifier: ContentClassifier::new(options.table.clone(), options.heading.clone()),
            reconstructor: TableReconstructor::new(options.table.clone()),
            normalizer: TextNormalizer::new(),
            options,
        }
    }

    /// Analyze every page of the source into a structured document.
    ///
    /// A page whose extraction fails recoverably is logged and substituted
    /// with an empty page; fatal errors abort the run.
    pub fn analyze<S: PrimitiveSource + ?Sized>(&self, source: &S) -> Result<StructuredDocument> {
        let total = source.page_count();
        let pages = if self.options.max_pages > 0 {
            total.min(self.options.max_pages)
        } else {
            total
        };
        if pages < total {
            warn!(
                "processing {} of {} pages (page limit in effect)",
                pages, total
            );
        }
        info!("analyzing '{}': {} pages", source.source_name(), pages);

        let extracted = self.extract_pages(source, pages)?;

        // Segment everything first so the font profile sees the whole
        // document before any heading decision is made.
        let page_blocks: Vec<Vec<Block>> = extracted
            .into_iter()
            .map(|primitives| self.segmenter.segment(primitives))
            .collect();

        let mut profile = FontProfile::new();
        for block in page_blocks.iter().flatten() {
            for run in block.runs() {
                profile.add_run(run);
            }
        }
        profile.analyze(self.options.heading.size_delta);
        debug!(
            "font profile: body {:.1}pt, {} heading sizes",
            profile.body_size(),
            profile.heading_sizes().len()
        );

        let mut builder = DocumentBuilder::new(source.source_name());
        let mut tracker = SectionTracker::new();
        let mut chart_counter = 0u32;

        for (index, blocks) in page_blocks.into_iter().enumerate() {
            let page = (index + 1) as u32;
            let items =
                self.page_items(page, blocks, &profile, &mut tracker, &mut chart_counter);
            builder.push_page(page, items)?;
        }

        let document = builder.finish();
        info!(
            "extracted {} items from {} pages",
            document.content.len(),
            document.page_count()
        );
        Ok(document)
    }

    /// Extract primitives for every page, substituting empty pages for
    /// recoverable failures.
    fn extract_pages<S: PrimitiveSource + ?Sized>(
        &self,
        source: &S,
        pages: usize,
    ) -> Result<Vec<Vec<Primitive>>> {
        let results: Vec<Result<Vec<Primitive>>> = if self.options.parallel {
            (0..pages)
                .into_par_iter()
                .map(|index| source.extract_page(index))
                .collect()
        } else {
            (0..pages).map(|index| source.extract_page(index)).collect()
        };

        let mut extracted = Vec::with_capacity(pages);
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(primitives) => extracted.push(primitives),
                Err(err) if err.is_page_recoverable() => {
                    warn!("page {}: extraction failed: {}", index + 1, err);
                    extracted.push(Vec::new());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(extracted)
    }

    /// Classify one page's blocks into content items, in reading order.
    fn page_items(
        &self,
        page: u32,
        blocks: Vec<Block>,
        profile: &FontProfile,
        tracker: &mut SectionTracker,
        chart_counter: &mut u32,
    ) -> Vec<ContentItem> {
        let mut items = Vec::new();

        for (i, block) in blocks.iter().enumerate() {
            // Headings are resolved before classification: a heading is
            // emitted as a paragraph under the context that was active when
            // it appeared, then opens its own context.
            if let Some(rank) = self.classifier.heading_rank(block, profile) {
                let title = self.normalizer.join_lines(&block.line_texts());
                if !title.is_empty() {
                    let (section, subsection) = tracker.current();
                    items.push(ContentItem::Paragraph {
                        page,
                        section,
                        subsection,
                        text: title.clone(),
                    });
                    tracker.observe_heading(rank, title);
                }
                continue;
            }

            let (section, subsection) = tracker.current();
            match self.classifier.classify(block) {
                BlockClass::Paragraph => {
                    let text = self.normalizer.join_lines(&block.line_texts());
                    if text.chars().count() >= self.options.min_paragraph_chars {
                        items.push(ContentItem::Paragraph {
                            page,
                            section,
                            subsection,
                            text,
                        });
                    }
                }
                BlockClass::Table => match self.reconstructor.reconstruct(block) {
                    TableOutcome::Table(rows) => {
                        items.push(ContentItem::Table {
                            page,
                            section,
                            subsection,
                            rows,
                        });
                    }
                    TableOutcome::Degenerate(text) => {
                        debug!("page {}: tabular block collapsed to a single cell", page);
                        if text.chars().count() >= self.options.min_paragraph_chars {
                            items.push(ContentItem::Paragraph {
                                page,
                                section,
                                subsection,
                                text,
                            });
                        }
                    }
                },
                BlockClass::Chart => {
                    *chart_counter += 1;
                    let description = self.chart_description(
                        *chart_counter,
                        block,
                        blocks.get(i + 1),
                    );
                    items.push(ContentItem::Chart {
                        page,
                        section,
                        subsection,
                        description,
                    });
                }
            }
        }

        items
    }

    /// Build a chart description, borrowing the caption paragraph directly
    /// below the image when one is close enough.
    fn chart_description(&self, number: u32, chart: &Block, next: Option<&Block>) -> String {
        let caption = next.and_then(|block| {
            if block.lines.is_empty() {
                return None;
            }
            let gap = chart.bbox.y0 - block.bbox.y1;
            if gap >= 0.0 && gap <= CAPTION_PROXIMITY {
                let text = self.normalizer.join_lines(&block.line_texts());
                if text.is_empty() {
                    None
                } else {
                    Some(text.chars().take(CAPTION_SNIPPET_CHARS).collect::<String>())
                }
            } else {
                None
            }
        });

        match caption {
            Some(caption) => format!("Chart/Image {} - {}", number, caption),
            None => format!("Chart/Image {}", number),
        }
    }
}

impl Default for DocumentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
