//! Benchmarks for the analysis pipeline on synthetic pages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pdftree::analyze::{AnalyzeOptions, DocumentAnalyzer};
use pdftree::extract::{FontInfo, Primitive, PrimitiveSource, TextRun};
use pdftree::Result;

struct SyntheticSource {
    pages: Vec<Vec<Primitive>>,
}

impl PrimitiveSource for SyntheticSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_page(&self, index: usize) -> Result<Vec<Primitive>> {
        Ok(self.pages[index].clone())
    }

    fn source_name(&self) -> &str {
        "synthetic.pdf"
    }
}

fn text(t: &str, x: f32, y: f32, size: f32) -> Primitive {
    let width = t.chars().count() as f32 * size * 0.5;
    Primitive::Text(TextRun::new(
        t.to_string(),
        x,
        y,
        width,
        FontInfo::new(size, "Helvetica"),
    ))
}

/// A dense page: a heading, forty body lines, and a ten-row table.
fn synthetic_page() -> Vec<Primitive> {
    let mut primitives = vec![text("Section Heading", 72.0, 760.0, 16.0)];
    let mut y = 730.0;
    for i in 0..40 {
        primitives.push(text(
            &format!("Body line {} with enough words to look like prose.", i),
            72.0,
            y,
            10.0,
        ));
        y -= 12.0;
    }
    y -= 30.0;
    for i in 0..10 {
        primitives.push(text(&format!("row{}", i), 72.0, y, 10.0));
        primitives.push(text(&format!("{}", i * 100), 220.0, y, 10.0));
        primitives.push(text(&format!("{:.2}", i as f32 * 1.5), 360.0, y, 10.0));
        y -= 12.0;
    }
    primitives
}

fn bench_single_page(c: &mut Criterion) {
    let source = SyntheticSource {
        pages: vec![synthetic_page()],
    };
    let analyzer = DocumentAnalyzer::with_options(AnalyzeOptions::default().sequential());

    c.bench_function("analyze_single_page", |b| {
        b.iter(|| analyzer.analyze(black_box(&source)).unwrap())
    });
}

fn bench_multi_page(c: &mut Criterion) {
    let source = SyntheticSource {
        pages: (0..20).map(|_| synthetic_page()).collect(),
    };
    let sequential = DocumentAnalyzer::with_options(AnalyzeOptions::default().sequential());
    let parallel = DocumentAnalyzer::with_options(AnalyzeOptions::default());

    let mut group = c.benchmark_group("analyze_20_pages");
    group.bench_function("sequential", |b| {
        b.iter(|| sequential.analyze(black_box(&source)).unwrap())
    });
    group.bench_function("parallel", |b| {
        b.iter(|| parallel.analyze(black_box(&source)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_single_page, bench_multi_page);
criterion_main!(benches);
