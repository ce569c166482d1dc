//! Benchmarks for span building, quality checks and rendering.
//!
//! Run with: cargo bench
//!
//! Pages are synthetic engine records, so no PDF file is needed.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdflines::parser::{
    build_page_lines, classify, FontDescriptor, PageRecord, RawBlock, RawLine, RawSpan,
};
use pdflines::render::{page_markup, render_span};
use pdflines::ContentQualityGate;

const WORDS: &[&str] = &[
    "lorem",
    "ipsum-\n",
    "dolor",
    "sit",
    "amet\n",
    "<consectetur>",
    "&",
    "elit",
];

/// Creates a synthetic page with the given number of lines.
fn create_record(line_count: usize) -> PageRecord {
    let fonts = [("Times", 34), ("Times-Bold", 34), ("CMMI10", 68), ("Times-Italic", 98)];
    let mut offset = 0;
    let lines = (0..line_count)
        .map(|i| {
            let spans = (0..6)
                .map(|j| {
                    let text = WORDS[(i + j) % WORDS.len()].to_string();
                    let (name, flags) = fonts[(i * 7 + j) % fonts.len()];
                    let len = text.chars().count();
                    let span = RawSpan {
                        bbox: [
                            72.0 + j as f32 * 60.0,
                            72.0 + i as f32 * 14.0,
                            128.0 + j as f32 * 60.0,
                            84.0 + i as f32 * 14.0,
                        ],
                        text,
                        font: FontDescriptor {
                            name: name.to_string(),
                            flags,
                            weight: 400.0,
                            size: 12.0,
                        },
                        char_start_idx: offset,
                        char_end_idx: offset + len - 1,
                    };
                    offset += len + 1;
                    span
                })
                .collect();
            RawLine {
                bbox: [72.0, 72.0 + i as f32 * 14.0, 540.0, 84.0 + i as f32 * 14.0],
                spans,
            }
        })
        .collect();

    PageRecord {
        page: 0,
        bbox: [0.0, 0.0, 612.0, 792.0],
        blocks: vec![RawBlock {
            bbox: [72.0, 72.0, 540.0, 720.0],
            lines,
        }],
    }
}

fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| {
            for flags in [0u32, 4, 32, 34, 68, 262_178, u32::MAX] {
                black_box(classify(black_box(flags), black_box("ABCDEF+Times-BoldItalic")));
            }
        })
    });
}

fn bench_build_and_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_page_lines");
    let gate = ContentQualityGate::default();

    for lines in [10, 50, 200] {
        let record = create_record(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &record, |b, record| {
            b.iter(|| {
                let page = build_page_lines(black_box(record));
                black_box(gate.accept(&page.spans))
            })
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let page = build_page_lines(&create_record(50));
    let first = page.spans.iter().flatten().next().cloned();

    if let Some(span) = first {
        c.bench_function("render_span", |b| {
            b.iter(|| black_box(render_span(black_box(&span))))
        });
    }
    c.bench_function("page_markup_50_lines", |b| {
        b.iter(|| black_box(page_markup(black_box(&page))))
    });
}

criterion_group!(benches, bench_classify, bench_build_and_gate, bench_render);
criterion_main!(benches);
