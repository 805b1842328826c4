//! Performance benchmarks for inkpress
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use inkpress::{Arena, BlockParser, Document, ParserConfig, Session};

/// Sample Markdown documents of various sizes
mod samples {
    pub const TINY: &str = "Hello, world!";

    pub const SMALL: &str = r#"# Heading

This is a paragraph line.

- Item 1
- Item 2
- Item 3
"#;

    pub const MEDIUM: &str = r#"---
title: Project README
tags: [rust, markdown]
---

# Project README

This is a sample README file.

## Features

- Fast parsing
- Pointer-stable arena
- Single-pass rendering

### Code Example

```rust
fn main() {
    println!("Hello, world!");
}
```

## Steps

1. Parse
2. Render
3. Drop the session

Thank you for reading!
"#;

    /// Generate a large document by repeating sections
    pub fn large() -> String {
        let section = r#"
## Section Title

A paragraph line with <b>inline html</b> passed through.
Another paragraph line.

- First bullet point
- Second bullet point
- Third point

```rust
fn example() {
    let x = 42;
    println!("{}", x);
}
```

1. ordered
2. items

"#;
        section.repeat(50)
    }

    /// Alternating list kinds: every line opens and closes a list
    pub fn alternating_lists() -> String {
        "- a\n1. b\n".repeat(2000)
    }

    /// An unterminated fence near the top forces a full lookahead scan
    pub fn unterminated_fence() -> String {
        "```\n".to_owned() + &"line of text\n".repeat(5000)
    }
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    for (name, input) in [
        ("tiny", samples::TINY),
        ("small", samples::SMALL),
        ("medium", samples::MEDIUM),
    ] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(name, |b| b.iter(|| inkpress::to_html(black_box(input))));
    }

    let large = samples::large();
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("large", |b| {
        b.iter(|| inkpress::to_html(black_box(&large)))
    });

    group.finish();
}

fn bench_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("phases");
    let large = samples::large();
    group.throughput(Throughput::Bytes(large.len() as u64));

    group.bench_function("parse_only", |b| {
        b.iter(|| {
            let mut arena = Arena::with_capacity_for(large.len());
            let mut doc = Document::new();
            BlockParser::new(black_box(&large))
                .parse(&mut arena, &mut doc)
                .map(|_| doc.len())
        })
    });

    let mut session = Session::new(ParserConfig::default());
    if session.parse(&large).is_ok() {
        group.bench_function("render_only", |b| b.iter(|| black_box(&session).render()));
    }

    group.finish();
}

fn bench_arena(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena");
    let line = "a typical paragraph line of moderate length";

    for chunk_size in [64usize, 4096, 65536] {
        group.bench_with_input(
            BenchmarkId::new("alloc_str", chunk_size),
            &chunk_size,
            |b, &size| {
                b.iter(|| {
                    let mut arena = Arena::with_chunk_size(size);
                    for _ in 0..1000 {
                        let _ = arena.alloc_str(black_box(line));
                    }
                    arena.stats()
                })
            },
        );
    }

    group.finish();
}

fn bench_escaping(c: &mut Criterion) {
    let mut group = c.benchmark_group("escaping");

    // Plain text (no escaping needed)
    let plain = "Hello, this is plain text without any special characters. ".repeat(100);
    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("plain_text", |b| {
        b.iter(|| inkpress::escape_html(black_box(&plain)))
    });

    // Text with HTML that needs escaping
    let html_heavy = "<script>alert('xss')</script> & more <tags> here! ".repeat(100);
    group.throughput(Throughput::Bytes(html_heavy.len() as u64));
    group.bench_function("html_heavy", |b| {
        b.iter(|| inkpress::escape_html(black_box(&html_heavy)))
    });

    group.bench_function("sanitize", |b| {
        b.iter(|| {
            let mut html = html_heavy.clone();
            inkpress::sanitize_html(black_box(&mut html));
            html
        })
    });

    group.bench_function("url_encode", |b| {
        b.iter(|| inkpress::escape::url_encode(black_box(&html_heavy), usize::MAX))
    });

    group.finish();
}

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological");
    group.sample_size(20); // Fewer samples for slow cases

    let lists = samples::alternating_lists();
    group.throughput(Throughput::Bytes(lists.len() as u64));
    group.bench_function("alternating_lists", |b| {
        b.iter(|| inkpress::to_html(black_box(&lists)))
    });

    let fence = samples::unterminated_fence();
    group.throughput(Throughput::Bytes(fence.len() as u64));
    group.bench_function("unterminated_fence", |b| {
        b.iter(|| inkpress::to_html(black_box(&fence)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_phases,
    bench_arena,
    bench_escaping,
    bench_pathological
);
criterion_main!(benches);
