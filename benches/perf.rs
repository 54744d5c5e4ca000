use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use betmind_terminal::demo_analyst::DemoAnalyst;
use betmind_terminal::gemini::parse_generate_content;
use betmind_terminal::normalize::{normalize, strip_trailing_commas};
use betmind_terminal::orchestrator::MatchAnalyst;
use betmind_terminal::view::sections;
use betmind_terminal::report::ViewMode;

const ENVELOPE: &str = include_str!("../tests/fixtures/gemini_generate_content.json");

fn bench_normalize(c: &mut Criterion) {
    let reply = DemoAnalyst::with_latency(Duration::ZERO)
        .analyze("Flamengo vs Palmeiras")
        .expect("demo reply");

    c.bench_function("normalize_demo_reply", |b| {
        b.iter(|| {
            let result = normalize(black_box(&reply.text), black_box(&reply.citations)).unwrap();
            black_box(result.probabilities.win_a);
        })
    });

    c.bench_function("strip_trailing_commas", |b| {
        b.iter(|| {
            let repaired = strip_trailing_commas(black_box(&reply.text));
            black_box(repaired.len());
        })
    });
}

fn bench_envelope(c: &mut Criterion) {
    c.bench_function("gemini_envelope_to_sections", |b| {
        b.iter(|| {
            let reply = parse_generate_content(black_box(ENVELOPE)).unwrap();
            let result = normalize(&reply.text, &reply.citations).unwrap();
            black_box(sections(&result, ViewMode::Dashboard).len());
        })
    });
}

criterion_group!(benches, bench_normalize, bench_envelope);
criterion_main!(benches);
