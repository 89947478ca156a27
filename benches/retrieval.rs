use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use resume_analyzer::{ChunkConfig, Passage, chunk_text, rank};

const DIM: usize = 384;

fn sample_resume(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            let sentence = format!(
                "Designed and shipped service {i} in Rust with tokio and axum, cutting p99 latency. "
            );
            if i % 3 == 0 {
                format!("Section {i}")
            } else {
                sentence.repeat(5)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Deterministic pseudo-random vector; quality does not matter for timing.
fn vector(seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..DIM)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 40) as f32 / (1u64 << 24) as f32) - 0.5
        })
        .collect()
}

fn bench_chunking(c: &mut Criterion) {
    let cfg = ChunkConfig::default();
    let mut group = c.benchmark_group("chunk_text");
    for &paragraphs in &[10usize, 100, 1000] {
        let text = sample_resume(paragraphs);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &text, |b, text| {
            b.iter(|| chunk_text(black_box(text), black_box(&cfg)));
        });
    }
    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let query = vector(0);
    let mut group = c.benchmark_group("rank");
    for &count in &[5usize, 50, 500] {
        let passages: Vec<Passage> = (1..=count as u64)
            .map(|i| Passage::embedded(format!("passage {i}"), vector(i)))
            .collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &passages, |b, passages| {
            b.iter(|| rank(black_box(&query), black_box(passages), 3));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chunking, bench_ranking);
criterion_main!(benches);
