use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use vellum_core::font::Helvetica;
use vellum_core::placement::LabelPlacer;
use vellum_core::text::WordDiff;

#[derive(Clone)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn gen_f64(&mut self, min: f64, max: f64) -> f64 {
        let n = self.next_u64() as f64 / u64::MAX as f64;
        min + (max - min) * n
    }
}

/// Word diffs spread over `lines` text lines of a letter-size page. Many land
/// close together so the collision path is exercised.
fn generate_diffs(seed: u64, count: usize, lines: usize) -> Vec<WordDiff> {
    let mut rng = XorShift64::new(seed);
    (0..count)
        .map(|i| {
            let line = (rng.next_u64() as usize) % lines;
            let y = 72.0 + line as f64 * 14.0;
            let x = rng.gen_f64(36.0, 540.0);
            let bbox = (x, y, x + rng.gen_f64(12.0, 60.0), y + 10.0);
            let text = format!("word{i}");
            if i % 2 == 0 {
                WordDiff::added(text, bbox)
            } else {
                WordDiff::removed(text, bbox)
            }
        })
        .collect()
}

fn bench_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement_place");
    for &n in &[50usize, 500, 5000] {
        let diffs = generate_diffs(0x5eed ^ n as u64, n, 48);
        let placer = LabelPlacer::new(&Helvetica, 8.0, 2.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("helvetica", n), &diffs, |b, diffs| {
            b.iter(|| {
                let labels = placer.place(diffs);
                black_box(labels.len());
            })
        });
    }
    group.finish();
}

fn bench_dense_line(c: &mut Criterion) {
    // Every diff on the same line: the worst case for marker insertion.
    let diffs = generate_diffs(42, 1000, 1);
    let placer = LabelPlacer::new(&Helvetica, 8.0, 2.0);
    c.bench_function("placement_dense_line", |b| {
        b.iter(|| black_box(placer.place(black_box(&diffs))))
    });
}

criterion_group!(placement_benches, bench_place, bench_dense_line);
criterion_main!(placement_benches);
