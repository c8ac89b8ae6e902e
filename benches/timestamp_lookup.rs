//! Benchmark for repeated tick to timestamp lookups and whole chart parsing.

use chart_rs::prelude::*;
use criterion::{Criterion, Throughput};

fn sync_track(tempo_changes: i64) -> SyncTrack {
    let tempos = (0..tempo_changes).map(|i| RawTempo {
        tick: i * 480,
        bpm: 90.0 + (i % 7) as f64 * 15.0,
    });
    SyncTrack::new(
        Resolution::STANDARD,
        tempos,
        [RawTimeSignature {
            tick: 0,
            numerator: 4,
            denominator: 4,
        }],
        &ChartConfig::default(),
    )
    .expect("benchmark tempo map must be valid")
}

fn bench_timestamp_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp_lookup");
    let queries: Vec<Tick> = (0..10_000u64).map(|i| Tick(i * 97 % 480_000)).collect();
    group.throughput(Throughput::Elements(queries.len() as u64));

    for tempo_changes in [1, 100, 1000] {
        let track = sync_track(tempo_changes);
        group.bench_function(format!("{tempo_changes}_tempos"), |b| {
            b.iter(|| {
                for &tick in &queries {
                    std::hint::black_box(track.timestamp_at_tick(std::hint::black_box(tick)));
                }
            });
        });
    }

    group.finish();
}

fn bench_parse_chart(c: &mut Criterion) {
    let source = include_str!("../tests/files/sample.chart");
    let mut group = c.benchmark_group("parse_chart");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("sample", |b| {
        b.iter(|| parse_chart(std::hint::black_box(source), &ChartConfig::default()));
    });
    group.finish();
}

fn main() {
    let mut criterion = Criterion::default();
    bench_timestamp_lookup(&mut criterion);
    bench_parse_chart(&mut criterion);
}
