// Criterion comparison of the four call-convention batches

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use memspeed::call_timer::{pass_by_ref, pass_by_value, LargeRecord, SmallRecord};

fn benchmark_conventions(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_convention");

    let large = LargeRecord::new();
    let small = SmallRecord::new();

    group.bench_with_input(BenchmarkId::new("by_value", "64KiB"), &large, |b, record| {
        b.iter(|| pass_by_value(black_box(*record)))
    });

    group.bench_with_input(BenchmarkId::new("by_ref", "64KiB"), &large, |b, record| {
        b.iter(|| pass_by_ref(black_box(record)))
    });

    group.bench_with_input(BenchmarkId::new("by_value", "1B"), &small, |b, record| {
        b.iter(|| pass_by_value(black_box(*record)))
    });

    group.bench_with_input(BenchmarkId::new("by_ref", "1B"), &small, |b, record| {
        b.iter(|| pass_by_ref(black_box(record)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_conventions);
criterion_main!(benches);
