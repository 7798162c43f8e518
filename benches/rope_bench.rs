use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use lite::rope::Rope;
use std::hint::black_box;

fn rope_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("rope_insert");
    static CHUNK: &str = "The quick brown fox jumps over the lazy dog. ";
    group.throughput(Throughput::Bytes(CHUNK.len() as u64));

    group.bench_function("append_chunk_to_1kb", |b| {
        b.iter_batched(
            || Rope::new(&vec![b'x'; 1024]),
            |rope| black_box(rope.insert(1024, CHUNK.as_bytes())),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("insert_chunk_at_midpoint_of_64kb", |b| {
        b.iter_batched(
            || Rope::new(&vec![b'x'; 64 * 1024]),
            |rope| black_box(rope.insert(32 * 1024, CHUNK.as_bytes())),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn rope_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("rope_slice");
    let rope = Rope::new(&vec![b'a'; 256 * 1024]);

    group.bench_function("slice_middle_1kb_of_256kb", |b| {
        b.iter(|| black_box(rope.slice(128 * 1024, 128 * 1024 + 1024)))
    });

    group.bench_function("to_bytes_256kb", |b| b.iter(|| black_box(rope.to_bytes())));

    group.finish();
}

fn rope_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("rope_remove");

    group.bench_function("remove_1kb_from_64kb", |b| {
        b.iter_batched(
            || Rope::new(&vec![b'x'; 64 * 1024]),
            |rope| black_box(rope.remove_span(16 * 1024, 1024)),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, rope_insert, rope_slice, rope_remove);
criterion_main!(benches);
