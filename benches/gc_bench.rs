use criterion::{criterion_group, criterion_main, Criterion};
use lite::state::EditorState;
use lite::value::Value;
use std::hint::black_box;

/// Builds a state with `count` cons cells reachable from the global
/// environment (live) and another `count` unreachable (garbage), so a
/// collection actually has sweeping work to do.
fn state_with_garbage(count: usize) -> EditorState {
    let mut state = EditorState::new();
    let sym = state.symbols.intern("GC-BENCH-ROOT");
    let ctx = state.env_ctx();

    let mut live = Value::Nil;
    for i in 0..count {
        live = state.arena.cons(Value::Integer(i as i64), live);
    }
    lite::env::set(&mut state.arena, state.global_env, sym, live, &ctx).unwrap();

    for i in 0..count {
        let _garbage = state.arena.cons(Value::Integer(i as i64), Value::Nil);
    }
    state
}

fn gc_collect_small_heap(c: &mut Criterion) {
    c.bench_function("collect_garbage_1k_live_1k_garbage", |b| {
        b.iter_batched(
            || state_with_garbage(1_000),
            |mut state| black_box(state.collect_garbage()),
            criterion::BatchSize::LargeInput,
        )
    });
}

fn gc_collect_large_heap(c: &mut Criterion) {
    c.bench_function("collect_garbage_10k_live_10k_garbage", |b| {
        b.iter_batched(
            || state_with_garbage(10_000),
            |mut state| black_box(state.collect_garbage()),
            criterion::BatchSize::LargeInput,
        )
    });
}

fn gc_allocation_only(c: &mut Criterion) {
    c.bench_function("cons_10k_cells_no_collection", |b| {
        b.iter_batched(
            EditorState::new,
            |mut state| {
                let mut list = Value::Nil;
                for i in 0..10_000 {
                    list = state.arena.cons(Value::Integer(i), list);
                }
                black_box(list)
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, gc_collect_small_heap, gc_collect_large_heap, gc_allocation_only);
criterion_main!(benches);
