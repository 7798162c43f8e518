use criterion::{criterion_group, criterion_main, Criterion};
use lite::builtins;
use lite::parser::parse_all;
use lite::state::EditorState;
use std::hint::black_box;

fn new_state() -> EditorState {
    let mut state = EditorState::new();
    builtins::install_all(&mut state);
    state
}

fn eval_source(state: &mut EditorState, source: &[u8]) {
    let forms = parse_all(source, &mut state.arena, &mut state.symbols).unwrap();
    for form in forms {
        lite::eval::eval(state, form, state.global_env).unwrap();
    }
}

fn eval_arithmetic(c: &mut Criterion) {
    c.bench_function("eval_nested_arithmetic", |b| {
        b.iter_batched(
            new_state,
            |mut state| eval_source(&mut state, b"(+ 1 (* 2 (- 10 3)) (/ 20 4))"),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn eval_recursive_closure(c: &mut Criterion) {
    c.bench_function("eval_recursive_factorial_10", |b| {
        b.iter_batched(
            new_state,
            |mut state| {
                eval_source(
                    &mut state,
                    b"(DEFINE FACT (LAMBDA (N) (IF (= N 0) 1 (* N (FACT (- N 1))))))
                      (FACT 10)",
                )
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn eval_list_building(c: &mut Criterion) {
    c.bench_function("eval_build_100_element_list", |b| {
        b.iter_batched(
            new_state,
            |mut state| {
                eval_source(
                    &mut state,
                    b"(DEFINE BUILD (LAMBDA (N) (IF (= N 0) NIL (CONS N (BUILD (- N 1))))))
                      (BUILD 100)",
                )
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn eval_parse_only(c: &mut Criterion) {
    let mut state = new_state();
    static SOURCE: &[u8] = b"(DEFINE FACT (LAMBDA (N) (IF (= N 0) 1 (* N (FACT (- N 1))))))";
    c.bench_function("parse_small_form", |b| {
        b.iter(|| black_box(parse_all(SOURCE, &mut state.arena, &mut state.symbols).unwrap()))
    });
}

criterion_group!(benches, eval_arithmetic, eval_recursive_closure, eval_list_building, eval_parse_only);
criterion_main!(benches);
