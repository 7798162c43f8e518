//! Evaluation and introspection primitives (spec §4.6): `apply`,
//! `evaluate-string`, `evaluate-file`, `copy`, `print`, `prins`,
//! `symbol-table`.

use super::strings::print_value;
use super::{args_vec, expect_count, expect_string_bytes, nth, register};
use crate::error::Result;
use crate::state::EditorState;
use crate::value::{copy_list, Value};
use std::io::Write;

fn apply_builtin(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "APPLY")?;
    crate::eval::apply(state, items[0], items[1])
}

fn evaluate_string(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "EVALUATE-STRING")?;
    let source = expect_string_bytes(state, nth(&items, 0, "EVALUATE-STRING")?, "EVALUATE-STRING")?.to_vec();
    let forms = crate::parser::parse_all(&source, &mut state.arena, &mut state.symbols)?;
    let mut result = Value::Nil;
    for form in forms {
        result = crate::eval::eval(state, form, state.global_env)?;
    }
    Ok(result)
}

fn evaluate_file(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "EVALUATE-FILE")?;
    let path_bytes = expect_string_bytes(state, nth(&items, 0, "EVALUATE-FILE")?, "EVALUATE-FILE")?.to_vec();
    let path = std::path::PathBuf::from(String::from_utf8_lossy(&path_bytes).into_owned());
    let source = crate::file_io::read_whole_file(&path)?;
    let forms = crate::parser::parse_all(&source, &mut state.arena, &mut state.symbols)?;
    let mut result = Value::Nil;
    for form in forms {
        result = crate::eval::eval(state, form, state.global_env)?;
    }
    Ok(result)
}

fn copy(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "COPY")?;
    match items[0] {
        Value::Pair(_) => copy_list(&mut state.arena, items[0]),
        other => Ok(other),
    }
}

fn print(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "PRINT")?;
    let rendered = print_value(state, items[0]);
    let mut out = std::io::stdout();
    let _ = out.write_all(&rendered);
    let _ = out.write_all(b"\n");
    Ok(items[0])
}

/// `princ`-style printing: raw bytes for strings (no surrounding quotes),
/// no trailing newline.
fn prins(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "PRINS")?;
    let mut out = std::io::stdout();
    match items[0] {
        Value::Str(_) => {
            let bytes = state.arena.string_bytes(items[0])?;
            let _ = out.write_all(bytes);
        }
        other => {
            let rendered = print_value(state, other);
            let _ = out.write_all(&rendered);
        }
    }
    Ok(items[0])
}

/// Requests that the editor's main loop stop after the current event, per
/// the original `quit_lisp` builtin.
fn quit_lisp(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "QUIT-LISP")?;
    state.should_quit = true;
    Ok(Value::Nil)
}

fn symbol_table(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "SYMBOL-TABLE")?;
    let all: Vec<Value> = (0..state.symbols.len())
        .map(|i| Value::Symbol(crate::symbol::SymbolId(i)))
        .collect();
    Ok(crate::value::vec_to_list(&mut state.arena, &all))
}

pub fn install(state: &mut EditorState) {
    register(state, "APPLY", "apply a function to an argument list", apply_builtin);
    register(state, "EVALUATE-STRING", "parse and evaluate every form in a string", evaluate_string);
    register(state, "EVALUATE-FILE", "parse and evaluate every form in a file", evaluate_file);
    register(state, "COPY", "shallow-copy a list", copy);
    register(state, "PRINT", "print a value's read syntax with a trailing newline", print);
    register(state, "PRINS", "print a value's raw text with no newline", prins);
    register(state, "SYMBOL-TABLE", "every interned symbol", symbol_table);
    register(state, "QUIT-LISP", "request that the editor exit after this event", quit_lisp);
}
