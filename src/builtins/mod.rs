//! The builtin registry (spec §4.6): ~80 native primitives installed into
//! the root environment at startup, grouped into the categories the spec
//! lists.

mod bitwise;
mod buffers;
mod evaluation;
mod io;
mod numerics;
mod pairs;
mod predicates;
mod strings;

use crate::error::{LiteError, Result};
use crate::state::EditorState;
use crate::value::{BuiltinFn, Value};

/// Interns `name`, allocates a `Builtin` value wrapping `func`, and binds
/// it in the global environment.
fn register(state: &mut EditorState, name: &'static str, doc: &'static str, func: BuiltinFn) {
    let value = state.arena.make_builtin(name, doc, func);
    let sym = state.symbols.intern(name);
    let ctx = state.env_ctx();
    crate::env::set(&mut state.arena, state.global_env, sym, value, &ctx)
        .expect("global environment always accepts a new binding");
}

/// Installs every builtin category into `state`'s global environment.
pub fn install_all(state: &mut EditorState) {
    pairs::install(state);
    predicates::install(state);
    numerics::install(state);
    bitwise::install(state);
    strings::install(state);
    buffers::install(state);
    evaluation::install(state);
    io::install(state);
}

/// Collects `args` (a proper list) into a `Vec`, erroring with a
/// builtin-appropriate message rather than the generic `list_to_vec`
/// wording when it isn't a proper list.
fn args_vec(state: &EditorState, args: Value) -> Result<Vec<Value>> {
    crate::value::list_to_vec(&state.arena, args)
        .map_err(|_| LiteError::arguments("arguments must be a proper list"))
}

fn nth(args: &[Value], i: usize, who: &str) -> Result<Value> {
    args.get(i).copied().ok_or_else(|| LiteError::arguments(format!("{who}: missing argument {i}")))
}

fn expect_count(args: &[Value], n: usize, who: &str) -> Result<()> {
    if args.len() != n {
        return Err(LiteError::arguments(format!("{who}: expected {n} argument(s), got {}", args.len())));
    }
    Ok(())
}

fn expect_integer(v: Value, who: &str) -> Result<i64> {
    match v {
        Value::Integer(n) => Ok(n),
        _ => Err(LiteError::type_error(format!("{who}: expected an integer, got {}", v.type_name()))),
    }
}

fn expect_symbol(v: Value, who: &str) -> Result<crate::symbol::SymbolId> {
    match v {
        Value::Symbol(s) => Ok(s),
        _ => Err(LiteError::type_error(format!("{who}: expected a symbol, got {}", v.type_name()))),
    }
}

fn expect_buffer(v: Value, who: &str) -> Result<crate::buffer::BufferId> {
    match v {
        Value::Buffer(id) => Ok(id),
        _ => Err(LiteError::type_error(format!("{who}: expected a buffer, got {}", v.type_name()))),
    }
}

fn expect_string_bytes<'a>(state: &'a EditorState, v: Value, who: &str) -> Result<&'a [u8]> {
    state
        .arena
        .string_bytes(v)
        .map_err(|_| LiteError::type_error(format!("{who}: expected a string, got {}", v.type_name())))
}

fn bool_value(b: bool) -> Value {
    if b {
        Value::Integer(1)
    } else {
        Value::Nil
    }
}
