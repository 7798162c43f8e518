//! String primitives (spec §4.6): `concat`, `index`, `to_string` (`length`
//! is shared with the pairs/lists category in `pairs.rs`, since the spec
//! lists it once under both).

use super::{args_vec, expect_count, expect_integer, expect_string_bytes, nth, register};
use crate::error::{LiteError, Result};
use crate::state::EditorState;
use crate::value::Value;

fn concat(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        out.extend_from_slice(expect_string_bytes(state, *item, &format!("STRING-CONCAT arg {i}"))?);
    }
    Ok(state.arena.make_string(out))
}

fn index(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "STRING-INDEX")?;
    let bytes = expect_string_bytes(state, nth(&items, 0, "STRING-INDEX")?, "STRING-INDEX")?.to_vec();
    let i = expect_integer(nth(&items, 1, "STRING-INDEX")?, "STRING-INDEX")?;
    if i < 0 || i as usize >= bytes.len() {
        return Err(LiteError::arguments("STRING-INDEX: index out of range"));
    }
    Ok(Value::Integer(bytes[i as usize] as i64))
}

fn to_string(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "TO-STRING")?;
    match items[0] {
        Value::Str(_) => {
            let bytes = state.arena.string_bytes(items[0])?.to_vec();
            Ok(state.arena.make_string(bytes))
        }
        other => {
            let printed = print_value(state, other);
            Ok(state.arena.make_string(printed))
        }
    }
}

/// Renders `v` in the reader's surface syntax — used by `to_string`,
/// `print`/`prins`, and the input pipeline's footline reporting.
pub(crate) fn print_value(state: &EditorState, v: Value) -> Vec<u8> {
    match v {
        Value::Nil => b"NIL".to_vec(),
        Value::Integer(n) => n.to_string().into_bytes(),
        Value::Symbol(s) => state.symbols.name(s).as_bytes().to_vec(),
        Value::Str(_) => {
            let bytes = state.arena.string_bytes(v).unwrap_or(&[]);
            let mut out = Vec::with_capacity(bytes.len() + 2);
            out.push(b'"');
            out.extend_from_slice(bytes);
            out.push(b'"');
            out
        }
        Value::Pair(_) => print_list(state, v),
        Value::Builtin(_) => {
            let name = state.arena.builtin(v).map(|b| b.name).unwrap_or("?");
            format!("#<builtin {name}>").into_bytes()
        }
        Value::Closure(_) => b"#<closure>".to_vec(),
        Value::Macro(_) => b"#<macro>".to_vec(),
        Value::Environment(_) => b"#<environment>".to_vec(),
        Value::Buffer(_) => b"#<buffer>".to_vec(),
    }
}

fn print_list(state: &EditorState, v: Value) -> Vec<u8> {
    let mut out = vec![b'('];
    let mut cur = v;
    let mut first = true;
    loop {
        match cur {
            Value::Nil => break,
            Value::Pair(_) => {
                if !first {
                    out.push(b' ');
                }
                first = false;
                let car = state.arena.car(cur).unwrap_or(Value::Nil);
                out.extend_from_slice(&print_value(state, car));
                cur = state.arena.cdr(cur).unwrap_or(Value::Nil);
            }
            other => {
                out.extend_from_slice(b" . ");
                out.extend_from_slice(&print_value(state, other));
                break;
            }
        }
    }
    out.push(b')');
    out
}

pub fn install(state: &mut EditorState) {
    register(state, "STRING-CONCAT", "concatenate strings", concat);
    register(state, "STRING-INDEX", "byte at a string index", index);
    register(state, "TO-STRING", "render a value as a string", to_string);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::vec_to_list;

    #[test]
    fn concat_joins_string_bytes() {
        let mut state = EditorState::new();
        let a = state.arena.make_string(b"foo".to_vec());
        let b = state.arena.make_string(b"bar".to_vec());
        let args = vec_to_list(&mut state.arena, &[a, b]);
        let result = concat(&mut state, args).unwrap();
        assert_eq!(state.arena.string_bytes(result).unwrap(), b"foobar");
    }

    #[test]
    fn index_out_of_range_is_an_error() {
        let mut state = EditorState::new();
        let s = state.arena.make_string(b"ab".to_vec());
        let args = vec_to_list(&mut state.arena, &[s, Value::Integer(5)]);
        assert!(index(&mut state, args).is_err());
    }

    #[test]
    fn to_string_renders_integers_and_symbols() {
        let mut state = EditorState::new();
        let sym = state.symbols.intern("FOO");
        let args = vec_to_list(&mut state.arena, &[Value::Symbol(sym)]);
        let result = to_string(&mut state, args).unwrap();
        assert_eq!(state.arena.string_bytes(result).unwrap(), b"FOO");
    }

    #[test]
    fn print_value_renders_dotted_pairs() {
        let mut state = EditorState::new();
        let pair = state.arena.cons(Value::Integer(1), Value::Integer(2));
        assert_eq!(print_value(&state, pair), b"(1 . 2)");
    }
}
