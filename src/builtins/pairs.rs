//! Pairs and lists: `cons`, `car`, `cdr`, `setcar`, `setcdr`, `member`,
//! `length` (spec §4.6).

use super::{args_vec, bool_value, expect_count, nth, register};
use crate::error::Result;
use crate::state::EditorState;
use crate::value::Value;

fn cons(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "CONS")?;
    Ok(state.arena.cons(items[0], items[1]))
}

fn car(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "CAR")?;
    state.arena.car(items[0])
}

fn cdr(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "CDR")?;
    state.arena.cdr(items[0])
}

fn setcar(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "SETCAR")?;
    state.arena.setcar(items[0], items[1])?;
    Ok(items[0])
}

fn setcdr(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "SETCDR")?;
    state.arena.setcdr(items[0], items[1])?;
    Ok(items[0])
}

/// Returns the first cdr-suffix of the list whose car is `eq` to the
/// target, or `Nil` if not found.
fn member(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "MEMBER")?;
    let target = nth(&items, 0, "MEMBER")?;
    let mut cur = nth(&items, 1, "MEMBER")?;
    loop {
        match cur {
            Value::Nil => return Ok(Value::Nil),
            Value::Pair(_) => {
                let car = state.arena.car(cur)?;
                if car == target {
                    return Ok(cur);
                }
                cur = state.arena.cdr(cur)?;
            }
            _ => return Ok(Value::Nil),
        }
    }
}

/// Length of a proper list, or of a string (byte length) — the teacher's
/// builtins overload `length` across both, matching this spec's single
/// `length` entry under both "Pairs and lists" and "Strings".
fn length(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "LENGTH")?;
    match items[0] {
        Value::Str(_) => {
            let bytes = state.arena.string_bytes(items[0])?;
            Ok(Value::Integer(bytes.len() as i64))
        }
        _ => {
            let mut n = 0i64;
            let mut cur = items[0];
            loop {
                match cur {
                    Value::Nil => break,
                    Value::Pair(_) => {
                        n += 1;
                        cur = state.arena.cdr(cur)?;
                    }
                    _ => break,
                }
            }
            Ok(Value::Integer(n))
        }
    }
}

fn not(_state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(_state, args)?;
    expect_count(&items, 1, "NOT")?;
    Ok(bool_value(items[0].is_nil()))
}

fn eq(_state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(_state, args)?;
    expect_count(&items, 2, "EQ")?;
    Ok(bool_value(items[0] == items[1]))
}

pub fn install(state: &mut EditorState) {
    register(state, "CONS", "allocate a fresh pair", cons);
    register(state, "CAR", "the first element of a pair", car);
    register(state, "CDR", "the rest of a pair", cdr);
    register(state, "SETCAR", "mutate a pair's car", setcar);
    register(state, "SETCDR", "mutate a pair's cdr", setcdr);
    register(state, "MEMBER", "find an element by EQ in a list", member);
    register(state, "LENGTH", "the length of a list or string", length);
    register(state, "NOT", "logical negation", not);
    register(state, "EQ", "typed structural equality", eq);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::vec_to_list;

    #[test]
    fn cons_car_cdr() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(1), Value::Integer(2)]);
        let pair = cons(&mut state, args).unwrap();
        let car_args = vec_to_list(&mut state.arena, &[pair]);
        assert_eq!(car(&mut state, car_args).unwrap(), Value::Integer(1));
    }

    #[test]
    fn member_finds_an_eq_element() {
        let mut state = EditorState::new();
        let list = vec_to_list(&mut state.arena, &[Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        let args = vec_to_list(&mut state.arena, &[Value::Integer(2), list]);
        let result = member(&mut state, args).unwrap();
        let items = crate::value::list_to_vec(&state.arena, result).unwrap();
        assert_eq!(items, vec![Value::Integer(2), Value::Integer(3)]);
    }

    #[test]
    fn length_of_a_proper_list() {
        let mut state = EditorState::new();
        let list = vec_to_list(&mut state.arena, &[Value::Integer(1), Value::Integer(2)]);
        let args = vec_to_list(&mut state.arena, &[list]);
        assert_eq!(length(&mut state, args).unwrap(), Value::Integer(2));
    }

    #[test]
    fn eq_compares_typed_structural_equality() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(7), Value::Integer(7)]);
        assert_eq!(eq(&mut state, args).unwrap(), Value::Integer(1));
        let args2 = vec_to_list(&mut state.arena, &[Value::Integer(7), Value::Nil]);
        assert_eq!(eq(&mut state, args2).unwrap(), Value::Nil);
    }
}
