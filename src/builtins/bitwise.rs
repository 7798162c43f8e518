//! Bitwise primitives (spec §4.6): `and, or, xor, not, shl, shr`, operating
//! on integers. Named `BIT-AND`/`BIT-OR`/`BIT-XOR`/`BIT-NOT` rather than
//! bare `AND`/`OR`/`NOT` since `NOT` is already the logical negation
//! builtin (spec's "Logic" category) and the two must not collide.

use super::{args_vec, expect_integer, nth, register};
use crate::error::{LiteError, Result};
use crate::state::EditorState;
use crate::value::Value;

fn pair_of_integers(state: &EditorState, args: Value, who: &str) -> Result<(i64, i64)> {
    let items = args_vec(state, args)?;
    if items.len() != 2 {
        return Err(LiteError::arguments(format!("{who}: expected exactly two arguments")));
    }
    Ok((expect_integer(nth(&items, 0, who)?, who)?, expect_integer(nth(&items, 1, who)?, who)?))
}

fn bit_and(state: &mut EditorState, args: Value) -> Result<Value> {
    let (a, b) = pair_of_integers(state, args, "BIT-AND")?;
    Ok(Value::Integer(a & b))
}

fn bit_or(state: &mut EditorState, args: Value) -> Result<Value> {
    let (a, b) = pair_of_integers(state, args, "BIT-OR")?;
    Ok(Value::Integer(a | b))
}

fn bit_xor(state: &mut EditorState, args: Value) -> Result<Value> {
    let (a, b) = pair_of_integers(state, args, "BIT-XOR")?;
    Ok(Value::Integer(a ^ b))
}

fn bit_not(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    if items.len() != 1 {
        return Err(LiteError::arguments("BIT-NOT: expected exactly one argument"));
    }
    let n = expect_integer(nth(&items, 0, "BIT-NOT")?, "BIT-NOT")?;
    Ok(Value::Integer(!n))
}

fn shl(state: &mut EditorState, args: Value) -> Result<Value> {
    let (a, b) = pair_of_integers(state, args, "SHL")?;
    Ok(Value::Integer(a.wrapping_shl(b as u32)))
}

fn shr(state: &mut EditorState, args: Value) -> Result<Value> {
    let (a, b) = pair_of_integers(state, args, "SHR")?;
    Ok(Value::Integer(a.wrapping_shr(b as u32)))
}

pub fn install(state: &mut EditorState) {
    register(state, "BIT-AND", "bitwise AND of two integers", bit_and);
    register(state, "BIT-OR", "bitwise OR of two integers", bit_or);
    register(state, "BIT-XOR", "bitwise XOR of two integers", bit_xor);
    register(state, "BIT-NOT", "bitwise complement of an integer", bit_not);
    register(state, "SHL", "left-shift an integer", shl);
    register(state, "SHR", "right-shift an integer", shr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::vec_to_list;

    #[test]
    fn bitwise_ops_on_small_integers() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(0b110), Value::Integer(0b011)]);
        assert_eq!(bit_and(&mut state, args).unwrap(), Value::Integer(0b010));

        let args = vec_to_list(&mut state.arena, &[Value::Integer(0b110), Value::Integer(0b011)]);
        assert_eq!(bit_or(&mut state, args).unwrap(), Value::Integer(0b111));

        let args = vec_to_list(&mut state.arena, &[Value::Integer(0b110), Value::Integer(0b011)]);
        assert_eq!(bit_xor(&mut state, args).unwrap(), Value::Integer(0b101));
    }

    #[test]
    fn shl_and_shr_shift_bits() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(1), Value::Integer(4)]);
        assert_eq!(shl(&mut state, args).unwrap(), Value::Integer(16));

        let args = vec_to_list(&mut state.arena, &[Value::Integer(16), Value::Integer(4)]);
        assert_eq!(shr(&mut state, args).unwrap(), Value::Integer(1));
    }

    #[test]
    fn bit_not_complements() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(0)]);
        assert_eq!(bit_not(&mut state, args).unwrap(), Value::Integer(-1));
    }
}
