//! Numeric primitives (spec §4.6): `+ − × ÷`, `remainder`, and the
//! integer comparisons `= ≠ < ≤ > ≥`.

use super::{args_vec, bool_value, expect_integer, nth, register};
use crate::error::{LiteError, Result};
use crate::state::EditorState;
use crate::value::Value;

fn integers(state: &EditorState, args: Value, who: &str) -> Result<Vec<i64>> {
    args_vec(state, args)?
        .into_iter()
        .map(|v| expect_integer(v, who))
        .collect()
}

fn add(state: &mut EditorState, args: Value) -> Result<Value> {
    let ns = integers(state, args, "+")?;
    Ok(Value::Integer(ns.into_iter().sum()))
}

fn sub(state: &mut EditorState, args: Value) -> Result<Value> {
    let ns = integers(state, args, "-")?;
    match ns.as_slice() {
        [] => Err(LiteError::arguments("-: needs at least one argument")),
        [only] => Ok(Value::Integer(-only)),
        [first, rest @ ..] => Ok(Value::Integer(rest.iter().fold(*first, |acc, n| acc - n))),
    }
}

fn mul(state: &mut EditorState, args: Value) -> Result<Value> {
    let ns = integers(state, args, "*")?;
    Ok(Value::Integer(ns.into_iter().product()))
}

fn div(state: &mut EditorState, args: Value) -> Result<Value> {
    let ns = integers(state, args, "/")?;
    match ns.as_slice() {
        [] | [_] => Err(LiteError::arguments("/: needs at least two arguments")),
        [first, rest @ ..] => {
            let mut acc = *first;
            for n in rest {
                if *n == 0 {
                    return Err(LiteError::arguments("/: division by zero"));
                }
                acc /= n;
            }
            Ok(Value::Integer(acc))
        }
    }
}

fn remainder(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    if items.len() != 2 {
        return Err(LiteError::arguments("%: expected exactly two arguments"));
    }
    let a = expect_integer(nth(&items, 0, "%")?, "%")?;
    let b = expect_integer(nth(&items, 1, "%")?, "%")?;
    if b == 0 {
        return Err(LiteError::arguments("%: division by zero"));
    }
    Ok(Value::Integer(a % b))
}

macro_rules! comparison {
    ($fn_name:ident, $who:literal, $op:tt) => {
        fn $fn_name(state: &mut EditorState, args: Value) -> Result<Value> {
            let ns = integers(state, args, $who)?;
            if ns.len() < 2 {
                return Err(LiteError::arguments(concat!($who, ": needs at least two arguments")));
            }
            Ok(bool_value(ns.windows(2).all(|w| w[0] $op w[1])))
        }
    };
}

comparison!(num_eq, "=", ==);
comparison!(num_ne, "/=", !=);
comparison!(num_lt, "<", <);
comparison!(num_le, "<=", <=);
comparison!(num_gt, ">", >);
comparison!(num_ge, ">=", >=);

pub fn install(state: &mut EditorState) {
    register(state, "+", "sum of its arguments", add);
    register(state, "-", "difference, or negation with one argument", sub);
    register(state, "*", "product of its arguments", mul);
    register(state, "/", "successive integer division", div);
    register(state, "%", "remainder of the first two arguments", remainder);
    register(state, "=", "true iff all arguments are equal", num_eq);
    register(state, "/=", "true iff consecutive arguments differ", num_ne);
    register(state, "<", "strictly increasing", num_lt);
    register(state, "<=", "non-decreasing", num_le);
    register(state, ">", "strictly decreasing", num_gt);
    register(state, ">=", "non-increasing", num_ge);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::vec_to_list;

    #[test]
    fn add_sums_all_arguments() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(add(&mut state, args).unwrap(), Value::Integer(6));
    }

    #[test]
    fn sub_with_one_argument_negates() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(5)]);
        assert_eq!(sub(&mut state, args).unwrap(), Value::Integer(-5));
    }

    #[test]
    fn div_by_zero_is_an_error() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(1), Value::Integer(0)]);
        assert!(div(&mut state, args).is_err());
    }

    #[test]
    fn comparisons_chain_across_all_arguments() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(num_lt(&mut state, args).unwrap(), Value::Integer(1));

        let args2 = vec_to_list(&mut state.arena, &[Value::Integer(1), Value::Integer(3), Value::Integer(2)]);
        assert_eq!(num_lt(&mut state, args2).unwrap(), Value::Nil);
    }

    #[test]
    fn remainder_of_negative_dividend() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(-7), Value::Integer(3)]);
        assert_eq!(remainder(&mut state, args).unwrap(), Value::Integer(-1));
    }
}
