//! Type predicates (spec §4.6): `nilp`, `pairp`, `symbolp`, `integerp`,
//! `builtinp`, `closurep`, `macrop`, `stringp`, `bufferp`, `envp`.

use super::{args_vec, bool_value, expect_count, register};
use crate::error::Result;
use crate::state::EditorState;
use crate::value::Value;

macro_rules! predicate {
    ($fn_name:ident, $pattern:pat) => {
        fn $fn_name(state: &mut EditorState, args: Value) -> Result<Value> {
            let items = args_vec(state, args)?;
            expect_count(&items, 1, stringify!($fn_name))?;
            Ok(bool_value(matches!(items[0], $pattern)))
        }
    };
}

predicate!(nilp, Value::Nil);
predicate!(pairp, Value::Pair(_));
predicate!(symbolp, Value::Symbol(_));
predicate!(integerp, Value::Integer(_));
predicate!(builtinp, Value::Builtin(_));
predicate!(closurep, Value::Closure(_));
predicate!(macrop, Value::Macro(_));
predicate!(stringp, Value::Str(_));
predicate!(bufferp, Value::Buffer(_));
predicate!(envp, Value::Environment(_));

pub fn install(state: &mut EditorState) {
    register(state, "NILP", "true iff the value is NIL", nilp);
    register(state, "PAIRP", "true iff the value is a pair", pairp);
    register(state, "SYMBOLP", "true iff the value is a symbol", symbolp);
    register(state, "INTEGERP", "true iff the value is an integer", integerp);
    register(state, "BUILTINP", "true iff the value is a builtin", builtinp);
    register(state, "CLOSUREP", "true iff the value is a closure", closurep);
    register(state, "MACROP", "true iff the value is a macro", macrop);
    register(state, "STRINGP", "true iff the value is a string", stringp);
    register(state, "BUFFERP", "true iff the value is a buffer", bufferp);
    register(state, "ENVP", "true iff the value is an environment", envp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::vec_to_list;

    #[test]
    fn predicates_distinguish_their_own_type() {
        let mut state = EditorState::new();
        let nil_args = vec_to_list(&mut state.arena, &[Value::Nil]);
        assert_eq!(nilp(&mut state, nil_args).unwrap(), Value::Integer(1));

        let int_args = vec_to_list(&mut state.arena, &[Value::Integer(3)]);
        assert_eq!(nilp(&mut state, int_args.clone()).unwrap(), Value::Nil);
        assert_eq!(integerp(&mut state, int_args).unwrap(), Value::Integer(1));
    }

    #[test]
    fn pairp_is_false_for_nil() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Nil]);
        assert_eq!(pairp(&mut state, args).unwrap(), Value::Nil);
    }
}
