//! The Value model: a small tagged sum plus an arena of GC-managed heap
//! allocations (spec §3, §4.3, §9).
//!
//! Per the "Cons-cell cycles and shared environments" design note, pairs,
//! strings, builtins, closures, macros, and environments are not raw heap
//! pointers: they are indices (`ValueId`) into a single `Arena`. Cycles
//! (a closure's captured environment holding a closure that captures it)
//! fall out naturally since the mark pass walks indices, never addresses.
//! Symbols (`symbol::SymbolId`) and buffers (`buffer::BufferId`) live in
//! their own tables since neither is ever swept by the collector.

use crate::buffer::BufferId;
use crate::error::{ErrorKind, LiteError, Result};
use crate::symbol::SymbolId;
use std::collections::HashMap;

/// Stable identity of an arena-allocated heap value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub usize);

/// A Lisp value. Heap variants hold an index into the owning `Arena`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Nil,
    Integer(i64),
    Symbol(SymbolId),
    Pair(ValueId),
    Str(ValueId),
    Builtin(ValueId),
    Closure(ValueId),
    Macro(ValueId),
    Environment(ValueId),
    Buffer(BufferId),
}

impl Value {
    pub fn is_nil(self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Value::Nil => "NIL",
            Value::Integer(_) => "INTEGER",
            Value::Symbol(_) => "SYMBOL",
            Value::Pair(_) => "PAIR",
            Value::Str(_) => "STRING",
            Value::Builtin(_) => "BUILTIN",
            Value::Closure(_) => "CLOSURE",
            Value::Macro(_) => "MACRO",
            Value::Environment(_) => "ENVIRONMENT",
            Value::Buffer(_) => "BUFFER",
        }
    }
}

/// A native function backing a `Builtin` value. Takes the evaluated
/// argument list (a proper list `Value`) and the interpreter, returns a
/// result value or a typed error (spec §4.6).
pub type BuiltinFn = fn(&mut crate::state::EditorState, Value) -> Result<Value>;

#[derive(Clone)]
pub struct BuiltinData {
    pub name: &'static str,
    pub doc: &'static str,
    pub func: BuiltinFn,
}

impl std::fmt::Debug for BuiltinData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ClosureData {
    pub env: Value,
    pub params: Value,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct EnvData {
    pub table: HashMap<SymbolId, Value>,
    pub parent: Value,
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

/// A single arena slot. `Free` entries form a singly-linked freelist
/// threaded through the arena so that a GC sweep can recycle dead
/// allocations without shrinking the backing `Vec`.
#[derive(Debug)]
enum Slot {
    Free(Option<usize>),
    Pair(Value, Value),
    Str(Vec<u8>),
    Builtin(BuiltinData),
    Closure(ClosureData),
    Macro(ClosureData),
    Environment(EnvData),
}

struct Entry {
    marked: bool,
    slot: Slot,
}

/// The mark-and-sweep arena backing every GC-managed `Value` variant.
pub struct Arena {
    entries: Vec<Entry>,
    free_head: Option<usize>,
    /// Count of pair allocations since the last collection; one of the two
    /// GC triggers in spec §4.7.
    pub pair_allocations_since_gc: u64,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            pair_allocations_since_gc: 0,
        }
    }

    fn alloc(&mut self, slot: Slot) -> usize {
        if let Some(idx) = self.free_head {
            let Entry { slot: old, .. } = &self.entries[idx];
            let next = match old {
                Slot::Free(next) => *next,
                _ => unreachable!("free_head points to a live slot"),
            };
            self.free_head = next;
            self.entries[idx] = Entry {
                marked: false,
                slot,
            };
            idx
        } else {
            self.entries.push(Entry {
                marked: false,
                slot,
            });
            self.entries.len() - 1
        }
    }

    pub fn cons(&mut self, car: Value, cdr: Value) -> Value {
        self.pair_allocations_since_gc += 1;
        Value::Pair(ValueId(self.alloc(Slot::Pair(car, cdr))))
    }

    pub fn make_string(&mut self, bytes: Vec<u8>) -> Value {
        Value::Str(ValueId(self.alloc(Slot::Str(bytes))))
    }

    pub fn make_builtin(&mut self, name: &'static str, doc: &'static str, func: BuiltinFn) -> Value {
        Value::Builtin(ValueId(self.alloc(Slot::Builtin(BuiltinData { name, doc, func }))))
    }

    pub fn make_closure(&mut self, env: Value, params: Value, body: Value) -> Value {
        Value::Closure(ValueId(self.alloc(Slot::Closure(ClosureData {
            env,
            params,
            body,
        }))))
    }

    pub fn make_macro(&mut self, env: Value, params: Value, body: Value) -> Value {
        Value::Macro(ValueId(self.alloc(Slot::Macro(ClosureData { env, params, body }))))
    }

    pub fn make_environment(&mut self, parent: Value) -> Value {
        Value::Environment(ValueId(self.alloc(Slot::Environment(EnvData {
            table: HashMap::new(),
            parent,
        }))))
    }

    pub fn car(&self, v: Value) -> Result<Value> {
        self.pair(v).map(|(car, _)| car)
    }

    pub fn cdr(&self, v: Value) -> Result<Value> {
        self.pair(v).map(|(_, cdr)| cdr)
    }

    pub fn pair(&self, v: Value) -> Result<(Value, Value)> {
        match v {
            Value::Pair(id) => match &self.entries[id.0].slot {
                Slot::Pair(car, cdr) => Ok((*car, *cdr)),
                _ => unreachable!("ValueId tag mismatch"),
            },
            _ => Err(LiteError::type_error(format!(
                "expected a pair, got {}",
                v.type_name()
            ))),
        }
    }

    pub fn setcar(&mut self, v: Value, new_car: Value) -> Result<()> {
        match v {
            Value::Pair(id) => match &mut self.entries[id.0].slot {
                Slot::Pair(car, _) => {
                    *car = new_car;
                    Ok(())
                }
                _ => unreachable!(),
            },
            _ => Err(LiteError::type_error("setcar on non-pair")),
        }
    }

    pub fn setcdr(&mut self, v: Value, new_cdr: Value) -> Result<()> {
        match v {
            Value::Pair(id) => match &mut self.entries[id.0].slot {
                Slot::Pair(_, cdr) => {
                    *cdr = new_cdr;
                    Ok(())
                }
                _ => unreachable!(),
            },
            _ => Err(LiteError::type_error("setcdr on non-pair")),
        }
    }

    pub fn string_bytes(&self, v: Value) -> Result<&[u8]> {
        match v {
            Value::Str(id) => match &self.entries[id.0].slot {
                Slot::Str(bytes) => Ok(bytes),
                _ => unreachable!(),
            },
            _ => Err(LiteError::type_error(format!(
                "expected a string, got {}",
                v.type_name()
            ))),
        }
    }

    pub fn builtin(&self, v: Value) -> Result<&BuiltinData> {
        match v {
            Value::Builtin(id) => match &self.entries[id.0].slot {
                Slot::Builtin(b) => Ok(b),
                _ => unreachable!(),
            },
            _ => Err(LiteError::type_error("expected a builtin")),
        }
    }

    pub fn closure(&self, v: Value) -> Result<&ClosureData> {
        match v {
            Value::Closure(id) => match &self.entries[id.0].slot {
                Slot::Closure(c) => Ok(c),
                _ => unreachable!(),
            },
            Value::Macro(id) => match &self.entries[id.0].slot {
                Slot::Macro(c) => Ok(c),
                _ => unreachable!(),
            },
            _ => Err(LiteError::type_error("expected a closure or macro")),
        }
    }

    pub fn env(&self, v: Value) -> Result<&EnvData> {
        match v {
            Value::Environment(id) => match &self.entries[id.0].slot {
                Slot::Environment(e) => Ok(e),
                _ => unreachable!(),
            },
            _ => Err(LiteError::type_error(format!(
                "expected an environment, got {}",
                v.type_name()
            ))),
        }
    }

    pub fn env_mut(&mut self, v: Value) -> Result<&mut EnvData> {
        match v {
            Value::Environment(id) => match &mut self.entries[id.0].slot {
                Slot::Environment(e) => Ok(e),
                _ => unreachable!(),
            },
            _ => Err(LiteError::type_error(format!(
                "expected an environment, got {}",
                v.type_name()
            ))),
        }
    }

    // --- GC plumbing (see gc.rs for the collection algorithm itself) ---

    pub(crate) fn mark(&mut self, id: usize) -> bool {
        let already = self.entries[id].marked;
        self.entries[id].marked = true;
        already
    }

    pub(crate) fn is_marked(&self, id: usize) -> bool {
        self.entries[id].marked
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_free(&self, id: usize) -> bool {
        matches!(self.entries[id].slot, Slot::Free(_))
    }

    pub(crate) fn children_of(&self, id: usize) -> Vec<Value> {
        match &self.entries[id].slot {
            Slot::Pair(car, cdr) => vec![*car, *cdr],
            Slot::Str(_) => vec![],
            Slot::Builtin(_) => vec![],
            Slot::Closure(c) | Slot::Macro(c) => vec![c.env, c.params, c.body],
            Slot::Environment(e) => {
                let mut out: Vec<Value> = e.table.values().copied().collect();
                out.push(e.parent);
                out
            }
            Slot::Free(_) => vec![],
        }
    }

    pub(crate) fn sweep_unmarked(&mut self, id: usize) {
        self.entries[id].slot = Slot::Free(self.free_head);
        self.free_head = Some(id);
    }

    pub(crate) fn clear_mark(&mut self, id: usize) {
        self.entries[id].marked = false;
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

/// `listp`: true iff repeatedly taking `cdr` reaches `Nil` without hitting
/// a non-pair (spec §4.3).
pub fn listp(arena: &Arena, mut v: Value) -> bool {
    loop {
        match v {
            Value::Nil => return true,
            Value::Pair(_) => v = arena.cdr(v).expect("pair checked above"),
            _ => return false,
        }
    }
}

/// `copy_list`: a fresh proper-list spine sharing element values (spec §4.3).
pub fn copy_list(arena: &mut Arena, v: Value) -> Result<Value> {
    let mut items = Vec::new();
    let mut cur = v;
    loop {
        match cur {
            Value::Nil => break,
            Value::Pair(_) => {
                items.push(arena.car(cur)?);
                cur = arena.cdr(cur)?;
            }
            _ => return Err(LiteError::type_error("copy-list on improper list")),
        }
    }
    let mut result = Value::Nil;
    for item in items.into_iter().rev() {
        result = arena.cons(item, result);
    }
    Ok(result)
}

/// Collects a proper list into a `Vec<Value>`, erroring on improper lists.
pub fn list_to_vec(arena: &Arena, mut v: Value) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    loop {
        match v {
            Value::Nil => return Ok(out),
            Value::Pair(_) => {
                out.push(arena.car(v)?);
                v = arena.cdr(v)?;
            }
            _ => {
                return Err(LiteError::new(
                    ErrorKind::Type,
                    "IMPROPER_LIST",
                    "expected a proper list",
                ))
            }
        }
    }
}

/// Builds a proper list from a slice, right-to-left.
pub fn vec_to_list(arena: &mut Arena, items: &[Value]) -> Value {
    let mut result = Value::Nil;
    for item in items.iter().rev() {
        result = arena.cons(*item, result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cons_car_cdr_roundtrip() {
        let mut arena = Arena::new();
        let p = arena.cons(Value::Integer(1), Value::Integer(2));
        assert_eq!(arena.car(p).unwrap(), Value::Integer(1));
        assert_eq!(arena.cdr(p).unwrap(), Value::Integer(2));
    }

    #[test]
    fn listp_detects_proper_and_improper_lists() {
        let mut arena = Arena::new();
        let proper = vec_to_list(&mut arena, &[Value::Integer(1), Value::Integer(2)]);
        assert!(listp(&arena, proper));

        let improper = arena.cons(Value::Integer(1), Value::Integer(2));
        assert!(!listp(&arena, improper));
        assert!(listp(&arena, Value::Nil));
    }

    #[test]
    fn vec_to_list_and_back_round_trips() {
        let mut arena = Arena::new();
        let items = vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)];
        let list = vec_to_list(&mut arena, &items);
        assert_eq!(list_to_vec(&arena, list).unwrap(), items);
    }

    #[test]
    fn setcar_setcdr_mutate_in_place() {
        let mut arena = Arena::new();
        let p = arena.cons(Value::Integer(1), Value::Integer(2));
        arena.setcar(p, Value::Integer(9)).unwrap();
        arena.setcdr(p, Value::Integer(8)).unwrap();
        assert_eq!(arena.car(p).unwrap(), Value::Integer(9));
        assert_eq!(arena.cdr(p).unwrap(), Value::Integer(8));
    }

    #[test]
    fn freed_slots_are_recycled_by_alloc() {
        let mut arena = Arena::new();
        let p1 = arena.cons(Value::Integer(1), Value::Nil);
        let id = match p1 {
            Value::Pair(id) => id.0,
            _ => unreachable!(),
        };
        arena.sweep_unmarked(id);
        let p2 = arena.cons(Value::Integer(2), Value::Nil);
        assert_eq!(p2, Value::Pair(ValueId(id)));
        assert_eq!(arena.len(), 1);
    }
}
