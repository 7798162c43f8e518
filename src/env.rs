//! Lexical environments: a hash map from symbol to value plus a parent
//! chain (spec §3, §4.5).
//!
//! `env_get`/`env_set` also implement the §9 design note "Dynamic
//! `env_get_containing` substitution": while the editor is in prompt
//! (`reading`) mode, a lookup or assignment of `CURRENT-BUFFER` is
//! transparently redirected to `POPUP-BUFFER`. This is a first-class
//! branch here, not a special case sprinkled through call sites.

use crate::error::{LiteError, Result};
use crate::symbol::SymbolId;
use crate::value::{Arena, Value};

/// Context needed to resolve the popup-buffer substitution. Anything that
/// calls `env_get`/`env_set` threads this through rather than reaching for
/// global state, keeping the substitution explicit and testable.
#[derive(Debug, Clone, Copy)]
pub struct EnvContext {
    pub reading: bool,
    pub current_buffer_sym: SymbolId,
    pub popup_buffer_sym: SymbolId,
}

impl EnvContext {
    fn redirect(&self, sym: SymbolId) -> SymbolId {
        if self.reading && sym == self.current_buffer_sym {
            self.popup_buffer_sym
        } else {
            sym
        }
    }
}

/// Create a new environment whose parent is `parent` (`Nil` or another
/// `Environment` value).
pub fn create(arena: &mut Arena, parent: Value) -> Value {
    arena.make_environment(parent)
}

/// Walk the parent chain until `sym` is found or the chain ends in `Nil`.
pub fn get(arena: &Arena, env: Value, sym: SymbolId, ctx: &EnvContext) -> Result<Value> {
    let sym = ctx.redirect(sym);
    let mut cur = env;
    loop {
        let data = arena.env(cur)?;
        if let Some(v) = data.table.get(&sym) {
            return Ok(*v);
        }
        match data.parent {
            Value::Nil => return Err(LiteError::not_bound(&format!("#{}", sym.0))),
            parent => cur = parent,
        }
    }
}

/// Like `get`, but returns `None` instead of an error when unbound — used
/// by the evaluator's symbol-lookup rule, which needs to distinguish
/// "not found anywhere" from a successful-but-nil binding.
pub fn try_get(arena: &Arena, env: Value, sym: SymbolId, ctx: &EnvContext) -> Option<Value> {
    get(arena, env, sym, ctx).ok()
}

/// `set` writes only to the current environment (spec §3): no parent walk.
pub fn set(arena: &mut Arena, env: Value, sym: SymbolId, value: Value, ctx: &EnvContext) -> Result<()> {
    let sym = ctx.redirect(sym);
    let data = arena.env_mut(env)?;
    data.table.insert(sym, value);
    Ok(())
}

/// Writes to the environment that already binds `sym`, walking the parent
/// chain to find it; falls back to `env` itself if unbound anywhere
/// (used by `setq`-like assignment where a missing binding still defines
/// one locally rather than erroring).
pub fn set_existing(
    arena: &mut Arena,
    env: Value,
    sym: SymbolId,
    value: Value,
    ctx: &EnvContext,
) -> Result<()> {
    let sym = ctx.redirect(sym);
    let mut cur = env;
    loop {
        let parent = {
            let data = arena.env(cur)?;
            if data.table.contains_key(&sym) {
                None
            } else {
                Some(data.parent)
            }
        };
        match parent {
            None => {
                arena.env_mut(cur)?.table.insert(sym, value);
                return Ok(());
            }
            Some(Value::Nil) => {
                arena.env_mut(env)?.table.insert(sym, value);
                return Ok(());
            }
            Some(next) => cur = next,
        }
    }
}
