//! The editor's single "global state" value (spec §9's "Global singletons"
//! design note): the symbol table, arena, root environment, buffer table,
//! modifier bitset, and GUI context all live here instead of as module
//! statics, and are threaded through the core explicitly.

use crate::buffer::BufferTable;
use crate::env::{self, EnvContext};
use crate::error::{LiteError, Result};
use crate::gc::{self, GcCounters, Pins};
use crate::gui::GuiContext;
use crate::key::ModifierState;
use crate::symbol::{SymbolId, SymbolTable};
use crate::value::{Arena, Value};

/// Symbol ids looked up once at startup and reused by the evaluator and
/// input pipeline, rather than re-interning well-known names on every
/// dispatch.
#[derive(Debug, Clone, Copy)]
pub struct WellKnown {
    pub quote: SymbolId,
    pub quasiquote: SymbolId,
    pub unquote: SymbolId,
    pub unquote_splicing: SymbolId,
    pub define: SymbolId,
    pub lambda: SymbolId,
    pub if_: SymbolId,
    pub while_: SymbolId,
    pub while_recurse_limit: SymbolId,
    pub sym: SymbolId,
    pub self_insert: SymbolId,
    pub ignore: SymbolId,
    pub current_buffer: SymbolId,
    pub popup_buffer: SymbolId,
    pub current_keymap: SymbolId,
    pub keymap: SymbolId,
}

impl WellKnown {
    fn new(symbols: &mut SymbolTable) -> Self {
        WellKnown {
            quote: symbols.intern("QUOTE"),
            quasiquote: symbols.intern("QUASIQUOTE"),
            unquote: symbols.intern("UNQUOTE"),
            unquote_splicing: symbols.intern("UNQUOTE-SPLICING"),
            define: symbols.intern("DEFINE"),
            lambda: symbols.intern("LAMBDA"),
            if_: symbols.intern("IF"),
            while_: symbols.intern("WHILE"),
            while_recurse_limit: symbols.intern("WHILE-RECURSE-LIMIT"),
            sym: symbols.intern("SYM"),
            self_insert: symbols.intern("SELF-INSERT"),
            ignore: symbols.intern("IGNORE"),
            current_buffer: symbols.intern("CURRENT-BUFFER"),
            popup_buffer: symbols.intern("POPUP-BUFFER"),
            current_keymap: symbols.intern("CURRENT-KEYMAP"),
            keymap: symbols.intern("KEYMAP"),
        }
    }
}

pub struct EditorState {
    pub arena: Arena,
    pub symbols: SymbolTable,
    pub global_env: Value,
    pub buffers: BufferTable,
    pub modifiers: ModifierState,
    pub gui: GuiContext,
    pub gc_counters: GcCounters,
    pub pins: Pins,
    pub wk: WellKnown,
    /// Prompt mode: while true, `CURRENT-BUFFER` lookups redirect to
    /// `POPUP-BUFFER` (spec §9's dynamic substitution).
    pub reading: bool,
    /// Set by the `QUIT-LISP` builtin; checked by `Editor::run` after every
    /// handled event.
    pub should_quit: bool,
    /// Depth of nested Lisp-level function/macro application, incremented
    /// and decremented around every `apply` of a `Closure`/`Macro` so
    /// unbounded recursion fails as a `LiteError` instead of overflowing
    /// the native stack.
    pub call_depth: u32,
}

impl EditorState {
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        let wk = WellKnown::new(&mut symbols);
        let mut arena = Arena::new();
        let global_env = env::create(&mut arena, Value::Nil);
        let mut buffers = BufferTable::new();
        // The popup buffer backs prompt-mode input (`READ-PROMPTED`) and
        // always exists, so `CURRENT-BUFFER`'s reading-mode redirect always
        // has somewhere to land.
        let popup_id = buffers.open(None).expect("an unnamed buffer never fails to open");

        let mut state = EditorState {
            arena,
            symbols,
            global_env,
            buffers,
            modifiers: ModifierState::new(),
            gui: GuiContext::new(),
            gc_counters: GcCounters::new(),
            pins: Pins::new(),
            wk,
            reading: false,
            should_quit: false,
            call_depth: 0,
        };
        let ctx = state.env_ctx();
        env::set(&mut state.arena, state.global_env, wk.popup_buffer, Value::Buffer(popup_id), &ctx)
            .expect("global environment always accepts a new binding");
        state
    }

    pub fn env_ctx(&self) -> EnvContext {
        EnvContext {
            reading: self.reading,
            current_buffer_sym: self.wk.current_buffer,
            popup_buffer_sym: self.wk.popup_buffer,
        }
    }

    /// Resolves `CURRENT-BUFFER` (or `POPUP-BUFFER` while reading) to a
    /// concrete buffer id.
    pub fn current_buffer(&self) -> Result<crate::buffer::BufferId> {
        let ctx = self.env_ctx();
        let v = env::get(&self.arena, self.global_env, self.wk.current_buffer, &ctx)?;
        match v {
            Value::Buffer(id) => Ok(id),
            _ => Err(LiteError::type_error("CURRENT-BUFFER is not bound to a buffer")),
        }
    }

    pub fn set_current_buffer(&mut self, id: crate::buffer::BufferId) -> Result<()> {
        let ctx = self.env_ctx();
        env::set(&mut self.arena, self.global_env, self.wk.current_buffer, Value::Buffer(id), &ctx)
    }

    /// Opens `path` (or an unnamed scratch buffer if `None`) and installs a
    /// fresh per-buffer environment parented to the global one — the full
    /// buffer-creation path `BUFFER-OPEN` and startup file-loading share.
    pub fn open_buffer(&mut self, path: Option<&std::path::Path>) -> Result<crate::buffer::BufferId> {
        let id = self.buffers.open(path)?;
        if self.buffers.get(id).environment.is_nil() {
            let env = env::create(&mut self.arena, self.global_env);
            self.buffers.get_mut(id).environment = env;
        }
        Ok(id)
    }

    /// Every GC root named in spec §4.7: the global environment, every
    /// live buffer's environment slot, the popup-buffer handle (if bound),
    /// and any transient pins. The symbol table is not included — it is
    /// never swept.
    fn roots(&self) -> Vec<Value> {
        let mut roots = vec![self.global_env];
        for (_, buffer) in self.buffers.iter() {
            roots.push(buffer.environment);
        }
        let ctx = self.env_ctx();
        if let Some(popup) = env::try_get(&self.arena, self.global_env, self.wk.popup_buffer, &ctx) {
            roots.push(popup);
        }
        roots.extend(self.pins.as_roots());
        roots
    }

    /// Runs a collection unconditionally.
    pub fn collect_garbage(&mut self) -> usize {
        let roots = self.roots();
        let freed = gc::collect(&mut self.arena, &roots);
        self.gc_counters.note_collected();
        freed
    }

    /// Called once per `eval` entry; collects if either trigger counter
    /// (spec §4.7) has been exceeded.
    pub fn note_eval_and_maybe_collect(&mut self) {
        self.gc_counters.note_eval();
        if self.gc_counters.should_collect(self.arena.pair_allocations_since_gc) {
            self.collect_garbage();
        }
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_buffer_round_trips_through_the_global_env() {
        let mut state = EditorState::new();
        let id = state.buffers.open(None).unwrap();
        state.set_current_buffer(id).unwrap();
        assert_eq!(state.current_buffer().unwrap(), id);
    }

    #[test]
    fn reading_mode_redirects_current_buffer_lookup() {
        let mut state = EditorState::new();
        let main = state.buffers.open(None).unwrap();
        let popup = state.buffers.open(None).unwrap();
        state.set_current_buffer(main).unwrap();

        let ctx = state.env_ctx();
        env::set(&mut state.arena, state.global_env, state.wk.popup_buffer, Value::Buffer(popup), &ctx).unwrap();

        state.reading = true;
        assert_eq!(state.current_buffer().unwrap(), popup);
        state.reading = false;
        assert_eq!(state.current_buffer().unwrap(), main);
    }

    #[test]
    fn collect_garbage_keeps_buffer_environments_reachable() {
        let mut state = EditorState::new();
        let id = state.buffers.open(None).unwrap();
        let env = env::create(&mut state.arena, state.global_env);
        state.buffers.get_mut(id).environment = env;
        let ctx = state.env_ctx();
        let marker = state.arena.cons(Value::Integer(42), Value::Nil);
        env::set(&mut state.arena, env, state.wk.sym, marker, &ctx).unwrap();

        state.collect_garbage();
        assert_eq!(env::get(&state.arena, env, state.wk.sym, &ctx).unwrap(), marker);
    }
}
