//! The input pipeline (spec §4.8): turns a keystring plus the modifier
//! bitset into either a nested-keymap descent, a rebinding, a self-insert,
//! the symbol sentinels `IGNORE`/`SELF-INSERT`, or a Lisp expression to
//! evaluate — bounded by a single 256-step recursion counter shared across
//! modifier-layer resolution and the key loop (spec's Scenario S6).
//!
//! A keymap value is tagged data, not a distinct Rust type: `(KEYMAP
//! (key1 . action1) (key2 . action2) ...)`, a pair whose head is the
//! well-known `KEYMAP` symbol and whose tail is an alist from keystring (a
//! `Str`) to action. This is what disambiguates a nested keymap from an
//! ordinary Lisp form to evaluate — both are otherwise just a `Pair`.

use crate::error::Result;
use crate::gui::InputEvent;
use crate::key::{is_ignored_control_char, Modifier};
use crate::state::EditorState;
use crate::value::Value;

const RECURSION_LIMIT: u32 = 256;

/// Handles one event from the `EventSource`. Modifier up/down only flip
/// bits in the bitset (spec: "must never traverse the keymap"); `KeyUp`
/// has no pipeline of its own — only `KeyDown` drives dispatch.
pub fn handle_event(state: &mut EditorState, event: InputEvent) -> Result<()> {
    match event {
        InputEvent::ModifierDown(m) => {
            state.modifiers.down(m);
            Ok(())
        }
        InputEvent::ModifierUp(m) => {
            state.modifiers.up(m);
            Ok(())
        }
        InputEvent::KeyDown(keystring) => dispatch_keydown(state, &keystring),
        InputEvent::KeyUp(_) => Ok(()),
    }
}

fn is_keymap_value(state: &EditorState, v: Value) -> bool {
    match v {
        Value::Pair(_) => matches!(state.arena.car(v), Ok(Value::Symbol(s)) if s == state.wk.keymap),
        _ => false,
    }
}

fn keymap_alist(state: &EditorState, keymap_value: Value) -> Value {
    state.arena.cdr(keymap_value).unwrap_or(Value::Nil)
}

/// `assoc`-style walk of a keymap's alist for `key`.
fn keymap_lookup(state: &EditorState, keymap_value: Value, key: &str) -> Option<Value> {
    let entries = crate::value::list_to_vec(&state.arena, keymap_alist(state, keymap_value)).ok()?;
    for entry in entries {
        let Value::Pair(_) = entry else { continue };
        let Ok(car) = state.arena.car(entry) else { continue };
        let Ok(bytes) = state.arena.string_bytes(car) else { continue };
        if bytes == key.as_bytes() {
            return state.arena.cdr(entry).ok();
        }
    }
    None
}

fn root_keymap(state: &EditorState) -> Option<Value> {
    let ctx = state.env_ctx();
    match crate::env::get(&state.arena, state.global_env, state.wk.keymap, &ctx) {
        Ok(v) if is_keymap_value(state, v) => Some(v),
        _ => None,
    }
}

fn get_current_keymap(state: &EditorState, root: Value) -> Value {
    let ctx = state.env_ctx();
    match crate::env::get(&state.arena, state.global_env, state.wk.current_keymap, &ctx) {
        Ok(v) if is_keymap_value(state, v) => v,
        _ => root,
    }
}

fn set_current_keymap(state: &mut EditorState, v: Value) {
    let ctx = state.env_ctx();
    let _ = crate::env::set(&mut state.arena, state.global_env, state.wk.current_keymap, v, &ctx);
}

fn buffer_insert(state: &mut EditorState, k: &str) -> Result<()> {
    let id = state.current_buffer()?;
    state.buffers.get_mut(id).insert(k.as_bytes());
    Ok(())
}

/// A minimal read-syntax renderer for the footline (spec §4.8 step 2: "set
/// the footline to the printed result"). Doesn't need to match the
/// `PRINT`/`PRINS` builtins' output exactly — just enough for a human to
/// read what a keybinding evaluated to.
fn render_value(state: &EditorState, v: Value) -> Vec<u8> {
    match v {
        Value::Nil => b"NIL".to_vec(),
        Value::Integer(n) => n.to_string().into_bytes(),
        Value::Symbol(s) => state.symbols.name(s).as_bytes().to_vec(),
        Value::Str(_) => state.arena.string_bytes(v).unwrap_or(&[]).to_vec(),
        Value::Pair(_) => b"(...)".to_vec(),
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

/// Outcome of resolving the modifier layer (spec §4.8 step 1): either a
/// keymap to continue the key loop from, or an early stop (the keystroke
/// was discarded or the recursion bound was hit).
enum LayerResolution {
    Continue(Value),
    Stop,
}

/// Step 1: for each pressed modifier, walk rebinding strings (incrementing
/// `recursion`) until a nested keymap is found, an unbound required
/// modifier discards the keystroke, or the recursion bound is hit.
fn resolve_modifier_layer(state: &mut EditorState, root: Value, mut current: Value, recursion: &mut u32) -> LayerResolution {
    let pressed: Vec<Modifier> = state.modifiers.pressed().collect();
    for modifier in pressed {
        let mut layer_key = modifier.layer_keystring().to_string();
        loop {
            if *recursion >= RECURSION_LIMIT {
                state.gui.set_footline("Keybinding recursion limit exceeded.");
                set_current_keymap(state, root);
                return LayerResolution::Stop;
            }
            match keymap_lookup(state, current, &layer_key) {
                None => {
                    if modifier.is_optional() {
                        break;
                    }
                    state.gui.set_footline("Undefined keybinding!");
                    set_current_keymap(state, root);
                    return LayerResolution::Stop;
                }
                Some(v @ Value::Str(_)) => {
                    let bytes = state.arena.string_bytes(v).unwrap_or(&[]).to_vec();
                    layer_key = String::from_utf8_lossy(&bytes).into_owned();
                    *recursion += 1;
                }
                Some(v) if is_keymap_value(state, v) => {
                    current = v;
                    break;
                }
                Some(_) => {
                    // Neither a rebinding nor a nested keymap: not a
                    // meaningful modifier-layer binding. Leave the current
                    // keymap untouched and move on to the next modifier.
                    break;
                }
            }
        }
    }
    LayerResolution::Continue(current)
}

/// Step 2: the key loop proper.
fn run_key_loop(state: &mut EditorState, root: Value, mut current: Value, mut k: String, recursion: &mut u32) -> Result<()> {
    loop {
        if *recursion >= RECURSION_LIMIT {
            state.gui.set_footline("Keybinding recursion limit exceeded.");
            set_current_keymap(state, root);
            return Ok(());
        }
        match keymap_lookup(state, current, &k) {
            Some(v) if is_keymap_value(state, v) => {
                set_current_keymap(state, v);
                return Ok(());
            }
            None => {
                if current == root {
                    buffer_insert(state, &k)?;
                    set_current_keymap(state, root);
                    return Ok(());
                }
                current = root;
                *recursion += 1;
                continue;
            }
            Some(Value::Symbol(s)) if s == state.wk.ignore => {
                set_current_keymap(state, root);
                return Ok(());
            }
            Some(Value::Symbol(s)) if s == state.wk.self_insert => {
                buffer_insert(state, &k)?;
                set_current_keymap(state, root);
                return Ok(());
            }
            // Bound to a string: treated as a re-dispatch, exactly like the
            // modifier layer's own rebinding case — not a value to evaluate.
            Some(v @ Value::Str(_)) => {
                let bytes = state.arena.string_bytes(v).unwrap_or(&[]).to_vec();
                k = String::from_utf8_lossy(&bytes).into_owned();
                *recursion += 1;
                continue;
            }
            Some(form) => {
                match crate::eval::eval(state, form, state.global_env) {
                    Ok(result) => {
                        let rendered = render_value(state, result);
                        state.gui.set_footline(rendered);
                    }
                    Err(e) => {
                        state.gui.set_footline(e.to_string());
                    }
                }
                set_current_keymap(state, root);
                return Ok(());
            }
        }
    }
}

/// Runs the full algorithm of spec §4.8 for one keystring.
fn dispatch_keydown(state: &mut EditorState, keystring: &str) -> Result<()> {
    if is_ignored_control_char(keystring) {
        return Ok(());
    }
    let Some(root) = root_keymap(state) else {
        state.gui.set_footline("No keymap configured.");
        return Ok(());
    };

    let mut recursion: u32 = 0;
    let current = get_current_keymap(state, root);

    let current = match resolve_modifier_layer(state, root, current, &mut recursion) {
        LayerResolution::Stop => return Ok(()),
        LayerResolution::Continue(v) => v,
    };

    run_key_loop(state, root, current, keystring.to_string(), &mut recursion)
}
