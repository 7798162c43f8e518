//! I/O and GUI-contract primitives (spec §4.6): clipboard, font/window
//! hints, scrolling, and the prompt-mode (`READ-PROMPTED`/`FINISH-READ`)
//! pair. These operate against `state.gui` (the display snapshot) and the
//! popup buffer rather than any concrete terminal backend — a `DisplaySink`
//! decides what, if anything, to do with the hints.

use super::{args_vec, expect_count, expect_string_bytes, nth, register};
use crate::error::{LiteError, Result};
use crate::state::EditorState;
use crate::value::Value;

fn clipboard_copy(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "CLIPBOARD-COPY")?;
    let bytes = expect_string_bytes(state, nth(&items, 0, "CLIPBOARD-COPY")?, "CLIPBOARD-COPY")?.to_vec();
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| LiteError::new(crate::error::ErrorKind::Generic, "CLIPBOARD", e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| LiteError::new(crate::error::ErrorKind::Generic, "CLIPBOARD", e.to_string()))?;
    Ok(items[0])
}

/// `clipboard-cut`: the region's text goes to the clipboard and is removed
/// from the current buffer.
fn clipboard_cut(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "CLIPBOARD-CUT")?;
    let id = state.current_buffer()?;
    let region = state.buffers.get(id).region();
    let text = String::from_utf8_lossy(&region).into_owned();
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| LiteError::new(crate::error::ErrorKind::Generic, "CLIPBOARD", e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| LiteError::new(crate::error::ErrorKind::Generic, "CLIPBOARD", e.to_string()))?;
    let buffer = state.buffers.get_mut(id);
    let len = buffer.region_length();
    if buffer.point() <= buffer.mark() {
        buffer.remove_bytes_forward(len);
    } else {
        buffer.remove_bytes(len);
    }
    Ok(state.arena.make_string(region))
}

fn clipboard_paste(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "CLIPBOARD-PASTE")?;
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| LiteError::new(crate::error::ErrorKind::Generic, "CLIPBOARD", e.to_string()))?;
    let text = clipboard
        .get_text()
        .map_err(|e| LiteError::new(crate::error::ErrorKind::Generic, "CLIPBOARD", e.to_string()))?;
    let id = state.current_buffer()?;
    state.buffers.get_mut(id).insert(text.as_bytes());
    Ok(state.arena.make_string(text.into_bytes()))
}

fn change_font(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "CHANGE-FONT")?;
    let bytes = expect_string_bytes(state, nth(&items, 0, "CHANGE-FONT")?, "CHANGE-FONT")?.to_vec();
    state.gui.font = String::from_utf8_lossy(&bytes).into_owned();
    Ok(items[0])
}

fn change_font_size(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "CHANGE-FONT-SIZE")?;
    let n = super::expect_integer(nth(&items, 0, "CHANGE-FONT-SIZE")?, "CHANGE-FONT-SIZE")?;
    state.gui.font_size = n;
    Ok(Value::Integer(n))
}

fn window_size(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "WINDOW-SIZE")?;
    let cols = Value::Integer(state.gui.window_cols as i64);
    let rows = Value::Integer(state.gui.window_rows as i64);
    Ok(state.arena.cons(cols, rows))
}

fn change_window_size(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "CHANGE-WINDOW-SIZE")?;
    let cols = super::expect_integer(nth(&items, 0, "CHANGE-WINDOW-SIZE")?, "CHANGE-WINDOW-SIZE")?;
    let rows = super::expect_integer(nth(&items, 1, "CHANGE-WINDOW-SIZE")?, "CHANGE-WINDOW-SIZE")?;
    if cols < 0 || rows < 0 {
        return Err(LiteError::arguments("CHANGE-WINDOW-SIZE: dimensions must be non-negative"));
    }
    state.gui.window_cols = cols as u32;
    state.gui.window_rows = rows as u32;
    Ok(Value::Nil)
}

fn change_window_mode(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "CHANGE-WINDOW-MODE")?;
    let mode = super::expect_symbol(nth(&items, 0, "CHANGE-WINDOW-MODE")?, "CHANGE-WINDOW-MODE")?;
    state.gui.window_mode = state.symbols.name(mode).to_string();
    Ok(items[0])
}

fn scroll_by(state: &mut EditorState, rows: i64) {
    if rows >= 0 {
        state.gui.scroll_row = state.gui.scroll_row.saturating_add(rows as usize);
    } else {
        state.gui.scroll_row = state.gui.scroll_row.saturating_sub((-rows) as usize);
    }
}

fn scroll_up(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "SCROLL-UP")?;
    scroll_by(state, -1);
    Ok(Value::Integer(state.gui.scroll_row as i64))
}

fn scroll_down(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "SCROLL-DOWN")?;
    scroll_by(state, 1);
    Ok(Value::Integer(state.gui.scroll_row as i64))
}

fn scroll_to(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "SCROLL-TO")?;
    let row = super::expect_integer(nth(&items, 0, "SCROLL-TO")?, "SCROLL-TO")?;
    state.gui.scroll_row = row.max(0) as usize;
    Ok(Value::Integer(state.gui.scroll_row as i64))
}

/// Enters prompt mode: binds `POPUP-BUFFER` to an emptied scratch buffer,
/// shows `prompt` as the popup's label, and redirects `CURRENT-BUFFER`
/// lookups there (`EditorState::reading`) until `FINISH-READ` runs.
fn read_prompted(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "READ-PROMPTED")?;
    let prompt = expect_string_bytes(state, nth(&items, 0, "READ-PROMPTED")?, "READ-PROMPTED")?.to_vec();

    let ctx = state.env_ctx();
    let popup_value = crate::env::get(&state.arena, state.global_env, state.wk.popup_buffer, &ctx)?;
    let popup_id = match popup_value {
        Value::Buffer(id) => id,
        _ => return Err(LiteError::type_error("POPUP-BUFFER is not bound to a buffer")),
    };
    let popup = state.buffers.get_mut(popup_id);
    popup.set_point(0);
    let len = popup.len();
    popup.remove_bytes_forward(len);
    popup.insert(b"\n");
    popup.set_point(0);

    state.gui.popup = Some(crate::gui::AnnotatedText::plain(prompt));
    state.gui.reading = true;
    state.reading = true;
    Ok(Value::Nil)
}

/// Leaves prompt mode and returns the popup buffer's contents (minus its
/// trailing newline) as a string.
fn finish_read(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "FINISH-READ")?;

    let ctx = state.env_ctx();
    let popup_value = crate::env::get(&state.arena, state.global_env, state.wk.popup_buffer, &ctx)?;
    let popup_id = match popup_value {
        Value::Buffer(id) => id,
        _ => return Err(LiteError::type_error("POPUP-BUFFER is not bound to a buffer")),
    };
    let mut contents = state.buffers.get(popup_id).contents();
    if contents.last() == Some(&b'\n') {
        contents.pop();
    }

    state.reading = false;
    state.gui.reading = false;
    state.gui.popup = None;
    Ok(state.arena.make_string(contents))
}

pub fn install(state: &mut EditorState) {
    register(state, "CLIPBOARD-CUT", "cut the current region to the system clipboard", clipboard_cut);
    register(state, "CLIPBOARD-COPY", "copy a string to the system clipboard", clipboard_copy);
    register(state, "CLIPBOARD-PASTE", "paste the system clipboard into the current buffer", clipboard_paste);
    register(state, "CHANGE-FONT", "set the display font hint", change_font);
    register(state, "CHANGE-FONT-SIZE", "set the display font size hint", change_font_size);
    register(state, "WINDOW-SIZE", "current window size, as (cols . rows)", window_size);
    register(state, "CHANGE-WINDOW-SIZE", "set the window size hint", change_window_size);
    register(state, "CHANGE-WINDOW-MODE", "set the window mode hint", change_window_mode);
    register(state, "SCROLL-UP", "scroll the display up one row", scroll_up);
    register(state, "SCROLL-DOWN", "scroll the display down one row", scroll_down);
    register(state, "SCROLL-TO", "scroll the display to an absolute row", scroll_to);
    register(state, "READ-PROMPTED", "enter prompt mode with a popup label", read_prompted);
    register(state, "FINISH-READ", "leave prompt mode, returning the popup's text", finish_read);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::vec_to_list;

    #[test]
    fn change_window_size_updates_the_gui_context() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[Value::Integer(100), Value::Integer(40)]);
        change_window_size(&mut state, args).unwrap();
        assert_eq!(state.gui.window_cols, 100);
        assert_eq!(state.gui.window_rows, 40);
    }

    #[test]
    fn window_size_reports_current_dimensions() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[]);
        let result = window_size(&mut state, args).unwrap();
        assert_eq!(state.arena.car(result).unwrap(), Value::Integer(80));
        assert_eq!(state.arena.cdr(result).unwrap(), Value::Integer(24));
    }

    #[test]
    fn scroll_up_and_down_move_the_scroll_row() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[]);
        scroll_down(&mut state, args).unwrap();
        let args = vec_to_list(&mut state.arena, &[]);
        scroll_down(&mut state, args).unwrap();
        assert_eq!(state.gui.scroll_row, 2);
        let args = vec_to_list(&mut state.arena, &[]);
        scroll_up(&mut state, args).unwrap();
        assert_eq!(state.gui.scroll_row, 1);
    }

    #[test]
    fn scroll_up_at_zero_saturates_instead_of_underflowing() {
        let mut state = EditorState::new();
        let args = vec_to_list(&mut state.arena, &[]);
        scroll_up(&mut state, args).unwrap();
        assert_eq!(state.gui.scroll_row, 0);
    }

    #[test]
    fn read_prompted_then_finish_read_round_trips_through_the_popup_buffer() {
        let mut state = EditorState::new();
        let prompt = state.arena.make_string(b"Find file: ".to_vec());
        let args = vec_to_list(&mut state.arena, &[prompt]);
        read_prompted(&mut state, args).unwrap();
        assert!(state.reading);
        assert!(state.gui.popup.is_some());

        let ctx = state.env_ctx();
        let popup_value = crate::env::get(&state.arena, state.global_env, state.wk.popup_buffer, &ctx).unwrap();
        let popup_id = match popup_value {
            Value::Buffer(id) => id,
            _ => panic!("expected a buffer"),
        };
        state.buffers.get_mut(popup_id).insert(b"notes.lisp");

        let args = vec_to_list(&mut state.arena, &[]);
        let result = finish_read(&mut state, args).unwrap();
        assert_eq!(state.arena.string_bytes(result).unwrap(), b"notes.lisp");
        assert!(!state.reading);
        assert!(state.gui.popup.is_none());
    }

    #[test]
    fn change_window_mode_stores_the_symbol_name() {
        let mut state = EditorState::new();
        let sym = state.symbols.intern("FULLSCREEN");
        let args = vec_to_list(&mut state.arena, &[Value::Symbol(sym)]);
        change_window_mode(&mut state, args).unwrap();
        assert_eq!(state.gui.window_mode, "FULLSCREEN");
    }
}
