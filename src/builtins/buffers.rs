//! Buffer primitives (spec §4.6): open/path/table, edit and history ops,
//! point/mark/region, seeking, and line queries. Every op takes the
//! target buffer as an explicit first argument, mirroring the `(b, ...)`
//! signatures in spec §4.2's table.

use super::{args_vec, bool_value, expect_buffer, expect_count, expect_integer, expect_string_bytes, nth, register};
use crate::buffer::Direction;
use crate::error::{LiteError, Result};
use crate::state::EditorState;
use crate::value::Value;
use std::path::PathBuf;

fn direction_of(n: i64) -> Direction {
    if n >= 0 {
        Direction::Forward
    } else {
        Direction::Backward
    }
}

fn open(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-OPEN")?;
    let path_bytes = expect_string_bytes(state, nth(&items, 0, "BUFFER-OPEN")?, "BUFFER-OPEN")?.to_vec();
    let path = PathBuf::from(String::from_utf8_lossy(&path_bytes).into_owned());
    let id = state.open_buffer(Some(&path))?;
    Ok(Value::Buffer(id))
}

fn path(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-PATH")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-PATH")?, "BUFFER-PATH")?;
    match state.buffers.get(id).path.as_ref() {
        Some(p) => Ok(state.arena.make_string(p.to_string_lossy().into_owned().into_bytes())),
        None => Ok(Value::Nil),
    }
}

fn table(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 0, "BUFFER-TABLE")?;
    let ids: Vec<Value> = state.buffers.iter().map(|(id, _)| Value::Buffer(id)).collect();
    Ok(crate::value::vec_to_list(&mut state.arena, &ids))
}

fn insert(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "BUFFER-INSERT")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-INSERT")?, "BUFFER-INSERT")?;
    let bytes = expect_string_bytes(state, nth(&items, 1, "BUFFER-INSERT")?, "BUFFER-INSERT")?.to_vec();
    state.buffers.get_mut(id).insert(&bytes);
    Ok(Value::Nil)
}

fn remove(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "BUFFER-REMOVE")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-REMOVE")?, "BUFFER-REMOVE")?;
    let n = expect_integer(nth(&items, 1, "BUFFER-REMOVE")?, "BUFFER-REMOVE")?;
    if n < 0 {
        return Err(LiteError::arguments("BUFFER-REMOVE: count must be non-negative"));
    }
    let removed = state.buffers.get_mut(id).remove_bytes(n as usize);
    Ok(Value::Integer(removed as i64))
}

fn remove_forward(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "BUFFER-REMOVE-FORWARD")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-REMOVE-FORWARD")?, "BUFFER-REMOVE-FORWARD")?;
    let n = expect_integer(nth(&items, 1, "BUFFER-REMOVE-FORWARD")?, "BUFFER-REMOVE-FORWARD")?;
    if n < 0 {
        return Err(LiteError::arguments("BUFFER-REMOVE-FORWARD: count must be non-negative"));
    }
    let removed = state.buffers.get_mut(id).remove_bytes_forward(n as usize);
    Ok(Value::Integer(removed as i64))
}

fn undo(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-UNDO")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-UNDO")?, "BUFFER-UNDO")?;
    Ok(bool_value(state.buffers.get_mut(id).undo()))
}

fn redo(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-REDO")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-REDO")?, "BUFFER-REDO")?;
    Ok(bool_value(state.buffers.get_mut(id).redo()))
}

fn set_point(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "BUFFER-SET-POINT")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-SET-POINT")?, "BUFFER-SET-POINT")?;
    let i = expect_integer(nth(&items, 1, "BUFFER-SET-POINT")?, "BUFFER-SET-POINT")?;
    state.buffers.get_mut(id).set_point(i.max(0) as usize);
    Ok(Value::Nil)
}

fn point(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-POINT")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-POINT")?, "BUFFER-POINT")?;
    Ok(Value::Integer(state.buffers.get(id).point() as i64))
}

fn index(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "BUFFER-INDEX")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-INDEX")?, "BUFFER-INDEX")?;
    let i = expect_integer(nth(&items, 1, "BUFFER-INDEX")?, "BUFFER-INDEX")?;
    if i < 0 {
        return Err(LiteError::arguments("BUFFER-INDEX: index must be non-negative"));
    }
    Ok(Value::Integer(state.buffers.get(id).byte_at(i as usize) as i64))
}

fn string(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-STRING")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-STRING")?, "BUFFER-STRING")?;
    let bytes = state.buffers.get(id).contents();
    Ok(state.arena.make_string(bytes))
}

fn lines(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-LINES")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-LINES")?, "BUFFER-LINES")?;
    let contents = state.buffers.get(id).contents();
    let count = contents.iter().filter(|&&b| b == b'\n').count();
    Ok(Value::Integer(count as i64))
}

fn nth_line(contents: &[u8], row: usize) -> Option<Vec<u8>> {
    contents.split(|&b| b == b'\n').nth(row).map(|s| s.to_vec())
}

fn line(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "BUFFER-LINE")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-LINE")?, "BUFFER-LINE")?;
    let row = expect_integer(nth(&items, 1, "BUFFER-LINE")?, "BUFFER-LINE")?;
    if row < 0 {
        return Err(LiteError::arguments("BUFFER-LINE: row must be non-negative"));
    }
    let contents = state.buffers.get(id).contents();
    match nth_line(&contents, row as usize) {
        Some(bytes) => Ok(state.arena.make_string(bytes)),
        None => Err(LiteError::arguments("BUFFER-LINE: row out of range")),
    }
}

fn current_line(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-CURRENT-LINE")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-CURRENT-LINE")?, "BUFFER-CURRENT-LINE")?;
    let buffer = state.buffers.get(id);
    let (row, _) = buffer.row_col(buffer.point());
    let contents = buffer.contents();
    match nth_line(&contents, row) {
        Some(bytes) => Ok(state.arena.make_string(bytes)),
        None => Ok(state.arena.make_string(Vec::new())),
    }
}

fn seek_byte(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 3, "BUFFER-SEEK-BYTE")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-SEEK-BYTE")?, "BUFFER-SEEK-BYTE")?;
    let ctrl = expect_string_bytes(state, nth(&items, 1, "BUFFER-SEEK-BYTE")?, "BUFFER-SEEK-BYTE")?.to_vec();
    let dir = expect_integer(nth(&items, 2, "BUFFER-SEEK-BYTE")?, "BUFFER-SEEK-BYTE")?;
    let moved = state.buffers.get_mut(id).seek_until_byte(&ctrl, direction_of(dir));
    Ok(Value::Integer(moved as i64))
}

fn seek_past_byte(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 3, "BUFFER-SEEK-PAST-BYTE")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-SEEK-PAST-BYTE")?, "BUFFER-SEEK-PAST-BYTE")?;
    let ctrl = expect_string_bytes(state, nth(&items, 1, "BUFFER-SEEK-PAST-BYTE")?, "BUFFER-SEEK-PAST-BYTE")?.to_vec();
    let dir = expect_integer(nth(&items, 2, "BUFFER-SEEK-PAST-BYTE")?, "BUFFER-SEEK-PAST-BYTE")?;
    let moved = state.buffers.get_mut(id).seek_while_byte(&ctrl, direction_of(dir));
    Ok(Value::Integer(moved as i64))
}

fn seek_substring(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 3, "BUFFER-SEEK-SUBSTRING")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-SEEK-SUBSTRING")?, "BUFFER-SEEK-SUBSTRING")?;
    let needle = expect_string_bytes(state, nth(&items, 1, "BUFFER-SEEK-SUBSTRING")?, "BUFFER-SEEK-SUBSTRING")?.to_vec();
    let dir = expect_integer(nth(&items, 2, "BUFFER-SEEK-SUBSTRING")?, "BUFFER-SEEK-SUBSTRING")?;
    let found = state.buffers.get_mut(id).seek_until_substr(&needle, direction_of(dir));
    Ok(bool_value(found))
}

fn set_mark(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "BUFFER-SET-MARK")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-SET-MARK")?, "BUFFER-SET-MARK")?;
    let i = expect_integer(nth(&items, 1, "BUFFER-SET-MARK")?, "BUFFER-SET-MARK")?;
    state.buffers.get_mut(id).set_mark(i.max(0) as usize);
    Ok(Value::Nil)
}

fn mark(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-MARK")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-MARK")?, "BUFFER-MARK")?;
    Ok(Value::Integer(state.buffers.get(id).mark() as i64))
}

fn mark_activated(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-MARK-ACTIVATED")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-MARK-ACTIVATED")?, "BUFFER-MARK-ACTIVATED")?;
    Ok(bool_value(state.buffers.get(id).mark_active()))
}

fn toggle_mark(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-TOGGLE-MARK")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-TOGGLE-MARK")?, "BUFFER-TOGGLE-MARK")?;
    state.buffers.get_mut(id).toggle_mark();
    Ok(Value::Nil)
}

fn set_mark_activation(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 2, "BUFFER-SET-MARK-ACTIVATION")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-SET-MARK-ACTIVATION")?, "BUFFER-SET-MARK-ACTIVATION")?;
    let active = !nth(&items, 1, "BUFFER-SET-MARK-ACTIVATION")?.is_nil();
    state.buffers.get_mut(id).set_mark_activation(active);
    Ok(Value::Nil)
}

fn region(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-REGION")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-REGION")?, "BUFFER-REGION")?;
    let bytes = state.buffers.get(id).region();
    Ok(state.arena.make_string(bytes))
}

fn region_length(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-REGION-LENGTH")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-REGION-LENGTH")?, "BUFFER-REGION-LENGTH")?;
    Ok(Value::Integer(state.buffers.get(id).region_length() as i64))
}

fn save(state: &mut EditorState, args: Value) -> Result<Value> {
    let items = args_vec(state, args)?;
    expect_count(&items, 1, "BUFFER-SAVE")?;
    let id = expect_buffer(nth(&items, 0, "BUFFER-SAVE")?, "BUFFER-SAVE")?;
    state.buffers.get_mut(id).save()?;
    Ok(Value::Nil)
}

pub fn install(state: &mut EditorState) {
    register(state, "BUFFER-OPEN", "open or reuse a buffer by path", open);
    register(state, "BUFFER-PATH", "a buffer's path, or NIL", path);
    register(state, "BUFFER-TABLE", "every open buffer", table);
    register(state, "BUFFER-INSERT", "insert a string at point", insert);
    register(state, "BUFFER-REMOVE", "remove bytes backward from point", remove);
    register(state, "BUFFER-REMOVE-FORWARD", "remove bytes forward from point", remove_forward);
    register(state, "BUFFER-UNDO", "undo the last edit", undo);
    register(state, "BUFFER-REDO", "redo the last undone edit", redo);
    register(state, "BUFFER-SET-POINT", "move point", set_point);
    register(state, "BUFFER-POINT", "the current point", point);
    register(state, "BUFFER-INDEX", "the byte at an index", index);
    register(state, "BUFFER-STRING", "the buffer's full contents", string);
    register(state, "BUFFER-LINES", "the number of lines", lines);
    register(state, "BUFFER-LINE", "the text of one line", line);
    register(state, "BUFFER-CURRENT-LINE", "the text of point's line", current_line);
    register(state, "BUFFER-SEEK-BYTE", "seek to the next matching byte", seek_byte);
    register(state, "BUFFER-SEEK-PAST-BYTE", "seek past a run of matching bytes", seek_past_byte);
    register(state, "BUFFER-SEEK-SUBSTRING", "seek to the next occurrence of a substring", seek_substring);
    register(state, "BUFFER-SET-MARK", "move the mark", set_mark);
    register(state, "BUFFER-MARK", "the current mark position", mark);
    register(state, "BUFFER-MARK-ACTIVATED", "whether the mark is active", mark_activated);
    register(state, "BUFFER-TOGGLE-MARK", "flip mark activation", toggle_mark);
    register(state, "BUFFER-SET-MARK-ACTIVATION", "set mark activation explicitly", set_mark_activation);
    register(state, "BUFFER-REGION", "the text between point and mark", region);
    register(state, "BUFFER-REGION-LENGTH", "the length of the region", region_length);
    register(state, "BUFFER-SAVE", "write the buffer to its path", save);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::vec_to_list;

    fn new_buffer(state: &mut EditorState) -> Value {
        let id = state.buffers.open(None).unwrap();
        Value::Buffer(id)
    }

    #[test]
    fn insert_point_and_string_round_trip() {
        let mut state = EditorState::new();
        let b = new_buffer(&mut state);
        let s = state.arena.make_string(b"hi".to_vec());
        let args = vec_to_list(&mut state.arena, &[b, s]);
        insert(&mut state, args).unwrap();

        let args = vec_to_list(&mut state.arena, &[b]);
        assert_eq!(point(&mut state, args.clone()).unwrap(), Value::Integer(2));
        let result = string(&mut state, args).unwrap();
        assert_eq!(state.arena.string_bytes(result).unwrap(), b"hi\n");
    }

    #[test]
    fn undo_redo_builtins_report_success() {
        let mut state = EditorState::new();
        let b = new_buffer(&mut state);
        let args = vec_to_list(&mut state.arena, &[b]);
        assert_eq!(undo(&mut state, args.clone()).unwrap(), Value::Nil);

        let s = state.arena.make_string(b"x".to_vec());
        let insert_args = vec_to_list(&mut state.arena, &[b, s]);
        insert(&mut state, insert_args).unwrap();

        assert_eq!(undo(&mut state, args.clone()).unwrap(), Value::Integer(1));
        assert_eq!(redo(&mut state, args).unwrap(), Value::Integer(1));
    }

    #[test]
    fn mark_and_region_builtins() {
        let mut state = EditorState::new();
        let b = new_buffer(&mut state);
        let s = state.arena.make_string(b"hello world".to_vec());
        let args = vec_to_list(&mut state.arena, &[b, s]);
        insert(&mut state, args).unwrap();

        let set_mark_args = vec_to_list(&mut state.arena, &[b, Value::Integer(0)]);
        set_mark(&mut state, set_mark_args).unwrap();
        let set_point_args = vec_to_list(&mut state.arena, &[b, Value::Integer(5)]);
        set_point(&mut state, set_point_args).unwrap();

        let region_args = vec_to_list(&mut state.arena, &[b]);
        let result = region(&mut state, region_args).unwrap();
        assert_eq!(state.arena.string_bytes(result).unwrap(), b"hello");
    }

    #[test]
    fn current_line_reflects_point_row() {
        let mut state = EditorState::new();
        let b = new_buffer(&mut state);
        let s = state.arena.make_string(b"ab\ncde".to_vec());
        let args = vec_to_list(&mut state.arena, &[b, s]);
        insert(&mut state, args).unwrap();

        let set_point_args = vec_to_list(&mut state.arena, &[b, Value::Integer(0)]);
        set_point(&mut state, set_point_args).unwrap();
        let line_args = vec_to_list(&mut state.arena, &[b]);
        let result = current_line(&mut state, line_args).unwrap();
        assert_eq!(state.arena.string_bytes(result).unwrap(), b"ab");
    }
}
