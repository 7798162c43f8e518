//! The rope-backed text buffer: path, contents, point/mark, undo/redo
//! history, and the global buffer table (spec §3, §4.2).
//!
//! Per the "Mark-active bit stolen from `mark_byte`" design note, the
//! activation flag is a plain `bool` field here, not the top bit of
//! `mark_byte` — the bit-packing was never a contract callers could see
//! through the accessors, so there is nothing to preserve.

use crate::error::{LiteError, Result};
use crate::file_io;
use crate::rope::Rope;
use crate::value::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Stable identity of a buffer. Buffers are never GC-managed (spec §3):
/// they live in `BufferTable` and are freed only at process shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// One entry of the undo/redo history (spec §3's `{ type, offset, length,
/// data }` record, split into the two cases that type tags).
#[derive(Debug, Clone)]
enum EditRecord {
    Insert { offset: usize, length: usize },
    Remove { offset: usize, data: Vec<u8> },
}

/// Applies `record` to `rope`, returning the edited rope, the point it
/// implies, and the inverse record to push onto the opposite stack.
/// `undo` and `redo` are this same operation run in opposite directions,
/// so they share it rather than duplicating the apply-and-invert logic.
fn apply_record(rope: &Rope, record: &EditRecord) -> (Rope, usize, EditRecord) {
    match record {
        EditRecord::Insert { offset, length } => {
            let removed = rope.slice(*offset, *offset + *length);
            let new_rope = rope.remove_span(*offset, *length);
            (new_rope, *offset, EditRecord::Remove { offset: *offset, data: removed })
        }
        EditRecord::Remove { offset, data } => {
            let new_rope = rope.insert(*offset, data);
            let point = offset + data.len();
            (new_rope, point, EditRecord::Insert { offset: *offset, length: data.len() })
        }
    }
}

pub struct Buffer {
    pub path: Option<PathBuf>,
    rope: Rope,
    point_byte: usize,
    mark_byte: usize,
    mark_active: bool,
    undo: Vec<EditRecord>,
    redo: Vec<EditRecord>,
    pub modified: bool,
    /// Per-buffer Lisp environment slot. `Value::Nil` until the caller
    /// (the interpreter's buffer-open path) installs a real environment,
    /// since building one requires an `Arena` this module doesn't own.
    pub environment: Value,
}

impl Buffer {
    /// `create`: reads `path` if given (empty file ⇒ `"\n"`), or starts an
    /// unnamed buffer at `"\n"` if `path` is `None`.
    pub fn create(path: Option<PathBuf>) -> Result<Self> {
        let bytes = match &path {
            // A path naming a file that doesn't exist yet is a new file,
            // not an error: it starts out as an empty buffer and is
            // created on the first `save`.
            Some(p) if p.exists() => {
                let contents = file_io::read_whole_file(p)?;
                if contents.is_empty() {
                    b"\n".to_vec()
                } else {
                    contents
                }
            }
            _ => b"\n".to_vec(),
        };
        Ok(Buffer {
            path,
            rope: Rope::new(&bytes),
            point_byte: 0,
            mark_byte: 0,
            mark_active: false,
            undo: Vec::new(),
            redo: Vec::new(),
            modified: false,
            environment: Value::Nil,
        })
    }

    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.rope.to_bytes()
    }

    pub fn byte_at(&self, i: usize) -> u8 {
        self.rope.byte_at(i)
    }

    pub fn point(&self) -> usize {
        self.point_byte
    }

    pub fn set_point(&mut self, i: usize) {
        self.point_byte = i.min(self.rope.len());
    }

    /// `mark()`: the activation bit is never mixed into this value.
    pub fn mark(&self) -> usize {
        self.mark_byte
    }

    pub fn mark_active(&self) -> bool {
        self.mark_active
    }

    pub fn set_mark(&mut self, i: usize) {
        self.mark_byte = i.min(self.rope.len());
    }

    pub fn toggle_mark(&mut self) {
        self.mark_active = !self.mark_active;
    }

    pub fn set_mark_activation(&mut self, active: bool) {
        self.mark_active = active;
    }

    /// `insert`: inserts `s` at point, advances point by `len(s)` (the
    /// off-by-one variants in the original are not carried over — see
    /// `SPEC_FULL.md`'s redesign notes).
    pub fn insert(&mut self, s: &[u8]) {
        if s.is_empty() {
            return;
        }
        let offset = self.point_byte;
        self.rope = self.rope.insert(offset, s);
        self.undo.push(EditRecord::Insert { offset, length: s.len() });
        self.redo.clear();
        self.point_byte = offset + s.len();
        self.modified = true;
    }

    pub fn insert_indexed(&mut self, i: usize, s: &[u8]) {
        if s.is_empty() {
            return;
        }
        let offset = i.min(self.rope.len());
        self.rope = self.rope.insert(offset, s);
        self.undo.push(EditRecord::Insert { offset, length: s.len() });
        self.redo.clear();
        self.point_byte = (offset + s.len()).min(self.rope.len());
        self.modified = true;
    }

    /// Removes up to `n` bytes backward from point; returns the amount
    /// actually removed.
    pub fn remove_bytes(&mut self, n: usize) -> usize {
        let n = n.min(self.point_byte);
        if n == 0 {
            return 0;
        }
        let offset = self.point_byte - n;
        let removed = self.rope.slice(offset, offset + n);
        self.rope = self.rope.remove_span(offset, n);
        self.undo.push(EditRecord::Remove { offset, data: removed });
        self.redo.clear();
        self.point_byte = offset;
        self.modified = true;
        n
    }

    /// Symmetric forward variant: point is unchanged.
    pub fn remove_bytes_forward(&mut self, n: usize) -> usize {
        let n = n.min(self.rope.len().saturating_sub(self.point_byte));
        if n == 0 {
            return 0;
        }
        let offset = self.point_byte;
        let removed = self.rope.slice(offset, offset + n);
        self.rope = self.rope.remove_span(offset, n);
        self.undo.push(EditRecord::Remove { offset, data: removed });
        self.redo.clear();
        self.modified = true;
        n
    }

    /// Pops the top of `undo`, applies its inverse, pushes the inverse onto
    /// `redo`. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo.pop() else {
            return false;
        };
        let (rope, point, inverse) = apply_record(&self.rope, &record);
        self.rope = rope;
        self.point_byte = point;
        self.redo.push(inverse);
        self.modified = true;
        true
    }

    /// Mirror of `undo`.
    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo.pop() else {
            return false;
        };
        let (rope, point, inverse) = apply_record(&self.rope, &record);
        self.rope = rope;
        self.point_byte = point;
        self.undo.push(inverse);
        self.modified = true;
        true
    }

    /// Bytes between `min(point, mark)` and `max(point, mark)`.
    pub fn region(&self) -> Vec<u8> {
        let (lo, hi) = if self.point_byte <= self.mark_byte {
            (self.point_byte, self.mark_byte)
        } else {
            (self.mark_byte, self.point_byte)
        };
        self.rope.slice(lo, hi)
    }

    pub fn region_length(&self) -> usize {
        self.point_byte.abs_diff(self.mark_byte)
    }

    /// Moves point to the next byte that IS in `ctrl`, in direction `dir`;
    /// returns the number of bytes moved.
    pub fn seek_until_byte(&mut self, ctrl: &[u8], dir: Direction) -> usize {
        let len = self.rope.len();
        let mut moved = 0;
        match dir {
            Direction::Forward => {
                while self.point_byte < len && !ctrl.contains(&self.rope.byte_at(self.point_byte)) {
                    self.point_byte += 1;
                    moved += 1;
                }
            }
            Direction::Backward => {
                while self.point_byte > 0 && !ctrl.contains(&self.rope.byte_at(self.point_byte - 1)) {
                    self.point_byte -= 1;
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Moves point past a run of bytes that ARE in `ctrl`.
    pub fn seek_while_byte(&mut self, ctrl: &[u8], dir: Direction) -> usize {
        let len = self.rope.len();
        let mut moved = 0;
        match dir {
            Direction::Forward => {
                while self.point_byte < len && ctrl.contains(&self.rope.byte_at(self.point_byte)) {
                    self.point_byte += 1;
                    moved += 1;
                }
            }
            Direction::Backward => {
                while self.point_byte > 0 && ctrl.contains(&self.rope.byte_at(self.point_byte - 1)) {
                    self.point_byte -= 1;
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Moves point to the start of the next occurrence of `needle`.
    /// Returns `false` (point unchanged) if no occurrence exists in that
    /// direction.
    pub fn seek_until_substr(&mut self, needle: &[u8], dir: Direction) -> bool {
        if needle.is_empty() {
            return false;
        }
        let contents = self.rope.to_bytes();
        match dir {
            Direction::Forward => {
                let start = self.point_byte + 1;
                if start > contents.len() {
                    return false;
                }
                if let Some(rel) = find_subslice(&contents[start..], needle) {
                    self.point_byte = start + rel;
                    true
                } else {
                    false
                }
            }
            Direction::Backward => {
                let end = self.point_byte.saturating_sub(1);
                if let Some(rel) = find_subslice_rev(&contents[..end], needle) {
                    self.point_byte = rel;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Rows are 0-indexed and newline-terminated; columns are byte offsets
    /// within the row.
    pub fn row_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.rope.len());
        let mut row = 0;
        let mut line_start = 0;
        for i in 0..offset {
            if self.rope.byte_at(i) == b'\n' {
                row += 1;
                line_start = i + 1;
            }
        }
        (row, offset - line_start)
    }

    /// Writes the buffer's contents to `path`; errors if there is no path
    /// or the write didn't cover the whole buffer.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| LiteError::arguments("buffer has no path to save to"))?;
        let bytes = self.rope.to_bytes();
        let expected = bytes.len();
        let written = file_io::write_whole_file(path, &bytes)?;
        if written != expected {
            return Err(LiteError::new(
                crate::error::ErrorKind::Generic,
                "SHORT_WRITE",
                format!("wrote {written} of {expected} bytes"),
            ));
        }
        self.modified = false;
        Ok(())
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn find_subslice_rev(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// The global buffer table: buffers keyed by canonical path, plus unnamed
/// scratch buffers. Entries are never removed by GC (spec §3) — only
/// `close` (not currently exposed) or process shutdown frees a slot.
#[derive(Default)]
pub struct BufferTable {
    buffers: Vec<Buffer>,
    by_path: HashMap<PathBuf, BufferId>,
}

impl BufferTable {
    pub fn new() -> Self {
        Self { buffers: Vec::new(), by_path: HashMap::new() }
    }

    pub fn get(&self, id: BufferId) -> &Buffer {
        &self.buffers[id.0]
    }

    pub fn get_mut(&mut self, id: BufferId) -> &mut Buffer {
        &mut self.buffers[id.0]
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BufferId, &Buffer)> {
        self.buffers.iter().enumerate().map(|(i, b)| (BufferId(i), b))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BufferId, &mut Buffer)> {
        self.buffers.iter_mut().enumerate().map(|(i, b)| (BufferId(i), b))
    }

    /// `open_buffer(path)`: returns the existing buffer for `path` if one
    /// is already open, otherwise reads the file and creates one.
    pub fn open(&mut self, path: Option<&Path>) -> Result<BufferId> {
        if let Some(p) = path {
            if let Some(&id) = self.by_path.get(p) {
                return Ok(id);
            }
            let buffer = Buffer::create(Some(p.to_path_buf()))?;
            let id = BufferId(self.buffers.len());
            self.buffers.push(buffer);
            self.by_path.insert(p.to_path_buf(), id);
            Ok(id)
        } else {
            let buffer = Buffer::create(None)?;
            let id = BufferId(self.buffers.len());
            self.buffers.push(buffer);
            Ok(id)
        }
    }

    pub fn path_of(&self, id: BufferId) -> Option<&Path> {
        self.buffers[id.0].path.as_deref()
    }
}
