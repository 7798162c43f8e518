//! Whole-file reads and writes backing `Buffer::create`/`Buffer::save`
//! (spec §4.2, §6). Kept to two tiny functions so the buffer module never
//! touches `std::fs` directly.

use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Reads the whole file at `path`. A missing file is reported as an I/O
/// error (callers that want "missing file ⇒ empty buffer" behavior check
/// existence themselves before calling this).
pub fn read_whole_file(path: &Path) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// Writes `bytes` to `path`, truncating any existing file, and returns the
/// number of bytes written.
pub fn write_whole_file(path: &Path, bytes: &[u8]) -> Result<usize> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    Ok(bytes.len())
}
