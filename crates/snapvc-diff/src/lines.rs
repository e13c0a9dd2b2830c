//! Bounded line reading.
//!
//! Files enter the diff engine as ordered sequences of text lines with two
//! hard bounds: a line longer than [`MAX_LINE_LEN`] bytes is truncated (at a
//! character boundary), and a file with more than [`MAX_LINES`] lines is cut
//! off there. Both bounds are silent and are part of the observable diff
//! behavior, so history records and rendered patches stay stable on
//! oversized inputs.

use crate::error::{DiffError, DiffResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Maximum number of lines read from a single file.
pub const MAX_LINES: usize = 1000;

/// Maximum length of a single line, in bytes.
pub const MAX_LINE_LEN: usize = 256;

/// Read a file into a line sequence using the default bounds.
pub fn read_lines(path: impl AsRef<Path>) -> DiffResult<Vec<String>> {
    read_lines_bounded(path, MAX_LINES, MAX_LINE_LEN)
}

/// Read a file into a line sequence with explicit bounds.
///
/// Lines beyond `max_lines` are dropped; lines longer than `max_line_len`
/// bytes are truncated. Neither is an error.
pub fn read_lines_bounded(
    path: impl AsRef<Path>,
    max_lines: usize,
    max_line_len: usize,
) -> DiffResult<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DiffError::FileNotFound(path.to_path_buf()),
        _ => DiffError::Io(e),
    })?;

    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();

    while let Some(line) = read_line_bounded(&mut reader, max_line_len)? {
        if lines.len() >= max_lines {
            debug!(path = %path.display(), max_lines, "Dropping lines beyond file bound");
            break;
        }
        lines.push(line);
    }

    Ok(lines)
}

/// Read one line, keeping at most `max_len` bytes of it.
///
/// The remainder of an over-long line is consumed and discarded chunk by
/// chunk, so the memory held never exceeds the bound regardless of how long
/// the line on disk is. Returns `None` at end of input.
fn read_line_bounded<R: BufRead>(
    reader: &mut R,
    max_len: usize,
) -> std::io::Result<Option<String>> {
    let mut buf: Vec<u8> = Vec::new();
    let mut saw_input = false;
    let mut saw_newline = false;
    let mut truncated = false;

    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        saw_input = true;

        let line_end = chunk.iter().position(|&b| b == b'\n');
        let take = line_end.unwrap_or(chunk.len());

        let room = max_len.saturating_sub(buf.len());
        buf.extend_from_slice(&chunk[..take.min(room)]);
        if take > room {
            truncated = true;
        }

        match line_end {
            Some(pos) => {
                reader.consume(pos + 1);
                saw_newline = true;
                break;
            }
            None => reader.consume(take),
        }
    }

    if !saw_input {
        return Ok(None);
    }
    if saw_newline && !truncated && buf.last() == Some(&b'\r') {
        buf.pop();
    }
    line_from_bytes(buf, truncated).map(Some)
}

/// Decode collected line bytes as UTF-8.
///
/// When the byte bound cut the line, the cut may land inside a multi-byte
/// character; the partial character is dropped so the result always ends on
/// a character boundary. Invalid UTF-8 anywhere else is an error.
fn line_from_bytes(buf: Vec<u8>, truncated: bool) -> std::io::Result<String> {
    match String::from_utf8(buf) {
        Ok(line) => Ok(line),
        Err(err) if truncated && err.utf8_error().error_len().is_none() => {
            let valid = err.utf8_error().valid_up_to();
            let mut buf = err.into_bytes();
            buf.truncate(valid);
            line_from_bytes(buf, false)
        }
        Err(err) => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            err,
        )),
    }
}
