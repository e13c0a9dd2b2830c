//! Fixed-layout version records.
//!
//! The version log is a sequential stream of records with no delimiters, so
//! every record occupies exactly [`RECORD_SIZE`] bytes and boundaries are
//! purely positional. All integers are little-endian; strings are UTF-8,
//! NUL-padded to their field width and truncated silently when longer.
//!
//! Layout:
//!
//! | field          | bytes |
//! |----------------|-------|
//! | filename       | 256   |
//! | author         | 64    |
//! | timestamp      | 8     |
//! | version        | 4     |
//! | lines_added    | 4     |
//! | lines_removed  | 4     |
//! | change_count   | 4     |
//! | changes        | 64 × 129 |

use chrono::{DateTime, TimeZone, Utc};
use snapvc_diff::{EditKind, EditOp};
use tracing::warn;

const FILENAME_LEN: usize = 256;
const AUTHOR_LEN: usize = 64;
const CHANGE_LINE_LEN: usize = 128;

/// Maximum number of change lines embedded in a record.
///
/// Longer edit scripts are truncated silently; the embedded script is
/// display-only and never used to reconstruct content.
pub const MAX_EMBEDDED_CHANGES: usize = 64;

/// Total size of one encoded record in bytes.
pub const RECORD_SIZE: usize =
    FILENAME_LEN + AUTHOR_LEN + 8 + 4 + 4 + 4 + 4 + MAX_EMBEDDED_CHANGES * (1 + CHANGE_LINE_LEN);

/// Metadata for one saved version of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub filename: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub version: u32,
    pub lines_added: u32,
    pub lines_removed: u32,
    /// Bounded insert/delete lines for history display.
    pub changes: Vec<EditOp>,
}

impl VersionRecord {
    /// Create a record with no change summary (a first version).
    pub fn new(
        filename: impl Into<String>,
        author: impl Into<String>,
        timestamp: DateTime<Utc>,
        version: u32,
    ) -> Self {
        Self {
            filename: filename.into(),
            author: author.into(),
            timestamp,
            version,
            lines_added: 0,
            lines_removed: 0,
            changes: Vec::new(),
        }
    }

    /// Attach a change summary from an edit script.
    ///
    /// Only insert/delete operations are kept; the list is truncated at
    /// [`MAX_EMBEDDED_CHANGES`] entries and each line at the storable width.
    pub fn with_script(mut self, script: &[EditOp]) -> Self {
        let (added, removed) = snapvc_diff::change_counts(script);
        self.lines_added = added as u32;
        self.lines_removed = removed as u32;
        self.changes = script
            .iter()
            .filter(|op| op.kind != EditKind::Context)
            .take(MAX_EMBEDDED_CHANGES)
            .map(|op| EditOp::new(op.kind, truncate_bytes(&op.line, CHANGE_LINE_LEN)))
            .collect();
        self
    }

    /// Encode into exactly [`RECORD_SIZE`] bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; RECORD_SIZE];
        let mut offset = 0;

        put_str(&mut buf, &mut offset, &self.filename, FILENAME_LEN);
        put_str(&mut buf, &mut offset, &self.author, AUTHOR_LEN);
        put_bytes(&mut buf, &mut offset, &self.timestamp.timestamp().to_le_bytes());
        put_bytes(&mut buf, &mut offset, &self.version.to_le_bytes());
        put_bytes(&mut buf, &mut offset, &self.lines_added.to_le_bytes());
        put_bytes(&mut buf, &mut offset, &self.lines_removed.to_le_bytes());
        let count = self.changes.len().min(MAX_EMBEDDED_CHANGES) as u32;
        put_bytes(&mut buf, &mut offset, &count.to_le_bytes());

        for op in self.changes.iter().take(MAX_EMBEDDED_CHANGES) {
            buf[offset] = match op.kind {
                EditKind::Insert => b'+',
                EditKind::Delete => b'-',
                EditKind::Context => b' ',
            };
            offset += 1;
            put_str(&mut buf, &mut offset, &op.line, CHANGE_LINE_LEN);
        }

        buf
    }

    /// Decode a record from exactly [`RECORD_SIZE`] bytes.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() != RECORD_SIZE {
            return None;
        }
        let mut offset = 0;

        let filename = read_str(buf, &mut offset, FILENAME_LEN);
        let author = read_str(buf, &mut offset, AUTHOR_LEN);
        let timestamp = Utc
            .timestamp_opt(read_i64(buf, &mut offset), 0)
            .single()
            .unwrap_or_default();
        let version = read_u32(buf, &mut offset);
        let lines_added = read_u32(buf, &mut offset);
        let lines_removed = read_u32(buf, &mut offset);
        let count = read_u32(buf, &mut offset).min(MAX_EMBEDDED_CHANGES as u32);

        let mut changes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let tag = buf[offset];
            offset += 1;
            let line = read_str(buf, &mut offset, CHANGE_LINE_LEN);
            let kind = match tag {
                b'+' => EditKind::Insert,
                b'-' => EditKind::Delete,
                b' ' => EditKind::Context,
                other => {
                    warn!(tag = other, "Skipping change line with unknown tag");
                    continue;
                }
            };
            changes.push(EditOp::new(kind, line));
        }

        Some(Self {
            filename,
            author,
            timestamp,
            version,
            lines_added,
            lines_removed,
            changes,
        })
    }
}

/// Truncate a string to at most `max_len` bytes on a char boundary.
fn truncate_bytes(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

fn put_str(buf: &mut [u8], offset: &mut usize, s: &str, width: usize) {
    let truncated = truncate_bytes(s, width);
    let bytes = truncated.as_bytes();
    buf[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    *offset += width;
}

fn put_bytes(buf: &mut [u8], offset: &mut usize, bytes: &[u8]) {
    buf[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    *offset += bytes.len();
}

fn read_str(buf: &[u8], offset: &mut usize, width: usize) -> String {
    let field = &buf[*offset..*offset + width];
    *offset += width;
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn read_i64(buf: &[u8], offset: &mut usize) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[*offset..*offset + 8]);
    *offset += 8;
    i64::from_le_bytes(bytes)
}

fn read_u32(buf: &[u8], offset: &mut usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[*offset..*offset + 4]);
    *offset += 4;
    u32::from_le_bytes(bytes)
}
