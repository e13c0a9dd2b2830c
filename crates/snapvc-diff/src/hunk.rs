//! Context-windowed hunk grouping and unified-diff rendering.
//!
//! An edit script is split into hunks, each carrying up to `context` lines of
//! leading and trailing context. Change clusters separated by fewer than
//! `2 * context` unchanged lines end up in one merged hunk; clusters at least
//! `2 * context` apart get separate hunks.

use crate::lcs::{EditKind, EditOp};
use std::collections::VecDeque;

/// A contiguous, independently renderable region of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 0-based index of the first old line covered by this hunk.
    pub old_start: usize,
    /// 0-based index of the first new line covered by this hunk.
    pub new_start: usize,
    /// Operations in this hunk, leading/trailing context included.
    pub ops: Vec<EditOp>,
}

impl Hunk {
    /// Number of old lines covered (context + delete).
    pub fn old_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind != EditKind::Insert)
            .count()
    }

    /// Number of new lines covered (context + insert).
    pub fn new_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind != EditKind::Delete)
            .count()
    }

    /// Render the `@@ -a,b +c,d @@` header line.
    ///
    /// Starts are 1-based; a zero-length range reports the line before it,
    /// matching unified diff convention.
    pub fn header(&self) -> String {
        let old_len = self.old_len();
        let new_len = self.new_len();
        let old_display = if old_len == 0 {
            self.old_start
        } else {
            self.old_start + 1
        };
        let new_display = if new_len == 0 {
            self.new_start
        } else {
            self.new_start + 1
        };
        format!("@@ -{old_display},{old_len} +{new_display},{new_len} @@")
    }
}

/// Open hunk being accumulated by [`group_hunks`].
struct OpenHunk {
    old_start: usize,
    new_start: usize,
    ops: Vec<EditOp>,
    /// Context run seen since the last change, not yet committed to the hunk.
    pending: Vec<EditOp>,
}

impl OpenHunk {
    fn close(mut self, trailing: usize) -> (Hunk, Vec<EditOp>) {
        let rest = self.pending.split_off(trailing.min(self.pending.len()));
        self.ops.append(&mut self.pending);
        (
            Hunk {
                old_start: self.old_start,
                new_start: self.new_start,
                ops: self.ops,
            },
            rest,
        )
    }
}

/// Group an edit script into hunks with the given context window.
pub fn group_hunks(script: &[EditOp], context: usize) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut lead: VecDeque<EditOp> = VecDeque::new();
    let mut current: Option<OpenHunk> = None;

    // Old/new positions consumed so far.
    let mut i = 0usize;
    let mut j = 0usize;

    for op in script {
        match op.kind {
            EditKind::Context => {
                match current.take() {
                    Some(mut hunk) => {
                        hunk.pending.push(op.clone());
                        // A context run of 2*context lines separates
                        // clusters: keep the first half as trailing context
                        // and recycle the rest as the next leading buffer.
                        if hunk.pending.len() >= 2 * context {
                            let (closed, rest) = hunk.close(context);
                            hunks.push(closed);
                            lead = rest.into();
                            while lead.len() > context {
                                lead.pop_front();
                            }
                        } else {
                            current = Some(hunk);
                        }
                    }
                    None => {
                        lead.push_back(op.clone());
                        if lead.len() > context {
                            lead.pop_front();
                        }
                    }
                }
                i += 1;
                j += 1;
            }
            EditKind::Insert | EditKind::Delete => {
                let mut hunk = current.take().unwrap_or_else(|| OpenHunk {
                    old_start: i - lead.len(),
                    new_start: j - lead.len(),
                    ops: lead.drain(..).collect(),
                    pending: Vec::new(),
                });
                // Any pending context had a gap under 2*context: merge it.
                hunk.ops.append(&mut hunk.pending);
                hunk.ops.push(op.clone());
                current = Some(hunk);

                match op.kind {
                    EditKind::Insert => j += 1,
                    _ => i += 1,
                }
            }
        }
    }

    // Script ended with a hunk still open: flush with whatever trailing
    // context is available, never padding.
    if let Some(hunk) = current {
        let (closed, _) = hunk.close(context);
        hunks.push(closed);
    }

    hunks
}

/// Render an edit script as unified-diff-style text.
pub fn render_patch(old_label: &str, new_label: &str, script: &[EditOp], context: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("--- {old_label}\n"));
    out.push_str(&format!("+++ {new_label}\n"));

    for hunk in group_hunks(script, context) {
        out.push_str(&hunk.header());
        out.push('\n');
        for op in &hunk.ops {
            out.push(op.kind.prefix());
            out.push_str(&op.line);
            out.push('\n');
        }
    }

    out
}
