//! Longest-common-subsequence computation and edit scripts.
//!
//! An edit script is an ordered sequence of context/insert/delete operations.
//! The context+delete subsequence equals the old line sequence and the
//! context+insert subsequence equals the new one, so either side can be
//! reconstructed from the script alone.

/// Kind of a single edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Line present in both sequences.
    Context,
    /// Line present only in the new sequence.
    Insert,
    /// Line present only in the old sequence.
    Delete,
}

impl EditKind {
    /// The unified-diff prefix for this kind.
    pub fn prefix(&self) -> char {
        match self {
            EditKind::Context => ' ',
            EditKind::Insert => '+',
            EditKind::Delete => '-',
        }
    }
}

/// A single edit operation with its line content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOp {
    pub kind: EditKind,
    pub line: String,
}

impl EditOp {
    pub fn new(kind: EditKind, line: impl Into<String>) -> Self {
        Self {
            kind,
            line: line.into(),
        }
    }
}

/// Compute the edit script transforming `old` into `new`.
///
/// Context lines are exactly the longest common subsequence of the two
/// inputs. The DP table is heap-allocated and sized to the actual input
/// lengths, then released when the call returns.
///
/// Backtracking order is deliberate and stable: when an insert and a delete
/// are both available with equal LCS value, the insert is taken first, so a
/// replaced line always renders as delete-then-insert in the forward script.
pub fn diff_lines(old: &[String], new: &[String]) -> Vec<EditOp> {
    let m = old.len();
    let n = new.len();

    let mut table = vec![vec![0u32; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            if old[i - 1] == new[j - 1] {
                table[i][j] = table[i - 1][j - 1] + 1;
            } else {
                table[i][j] = table[i - 1][j].max(table[i][j - 1]);
            }
        }
    }

    // Walk back from (m, n); operations come out in reverse order.
    let mut script = Vec::with_capacity(m.max(n));
    let mut i = m;
    let mut j = n;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old[i - 1] == new[j - 1] {
            script.push(EditOp::new(EditKind::Context, old[i - 1].clone()));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i][j - 1] >= table[i - 1][j]) {
            script.push(EditOp::new(EditKind::Insert, new[j - 1].clone()));
            j -= 1;
        } else {
            script.push(EditOp::new(EditKind::Delete, old[i - 1].clone()));
            i -= 1;
        }
    }

    script.reverse();
    script
}

/// Count the insert and delete operations in a script.
///
/// Returns `(lines_added, lines_removed)`.
pub fn change_counts(script: &[EditOp]) -> (usize, usize) {
    let added = script.iter().filter(|op| op.kind == EditKind::Insert).count();
    let removed = script.iter().filter(|op| op.kind == EditKind::Delete).count();
    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Reconstruct the new sequence from context+insert operations.
    fn apply_forward(script: &[EditOp]) -> Vec<String> {
        script
            .iter()
            .filter(|op| op.kind != EditKind::Delete)
            .map(|op| op.line.clone())
            .collect()
    }

    /// Reconstruct the old sequence from context+delete operations.
    fn apply_backward(script: &[EditOp]) -> Vec<String> {
        script
            .iter()
            .filter(|op| op.kind != EditKind::Insert)
            .map(|op| op.line.clone())
            .collect()
    }

    #[test]
    fn test_identical_sequences_are_all_context() {
        let a = lines(&["alpha", "beta", "gamma"]);
        let script = diff_lines(&a, &a);
        assert_eq!(script.len(), 3);
        assert!(script.iter().all(|op| op.kind == EditKind::Context));
        assert_eq!(apply_forward(&script), a);
    }

    #[test]
    fn test_empty_old_is_all_insert() {
        let script = diff_lines(&[], &lines(&["one", "two"]));
        assert!(script.iter().all(|op| op.kind == EditKind::Insert));
        assert_eq!(script.len(), 2);
        assert_eq!(script[0].line, "one");
    }

    #[test]
    fn test_empty_new_is_all_delete() {
        let script = diff_lines(&lines(&["one", "two"]), &[]);
        assert!(script.iter().all(|op| op.kind == EditKind::Delete));
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn test_both_empty() {
        assert!(diff_lines(&[], &[]).is_empty());
    }

    #[test]
    fn test_expected_script_for_replacement_and_append() {
        let old = lines(&["one", "two", "three"]);
        let new = lines(&["one", "TWO", "three", "four"]);
        let script = diff_lines(&old, &new);

        let expected = vec![
            EditOp::new(EditKind::Context, "one"),
            EditOp::new(EditKind::Delete, "two"),
            EditOp::new(EditKind::Insert, "TWO"),
            EditOp::new(EditKind::Context, "three"),
            EditOp::new(EditKind::Insert, "four"),
        ];
        assert_eq!(script, expected);
    }

    #[test]
    fn test_round_trip() {
        let cases = [
            (vec!["a", "b", "c"], vec!["a", "x", "c", "d"]),
            (vec![], vec!["only", "new"]),
            (vec!["only", "old"], vec![]),
            (vec!["a", "a", "b"], vec!["b", "a", "a"]),
            (vec!["x"], vec!["x"]),
        ];
        for (old, new) in cases {
            let old = lines(&old);
            let new = lines(&new);
            let script = diff_lines(&old, &new);
            assert_eq!(apply_forward(&script), new, "forward mismatch");
            assert_eq!(apply_backward(&script), old, "backward mismatch");
        }
    }

    #[test]
    fn test_change_counts() {
        let old = lines(&["one", "two", "three"]);
        let new = lines(&["one", "TWO", "three", "four"]);
        let script = diff_lines(&old, &new);
        assert_eq!(change_counts(&script), (2, 1));
    }

    #[test]
    fn test_counts_zero_for_identical() {
        let a = lines(&["same"]);
        assert_eq!(change_counts(&diff_lines(&a, &a)), (0, 0));
    }
}
