//! Line-oriented comparison of two text sequences.
//!
//! [`Diff`] computes longest-common-subsequence lengths for any pair of
//! prefixes, one longest common subsequence as a list of aligned runs, and
//! an edit script turning the first sequence into the second.
//!
//! The LCS recurrence
//!
//! ```text
//! L(i, j) = 0                              if i = 0 or j = 0
//!         = L(i-1, j-1) + 1                if A[i-1] = B[j-1]
//!         = max(L(i, j-1), L(i-1, j))      otherwise
//! ```
//!
//! is evaluated lazily with memoization, but on an explicit work stack
//! rather than the call stack, so large inputs cannot overflow it. Only
//! the cells a query actually needs are filled.
//!
//! # Example
//!
//! ```
//! use commitstore::diff::{Diff, Edit};
//!
//! let mut diff = Diff::new(["a", "b", "c"], ["a", "x", "c"]);
//! assert_eq!(diff.lls(), 2);
//! assert_eq!(
//!     diff.diffs(),
//!     vec![Edit { delete_start: 1, delete_len: 1, insert_start: 1, insert_len: 1 }],
//! );
//! ```

use std::fmt::Write as _;
use std::path::Path;

/// Memo marker for a cell not computed yet.
const UNSET: usize = usize::MAX;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A run of `len` lines equal in both sequences, starting at `start1` in
/// the first and `start2` in the second (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonRun {
    pub start1: usize,
    pub start2: usize,
    pub len: usize,
}

/// Replace lines `delete_start .. delete_start + delete_len` of the first
/// sequence with lines `insert_start .. insert_start + insert_len` of the
/// second. At most one of the two lengths is zero: a zero `delete_len` is
/// a pure insertion, a zero `insert_len` a pure deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub delete_start: usize,
    pub delete_len: usize,
    pub insert_start: usize,
    pub insert_len: usize,
}

impl Edit {
    pub fn is_insertion(&self) -> bool {
        self.delete_len == 0
    }

    pub fn is_deletion(&self) -> bool {
        self.insert_len == 0
    }

    pub fn is_replacement(&self) -> bool {
        self.delete_len > 0 && self.insert_len > 0
    }
}

// ---------------------------------------------------------------------------
// Work stack
// ---------------------------------------------------------------------------

/// How far evaluation of `L(i, j)` got before it was suspended. Each
/// variant marks which of the (at most two) sub-queries has been issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Resume {
    /// Not started.
    Enter = 0,
    /// Lines differ; `L(i, j-1)` not yet requested.
    DropSecond = 1,
    /// `L(i, j-1)` requested; `L(i-1, j)` not yet.
    DropFirst = 2,
    /// Both neighbours requested; take their maximum.
    TakeMax = 3,
    /// Lines match and `L(i-1, j-1)` was requested; add one.
    TakeMatch = 4,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    i: usize,
    j: usize,
    resume: Resume,
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// A comparison between two line sequences.
#[derive(Debug, Clone)]
pub struct Diff {
    lines1: Vec<String>,
    lines2: Vec<String>,
    /// `(len1 + 1) x (len2 + 1)` row-major table, allocated on first query.
    memo: Vec<usize>,
}

impl Diff {
    /// Compare two in-memory sequences.
    pub fn new<A, B>(seq1: A, seq2: B) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Diff {
            lines1: seq1.into_iter().map(Into::into).collect(),
            lines2: seq2.into_iter().map(Into::into).collect(),
            memo: Vec::new(),
        }
    }

    /// Compare two texts line by line. Line terminators are not part of
    /// the lines.
    pub fn from_texts(text1: &str, text2: &str) -> Self {
        Diff::new(text1.lines(), text2.lines())
    }

    /// Compare the contents of two files. A side that is `None`, missing,
    /// or not valid UTF-8 is treated as empty.
    pub fn from_files(file1: Option<&Path>, file2: Option<&Path>) -> Self {
        Diff::new(read_lines(file1), read_lines(file2))
    }

    pub fn sequence1(&self) -> &[String] {
        &self.lines1
    }

    pub fn sequence2(&self) -> &[String] {
        &self.lines2
    }

    pub fn get1(&self, k: usize) -> Option<&str> {
        self.lines1.get(k).map(String::as_str)
    }

    pub fn get2(&self, k: usize) -> Option<&str> {
        self.lines2.get(k).map(String::as_str)
    }

    /// Length of the longest common subsequence of the first `k1` lines of
    /// sequence 1 and the first `k2` lines of sequence 2. Out-of-range
    /// prefixes count as empty.
    pub fn lls_prefix(&mut self, k1: usize, k2: usize) -> usize {
        let (len1, len2) = (self.lines1.len(), self.lines2.len());
        if self.memo.is_empty() {
            self.memo = vec![UNSET; (len1 + 1) * (len2 + 1)];
        }
        if k1 == 0 || k2 == 0 || k1 > len1 || k2 > len2 {
            return 0;
        }
        let width = len2 + 1;
        if self.memo[k1 * width + k2] == UNSET {
            fill(&self.lines1, &self.lines2, &mut self.memo, width, k1, k2);
        }
        self.memo[k1 * width + k2]
    }

    /// Length of the longest common subsequence of the full sequences.
    pub fn lls(&mut self) -> usize {
        let (len1, len2) = (self.lines1.len(), self.lines2.len());
        self.lls_prefix(len1, len2)
    }

    /// Whether both sequences have identical content.
    pub fn sequences_equal(&mut self) -> bool {
        self.lines1.len() == self.lines2.len() && self.lls() == self.lines1.len()
    }

    /// One longest common subsequence, as maximal aligned runs in
    /// increasing order.
    ///
    /// Backtracks from the end of both sequences. When dropping a line from
    /// either side keeps the length, the line is dropped from sequence 1
    /// first; this picks which of several equally long answers is reported.
    pub fn common_subsequence(&mut self) -> Vec<CommonRun> {
        let mut runs = Vec::new();
        let mut k1 = self.lines1.len();
        let mut k2 = self.lines2.len();

        while k1 > 0 && k2 > 0 {
            let ls = self.lls_prefix(k1, k2);
            if self.lls_prefix(k1 - 1, k2) == ls {
                k1 -= 1;
            } else if self.lls_prefix(k1, k2 - 1) == ls {
                k2 -= 1;
            } else {
                // (k1, k2) ends a match; extend it backwards while the
                // diagonal cells are matches too.
                let mut len = 1;
                while k1 > len
                    && k2 > len
                    && self.lls_prefix(k1 - len - 1, k2 - len) != ls - len
                    && self.lls_prefix(k1 - len, k2 - len - 1) != ls - len
                {
                    len += 1;
                }
                runs.push(CommonRun {
                    start1: k1 - len,
                    start2: k2 - len,
                    len,
                });
                k1 -= len;
                k2 -= len;
            }
        }

        runs.reverse();
        runs
    }

    /// Edit script converting sequence 1 into sequence 2: one [`Edit`] per
    /// gap around the runs of [`common_subsequence`](Self::common_subsequence).
    pub fn diffs(&mut self) -> Vec<Edit> {
        let common = self.common_subsequence();
        let mut edits = Vec::new();
        let (mut e1, mut e2) = (0, 0);

        for run in &common {
            if e1 != run.start1 || e2 != run.start2 {
                edits.push(Edit {
                    delete_start: e1,
                    delete_len: run.start1 - e1,
                    insert_start: e2,
                    insert_len: run.start2 - e2,
                });
            }
            e1 = run.start1 + run.len;
            e2 = run.start2 + run.len;
        }
        if e1 < self.lines1.len() || e2 < self.lines2.len() {
            edits.push(Edit {
                delete_start: e1,
                delete_len: self.lines1.len() - e1,
                insert_start: e2,
                insert_len: self.lines2.len() - e2,
            });
        }
        edits
    }

    /// Apply `edits` to sequence 1, taking inserted lines from sequence 2.
    ///
    /// Returns `None` if the edits are out of order or out of range.
    pub fn apply(&self, edits: &[Edit]) -> Option<Vec<String>> {
        let mut out = Vec::with_capacity(self.lines2.len());
        let mut cursor = 0;
        for edit in edits {
            out.extend_from_slice(self.lines1.get(cursor..edit.delete_start)?);
            let inserted = self
                .lines2
                .get(edit.insert_start..edit.insert_start + edit.insert_len)?;
            out.extend_from_slice(inserted);
            cursor = edit.delete_start + edit.delete_len;
        }
        out.extend_from_slice(self.lines1.get(cursor..)?);
        Some(out)
    }

    /// Render the edit script as hunks:
    ///
    /// ```text
    /// @@ -2,1 +2,1 @@
    /// -b
    /// +x
    /// ```
    ///
    /// Hunk starts are 1-based. Returns an empty string when the sequences
    /// are equal.
    pub fn render(&mut self) -> String {
        let mut out = String::new();
        for edit in self.diffs() {
            let _ = writeln!(
                out,
                "@@ -{},{} +{},{} @@",
                edit.delete_start + 1,
                edit.delete_len,
                edit.insert_start + 1,
                edit.insert_len,
            );
            for line in &self.lines1[edit.delete_start..edit.delete_start + edit.delete_len] {
                let _ = writeln!(out, "-{}", line);
            }
            for line in &self.lines2[edit.insert_start..edit.insert_start + edit.insert_len] {
                let _ = writeln!(out, "+{}", line);
            }
        }
        out
    }
}

/// Compute `L(k1, k2)` and every cell it depends on that is not yet in
/// `memo`, simulating the recursive definition with a stack of suspended
/// frames.
fn fill(
    lines1: &[String],
    lines2: &[String],
    memo: &mut [usize],
    width: usize,
    k1: usize,
    k2: usize,
) {
    let mut stack: Vec<Frame> = Vec::with_capacity(2 * (lines1.len() + lines2.len() + 1));
    stack.push(Frame {
        i: k1,
        j: k2,
        resume: Resume::Enter,
    });

    while let Some(Frame { i, j, resume }) = stack.pop() {
        let cell = i * width + j;
        if i == 0 || j == 0 {
            memo[cell] = 0;
            continue;
        }
        if memo[cell] != UNSET {
            continue;
        }
        match resume {
            Resume::Enter => {
                if lines1[i - 1] == lines2[j - 1] {
                    stack.push(Frame { i, j, resume: Resume::TakeMatch });
                    stack.push(Frame { i: i - 1, j: j - 1, resume: Resume::Enter });
                } else {
                    stack.push(Frame { i, j, resume: Resume::DropSecond });
                }
            }
            Resume::DropSecond => {
                stack.push(Frame { i, j, resume: Resume::DropFirst });
                stack.push(Frame { i, j: j - 1, resume: Resume::Enter });
            }
            Resume::DropFirst => {
                stack.push(Frame { i, j, resume: Resume::TakeMax });
                stack.push(Frame { i: i - 1, j, resume: Resume::Enter });
            }
            Resume::TakeMax => {
                memo[cell] = memo[cell - 1].max(memo[cell - width]);
            }
            Resume::TakeMatch => {
                memo[cell] = memo[cell - width - 1] + 1;
            }
        }
    }
}

fn read_lines(path: Option<&Path>) -> Vec<String> {
    let Some(path) = path else {
        return Vec::new();
    };
    match std::fs::read_to_string(path) {
        Ok(text) => text.lines().map(String::from).collect(),
        Err(e) => {
            log::warn!("diff: treating {} as empty: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain recursive definition, for cross-checking small inputs.
    fn naive(a: &[&str], b: &[&str], i: usize, j: usize) -> usize {
        if i == 0 || j == 0 {
            0
        } else if a[i - 1] == b[j - 1] {
            naive(a, b, i - 1, j - 1) + 1
        } else {
            naive(a, b, i, j - 1).max(naive(a, b, i - 1, j))
        }
    }

    #[test]
    fn every_prefix_matches_recursion() {
        let a = ["a", "b", "c", "a", "b", "b", "a"];
        let b = ["c", "b", "a", "b", "a", "c"];
        let mut diff = Diff::new(a, b);
        for i in 0..=a.len() {
            for j in 0..=b.len() {
                assert_eq!(diff.lls_prefix(i, j), naive(&a, &b, i, j), "L({i}, {j})");
            }
        }
    }

    #[test]
    fn lazy_fill_touches_only_needed_cells() {
        let mut diff = Diff::new(["x", "y", "z"], ["x", "y", "z"]);
        assert_eq!(diff.lls(), 3);
        // A full diagonal match never needs the off-diagonal cells.
        let width = 4;
        assert_eq!(diff.memo[width + 2], UNSET);
        assert_eq!(diff.memo[2 * width + 1], UNSET);
    }

    #[test]
    fn out_of_range_prefix_is_zero() {
        let mut diff = Diff::new(["a"], ["a"]);
        assert_eq!(diff.lls_prefix(5, 1), 0);
        assert_eq!(diff.lls_prefix(1, 5), 0);
    }

    #[test]
    fn resume_discriminants() {
        assert_eq!(Resume::Enter as u8, 0);
        assert_eq!(Resume::TakeMatch as u8, 4);
    }

    #[test]
    fn deep_input_does_not_overflow() {
        let a: Vec<String> = (0..2000).map(|i| format!("line {i}")).collect();
        let mut b = a.clone();
        b[1000] = "changed".into();
        let mut diff = Diff::new(a, b);
        assert_eq!(diff.lls(), 1999);
        assert_eq!(
            diff.diffs(),
            vec![Edit { delete_start: 1000, delete_len: 1, insert_start: 1000, insert_len: 1 }]
        );
    }
}
