use commitstore::diff::{CommonRun, Diff, Edit};
use proptest::prelude::*;

fn edit(delete_start: usize, delete_len: usize, insert_start: usize, insert_len: usize) -> Edit {
    Edit {
        delete_start,
        delete_len,
        insert_start,
        insert_len,
    }
}

/// Bottom-up LCS table, as a reference.
fn reference_lls(a: &[String], b: &[String]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0; b.len() + 1]; a.len() + 1];
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_line_replacement() {
    let mut diff = Diff::new(["a", "b", "c"], ["a", "x", "c"]);
    assert_eq!(diff.lls(), 2);
    assert_eq!(
        diff.common_subsequence(),
        vec![
            CommonRun { start1: 0, start2: 0, len: 1 },
            CommonRun { start1: 2, start2: 2, len: 1 },
        ]
    );
    let edits = diff.diffs();
    assert_eq!(edits, vec![edit(1, 1, 1, 1)]);
    assert!(edits[0].is_replacement());
}

#[test]
fn identical_sequences() {
    let mut diff = Diff::new(["a", "b"], ["a", "b"]);
    assert!(diff.sequences_equal());
    assert_eq!(diff.common_subsequence(), vec![CommonRun { start1: 0, start2: 0, len: 2 }]);
    assert!(diff.diffs().is_empty());
    assert_eq!(diff.render(), "");
}

#[test]
fn both_empty() {
    let mut diff = Diff::new(Vec::<String>::new(), Vec::<String>::new());
    assert_eq!(diff.lls(), 0);
    assert!(diff.sequences_equal());
    assert!(diff.diffs().is_empty());
}

#[test]
fn pure_insertion() {
    let mut diff = Diff::new(["a", "c"], ["a", "b", "c"]);
    let edits = diff.diffs();
    assert_eq!(edits, vec![edit(1, 0, 1, 1)]);
    assert!(edits[0].is_insertion());
}

#[test]
fn pure_deletion() {
    let mut diff = Diff::new(["a", "b", "c"], ["a", "c"]);
    let edits = diff.diffs();
    assert_eq!(edits, vec![edit(1, 1, 1, 0)]);
    assert!(edits[0].is_deletion());
}

#[test]
fn everything_from_empty() {
    let mut diff = Diff::new(Vec::<String>::new(), ["x", "y"]);
    assert_eq!(diff.diffs(), vec![edit(0, 0, 0, 2)]);
}

#[test]
fn everything_to_empty() {
    let mut diff = Diff::new(["x", "y"], Vec::<String>::new());
    assert_eq!(diff.diffs(), vec![edit(0, 2, 0, 0)]);
}

#[test]
fn ties_shrink_first_sequence_first() {
    // Both "a" and "b" are longest common subsequences. Dropping the
    // trailing "b" of the first sequence first leaves "a" as the match.
    let mut diff = Diff::new(["a", "b"], ["b", "a"]);
    assert_eq!(diff.lls(), 1);
    assert_eq!(diff.common_subsequence(), vec![CommonRun { start1: 0, start2: 1, len: 1 }]);
    assert_eq!(diff.diffs(), vec![edit(0, 0, 0, 1), edit(1, 1, 2, 0)]);
}

#[test]
fn sequences_not_equal_same_length() {
    let mut diff = Diff::new(["a", "b"], ["a", "c"]);
    assert!(!diff.sequences_equal());
}

#[test]
fn from_texts_splits_lines() {
    let mut diff = Diff::from_texts("one\ntwo\nthree\n", "one\n2\nthree\n");
    assert_eq!(diff.sequence1(), ["one", "two", "three"]);
    assert_eq!(diff.get2(1), Some("2"));
    assert_eq!(diff.get2(9), None);
    assert_eq!(diff.render(), "@@ -2,1 +2,1 @@\n-two\n+2\n");
}

#[test]
fn from_files_missing_side_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("present.txt");
    std::fs::write(&present, "a\nb\n").unwrap();
    let missing = dir.path().join("missing.txt");

    let mut diff = Diff::from_files(Some(missing.as_path()), Some(present.as_path()));
    assert!(diff.sequence1().is_empty());
    assert_eq!(diff.diffs(), vec![edit(0, 0, 0, 2)]);

    let diff = Diff::from_files(Some(present.as_path()), None);
    assert!(diff.sequence2().is_empty());
}

#[test]
fn apply_rejects_out_of_range_edits() {
    let diff = Diff::new(["a"], ["b"]);
    assert!(diff.apply(&[edit(0, 5, 0, 1)]).is_none());
    assert!(diff.apply(&[edit(0, 1, 3, 1)]).is_none());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn lines() -> impl Strategy<Value = Vec<String>> {
    // A small alphabet makes matches frequent.
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 0..24)
        .prop_map(|v| v.into_iter().map(String::from).collect())
}

proptest! {
    /// Applying the edit script to the first sequence yields the second.
    #[test]
    fn edit_script_round_trips(a in lines(), b in lines()) {
        let mut diff = Diff::new(a, b.clone());
        let edits = diff.diffs();
        prop_assert_eq!(diff.apply(&edits), Some(b));
    }

    /// Every prefix length equals the bottom-up table.
    #[test]
    fn lls_matches_reference(a in lines(), b in lines()) {
        let table = reference_lls(&a, &b);
        let mut diff = Diff::new(a.clone(), b.clone());
        for i in 0..=a.len() {
            for j in 0..=b.len() {
                prop_assert_eq!(diff.lls_prefix(i, j), table[i][j]);
            }
        }
    }

    /// `0 <= lls(A, B) <= min(|A|, |B|)` and `lls(A, A) == |A|`.
    #[test]
    fn lls_bounds(a in lines(), b in lines()) {
        let mut diff = Diff::new(a.clone(), b.clone());
        prop_assert!(diff.lls() <= a.len().min(b.len()));
        let mut same = Diff::new(a.clone(), a.clone());
        prop_assert_eq!(same.lls(), a.len());
        prop_assert!(same.diffs().is_empty());
    }

    /// Runs are real matches, strictly increasing, maximal in total length,
    /// and no two runs could be merged.
    #[test]
    fn common_runs_are_valid(a in lines(), b in lines()) {
        let mut diff = Diff::new(a.clone(), b.clone());
        let runs = diff.common_subsequence();
        let total: usize = runs.iter().map(|r| r.len).sum();
        prop_assert_eq!(total, diff.lls());

        let (mut end1, mut end2) = (0, 0);
        for run in &runs {
            prop_assert!(run.len > 0);
            prop_assert!(run.start1 >= end1 && run.start2 >= end2);
            prop_assert!(!(run.start1 == end1 && run.start2 == end2 && end1 > 0));
            for k in 0..run.len {
                prop_assert_eq!(&a[run.start1 + k], &b[run.start2 + k]);
            }
            end1 = run.start1 + run.len;
            end2 = run.start2 + run.len;
        }
    }

    /// Each edit touches at least one line and edits never overlap.
    #[test]
    fn edits_are_well_formed(a in lines(), b in lines()) {
        let mut diff = Diff::new(a.clone(), b.clone());
        let edits = diff.diffs();
        let (mut end1, mut end2) = (0, 0);
        for e in &edits {
            prop_assert!(e.delete_len > 0 || e.insert_len > 0);
            prop_assert!(e.delete_start >= end1 && e.insert_start >= end2);
            end1 = e.delete_start + e.delete_len;
            end2 = e.insert_start + e.insert_len;
        }
        prop_assert!(end1 <= a.len() && end2 <= b.len());
    }
}
