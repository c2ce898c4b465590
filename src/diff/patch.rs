//! Unified patch text rendering.
//!
//! Each delta becomes a header block plus hunks. Hunks come from a
//! line-level longest-common-subsequence walk of the two blob
//! contents, with three lines of context on each side. Binary blobs
//! (anything containing a NUL byte) get a placeholder line instead of
//! hunks.

use crate::error::Result;
use crate::objects::{Blob, LooseObjectStore, Oid};

use super::{DiffDelta, DiffStatus, TreeDiff};

/// Context lines kept on each side of a change.
const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOp {
    /// Line present on both sides (old index, new index).
    Keep(usize, usize),
    /// Line only in the old content.
    Del(usize),
    /// Line only in the new content.
    Ins(usize),
}

impl LineOp {
    fn is_change(&self) -> bool {
        !matches!(self, LineOp::Keep(_, _))
    }
}

/// File content split into lines, remembering the trailing newline.
///
/// Lines are kept as raw bytes with only the `\n` terminator removed,
/// so a CR that is part of a CRLF ending stays in the line content and
/// terminator-only edits still compare as changed lines.
struct Lines {
    lines: Vec<Vec<u8>>,
    ends_with_newline: bool,
}

impl Lines {
    fn split(content: &[u8]) -> Self {
        let ends_with_newline = content.is_empty() || content.ends_with(b"\n");
        let mut lines: Vec<Vec<u8>> = content.split(|&b| b == b'\n').map(Vec::from).collect();
        if ends_with_newline {
            lines.pop();
        }
        Lines {
            lines,
            ends_with_newline,
        }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Line-level LCS via the classic dynamic-programming table.
fn diff_line_ops(old: &[Vec<u8>], new: &[Vec<u8>]) -> Vec<LineOp> {
    let n = old.len();
    let m = new.len();

    // table[i][j] = LCS length of old[i..] and new[j..]
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(LineOp::Keep(i, j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(LineOp::Del(i));
            i += 1;
        } else {
            ops.push(LineOp::Ins(j));
            j += 1;
        }
    }
    while i < n {
        ops.push(LineOp::Del(i));
        i += 1;
    }
    while j < m {
        ops.push(LineOp::Ins(j));
        j += 1;
    }
    ops
}

/// Groups op indices into hunk ranges with merged context windows.
fn hunk_ranges(ops: &[LineOp]) -> Vec<(usize, usize)> {
    let change_positions: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| op.is_change())
        .map(|(i, _)| i)
        .collect();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &pos in &change_positions {
        let start = pos.saturating_sub(CONTEXT_LINES);
        let end = (pos + CONTEXT_LINES + 1).min(ops.len());

        match ranges.last_mut() {
            Some((_, last_end)) if start <= *last_end => {
                *last_end = (*last_end).max(end);
            }
            _ => ranges.push((start, end)),
        }
    }
    ranges
}

/// Formats the `@@ -s,c +s,c @@` range, omitting `,1` like diff does.
fn format_range(start: usize, count: usize) -> String {
    if count == 1 {
        format!("{}", start)
    } else {
        format!("{},{}", start, count)
    }
}

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Renders the hunks for a pair of text contents.
fn render_hunks(out: &mut String, old: &Lines, new: &Lines) {
    let ops = diff_line_ops(&old.lines, &new.lines);

    for (start, end) in hunk_ranges(&ops) {
        let hunk = &ops[start..end];

        let mut old_count = 0usize;
        let mut new_count = 0usize;
        for op in hunk {
            match op {
                LineOp::Keep(_, _) => {
                    old_count += 1;
                    new_count += 1;
                }
                LineOp::Del(_) => old_count += 1,
                LineOp::Ins(_) => new_count += 1,
            }
        }

        // Lines consumed on each side before this hunk
        let mut old_before = 0usize;
        let mut new_before = 0usize;
        for op in &ops[..start] {
            match op {
                LineOp::Keep(_, _) => {
                    old_before += 1;
                    new_before += 1;
                }
                LineOp::Del(_) => old_before += 1,
                LineOp::Ins(_) => new_before += 1,
            }
        }

        let old_start = if old_count == 0 { old_before } else { old_before + 1 };
        let new_start = if new_count == 0 { new_before } else { new_before + 1 };

        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            format_range(old_start, old_count),
            format_range(new_start, new_count)
        ));

        for op in hunk {
            match *op {
                LineOp::Keep(i, j) => {
                    out.push(' ');
                    out.push_str(&String::from_utf8_lossy(&old.lines[i]));
                    out.push('\n');
                    if i + 1 == old.len() && !old.ends_with_newline
                        || j + 1 == new.len() && !new.ends_with_newline
                    {
                        out.push_str(NO_NEWLINE_MARKER);
                        out.push('\n');
                    }
                }
                LineOp::Del(i) => {
                    out.push('-');
                    out.push_str(&String::from_utf8_lossy(&old.lines[i]));
                    out.push('\n');
                    if i + 1 == old.len() && !old.ends_with_newline {
                        out.push_str(NO_NEWLINE_MARKER);
                        out.push('\n');
                    }
                }
                LineOp::Ins(j) => {
                    out.push('+');
                    out.push_str(&String::from_utf8_lossy(&new.lines[j]));
                    out.push('\n');
                    if j + 1 == new.len() && !new.ends_with_newline {
                        out.push_str(NO_NEWLINE_MARKER);
                        out.push('\n');
                    }
                }
            }
        }
    }
}

fn read_blob(store: &LooseObjectStore, oid: &Oid) -> Result<Blob> {
    let raw = store.read(oid)?;
    Blob::parse(raw)
}

fn short_or_zero(oid: Option<&Oid>) -> String {
    match oid {
        Some(oid) => oid.short(),
        None => "0000000".to_string(),
    }
}

/// Renders one delta as a patch block.
fn format_delta(out: &mut String, store: &LooseObjectStore, delta: &DiffDelta) -> Result<()> {
    let path = delta.path();
    out.push_str(&format!("diff --git a/{} b/{}\n", path, path));

    match delta.status() {
        DiffStatus::ModeChanged => {
            // Content is identical, so no index line and no hunks
            out.push_str(&format!(
                "old mode {}\n",
                delta.old_mode().unwrap().as_octal_padded()
            ));
            out.push_str(&format!(
                "new mode {}\n",
                delta.new_mode().unwrap().as_octal_padded()
            ));
            return Ok(());
        }
        DiffStatus::Added => {
            out.push_str(&format!(
                "new file mode {}\n",
                delta.new_mode().unwrap().as_octal_padded()
            ));
        }
        DiffStatus::Deleted => {
            out.push_str(&format!(
                "deleted file mode {}\n",
                delta.old_mode().unwrap().as_octal_padded()
            ));
        }
        DiffStatus::Modified => {
            if delta.old_mode() != delta.new_mode() {
                out.push_str(&format!(
                    "old mode {}\n",
                    delta.old_mode().unwrap().as_octal_padded()
                ));
                out.push_str(&format!(
                    "new mode {}\n",
                    delta.new_mode().unwrap().as_octal_padded()
                ));
            }
        }
    }

    let old_blob = delta.old_oid().map(|oid| read_blob(store, oid)).transpose()?;
    let new_blob = delta.new_oid().map(|oid| read_blob(store, oid)).transpose()?;

    let mut index_line = format!(
        "index {}..{}",
        short_or_zero(delta.old_oid()),
        short_or_zero(delta.new_oid())
    );
    if delta.status() == DiffStatus::Modified && delta.old_mode() == delta.new_mode() {
        index_line.push(' ');
        index_line.push_str(delta.new_mode().unwrap().as_octal_padded());
    }
    out.push_str(&index_line);
    out.push('\n');

    let binary = old_blob.as_ref().map(Blob::is_binary).unwrap_or(false)
        || new_blob.as_ref().map(Blob::is_binary).unwrap_or(false);

    let (old_label, new_label) = (
        match delta.status() {
            DiffStatus::Added => "/dev/null".to_string(),
            _ => format!("a/{}", path),
        },
        match delta.status() {
            DiffStatus::Deleted => "/dev/null".to_string(),
            _ => format!("b/{}", path),
        },
    );

    if binary {
        out.push_str(&format!(
            "Binary files {} and {} differ\n",
            old_label, new_label
        ));
        return Ok(());
    }

    out.push_str(&format!("--- {}\n", old_label));
    out.push_str(&format!("+++ {}\n", new_label));

    let old_lines = old_blob
        .map(|b| Lines::split(b.content()))
        .unwrap_or(Lines {
            lines: Vec::new(),
            ends_with_newline: true,
        });
    let new_lines = new_blob
        .map(|b| Lines::split(b.content()))
        .unwrap_or(Lines {
            lines: Vec::new(),
            ends_with_newline: true,
        });

    render_hunks(out, &old_lines, &new_lines);
    Ok(())
}

/// Renders a whole diff as patch text.
///
/// An empty diff yields an empty string. Output is deterministic
/// since deltas arrive ordered by path.
pub fn format_patch(store: &LooseObjectStore, diff: &TreeDiff) -> Result<String> {
    let mut out = String::new();
    for delta in diff {
        format_delta(&mut out, store, delta)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_trees;
    use crate::objects::{FileMode, ObjectType, Tree, TreeBuilder};
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, LooseObjectStore) {
        let temp_dir = TempDir::new().unwrap();
        let objects_dir = temp_dir.path().join("objects");
        std::fs::create_dir(&objects_dir).unwrap();
        let store = LooseObjectStore::new(&objects_dir);
        (temp_dir, store)
    }

    fn tree_of(store: &LooseObjectStore, files: &[(&str, &[u8])]) -> Tree {
        let mut builder = TreeBuilder::new();
        for (name, content) in files {
            let oid = store.write(ObjectType::Blob, content).unwrap();
            builder.insert(FileMode::Regular, *name, oid);
        }
        let oid = builder.build(store).unwrap();
        Tree::parse(oid, &store.read(&oid).unwrap()).unwrap()
    }

    fn patch_between(
        store: &LooseObjectStore,
        old: &[(&str, &[u8])],
        new: &[(&str, &[u8])],
    ) -> String {
        let old_tree = tree_of(store, old);
        let new_tree = tree_of(store, new);
        let diff = diff_trees(store, Some(&old_tree), &new_tree).unwrap();
        format_patch(store, &diff).unwrap()
    }

    // P-001: single-line modification renders -old/+new
    #[test]
    fn test_single_line_change() {
        let (_t, store) = temp_store();
        let patch = patch_between(&store, &[("f.txt", b"x\n")], &[("f.txt", b"y\n")]);

        assert!(patch.starts_with("diff --git a/f.txt b/f.txt\n"));
        assert!(patch.contains("--- a/f.txt\n"));
        assert!(patch.contains("+++ b/f.txt\n"));
        assert!(patch.contains("@@ -1 +1 @@\n"));
        assert!(patch.contains("-x\n"));
        assert!(patch.contains("+y\n"));
    }

    // P-002: added file uses /dev/null and new file mode
    #[test]
    fn test_added_file() {
        let (_t, store) = temp_store();
        let patch = patch_between(&store, &[], &[("new.txt", b"one\ntwo\n")]);

        assert!(patch.contains("new file mode 100644\n"));
        assert!(patch.contains("index 0000000.."));
        assert!(patch.contains("--- /dev/null\n"));
        assert!(patch.contains("+++ b/new.txt\n"));
        assert!(patch.contains("@@ -0,0 +1,2 @@\n"));
        assert!(patch.contains("+one\n+two\n"));
    }

    // P-003: deleted file mirrors the added form
    #[test]
    fn test_deleted_file() {
        let (_t, store) = temp_store();
        let patch = patch_between(&store, &[("old.txt", b"gone\n")], &[]);

        assert!(patch.contains("deleted file mode 100644\n"));
        assert!(patch.contains("--- a/old.txt\n"));
        assert!(patch.contains("+++ /dev/null\n"));
        assert!(patch.contains("@@ -1 +0,0 @@\n"));
        assert!(patch.contains("-gone\n"));
    }

    // P-004: context lines surround the change, far lines are excluded
    #[test]
    fn test_context_window() {
        let (_t, store) = temp_store();
        let old = b"1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n";
        let new = b"1\n2\n3\n4\nFIVE\n6\n7\n8\n9\n10\n";
        let patch = patch_between(&store, &[("n.txt", old)], &[("n.txt", new)]);

        assert!(patch.contains("@@ -2,7 +2,7 @@\n"));
        assert!(patch.contains(" 2\n 3\n 4\n-5\n+FIVE\n 6\n 7\n 8\n"));
        assert!(!patch.contains(" 1\n"));
        assert!(!patch.contains(" 10\n"));
    }

    // P-005: nearby changes merge into one hunk, distant ones split
    #[test]
    fn test_hunk_splitting() {
        let (_t, store) = temp_store();
        let old: Vec<u8> = (1..=30).map(|i| format!("{}\n", i)).collect::<String>().into_bytes();
        let new: Vec<u8> = (1..=30)
            .map(|i| {
                if i == 2 || i == 28 {
                    format!("line-{}\n", i)
                } else {
                    format!("{}\n", i)
                }
            })
            .collect::<String>()
            .into_bytes();

        let patch = patch_between(&store, &[("f", &old)], &[("f", &new)]);
        assert_eq!(patch.matches("@@ ").count(), 2);
        assert!(patch.contains("-2\n+line-2\n"));
        assert!(patch.contains("-28\n+line-28\n"));
    }

    // P-006: binary content gets the placeholder line and no hunks
    #[test]
    fn test_binary_placeholder() {
        let (_t, store) = temp_store();
        let patch = patch_between(
            &store,
            &[("data.bin", b"\x00\x01\x02".as_slice())],
            &[("data.bin", b"\x00\x03\x04".as_slice())],
        );

        assert!(patch.contains("Binary files a/data.bin and b/data.bin differ\n"));
        assert!(!patch.contains("@@"));
    }

    // P-007: empty diff renders as an empty string
    #[test]
    fn test_empty_diff() {
        let (_t, store) = temp_store();
        let patch = patch_between(&store, &[("same", b"s\n")], &[("same", b"s\n")]);
        assert_eq!(patch, "");
    }

    // P-008: missing trailing newline is marked
    #[test]
    fn test_no_trailing_newline() {
        let (_t, store) = temp_store();
        let patch = patch_between(&store, &[("f", b"x\n")], &[("f", b"y")]);

        assert!(patch.contains("-x\n"));
        assert!(patch.contains("+y\n\\ No newline at end of file\n"));
    }

    // P-009: a mode-only change renders old/new mode without hunks
    #[test]
    fn test_mode_change_patch() {
        let (_t, store) = temp_store();
        let blob = store.write(ObjectType::Blob, b"#!/bin/sh\n").unwrap();

        let make = |mode: FileMode| {
            let mut builder = TreeBuilder::new();
            builder.insert(mode, "run.sh", blob);
            let oid = builder.build(&store).unwrap();
            Tree::parse(oid, &store.read(&oid).unwrap()).unwrap()
        };

        let diff = diff_trees(
            &store,
            Some(&make(FileMode::Regular)),
            &make(FileMode::Executable),
        )
        .unwrap();
        let patch = format_patch(&store, &diff).unwrap();

        assert_eq!(
            patch,
            "diff --git a/run.sh b/run.sh\nold mode 100644\nnew mode 100755\n"
        );
    }

    // P-010: multiple deltas render in path order
    #[test]
    fn test_multiple_deltas_ordered() {
        let (_t, store) = temp_store();
        let patch = patch_between(
            &store,
            &[("a.txt", b"a1\n"), ("z.txt", b"z1\n")],
            &[("a.txt", b"a2\n"), ("z.txt", b"z2\n")],
        );

        let a_pos = patch.find("diff --git a/a.txt").unwrap();
        let z_pos = patch.find("diff --git a/z.txt").unwrap();
        assert!(a_pos < z_pos);
    }

    // P-012: a terminator-only change still renders changed lines
    #[test]
    fn test_crlf_to_lf_change() {
        let (_t, store) = temp_store();
        let patch = patch_between(&store, &[("f.txt", b"a\r\nb\r\n")], &[("f.txt", b"a\nb\n")]);

        assert!(patch.contains("@@"));
        assert!(patch.contains("-a\r\n"));
        assert!(patch.contains("-b\r\n"));
        assert!(patch.contains("+a\n"));
        assert!(patch.contains("+b\n"));
    }

    // P-013: non-UTF-8 byte edits without NULs still produce hunks
    #[test]
    fn test_invalid_utf8_change_has_hunks() {
        let (_t, store) = temp_store();
        let patch = patch_between(
            &store,
            &[("f.bin", b"\x80feld\n".as_slice())],
            &[("f.bin", b"\x81feld\n".as_slice())],
        );

        assert!(patch.contains("@@ -1 +1 @@\n"));
        assert!(patch.contains("-\u{FFFD}feld\n"));
        assert!(patch.contains("+\u{FFFD}feld\n"));
    }

    // P-011: identical runs produce one hunk with shared context
    #[test]
    fn test_insertion_in_middle() {
        let (_t, store) = temp_store();
        let patch = patch_between(
            &store,
            &[("f", b"a\nb\nc\n")],
            &[("f", b"a\nb\nX\nc\n")],
        );

        assert!(patch.contains("@@ -1,3 +1,4 @@\n"));
        assert!(patch.contains(" a\n b\n+X\n c\n"));
    }
}
