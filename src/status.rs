//! Decoders for `git status --porcelain -b` and `git diff --numstat` output.
//!
//! # Status format
//!
//! The first line carries branch metadata (`## main...origin/main`); every
//! following line is `XY <name>` where `X` is the index state and `Y` the
//! working tree state. Renames are written `R  old -> new` and any name may be
//! wrapped in double quotes.
//!
//! # Examples
//!
//! ```
//! use git_scribe::status::parse_status;
//!
//! let status = parse_status("## main\nA  foo.txt\n").unwrap();
//! assert_eq!(status.branch, "main");
//! let entry = &status.files["foo.txt"];
//! assert!(entry.staged && entry.is_new);
//! assert!(!entry.removed && !entry.conflict && !entry.renamed);
//! ```

use crate::file_type::FileType;
use error_set::error_set;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

error_set! {
    /// Errors from decoding status or numstat output
    StatusError := {
        /// A status line has no room for a file name after its status code
        #[display("Status line '{line}' has no file name")]
        MissingFileName { line: String },
        /// A numstat line does not have three tab-separated fields
        #[display("Numstat line '{line}' must be 'additions<TAB>deletions<TAB>file'")]
        MalformedNumstat { line: String },
    }
}

/// Flags derived from one status code pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusEntry {
    /// Name as printed, `old -> new` for renames
    pub display_name: String,
    /// Name the file has after the change (the map key)
    pub final_name: String,
    pub staged: bool,
    pub removed: bool,
    pub is_new: bool,
    pub conflict: bool,
    pub renamed: bool,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

impl FileStatusEntry {
    /// Derive the entry flags from a two-character status code.
    fn from_code(index: char, worktree: char, display_name: String, final_name: String) -> Self {
        let removed = index == 'D' || worktree == 'D';
        Self {
            file_type: FileType::classify(&final_name),
            staged: matches!(index, 'A' | 'M'),
            removed,
            is_new: matches!(index, '?' | 'A') && !removed,
            conflict: (index == 'A' && worktree == 'A') || index == 'U' || worktree == 'U',
            renamed: index == 'R',
            display_name,
            final_name,
        }
    }
}

/// A decoded status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Last whitespace-delimited token of the metadata line
    pub branch: String,
    /// Entries keyed by final (post-rename) file name
    pub files: BTreeMap<String, FileStatusEntry>,
}

/// Decode `git status --porcelain -b` output.
///
/// # Errors
///
/// Returns [`StatusError::MissingFileName`] if a non-empty line is too short
/// to hold a status code followed by a file name.
pub fn parse_status(text: &str) -> Result<Status, StatusError> {
    let mut lines = text.split('\n');
    let branch = lines
        .next()
        .and_then(|header| header.split_whitespace().last())
        .unwrap_or_default()
        .to_string();

    let mut files = BTreeMap::new();
    for line in lines.filter(|line| !line.is_empty()) {
        let entry = parse_status_line(line)?;
        files.insert(entry.final_name.clone(), entry);
    }

    Ok(Status { branch, files })
}

fn parse_status_line(line: &str) -> Result<FileStatusEntry, StatusError> {
    let mut chars = line.chars();
    let (Some(index), Some(worktree)) = (chars.next(), chars.next()) else {
        return Err(StatusError::MissingFileName {
            line: line.to_string(),
        });
    };

    let name = chars.as_str().get(1..).map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(StatusError::MissingFileName {
            line: line.to_string(),
        });
    }

    let (display_name, final_name) = match name.split_once(" -> ") {
        Some((old, new)) if index == 'R' => {
            let (old, new) = (unquote(old), unquote(new));
            (format!("{old} -> {new}"), new.to_string())
        }
        _ => (unquote(name).to_string(), unquote(name).to_string()),
    };

    Ok(FileStatusEntry::from_code(
        index,
        worktree,
        display_name,
        final_name,
    ))
}

/// Strip one pair of surrounding double quotes.
fn unquote(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(name)
}

/// A line count from numstat output.
///
/// Git prints `-` instead of numbers for binary files; anything that is not a
/// plain count is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LineCount {
    Lines(u64),
    Other(String),
}

impl LineCount {
    /// Numeric value, `None` for binary markers
    #[must_use]
    pub fn count(&self) -> Option<u64> {
        match self {
            LineCount::Lines(n) => Some(*n),
            LineCount::Other(_) => None,
        }
    }
}

impl From<&str> for LineCount {
    fn from(field: &str) -> Self {
        field
            .parse::<u64>()
            .map_or_else(|_| LineCount::Other(field.to_string()), LineCount::Lines)
    }
}

impl fmt::Display for LineCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineCount::Lines(n) => write!(f, "{n}"),
            LineCount::Other(raw) => f.write_str(raw),
        }
    }
}

/// Per-file addition/deletion counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumstatEntry {
    pub additions: LineCount,
    pub deletions: LineCount,
}

/// Decode `git diff --numstat` output into entries keyed by file name.
///
/// # Errors
///
/// Returns [`StatusError::MalformedNumstat`] for a non-empty line without
/// three tab-separated fields.
pub fn parse_numstat(text: &str) -> Result<BTreeMap<String, NumstatEntry>, StatusError> {
    text.split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut fields = line.splitn(3, '\t');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(additions), Some(deletions), Some(file)) => Ok((
                    file.to_string(),
                    NumstatEntry {
                        additions: additions.into(),
                        deletions: deletions.into(),
                    },
                )),
                _ => Err(StatusError::MalformedNumstat {
                    line: line.to_string(),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn entry(text: &str, key: &str) -> FileStatusEntry {
        parse_status(text).unwrap().files.remove(key).unwrap()
    }

    #[test]
    fn branch_is_last_token_of_header() {
        let status = parse_status("## main...origin/main [ahead 1]\n").unwrap();
        assert_eq!(status.branch, "1]");
        let status = parse_status("## feature/x\n").unwrap();
        assert_eq!(status.branch, "feature/x");
        assert!(status.files.is_empty());
    }

    #[test]
    fn added_file_end_to_end() {
        let status = parse_status("## main\nA  foo.txt\n").unwrap();
        assert_eq!(status.branch, "main");
        assert_eq!(
            status.files["foo.txt"],
            FileStatusEntry {
                display_name: "foo.txt".to_string(),
                final_name: "foo.txt".to_string(),
                staged: true,
                removed: false,
                is_new: true,
                conflict: false,
                renamed: false,
                file_type: FileType::Text,
            }
        );
    }

    #[test]
    fn untracked_file() {
        let e = entry("## main\n?? new.png\n", "new.png");
        assert!(e.is_new);
        assert!(!e.staged && !e.removed && !e.conflict && !e.renamed);
        assert_eq!(e.file_type, FileType::Image);
    }

    #[test]
    fn rename_is_keyed_by_new_name() {
        let e = entry("## main\nR  old.txt -> new.txt\n", "new.txt");
        assert!(e.renamed);
        assert_eq!(e.display_name, "old.txt -> new.txt");
        assert_eq!(e.final_name, "new.txt");
    }

    #[test]
    fn quoted_rename_unquotes_each_side() {
        let e = entry("## main\nR  \"a b.txt\" -> \"c d.txt\"\n", "c d.txt");
        assert_eq!(e.display_name, "a b.txt -> c d.txt");
    }

    #[test]
    fn arrow_in_name_without_rename_code_is_literal() {
        let e = entry("## main\n?? a -> b\n", "a -> b");
        assert!(!e.renamed);
    }

    #[test]
    fn deletions_on_either_side() {
        let staged = entry("## main\nD  gone.txt\n", "gone.txt");
        assert!(staged.removed && !staged.is_new && !staged.staged);
        let unstaged = entry("## main\nAD gone.txt\n", "gone.txt");
        assert!(unstaged.removed && unstaged.staged && !unstaged.is_new);
    }

    #[test]
    fn conflicts() {
        assert!(entry("## main\nAA both.txt\n", "both.txt").conflict);
        assert!(entry("## main\nUU both.txt\n", "both.txt").conflict);
        assert!(entry("## main\nDU both.txt\n", "both.txt").conflict);
        assert!(!entry("## main\nMM both.txt\n", "both.txt").conflict);
    }

    #[test]
    fn modified_in_worktree_only_is_not_staged() {
        let e = entry("## main\n M file.rs\n", "file.rs");
        assert!(!e.staged && !e.is_new && !e.removed);
    }

    #[test]
    fn missing_file_name_is_rejected() {
        assert!(matches!(
            parse_status("## main\nM \n"),
            Err(StatusError::MissingFileName { .. })
        ));
        assert!(matches!(
            parse_status("## main\nM\n"),
            Err(StatusError::MissingFileName { .. })
        ));
    }

    #[test]
    fn empty_input_has_no_files() {
        let status = parse_status("").unwrap();
        assert_eq!(status.branch, "");
        assert!(status.files.is_empty());
    }

    #[test]
    fn numstat_counts_and_binary_markers() {
        let stats = parse_numstat("3\t1\tsrc/lib.rs\n-\t-\tlogo.png\n").unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["src/lib.rs"].additions, LineCount::Lines(3));
        assert_eq!(stats["src/lib.rs"].deletions, LineCount::Lines(1));
        assert_eq!(stats["logo.png"].additions, LineCount::Other("-".into()));
        assert_eq!(stats["logo.png"].deletions.count(), None);
    }

    #[test]
    fn numstat_serializes_markers_verbatim() {
        let stats = parse_numstat("-\t2\tx.bin").unwrap();
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"x.bin":{"additions":"-","deletions":2}}"#
        );
    }

    #[test]
    fn numstat_rejects_short_lines() {
        assert!(matches!(
            parse_numstat("1\t2\n"),
            Err(StatusError::MalformedNumstat { .. })
        ));
    }
}
