//! Decoder for commit history as printed by
//! `git log --decorate=full --pretty=fuller --parents --numstat`.
//!
//! Each commit moves through four sections:
//!
//! 1. `commit <sha1> [<parent>...] [(<refs>)]`
//! 2. header lines (`Author:`, `Commit:`, `AuthorDate:`, `CommitDate:`,
//!    `Reflog:`, `gpg:`) up to a blank line
//! 3. the indented message
//! 4. optional numstat rows, summarised by a leading `Total` row
//!
//! The boundaries between sections 3 and 4, and between one commit and the
//! next, are only visible from the following line, so the parser is driven
//! with one line of lookahead (see [`LogParser::feed`]).
//!
//! # Examples
//!
//! ```
//! use git_scribe::history::parse_log;
//!
//! let text = "commit 2222222 1111111 (HEAD -> refs/heads/main)\n\
//!             Author:     Jane Doe <jane@example.com>\n\
//!             \n\
//!             \x20   Second\n\
//!             \n\
//!             4\t1\tsrc/lib.rs\n\
//!             \n\
//!             commit 1111111\n\
//!             Author:     Jane Doe <jane@example.com>\n\
//!             \n\
//!             \x20   Root\n";
//!
//! let history = parse_log(text);
//! assert!(history.head_exists);
//! assert_eq!(history.commits[0].parents, vec!["1111111"]);
//! assert_eq!(history.commits[0].file_line_diffs[0].filename, "Total");
//! assert!(history.commits[1].parents.is_empty());
//! assert_eq!(history.commits[1].message, "Root");
//! ```

mod commit;
mod parser;

pub use commit::{CommitRecord, FileLineDiff, TOTAL_LABEL};
pub use parser::LogParser;

use serde::Serialize;

/// Commits in the order they were printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub commits: Vec<CommitRecord>,
    /// Whether any commit is decorated with `HEAD`
    #[serde(rename = "isHeadExist")]
    pub head_exists: bool,
}

impl IntoIterator for History {
    type Item = CommitRecord;
    type IntoIter = std::vec::IntoIter<CommitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.commits.into_iter()
    }
}

/// Decode a stream of log lines.
pub fn parse_log_lines<'a, I>(lines: I) -> History
where
    I: IntoIterator<Item = &'a str>,
{
    let mut lines = lines.into_iter().peekable();
    let mut parser = LogParser::new();
    while let Some(line) = lines.next() {
        parser.feed(line, lines.peek().copied());
    }
    parser.finish()
}

/// Decode complete `git log` output.
#[must_use]
pub fn parse_log(text: &str) -> History {
    parse_log_lines(text.split('\n'))
}
