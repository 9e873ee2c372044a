//! Decoders for the simple line listings: branches, tags, remotes,
//! `ls-remote` and `stash show --stat`.

use error_set::error_set;
use serde::Serialize;

error_set! {
    /// Errors from decoding line listings
    ListingError := {
        /// An ls-remote line does not start with a hex object id
        #[display("ls-remote line '{line}' does not start with an object id")]
        InvalidObjectId { line: String },
    }
}

/// A local or remote branch from `git branch` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchEntry {
    pub name: String,
    pub current: bool,
}

/// A ref advertised by `git ls-remote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteRef {
    pub sha1: String,
    pub name: String,
}

/// A file touched by a stash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StashFile {
    pub filename: String,
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').filter(|line| !line.is_empty())
}

/// Decode `git branch` output. The two-character prefix `* ` marks the
/// checked-out branch.
#[must_use]
pub fn parse_branches(text: &str) -> Vec<BranchEntry> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| BranchEntry {
            name: line.get(2..).unwrap_or_default().to_string(),
            current: line.starts_with("* "),
        })
        .collect()
}

/// Decode `git tag` output.
#[must_use]
pub fn parse_tags(text: &str) -> Vec<String> {
    non_empty_lines(text).map(str::to_string).collect()
}

/// Decode `git remote` output.
#[must_use]
pub fn parse_remotes(text: &str) -> Vec<String> {
    non_empty_lines(text).map(str::to_string).collect()
}

/// Decode `git ls-remote` output. `From <url>` banner lines are dropped.
///
/// # Errors
///
/// Returns [`ListingError::InvalidObjectId`] if a line does not begin with a
/// 40 (SHA-1) or 64 (SHA-256) character hex id.
pub fn parse_ls_remote(text: &str) -> Result<Vec<RemoteRef>, ListingError> {
    non_empty_lines(text)
        .filter(|line| !line.starts_with("From "))
        .map(|line| {
            let (id, name) = line
                .split_once(|c: char| c.is_ascii_whitespace())
                .unwrap_or((line, ""));
            let valid = matches!(id.len(), 40 | 64) && id.bytes().all(|b| b.is_ascii_hexdigit());
            if !valid {
                return Err(ListingError::InvalidObjectId {
                    line: line.to_string(),
                });
            }
            Ok(RemoteRef {
                sha1: id.to_string(),
                name: name.trim().to_string(),
            })
        })
        .collect()
}

/// Decode `git stash show --stat` output. The trailing summary line
/// (`N files changed, ...`) is not a file and is dropped.
#[must_use]
pub fn parse_stash_show(text: &str) -> Vec<StashFile> {
    let lines: Vec<&str> = non_empty_lines(text).collect();
    let Some((_summary, files)) = lines.split_last() else {
        return Vec::new();
    };

    files
        .iter()
        .filter_map(|line| {
            let Some((name, _)) = line.split_once('|') else {
                log::trace!("skipping stash stat line without separator: {line:?}");
                return None;
            };
            Some(StashFile {
                filename: name.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const SHA_A: &str = "1111111111111111111111111111111111111111";
    const SHA_B: &str = "abcdefabcdefabcdefabcdefabcdefabcdefabcd";

    #[test]
    fn branches_mark_current() {
        let branches = parse_branches("  develop\n* main\n  remotes/origin/main\n\n");
        assert_eq!(
            branches,
            vec![
                BranchEntry {
                    name: "develop".into(),
                    current: false
                },
                BranchEntry {
                    name: "main".into(),
                    current: true
                },
                BranchEntry {
                    name: "remotes/origin/main".into(),
                    current: false
                },
            ]
        );
        assert_eq!(branches.iter().filter(|b| b.current).count(), 1);
    }

    #[test]
    fn current_marker_needs_following_space() {
        let branches = parse_branches("*x\n+ worktree\n* (HEAD detached at 1a2b3c4)\n");
        assert_eq!(
            branches.iter().map(|b| b.current).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert_eq!(branches[2].name, "(HEAD detached at 1a2b3c4)");
    }

    #[test]
    fn branches_skip_blank_lines() {
        assert!(parse_branches("").is_empty());
        assert!(parse_branches("\n   \n").is_empty());
    }

    #[test]
    fn tags_and_remotes_drop_empty_lines() {
        assert_eq!(parse_tags("v1.0\n\nv1.1\n"), vec!["v1.0", "v1.1"]);
        assert_eq!(parse_remotes("origin\nupstream\n"), vec!["origin", "upstream"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn ls_remote_skips_banner() {
        let text = format!(
            "From git@github.com:org/repo.git\n{SHA_A}\tHEAD\n{SHA_B}\trefs/heads/main\n"
        );
        let refs = parse_ls_remote(&text).unwrap();
        assert_eq!(
            refs,
            vec![
                RemoteRef {
                    sha1: SHA_A.into(),
                    name: "HEAD".into()
                },
                RemoteRef {
                    sha1: SHA_B.into(),
                    name: "refs/heads/main".into()
                },
            ]
        );
    }

    #[test]
    fn ls_remote_accepts_sha256_ids() {
        let id = "a".repeat(64);
        let refs = parse_ls_remote(&format!("{id}\trefs/tags/v1\n")).unwrap();
        assert_eq!(refs[0].sha1, id);
        assert_eq!(refs[0].name, "refs/tags/v1");
    }

    #[test]
    fn ls_remote_rejects_short_ids() {
        assert!(matches!(
            parse_ls_remote("abc123\tHEAD\n"),
            Err(ListingError::InvalidObjectId { .. })
        ));
    }

    #[test]
    fn stash_show_drops_summary() {
        let text = " src/lib.rs | 4 ++--\n README.md  | 1 +\n 2 files changed, 3 insertions(+), 2 deletions(-)\n";
        assert_eq!(
            parse_stash_show(text),
            vec![
                StashFile {
                    filename: "src/lib.rs".into()
                },
                StashFile {
                    filename: "README.md".into()
                },
            ]
        );
    }

    #[test]
    fn stash_show_of_nothing() {
        assert!(parse_stash_show("").is_empty());
        assert!(parse_stash_show(" 0 files changed\n").is_empty());
    }
}
