//! Format dispatch from raw command output to JSON records.

use crate::GitScribeError;
use crate::{config, history, listing, status};
use serde::Serialize;
use serde_json::Value;

/// The kinds of git output this crate can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decoder {
    /// `git status --porcelain -b`
    Status,
    /// `git diff --numstat`
    Numstat,
    /// `git log --decorate=full --pretty=fuller --parents --numstat`
    Log,
    /// `git config --list`
    Config,
    /// `git branch`
    Branches,
    /// `git tag`
    Tags,
    /// `git remote`
    Remotes,
    /// `git ls-remote`
    LsRemote,
    /// `git stash show --stat`
    StashShow,
    /// `.gitmodules`
    Submodules,
}

impl Decoder {
    /// Decode `text` and render the records as JSON.
    pub fn decode(self, text: &str) -> Result<Value, GitScribeError> {
        log::debug!("decoding {} bytes as {self:?}", text.len());
        match self {
            Self::Status => to_json(status::parse_status(text)?),
            Self::Numstat => to_json(status::parse_numstat(text)?),
            Self::Log => to_json(history::parse_log(text)),
            Self::Config => to_json(config::parse_config(text)),
            Self::Branches => to_json(listing::parse_branches(text)),
            Self::Tags => to_json(listing::parse_tags(text)),
            Self::Remotes => to_json(listing::parse_remotes(text)),
            Self::LsRemote => to_json(listing::parse_ls_remote(text)?),
            Self::StashShow => to_json(listing::parse_stash_show(text)),
            Self::Submodules => to_json(config::parse_submodules(text)?),
        }
    }
}

fn to_json<T: Serialize>(records: T) -> Result<Value, GitScribeError> {
    Ok(serde_json::to_value(records)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    #[test]
    fn status_json_shape() {
        let value = Decoder::Status
            .decode("## main\n M src/lib.rs\n?? logo.png\n")
            .unwrap();
        assert_eq!(value["branch"], "main");
        assert_eq!(
            value["files"]["logo.png"],
            json!({
                "displayName": "logo.png",
                "finalName": "logo.png",
                "staged": false,
                "removed": false,
                "isNew": true,
                "conflict": false,
                "renamed": false,
                "type": "image",
            })
        );
    }

    #[test]
    fn numstat_counts_and_binary_markers() {
        let value = Decoder::Numstat
            .decode("3\t1\tREADME.md\n-\t-\tlogo.png\n")
            .unwrap();
        assert_eq!(
            value,
            json!({
                "README.md": { "additions": 3, "deletions": 1 },
                "logo.png": { "additions": "-", "deletions": "-" },
            })
        );
    }

    #[test]
    fn listings() {
        assert_eq!(
            Decoder::Branches.decode("  dev\n* main\n").unwrap(),
            json!([
                { "name": "dev", "current": false },
                { "name": "main", "current": true },
            ])
        );
        assert_eq!(
            Decoder::Tags.decode("v1.0\nv1.1\n").unwrap(),
            json!(["v1.0", "v1.1"])
        );
    }

    #[test]
    fn errors_propagate() {
        let err = Decoder::LsRemote.decode("not-a-sha\trefs/heads/main\n").unwrap_err();
        assert!(matches!(
            err,
            GitScribeError::ListingError(listing::ListingError::InvalidObjectId { .. })
        ));
    }
}
