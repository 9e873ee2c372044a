//! Structured decoding of git porcelain output and line-level patch
//! selection.
//!
//! Every decoder is a pure function from the text a git command printed to
//! typed records that serialise with the field names clients expect:
//!
//! | output                                    | decoder                        |
//! |-------------------------------------------|--------------------------------|
//! | `git status --porcelain -b`               | [`parse_status`]               |
//! | `git diff --numstat`                      | [`parse_numstat`]              |
//! | `git log --pretty=fuller --numstat ...`   | [`parse_log`]                  |
//! | `git config --list`                       | [`parse_config`]               |
//! | `.gitmodules`                             | [`parse_submodules`]           |
//! | `git branch`, `git tag`, `git remote`     | [`parse_branches`], [`parse_tags`], [`parse_remotes`] |
//! | `git ls-remote`                           | [`parse_ls_remote`]            |
//! | `git stash show --stat`                   | [`parse_stash_show`]           |
//!
//! [`transform_patch`] goes the other way: it narrows a unified diff down to
//! a selection of its modified lines, ready for `git apply --cached`.
//!
//! Nothing here runs git; obtaining the text is up to the caller.

use error_set::error_set;

pub mod config;
pub mod decode;
pub mod file_type;
pub mod history;
pub mod listing;
pub mod patch;
pub mod status;

pub use config::{ConfigError, SubmoduleEntry, parse_config, parse_submodules};
pub use decode::Decoder;
pub use file_type::FileType;
pub use history::{CommitRecord, History, parse_log};
pub use listing::{ListingError, parse_branches, parse_ls_remote, parse_remotes, parse_stash_show, parse_tags};
pub use patch::{PatchError, PatchOutcome, select_lines, transform_patch};
pub use status::{FileStatusEntry, Status, StatusError, parse_numstat, parse_status};

error_set! {
    /// Top-level error for git-scribe operations
    GitScribeError := {
        StatusError(StatusError),
        ListingError(ListingError),
        ConfigError(ConfigError),
        PatchError(PatchError),
        JsonError(serde_json::Error),
    }
}
