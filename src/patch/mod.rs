//! Line-level selection over an existing unified diff.
//!
//! Given the diff of a file and one flag per modified line, [`transform_patch`]
//! produces a diff that applies only the selected lines:
//!
//! - a selected `+`/`-` line is kept as is
//! - an unselected addition is dropped
//! - an unselected deletion becomes a context line, since the text stays in
//!   the file
//!
//! Hunk headers are rewritten so their counts match what follows them: the
//! new-side length shrinks by the additions dropped from the hunk (and grows
//! by the deletions turned into context), and the new-side start moves back
//! by the net lines dropped in earlier hunks of the same file. The old side
//! is never renumbered.
//!
//! Hunks left with only context are removed, as are file sections left with
//! no hunks. Sections that never had hunks (binary changes, mode changes,
//! pure renames) carry no selectable line and are removed too.
//!
//! # Examples
//!
//! ```
//! use git_scribe::patch::transform_patch;
//!
//! let diff = "\
//! --- a/notes.txt
//! +++ b/notes.txt
//! @@ -1,2 +1,3 @@
//!  keep
//! +wanted
//! +unwanted
//!  keep too
//! ";
//!
//! let patch = transform_patch([true, false], diff).unwrap().unwrap();
//! assert_eq!(patch, "\
//! --- a/notes.txt
//! +++ b/notes.txt
//! @@ -1,2 +1,2 @@
//!  keep
//! +wanted
//!  keep too
//! ");
//!
//! assert_eq!(transform_patch([false, false], diff).unwrap(), None);
//! ```

mod header;
mod selection;

pub use header::HunkHeader;
pub use selection::Selection;

use error_set::error_set;
use std::borrow::Cow;

error_set! {
    /// Errors from rewriting a patch
    PatchError := {
        /// Adjusting a hunk header would move it before the start of the file
        #[display("Adjusting hunk '{header}' moves it outside the file")]
        AdjustmentOutOfRange { header: String },
    }
}

/// Result of a selection pass, with bookkeeping about the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// The rewritten diff, `None` when no line was selected
    pub patch: Option<String>,
    /// Modified lines that were selected
    pub selected_lines: usize,
    /// Modified lines beyond the end of the flags, treated as unselected
    pub missing_flags: usize,
    /// Flags left over after the last modified line
    pub unused_flags: usize,
}

/// Keep only the selected modified lines of `diff`.
///
/// `selection` holds one flag per `+`/`-` line in diff order and is
/// consumed. Returns `Ok(None)` when nothing is selected.
///
/// # Errors
///
/// Returns [`PatchError::AdjustmentOutOfRange`] if a rewritten hunk header
/// would need a negative line number, which only happens for diffs whose
/// headers disagree with their bodies.
pub fn transform_patch<S>(selection: S, diff: &str) -> Result<Option<String>, PatchError>
where
    S: IntoIterator<Item = bool>,
{
    Ok(select_lines(selection, diff)?.patch)
}

/// Like [`transform_patch`], also reporting how the flags lined up with the
/// modified lines.
///
/// # Errors
///
/// See [`transform_patch`].
pub fn select_lines<S>(selection: S, diff: &str) -> Result<PatchOutcome, PatchError>
where
    S: IntoIterator<Item = bool>,
{
    let mut builder = PatchBuilder::new(Selection::new(selection));

    let (body, trailing_newline) = match diff.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (diff, false),
    };
    if !body.is_empty() {
        for line in body.split('\n') {
            builder.push(line)?;
        }
    }
    builder.finish(trailing_newline)
}

#[derive(Debug)]
struct PendingHunk {
    /// Position of the header in the output
    index: usize,
    header: HunkHeader,
}

struct PatchBuilder<'a, I> {
    selection: Selection<I>,
    out: Vec<Cow<'a, str>>,
    /// Still before the first hunk of the current file
    in_preamble: bool,
    pending: Option<PendingHunk>,
    /// Net new-side lines dropped by finished hunks of this file
    ignored_total: i64,
    /// Net new-side lines dropped by the pending hunk
    ignored_current: i64,
    file_start: usize,
    file_hunks_seen: usize,
    file_hunks_kept: usize,
    selected: usize,
    /// The previous modified line was dropped
    dropped_last: bool,
}

impl<'a, I: Iterator<Item = bool>> PatchBuilder<'a, I> {
    fn new(selection: Selection<I>) -> Self {
        Self {
            selection,
            out: Vec::new(),
            in_preamble: true,
            pending: None,
            ignored_total: 0,
            ignored_current: 0,
            file_start: 0,
            file_hunks_seen: 0,
            file_hunks_kept: 0,
            selected: 0,
            dropped_last: false,
        }
    }

    fn push(&mut self, line: &'a str) -> Result<(), PatchError> {
        if line.starts_with("diff ") {
            self.finish_file()?;
            self.file_start = self.out.len();
            self.in_preamble = true;
            self.out.push(Cow::Borrowed(line));
            return Ok(());
        }

        if let Some(header) = HunkHeader::parse(line) {
            self.finish_hunk()?;
            self.in_preamble = false;
            self.file_hunks_seen += 1;
            self.pending = Some(PendingHunk {
                index: self.out.len(),
                header,
            });
            self.out.push(Cow::Borrowed(line));
            return Ok(());
        }

        if self.in_preamble {
            self.out.push(Cow::Borrowed(line));
            return Ok(());
        }

        match line.as_bytes().first() {
            Some(b'+') => {
                if self.selection.next_selected() {
                    self.keep_modified(line);
                } else {
                    self.ignored_current += 1;
                    self.dropped_last = true;
                }
            }
            Some(b'-') => {
                if self.selection.next_selected() {
                    self.keep_modified(line);
                } else {
                    self.ignored_current -= 1;
                    self.dropped_last = false;
                    self.out.push(Cow::Owned(format!(" {}", &line[1..])));
                }
            }
            // "\ No newline at end of file" belongs to the line before it
            Some(b'\\') if self.dropped_last => {}
            _ => {
                self.dropped_last = false;
                self.out.push(Cow::Borrowed(line));
            }
        }
        Ok(())
    }

    fn keep_modified(&mut self, line: &'a str) {
        self.selected += 1;
        self.dropped_last = false;
        self.out.push(Cow::Borrowed(line));
    }

    /// Rewrite the pending header, or drop its hunk if nothing in it changes
    /// the file any more.
    fn finish_hunk(&mut self) -> Result<(), PatchError> {
        let Some(PendingHunk { index, header }) = self.pending.take() else {
            return Ok(());
        };

        let body = &self.out[index + 1..];
        if body.iter().all(|line| !is_modification(line)) {
            log::debug!("dropping hunk '{header}' with no selected lines");
            self.out.truncate(index);
        } else {
            let adjusted = header.adjusted(self.ignored_total, self.ignored_current)?;
            warn_on_length_mismatch(&adjusted, body);
            if adjusted != header {
                log::debug!("rewriting hunk '{header}' as '{adjusted}'");
                self.out[index] = Cow::Owned(adjusted.to_string());
            }
            self.file_hunks_kept += 1;
        }

        self.ignored_total += self.ignored_current;
        self.ignored_current = 0;
        Ok(())
    }

    /// Close the current file section, removing it entirely unless one of its
    /// hunks survived.
    fn finish_file(&mut self) -> Result<(), PatchError> {
        self.finish_hunk()?;
        if self.file_hunks_kept == 0 && self.out.len() > self.file_start {
            if self.file_hunks_seen == 0 {
                log::debug!(
                    "dropping file section without hunks: {:?}",
                    self.out[self.file_start]
                );
            } else {
                log::debug!("dropping file section with no selected lines");
            }
            self.out.truncate(self.file_start);
        }
        self.file_hunks_seen = 0;
        self.file_hunks_kept = 0;
        self.ignored_total = 0;
        self.dropped_last = false;
        Ok(())
    }

    fn finish(mut self, trailing_newline: bool) -> Result<PatchOutcome, PatchError> {
        self.finish_file()?;

        let missing_flags = self.selection.padded();
        if missing_flags > 0 {
            log::warn!(
                "selection covered {} modified lines, {missing_flags} more treated as unselected",
                self.selection.taken()
            );
        }
        let unused_flags = self.selection.unused();
        if unused_flags > 0 {
            log::debug!("{unused_flags} selection flags left over");
        }

        let patch = (self.selected > 0).then(|| {
            let mut text = self.out.join("\n");
            if trailing_newline {
                text.push('\n');
            }
            text
        });

        Ok(PatchOutcome {
            patch,
            selected_lines: self.selected,
            missing_flags,
            unused_flags,
        })
    }
}

fn is_modification(line: &str) -> bool {
    line.starts_with('+') || line.starts_with('-')
}

/// Headers are rewritten arithmetically from the original counts; when the
/// input's own header already disagreed with its body the result will too.
fn warn_on_length_mismatch(header: &HunkHeader, body: &[Cow<'_, str>]) {
    let (mut old, mut new) = (0u32, 0u32);
    for line in body {
        match line.as_bytes().first() {
            Some(b'+') => new += 1,
            Some(b'-') => old += 1,
            Some(b'\\') => {}
            _ => {
                old += 1;
                new += 1;
            }
        }
    }
    if (old, new) != (header.old_len, header.new_len) {
        log::warn!(
            "hunk '{header}' is followed by {old} old and {new} new lines; the input header was inconsistent"
        );
    }
}
