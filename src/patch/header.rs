use super::PatchError;
use nom::bytes::complete::tag;
use nom::character::complete::{char, u32 as decimal};
use nom::combinator::{opt, rest};
use nom::sequence::preceded;
use nom::{IResult, Parser};
use std::fmt;

/// A unified-diff hunk header `@@ -old_start,old_len +new_start,new_len @@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_len: u32,
    pub new_start: u32,
    pub new_len: u32,
    /// Text after the closing `@@`, usually the enclosing function
    pub section: String,
}

/// `start[,len]`; an omitted length means one line
fn range(input: &str) -> IResult<&str, (u32, u32)> {
    (decimal, opt(preceded(char(','), decimal)))
        .map(|(start, len)| (start, len.unwrap_or(1)))
        .parse(input)
}

fn header(input: &str) -> IResult<&str, HunkHeader> {
    (tag("@@ -"), range, tag(" +"), range, tag(" @@"), rest)
        .map(|(_, (old_start, old_len), _, (new_start, new_len), _, section)| HunkHeader {
            old_start,
            old_len,
            new_start,
            new_len,
            section: section.to_string(),
        })
        .parse(input)
}

impl HunkHeader {
    /// Parse a header line, `None` if the line is not one.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        header(line).ok().map(|(_, header)| header)
    }

    /// Move the new-side start back by `shift` lines dropped in earlier hunks
    /// and shrink the new side by `dropped` lines removed from this hunk. The
    /// old side describes the unchanged file and is kept as is.
    ///
    /// `dropped` goes negative when unselected deletions turned into context
    /// lines outnumber the unselected additions.
    pub fn adjusted(&self, shift: i64, dropped: i64) -> Result<Self, PatchError> {
        let out_of_range = || PatchError::AdjustmentOutOfRange {
            header: self.to_string(),
        };
        let fit = |value: i64| u32::try_from(value).map_err(|_| out_of_range());

        Ok(Self {
            old_start: self.old_start,
            old_len: self.old_len,
            new_start: fit(i64::from(self.new_start) - shift)?,
            new_len: fit(i64::from(self.new_len) - dropped)?,
            section: self.section.clone(),
        })
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@{}",
            self.old_start, self.old_len, self.new_start, self.new_len, self.section
        )
    }
}
