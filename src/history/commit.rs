use crate::file_type::FileType;
use crate::status::LineCount;
use nom::bytes::complete::take_till1;
use nom::character::complete::char;
use nom::sequence::delimited;
use nom::{IResult, Parser};
use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

/// Label of the synthetic first row in [`CommitRecord::file_line_diffs`]
pub const TOTAL_LABEL: &str = "Total";

/// One row of per-file change statistics.
///
/// Serialises as `[additions, deletions, filename, type]` so clients can
/// treat the list as a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLineDiff {
    pub additions: LineCount,
    pub deletions: LineCount,
    pub filename: String,
    /// `None` only for the synthetic total row
    pub file_type: Option<FileType>,
}

impl FileLineDiff {
    pub(super) fn new(additions: &str, deletions: &str, filename: &str) -> Self {
        Self {
            additions: additions.into(),
            deletions: deletions.into(),
            filename: filename.to_string(),
            file_type: Some(FileType::classify(filename)),
        }
    }

    /// Sum the numeric counts of `rows`; binary markers do not contribute.
    pub(super) fn total(rows: &[FileLineDiff]) -> Self {
        let additions = rows.iter().filter_map(|row| row.additions.count()).sum();
        let deletions = rows.iter().filter_map(|row| row.deletions.count()).sum();
        Self {
            additions: LineCount::Lines(additions),
            deletions: LineCount::Lines(deletions),
            filename: TOTAL_LABEL.to_string(),
            file_type: None,
        }
    }
}

impl Serialize for FileLineDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_tuple(4)?;
        row.serialize_element(&self.additions)?;
        row.serialize_element(&self.deletions)?;
        row.serialize_element(&self.filename)?;
        row.serialize_element(&self.file_type)?;
        row.end()
    }
}

/// A commit decoded from `git log --pretty=fuller --numstat` output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub sha1: String,
    /// Empty for a root commit, two or more for a merge
    pub parents: Vec<String>,
    /// Decorations such as `HEAD`, `refs/heads/main`, `tag: refs/tags/v1`
    pub refs: Vec<String>,
    pub is_head: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflog_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflog_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflog_author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflog_author_email: Option<String>,
    /// Date of a signature that was made and could be checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_date: Option<String>,
    /// Signer of a fully verified signature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_made: Option<String>,
    pub message: String,
    /// Per-file stats, led by a [`TOTAL_LABEL`] row when the commit has any
    pub file_line_diffs: Vec<FileLineDiff>,
}

impl CommitRecord {
    /// Build a record from a `commit <sha1> [<parent>...] [(<refs>)]` line.
    ///
    /// Returns `None` when the line carries no object id.
    pub(super) fn from_commit_line(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("commit ")?;
        let (ids, decorations) = match rest.split_once('(') {
            Some((ids, refs)) => (ids, Some(refs.strip_suffix(')').unwrap_or(refs))),
            None => (rest, None),
        };

        let mut ids = ids.split_whitespace().map(str::to_string);
        let sha1 = ids.next()?;
        let refs: Vec<String> = decorations
            .into_iter()
            .flat_map(|refs| refs.split(", "))
            .flat_map(|item| item.split(" -> "))
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();

        Some(Self {
            sha1,
            parents: ids.collect(),
            is_head: refs.iter().any(|item| item.trim() == "HEAD"),
            refs,
            ..Self::default()
        })
    }

    /// Apply one recognised header. Payloads that do not have the expected
    /// shape leave the record untouched.
    pub(super) fn apply_header(&mut self, header: Header, value: &str) {
        match header {
            Header::Author => {
                let (name, email) = split_identity(value);
                self.author_name = Some(name);
                self.author_email = email;
            }
            Header::Commit => {
                let (name, email) = split_identity(value);
                self.committer_name = Some(name);
                self.committer_email = email;
            }
            Header::AuthorDate => self.author_date = Some(value.to_string()),
            Header::CommitDate => self.commit_date = Some(value.to_string()),
            Header::Reflog => self.apply_reflog(value),
            Header::Gpg => self.apply_gpg(value),
        }
    }

    /// `HEAD@{0} (Jane Doe <jane@example.com>)`
    fn apply_reflog(&mut self, value: &str) {
        self.reflog_id = value
            .split_once('{')
            .and_then(|(_, rest)| rest.split_once('}'))
            .map(|(id, _)| id.to_string());

        let selector = value.split_once(' ').map_or(value, |(selector, _)| selector);
        self.reflog_name = Some(selector.replacen("refs/", "", 1));

        if let Some((_, author)) = value.split_once('(') {
            let author = author.strip_suffix(')').unwrap_or(author);
            let (name, email) = split_identity(author);
            self.reflog_author_name = Some(name);
            self.reflog_author_email = email;
        }
    }

    fn apply_gpg(&mut self, value: &str) {
        if let Some(date) = value.strip_prefix("Signature made") {
            self.signature_date = Some(date.trim().to_string());
        } else if let Some((_, signer)) = value.split_once("Good signature from") {
            self.signature_made = Some(signer.replace("[ultimate]", "").trim().to_string());
        } else if value.contains("Can't check signature") {
            self.signature_date = None;
        }
    }
}

/// Header keys understood inside a commit's header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Header {
    Author,
    Commit,
    AuthorDate,
    CommitDate,
    Reflog,
    Gpg,
}

impl Header {
    /// Split `Key: value` into a known header and its trimmed value.
    pub(super) fn split(line: &str) -> Option<(Self, &str)> {
        let (key, value) = line.split_once(": ")?;
        let header = match key {
            "Author" => Header::Author,
            "Commit" => Header::Commit,
            "AuthorDate" => Header::AuthorDate,
            "CommitDate" => Header::CommitDate,
            "Reflog" => Header::Reflog,
            "gpg" => Header::Gpg,
            _ => return None,
        };
        Some((header, value.trim()))
    }
}

fn name_email(input: &str) -> IResult<&str, (&str, &str)> {
    (
        take_till1(|c: char| c == '<'),
        delimited(char('<'), take_till1(|c: char| c == '>'), char('>')),
    )
        .parse(input)
}

/// Split `Name <email>`; without that shape the whole value is the name.
fn split_identity(value: &str) -> (String, Option<String>) {
    match name_email(value) {
        Ok((_, (name, email))) => (name.trim().to_string(), Some(email.trim().to_string())),
        Err(_) => (value.to_string(), None),
    }
}
