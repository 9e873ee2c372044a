use super::commit::{CommitRecord, FileLineDiff, Header};
use super::History;
use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::sequence::{separated_pair, terminated};
use nom::{IResult, Parser};

/// Where the parser is inside the current commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting `commit <sha1> ...`
    CommitLine,
    /// `Key: value` lines until a blank line
    Headers,
    /// Indented message lines
    Message,
    /// `additions<TAB>deletions<TAB>file` rows
    FileChanges,
}

/// Line-at-a-time `git log` decoder with one line of lookahead.
///
/// Feed every line together with the line that follows it (`None` at end of
/// input), then call [`LogParser::finish`]. Lines that fit no recognised
/// shape are skipped.
#[derive(Debug)]
pub struct LogParser {
    state: State,
    commits: Vec<CommitRecord>,
    head_exists: bool,
}

impl Default for LogParser {
    fn default() -> Self {
        Self {
            state: State::CommitLine,
            commits: Vec::new(),
            head_exists: false,
        }
    }
}

impl LogParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume `line`, using `next` to decide where the current section ends.
    pub fn feed(&mut self, line: &str, next: Option<&str>) {
        match self.state {
            State::CommitLine => self.commit_line(line),
            State::Headers => self.header_line(line),
            State::Message => self.message_line(line, next),
            State::FileChanges => self.file_change_line(line, next),
        }
    }

    /// Finish parsing and hand back the decoded history.
    #[must_use]
    pub fn finish(mut self) -> History {
        for commit in &mut self.commits {
            commit.message = commit.message.trim().to_string();
        }
        History {
            commits: self.commits,
            head_exists: self.head_exists,
        }
    }

    fn transition(&mut self, state: State) {
        log::debug!("log parser: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn commit_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let Some(commit) = CommitRecord::from_commit_line(line) else {
            log::trace!("skipping line outside a commit: {line:?}");
            return;
        };
        self.head_exists |= commit.is_head;
        self.commits.push(commit);
        self.transition(State::Headers);
    }

    fn header_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.transition(State::Message);
            return;
        }
        match (Header::split(line), self.commits.last_mut()) {
            (Some((header, value)), Some(commit)) => commit.apply_header(header, value),
            _ => log::trace!("ignoring unrecognised header: {line:?}"),
        }
    }

    fn message_line(&mut self, line: &str, next: Option<&str>) {
        // a commit with an empty message runs straight into the next one
        if starts_commit(line) {
            self.transition(State::CommitLine);
            self.commit_line(line);
            return;
        }
        // stats without a message separator in front of them
        if numstat_row(line).is_some() {
            self.transition(State::FileChanges);
            self.file_change_line(line, next);
            return;
        }

        let ends_here = match next {
            Some(next) if numstat_row(next).is_some() => Some(State::FileChanges),
            Some(next) if starts_commit(next) => Some(State::CommitLine),
            _ => None,
        };

        // the separator line before stats or the next commit carries nothing
        if ends_here.is_none() || !line.trim().is_empty() {
            self.push_message_line(line);
        }
        if let Some(state) = ends_here {
            self.transition(state);
        }
    }

    fn push_message_line(&mut self, line: &str) {
        let Some(commit) = self.commits.last_mut() else {
            return;
        };
        if !commit.message.is_empty() {
            commit.message.push('\n');
        }
        commit.message.push_str(line.trim());
    }

    fn file_change_line(&mut self, line: &str, next: Option<&str>) {
        if starts_commit(line) {
            self.close_file_changes();
            self.commit_line(line);
            return;
        }
        if let Some(commit) = self.commits.last_mut() {
            match numstat_row(line) {
                Some((additions, deletions, filename)) => commit
                    .file_line_diffs
                    .push(FileLineDiff::new(additions, deletions, filename)),
                None if !line.is_empty() => log::trace!("ignoring non-numstat line: {line:?}"),
                None => {}
            }
        }

        if next.is_none_or(starts_commit) {
            self.close_file_changes();
        }
    }

    fn close_file_changes(&mut self) {
        if let Some(commit) = self.commits.last_mut() {
            if !commit.file_line_diffs.is_empty() {
                let total = FileLineDiff::total(&commit.file_line_diffs);
                commit.file_line_diffs.insert(0, total);
            }
        }
        self.transition(State::CommitLine);
    }
}

fn starts_commit(line: &str) -> bool {
    line.starts_with("commit ")
}

fn count(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit() || c == '-').parse(input)
}

fn counts(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(count, char('\t'), terminated(count, char('\t'))).parse(input)
}

/// Split a numstat row `additions<TAB>deletions<TAB>file`.
fn numstat_row(line: &str) -> Option<(&str, &str, &str)> {
    let (filename, (additions, deletions)) = counts(line).ok()?;
    (!filename.is_empty()).then_some((additions, deletions, filename))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn numstat_row_shapes() {
        assert_eq!(numstat_row("3\t1\tsrc/a.rs"), Some(("3", "1", "src/a.rs")));
        assert_eq!(numstat_row("-\t-\timg.png"), Some(("-", "-", "img.png")));
        assert_eq!(numstat_row("3\t1\t"), None);
        assert_eq!(numstat_row("    3\t1\tindented"), None);
        assert_eq!(numstat_row("commit abc"), None);
    }

    #[test]
    fn feeding_lines_one_at_a_time() {
        let lines = [
            "commit abc",
            "Author: Jane <j@x>",
            "",
            "    message",
            "",
            "1\t0\ta.txt",
        ];
        let mut parser = LogParser::new();
        for (i, line) in lines.iter().enumerate() {
            parser.feed(line, lines.get(i + 1).copied());
        }
        let history = parser.finish();
        assert_eq!(history.commits.len(), 1);
        let commit = &history.commits[0];
        assert_eq!(commit.message, "message");
        // the final row counts even without a trailing newline
        assert_eq!(commit.file_line_diffs.len(), 2);
        assert_eq!(commit.file_line_diffs[1].filename, "a.txt");
    }

    #[test]
    fn stray_lines_before_first_commit_are_skipped() {
        let lines = ["warning: something", "", "commit abc", "", "    hi"];
        let mut parser = LogParser::new();
        for (i, line) in lines.iter().enumerate() {
            parser.feed(line, lines.get(i + 1).copied());
        }
        let history = parser.finish();
        assert_eq!(history.commits.len(), 1);
        assert_eq!(history.commits[0].message, "hi");
    }
}
