use std::iter::Fuse;

/// Cursor over the per-line selection flags.
///
/// One flag is taken for every `+`/`-` line, in diff order. Lines past the
/// end of the flags count as not selected; how many times that happened is
/// kept apart from the flags the caller actually supplied.
#[derive(Debug)]
pub struct Selection<I> {
    flags: Fuse<I>,
    taken: usize,
    padded: usize,
}

impl<I: Iterator<Item = bool>> Selection<I> {
    pub fn new<S>(flags: S) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            flags: flags.into_iter().fuse(),
            taken: 0,
            padded: 0,
        }
    }

    /// Take the flag for the next modified line.
    pub fn next_selected(&mut self) -> bool {
        match self.flags.next() {
            Some(selected) => {
                self.taken += 1;
                selected
            }
            None => {
                self.padded += 1;
                false
            }
        }
    }

    /// Flags consumed so far
    pub fn taken(&self) -> usize {
        self.taken
    }

    /// Modified lines that had no flag of their own
    pub fn padded(&self) -> usize {
        self.padded
    }

    /// Drain what is left, returning how many flags were never used.
    pub fn unused(self) -> usize {
        self.flags.count()
    }
}
