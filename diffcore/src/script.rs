use crate::sequence::ChangedFlags;

/// One change: `deleted` lines at `line0` of the first file replaced by
/// `inserted` lines at `line1` of the second. Either count may be zero.
/// Positions index the compared regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub line0: usize,
    pub line1: usize,
    pub deleted: usize,
    pub inserted: usize,
    /// Every affected line is blank or matches the ignore pattern.
    pub ignore: bool,
    /// For a deletion that reappears in the second file, where it starts.
    pub moved_to: Option<usize>,
    /// For an insertion lifted from the first file, where it came from.
    pub moved_from: Option<usize>,
}

/// The whole comparison result, changes in file order.
#[derive(Debug, Default)]
pub struct EditScript {
    changes: Vec<Change>,
}

impl EditScript {
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Mutable access for moved-block matchers. Edits must keep the
    /// script replaying to the same second file.
    pub fn changes_mut(&mut self) -> &mut Vec<Change> {
        &mut self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// False when every change is ignorable, in which case nothing would
    /// be printed and the files count as equal.
    pub fn has_visible_changes(&self) -> bool {
        self.changes.iter().any(|change| !change.ignore)
    }

    /// Replays the script against the compared lines of the first file,
    /// yielding the compared lines of the second.
    pub fn apply(&self, lines0: &[String], lines1: &[String]) -> Vec<String> {
        let mut result = Vec::new();
        let mut cursor = 0usize;
        for change in &self.changes {
            result.extend_from_slice(&lines0[cursor..change.line0]);
            result.extend_from_slice(&lines1[change.line1..change.line1 + change.inserted]);
            cursor = change.line0 + change.deleted;
        }
        result.extend_from_slice(&lines0[cursor..]);
        result
    }
}

/// Turns the two flag vectors into a script. Runs of changed lines that
/// touch across the two files fold into a single change.
pub(crate) fn build_script(changed0: &ChangedFlags, changed1: &ChangedFlags) -> EditScript {
    let len0 = changed0.len();
    let len1 = changed1.len();
    let mut changes = Vec::new();
    let mut i0 = 0usize;
    let mut i1 = 0usize;

    while i0 < len0 || i1 < len1 {
        if changed0.get(i0 as isize) || changed1.get(i1 as isize) {
            let line0 = i0;
            let line1 = i1;
            while changed0.get(i0 as isize) {
                i0 += 1;
            }
            while changed1.get(i1 as isize) {
                i1 += 1;
            }
            changes.push(Change {
                line0,
                line1,
                deleted: i0 - line0,
                inserted: i1 - line1,
                ignore: false,
                moved_to: None,
                moved_from: None,
            });
        } else {
            i0 += 1;
            i1 += 1;
        }
    }
    EditScript { changes }
}
