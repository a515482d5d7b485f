use std::io::{self, Write};

use crate::options::DiffOptions;
use crate::script::{Change, EditScript};
use crate::sequence::LineSequence;

pub(crate) const NO_NEWLINE_AT_END_OF_FILE: &str = "\\ No newline at end of file";

/// Which sides of a hunk carry lines worth showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HunkKind {
    /// Nothing to show; every change in the hunk is ignorable.
    Unchanged,
    Old,
    New,
    Changed,
}

/// Extents of a hunk over both compared regions, half open.
#[derive(Debug)]
pub(crate) struct HunkExtent {
    pub(crate) first0: usize,
    pub(crate) end0: usize,
    pub(crate) first1: usize,
    pub(crate) end1: usize,
    pub(crate) kind: HunkKind,
}

/// Sizes up a group of changes that will print as one hunk.
pub(crate) fn analyze_hunk(group: &[Change]) -> HunkExtent {
    let first = &group[0];
    let last = &group[group.len() - 1];

    let mut show_from = 0usize;
    let mut show_to = 0usize;
    let mut trivial = true;
    for change in group {
        show_from += change.deleted;
        show_to += change.inserted;
        if !change.ignore {
            trivial = false;
        }
    }

    let kind = if trivial {
        HunkKind::Unchanged
    } else {
        match (show_from > 0, show_to > 0) {
            (false, false) => HunkKind::Unchanged,
            (true, false) => HunkKind::Old,
            (false, true) => HunkKind::New,
            (true, true) => HunkKind::Changed,
        }
    };

    HunkExtent {
        first0: first.line0,
        end0: last.line0 + last.deleted,
        first1: first.line1,
        end1: last.line1 + last.inserted,
        kind,
    }
}

fn is_blank(line: &str, options: &DiffOptions) -> bool {
    if options.ignore_trailing_space {
        line.trim_end().is_empty()
    } else {
        line.is_empty()
    }
}

fn ignorable_line(line: &str, options: &DiffOptions) -> bool {
    if options.ignore_blank_lines && is_blank(line, options) {
        return true;
    }
    if let Some(pattern) = &options.ignore_pattern {
        return pattern.is_match(line);
    }
    false
}

/// Flags changes whose affected lines are all blank or all match the
/// ignore pattern. Grouping treats them as barely-there neighbors and a
/// script of nothing else prints as no difference at all.
pub(crate) fn mark_ignorable(
    script: &mut EditScript,
    seq0: &LineSequence,
    seq1: &LineSequence,
    options: &DiffOptions,
) {
    if !options.ignore_blank_lines && options.ignore_pattern.is_none() {
        return;
    }
    for change in script.changes_mut() {
        let deleted = (change.line0..change.line0 + change.deleted)
            .map(|index| seq0.line(seq0.prefix() + index));
        let inserted = (change.line1..change.line1 + change.inserted)
            .map(|index| seq1.line(seq1.prefix() + index));
        change.ignore = deleted
            .chain(inserted)
            .all(|line| ignorable_line(line, options));
    }
}

/// Returns the exclusive end of the hunk group that starts at `start`.
///
/// A following change joins the group when fewer than `2 * context + 1`
/// unchanged lines separate them, so their context would run together.
/// For an ignorable next change the bar drops to `context`.
pub(crate) fn find_hunk(changes: &[Change], start: usize, context: usize) -> usize {
    let mut index = start;
    loop {
        let current = &changes[index];
        let top0 = current.line0 + current.deleted;
        let top1 = current.line1 + current.inserted;
        let Some(next) = changes.get(index + 1) else {
            return index + 1;
        };
        // It must not matter which file the distance is measured in.
        assert_eq!(
            next.line0 - top0,
            next.line1 - top1,
            "unchanged gaps out of step between the files"
        );
        let threshold = if next.ignore { context } else { 2 * context + 1 };
        if next.line0 - top0 < threshold {
            index += 1;
        } else {
            return index + 1;
        }
    }
}

/// Writes one line behind its flag, and the no-newline marker when the
/// line ends the file without one.
pub(crate) fn print_line(
    out: &mut impl Write,
    flag: &str,
    seq: &LineSequence,
    index: usize,
) -> io::Result<()> {
    writeln!(out, "{}{}", flag, seq.line(index))?;
    if index + 1 == seq.total() && seq.missing_newline() {
        writeln!(out, "{}", NO_NEWLINE_AT_END_OF_FILE)?;
    }
    Ok(())
}

/// Prints a line range in file coordinates, one based and inclusive on
/// display. A range of one line collapses to a single number, and an
/// empty one names the line it follows.
pub(crate) fn print_number_range(
    out: &mut impl Write,
    separator: char,
    first: usize,
    end: usize,
) -> io::Result<()> {
    if end > first + 1 {
        write!(out, "{}{}{}", first + 1, separator, end)
    } else {
        write!(out, "{}", end)
    }
}
