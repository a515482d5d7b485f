use std::io::{self, Write};

use regex::Regex;

use crate::hunks::{self, HunkKind};
use crate::options::DiffOptions;
use crate::script::{Change, EditScript};
use crate::sequence::LineSequence;

/// Longest slice of a definition line shown beside a hunk header.
const FUNCTION_WIDTH: usize = 40;

/// Backward scanner for the definition line named in hunk headers.
///
/// Hunks are printed in file order, so each search stops where the last
/// one started and falls back to the last match when nothing new turns
/// up. That keeps the total scanning linear in the file.
pub(crate) struct FunctionFinder {
    pattern: Regex,
    last_search: usize,
    last_match: Option<usize>,
}

impl FunctionFinder {
    pub(crate) fn new(pattern: &Regex) -> Self {
        FunctionFinder {
            pattern: pattern.clone(),
            last_search: 0,
            last_match: None,
        }
    }

    /// Nearest matching line strictly above `limit`, in file coordinates.
    pub(crate) fn find(&mut self, seq: &LineSequence, limit: usize) -> Option<usize> {
        let stop = self.last_search;
        self.last_search = limit;
        let mut index = limit;
        while index > stop {
            index -= 1;
            if self.pattern.is_match(seq.line(index)) {
                self.last_match = Some(index);
                return self.last_match;
            }
        }
        self.last_match
    }
}

/// At most `FUNCTION_WIDTH` bytes of the definition line, leading blanks
/// skipped and trailing ones trimmed, cut on a character boundary.
fn clip_function(line: &str) -> &str {
    let line = line.trim_start();
    let mut end = line.len().min(FUNCTION_WIDTH);
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    line[..end].trim_end()
}

/// Unified-style range: start and length in display numbers. An empty
/// range names the line it follows, which is where patch will insert.
fn print_unidiff_range(out: &mut impl Write, first: usize, end: usize) -> io::Result<()> {
    if end == first {
        write!(out, "{},0", first)
    } else {
        write!(out, "{},{}", first + 1, end - first)
    }
}

/// Renders the script as context hunks with `context` lines around each.
pub(crate) fn print_context_script(
    out: &mut impl Write,
    script: &EditScript,
    seq0: &LineSequence,
    seq1: &LineSequence,
    context: usize,
    options: &DiffOptions,
) -> io::Result<()> {
    let mut finder = options.function_pattern.as_ref().map(FunctionFinder::new);
    let changes = script.changes();
    let mut start = 0;
    while start < changes.len() {
        let end = hunks::find_hunk(changes, start, context);
        pr_context_hunk(out, &changes[start..end], seq0, seq1, context, &mut finder)?;
        start = end;
    }
    Ok(())
}

/// Renders the script as unified hunks with `context` lines around each.
pub(crate) fn print_unidiff_script(
    out: &mut impl Write,
    script: &EditScript,
    seq0: &LineSequence,
    seq1: &LineSequence,
    context: usize,
    options: &DiffOptions,
) -> io::Result<()> {
    let mut finder = options.function_pattern.as_ref().map(FunctionFinder::new);
    let changes = script.changes();
    let mut start = 0;
    while start < changes.len() {
        let end = hunks::find_hunk(changes, start, context);
        pr_unidiff_hunk(out, &changes[start..end], seq0, seq1, context, &mut finder)?;
        start = end;
    }
    Ok(())
}

/// Hunk window in file coordinates: the group's extent widened by the
/// context radius and clipped to the file.
fn widen(
    extent: &hunks::HunkExtent,
    seq0: &LineSequence,
    seq1: &LineSequence,
    context: usize,
) -> (usize, usize, usize, usize) {
    let first0 = (extent.first0 + seq0.prefix()).saturating_sub(context);
    let end0 = (extent.end0 + seq0.prefix() + context).min(seq0.total());
    let first1 = (extent.first1 + seq1.prefix()).saturating_sub(context);
    let end1 = (extent.end1 + seq1.prefix() + context).min(seq1.total());
    (first0, end0, first1, end1)
}

fn pr_context_hunk(
    out: &mut impl Write,
    group: &[Change],
    seq0: &LineSequence,
    seq1: &LineSequence,
    context: usize,
    finder: &mut Option<FunctionFinder>,
) -> io::Result<()> {
    let extent = hunks::analyze_hunk(group);
    if extent.kind == HunkKind::Unchanged {
        return Ok(());
    }
    let (first0, end0, first1, end1) = widen(&extent, seq0, seq1, context);
    let function = finder.as_mut().and_then(|finder| finder.find(seq0, first0));

    write!(out, "***************")?;
    if let Some(index) = function {
        write!(out, " {}", clip_function(seq0.line(index)))?;
    }
    writeln!(out)?;

    write!(out, "*** ")?;
    hunks::print_number_range(out, ',', first0, end0)?;
    writeln!(out, " ****")?;

    if matches!(extent.kind, HunkKind::Old | HunkKind::Changed) {
        let prefix0 = seq0.prefix();
        let mut next = 0usize;
        for line in first0..end0 {
            // Skip changes that lie entirely above this line.
            while next < group.len()
                && group[next].line0 + group[next].deleted + prefix0 <= line
            {
                next += 1;
            }
            let flag = match group.get(next) {
                Some(change) if change.line0 + prefix0 <= line => {
                    if change.inserted > 0 {
                        "! "
                    } else {
                        "- "
                    }
                }
                _ => "  ",
            };
            hunks::print_line(out, flag, seq0, line)?;
        }
    }

    write!(out, "--- ")?;
    hunks::print_number_range(out, ',', first1, end1)?;
    writeln!(out, " ----")?;

    if matches!(extent.kind, HunkKind::New | HunkKind::Changed) {
        let prefix1 = seq1.prefix();
        let mut next = 0usize;
        for line in first1..end1 {
            while next < group.len()
                && group[next].line1 + group[next].inserted + prefix1 <= line
            {
                next += 1;
            }
            let flag = match group.get(next) {
                Some(change) if change.line1 + prefix1 <= line => {
                    if change.deleted > 0 {
                        "! "
                    } else {
                        "+ "
                    }
                }
                _ => "  ",
            };
            hunks::print_line(out, flag, seq1, line)?;
        }
    }
    Ok(())
}

fn pr_unidiff_hunk(
    out: &mut impl Write,
    group: &[Change],
    seq0: &LineSequence,
    seq1: &LineSequence,
    context: usize,
    finder: &mut Option<FunctionFinder>,
) -> io::Result<()> {
    let extent = hunks::analyze_hunk(group);
    if extent.kind == HunkKind::Unchanged {
        return Ok(());
    }
    let (first0, end0, first1, end1) = widen(&extent, seq0, seq1, context);
    let function = finder.as_mut().and_then(|finder| finder.find(seq0, first0));

    write!(out, "@@ -")?;
    print_unidiff_range(out, first0, end0)?;
    write!(out, " +")?;
    print_unidiff_range(out, first1, end1)?;
    write!(out, " @@")?;
    if let Some(index) = function {
        write!(out, " {}", clip_function(seq0.line(index)))?;
    }
    writeln!(out)?;

    let prefix0 = seq0.prefix();
    let mut i = first0;
    let mut j = first1;
    let mut next = 0usize;
    while i < end0 || j < end1 {
        match group.get(next) {
            Some(change) if change.line0 + prefix0 <= i => {
                for _ in 0..change.deleted {
                    write!(out, "-")?;
                    hunks::print_line(out, "", seq0, i)?;
                    i += 1;
                }
                for _ in 0..change.inserted {
                    write!(out, "+")?;
                    hunks::print_line(out, "", seq1, j)?;
                    j += 1;
                }
                next += 1;
            }
            _ => {
                // Context comes from the first file.
                write!(out, " ")?;
                hunks::print_line(out, "", seq0, i)?;
                i += 1;
                j += 1;
            }
        }
    }
    Ok(())
}
