use crate::options::{DiffOptions, DiscardTuning};
use crate::sequence::{ChangedFlags, LineSequence};

/// Per-line verdict while the filter runs. Anything other than `Keep`
/// ends up discarded before the matcher sees the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Keep,
    Provisional,
    Definite,
}

/// The matcher's view of one side after discarding: surviving class
/// numbers and, for each, the index it had in the compared region.
#[derive(Debug)]
pub(crate) struct DiscardTables {
    pub(crate) undiscarded: Vec<usize>,
    pub(crate) real_indexes: Vec<usize>,
}

fn occurrence_counts(classes: &[usize], table_len: usize) -> Vec<usize> {
    let mut counts = vec![0usize; table_len];
    for &class in classes {
        counts[class] += 1;
    }
    counts
}

/// First pass: lines with no match on the other side are definite
/// discards, lines with too many matches are provisional ones. The
/// "too many" bar rises with roughly the square root of the file size.
fn first_marks(classes: &[usize], other_counts: &[usize], tuning: &DiscardTuning) -> Vec<Mark> {
    let mut many = tuning.many_start;
    let mut tem = classes.len() / tuning.many_unit;
    loop {
        tem >>= 2;
        if tem == 0 {
            break;
        }
        many *= 2;
    }

    classes
        .iter()
        .map(|&class| {
            if class == 0 || other_counts[class] == 0 {
                Mark::Definite
            } else if other_counts[class] > many {
                Mark::Provisional
            } else {
                Mark::Keep
            }
        })
        .collect()
}

/// Second pass: keep or drop provisional marks depending on the runs of
/// discardable lines they sit in. A provisional line survives unless it
/// is well inside a run anchored by definite discards.
fn filter_runs(marks: &mut [Mark], tuning: &DiscardTuning) {
    let len = marks.len();
    let mut i = 0;
    while i < len {
        if marks[i] == Mark::Provisional {
            // Not in the middle of a run of discards.
            marks[i] = Mark::Keep;
        } else if marks[i] == Mark::Definite {
            // Measure the run and count its provisional members.
            let mut j = i;
            let mut provisional = 0usize;
            while j < len {
                match marks[j] {
                    Mark::Keep => break,
                    Mark::Provisional => provisional += 1,
                    Mark::Definite => {}
                }
                j += 1;
            }

            // Cancel provisional discards at the end, shrinking the run.
            while j > i && marks[j - 1] == Mark::Provisional {
                j -= 1;
                marks[j] = Mark::Keep;
                provisional -= 1;
            }

            let length = j - i;
            if provisional * tuning.provisional_ratio > length {
                // Too much of the run is provisional; cancel all of it.
                let mut k = j;
                while k > i {
                    k -= 1;
                    if marks[k] == Mark::Provisional {
                        marks[k] = Mark::Keep;
                    }
                }
            } else {
                // MINIMUM is roughly the square root of LENGTH / ratio.
                let mut minimum = 1usize;
                let mut tem = length / tuning.provisional_ratio;
                loop {
                    tem >>= 2;
                    if tem == 0 {
                        break;
                    }
                    minimum <<= 1;
                }
                minimum += 1;

                // Cancel any subrun of MINIMUM or more provisionals.
                let mut consec = 0usize;
                let mut k = 0usize;
                while k < length {
                    if marks[i + k] != Mark::Provisional {
                        consec = 0;
                    } else {
                        consec += 1;
                        if consec == minimum {
                            // Restart from the subrun's first line; consec
                            // exceeds minimum from there on, so it all
                            // cancels on the rewalk.
                            k = k + 1 - consec;
                            continue;
                        }
                        if consec > minimum {
                            marks[i + k] = Mark::Keep;
                        }
                    }
                    k += 1;
                }

                // Scan in from the run's start, cancelling provisionals,
                // until enough consecutive definite discards anchor the
                // edge or a definite discard past the window stops us.
                let mut consec = 0usize;
                for k in 0..length {
                    if k >= tuning.edge_window && marks[i + k] == Mark::Definite {
                        break;
                    }
                    match marks[i + k] {
                        Mark::Provisional => {
                            consec = 0;
                            marks[i + k] = Mark::Keep;
                        }
                        Mark::Keep => consec = 0,
                        Mark::Definite => consec += 1,
                    }
                    if consec == tuning.edge_anchor {
                        break;
                    }
                }

                // Same thing from the run's end.
                i += length - 1;
                let mut consec = 0usize;
                for k in 0..length {
                    if k >= tuning.edge_window && marks[i - k] == Mark::Definite {
                        break;
                    }
                    match marks[i - k] {
                        Mark::Provisional => {
                            consec = 0;
                            marks[i - k] = Mark::Keep;
                        }
                        Mark::Keep => consec = 0,
                        Mark::Definite => consec += 1,
                    }
                    if consec == tuning.edge_anchor {
                        break;
                    }
                }
            }
        }
        i += 1;
    }
}

fn apply_discards(
    classes: &[usize],
    marks: &[Mark],
    minimal: bool,
    changed: &mut ChangedFlags,
) -> DiscardTables {
    let mut undiscarded = Vec::with_capacity(classes.len());
    let mut real_indexes = Vec::with_capacity(classes.len());
    for (index, &class) in classes.iter().enumerate() {
        // Class 0 never matches anything, so it goes even when a minimal
        // script was asked for.
        let keep = class != 0 && (minimal || marks[index] == Mark::Keep);
        if keep {
            undiscarded.push(class);
            real_indexes.push(index);
        } else {
            changed.set(index, true);
        }
    }
    DiscardTables {
        undiscarded,
        real_indexes,
    }
}

/// Flags lines unlikely to help the match as already-changed and hands
/// the matcher the sequences that remain.
pub(crate) fn discard_confusing_lines(
    seq0: &LineSequence,
    seq1: &LineSequence,
    options: &DiffOptions,
    changed0: &mut ChangedFlags,
    changed1: &mut ChangedFlags,
) -> (DiscardTables, DiscardTables) {
    let table_len = seq0
        .classes()
        .iter()
        .chain(seq1.classes())
        .copied()
        .max()
        .map_or(1, |max| max + 1);
    let counts0 = occurrence_counts(seq0.classes(), table_len);
    let counts1 = occurrence_counts(seq1.classes(), table_len);

    let mut marks0 = first_marks(seq0.classes(), &counts1, &options.discard);
    let mut marks1 = first_marks(seq1.classes(), &counts0, &options.discard);
    filter_runs(&mut marks0, &options.discard);
    filter_runs(&mut marks1, &options.discard);

    let tables0 = apply_discards(seq0.classes(), &marks0, options.minimal, changed0);
    let tables1 = apply_discards(seq1.classes(), &marks1, options.minimal, changed1);
    log::debug!(
        "discard pass kept {} of {} and {} of {} lines",
        tables0.undiscarded.len(),
        seq0.compared(),
        tables1.undiscarded.len(),
        seq1.compared()
    );
    (tables0, tables1)
}
