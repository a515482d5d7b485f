use std::collections::HashMap;

use crate::script::{Change, EditScript};
use crate::sequence::LineSequence;

/// Annotates a finished script with moved-block correspondences.
///
/// Implementations fill in `moved_to` and `moved_from` and may split
/// changes to isolate a moved block, but the script must still replay to
/// the same second file.
pub trait MovedBlockMatcher {
    fn mark_moves(&self, script: &mut EditScript, seq0: &LineSequence, seq1: &LineSequence);
}

/// Tracks whether every occurrence of a class seen so far forms one
/// contiguous run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Run {
    #[default]
    Unset,
    /// One past the last line of the run.
    After(usize),
    Broken,
}

impl Run {
    fn note(self, line: usize) -> Run {
        match self {
            Run::Unset => Run::After(line + 1),
            Run::After(next) if next == line => Run::After(line + 1),
            _ => Run::Broken,
        }
    }

    fn end(self) -> Option<usize> {
        match self {
            Run::After(end) => Some(end),
            _ => None,
        }
    }
}

/// Deleted and inserted occurrences of one class across the script.
#[derive(Debug, Default, Clone, Copy)]
struct ClassGroup {
    balance: isize,
    deleted_run: Run,
    inserted_run: Run,
}

impl ClassGroup {
    /// One-past-the-end positions of both runs, when the class was
    /// deleted and inserted equally often and each side is contiguous.
    fn perfect_match(&self) -> Option<(usize, usize)> {
        if self.balance != 0 {
            return None;
        }
        Some((self.deleted_run.end()?, self.inserted_run.end()?))
    }
}

fn class_groups(
    changes: &[Change],
    classes0: &[usize],
    classes1: &[usize],
) -> HashMap<usize, ClassGroup> {
    let mut groups: HashMap<usize, ClassGroup> = HashMap::new();
    for change in changes {
        for line in change.line0..change.line0 + change.deleted {
            let class = classes0[line];
            if class == 0 {
                continue;
            }
            let group = groups.entry(class).or_default();
            group.balance -= 1;
            group.deleted_run = group.deleted_run.note(line);
        }
        for line in change.line1..change.line1 + change.inserted {
            let class = classes1[line];
            if class == 0 {
                continue;
            }
            let group = groups.entry(class).or_default();
            group.balance += 1;
            group.inserted_run = group.inserted_run.note(line);
        }
    }
    groups
}

/// Moved-block matcher pairing deleted and inserted blocks whose line
/// classes occur nowhere else in the script.
///
/// A line class deleted and inserted equally often, contiguously on both
/// sides, anchors a block; the block then grows in both directions while
/// the neighboring classes keep matching. When only part of a change
/// moved, the change is split so the moved part stands alone.
#[derive(Debug, Default)]
pub struct ClassBalanceMatcher;

impl MovedBlockMatcher for ClassBalanceMatcher {
    fn mark_moves(&self, script: &mut EditScript, seq0: &LineSequence, seq1: &LineSequence) {
        let classes0: Vec<usize> = seq0.classes().to_vec();
        let classes1: Vec<usize> = seq1.classes().to_vec();
        let changes = script.changes_mut();
        let groups = class_groups(changes, &classes0, &classes1);
        let mut marked = 0usize;

        // Deleted side first: find where each uniquely-moved block went.
        let mut index = 0;
        while index < changes.len() {
            let mut moved_index = None;
            let span = changes[index].line0..changes[index].line0 + changes[index].deleted;
            for k in span {
                let class = classes0[k];
                if class == 0 {
                    continue;
                }
                let Some(group) = groups.get(&class) else {
                    continue;
                };
                let Some((cookie0, cookie1)) = group.perfect_match() else {
                    continue;
                };

                let e_line0 = changes[index].line0;
                let e_deleted = changes[index].deleted;

                // Grow the block downward, then upward, while the classes
                // on both sides keep agreeing.
                let mut i2 = cookie0;
                let mut j2 = cookie1;
                while i2 - e_line0 < e_deleted
                    && j2 < classes1.len()
                    && classes0[i2] == classes1[j2]
                {
                    i2 += 1;
                    j2 += 1;
                }
                let mut i = cookie0 as isize;
                let mut j = cookie1 as isize;
                let (mut i1, mut j1);
                loop {
                    i1 = i;
                    j1 = j;
                    i -= 1;
                    j -= 1;
                    if i < e_line0 as isize
                        || j < 0
                        || classes0[i as usize] != classes1[j as usize]
                    {
                        break;
                    }
                }
                let i1 = i1 as usize;
                let j1 = j1 as usize;
                debug_assert!(i2 > i1 && i2 - i1 == j2 - j1);

                // Split off the unmoved head and tail of this change so
                // the moved block gets the annotation alone.
                let mut cur = index;
                let head = i1 - changes[cur].line0;
                if head > 0 {
                    let e = &changes[cur];
                    let tail = Change {
                        line0: i1,
                        line1: e.line1 + e.inserted,
                        deleted: e.deleted - head,
                        inserted: 0,
                        ignore: false,
                        moved_to: None,
                        moved_from: None,
                    };
                    changes[cur].deleted = head;
                    changes.insert(cur + 1, tail);
                    cur += 1;
                }
                changes[cur].moved_to = Some(j1);
                marked += 1;
                let covered = i2 - changes[cur].line0;
                let rest = changes[cur].deleted - covered;
                if rest > 0 {
                    let e = &changes[cur];
                    let tail = Change {
                        line0: i2,
                        line1: e.line1,
                        deleted: rest,
                        inserted: e.inserted,
                        ignore: false,
                        moved_to: None,
                        moved_from: None,
                    };
                    changes[cur].deleted = covered;
                    changes[cur].inserted = 0;
                    changes.insert(cur + 1, tail);
                }
                moved_index = Some(cur);
                break;
            }
            index = moved_index.map_or(index + 1, |moved| moved + 1);
        }

        // Then the inserted side: find where each block came from.
        let mut index = 0;
        while index < changes.len() {
            let mut moved_index = None;
            let span = changes[index].line1..changes[index].line1 + changes[index].inserted;
            for k in span {
                let class = classes1[k];
                if class == 0 {
                    continue;
                }
                let Some(group) = groups.get(&class) else {
                    continue;
                };
                let Some((cookie0, cookie1)) = group.perfect_match() else {
                    continue;
                };

                let e_line1 = changes[index].line1;
                let e_inserted = changes[index].inserted;

                let mut i2 = cookie0;
                let mut j2 = cookie1;
                while j2 - e_line1 < e_inserted
                    && i2 < classes0.len()
                    && classes0[i2] == classes1[j2]
                {
                    i2 += 1;
                    j2 += 1;
                }
                let mut i = cookie0 as isize;
                let mut j = cookie1 as isize;
                let (mut i1, mut j1);
                loop {
                    i1 = i;
                    j1 = j;
                    i -= 1;
                    j -= 1;
                    if j < e_line1 as isize
                        || i < 0
                        || classes0[i as usize] != classes1[j as usize]
                    {
                        break;
                    }
                }
                let i1 = i1 as usize;
                let j1 = j1 as usize;
                debug_assert!(j2 > j1 && i2 - i1 == j2 - j1);

                let mut cur = index;
                let head = j1 - changes[cur].line1;
                if head > 0 {
                    let e = &changes[cur];
                    let tail = Change {
                        line0: e.line0 + e.deleted,
                        line1: j1,
                        deleted: 0,
                        inserted: e.inserted - head,
                        ignore: false,
                        moved_to: None,
                        moved_from: None,
                    };
                    changes[cur].inserted = head;
                    changes.insert(cur + 1, tail);
                    cur += 1;
                }
                changes[cur].moved_from = Some(i1);
                marked += 1;
                let covered = j2 - changes[cur].line1;
                let rest = changes[cur].inserted - covered;
                if rest > 0 {
                    let e = &changes[cur];
                    let tail = Change {
                        line0: e.line0,
                        line1: j2,
                        deleted: e.deleted,
                        inserted: rest,
                        ignore: false,
                        moved_to: e.moved_to,
                        moved_from: None,
                    };
                    changes[cur].inserted = covered;
                    changes[cur].deleted = 0;
                    changes[cur].moved_to = None;
                    changes.insert(cur + 1, tail);
                }
                moved_index = Some(cur);
                break;
            }
            index = moved_index.map_or(index + 1, |moved| moved + 1);
        }

        if marked > 0 {
            log::debug!("moved-block pass annotated {} blocks", marked);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::build_script;
    use crate::sequence::ChangedFlags;

    fn seq(lines: &[&str], classes: &[usize]) -> LineSequence {
        LineSequence::new(
            lines.iter().map(|l| l.to_string()).collect(),
            classes.to_vec(),
            0,
            false,
        )
    }

    fn script_from(flags0: &[bool], flags1: &[bool]) -> EditScript {
        let mut changed0 = ChangedFlags::new(flags0.len());
        for (index, &value) in flags0.iter().enumerate() {
            changed0.set(index, value);
        }
        let mut changed1 = ChangedFlags::new(flags1.len());
        for (index, &value) in flags1.iter().enumerate() {
            changed1.set(index, value);
        }
        build_script(&changed0, &changed1)
    }

    #[test]
    fn whole_block_move_is_paired_up() {
        let seq0 = seq(&["m1", "m2", "a"], &[1, 2, 3]);
        let seq1 = seq(&["a", "m1", "m2"], &[3, 1, 2]);
        let mut script = script_from(&[true, true, false], &[false, true, true]);
        assert_eq!(script.len(), 2);

        ClassBalanceMatcher.mark_moves(&mut script, &seq0, &seq1);
        let changes = script.changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].moved_to, Some(1));
        assert_eq!(changes[1].moved_from, Some(0));
    }

    #[test]
    fn partial_move_splits_the_change() {
        let seq0 = seq(&["m1", "m2", "x", "a"], &[1, 2, 9, 3]);
        let seq1 = seq(&["a", "m1", "m2"], &[3, 1, 2]);
        let mut script = script_from(&[true, true, true, false], &[false, true, true]);
        assert_eq!(script.len(), 2);

        ClassBalanceMatcher.mark_moves(&mut script, &seq0, &seq1);
        let changes = script.changes();
        assert_eq!(changes.len(), 3);

        assert_eq!((changes[0].line0, changes[0].deleted), (0, 2));
        assert_eq!(changes[0].moved_to, Some(1));
        assert_eq!((changes[1].line0, changes[1].deleted), (2, 1));
        assert_eq!(changes[1].moved_to, None);
        assert_eq!(changes[2].moved_from, Some(0));

        // Splitting must not change what the script reconstructs.
        let rebuilt = script.apply(seq0.lines(), seq1.lines());
        assert_eq!(rebuilt, seq1.lines());
    }

    #[test]
    fn unbalanced_classes_are_not_moves() {
        let seq0 = seq(&["m", "m", "a"], &[1, 1, 2]);
        let seq1 = seq(&["a", "m"], &[2, 1]);
        let mut script = script_from(&[true, true, false], &[false, true]);

        ClassBalanceMatcher.mark_moves(&mut script, &seq0, &seq1);
        assert!(script.changes().iter().all(|c| c.moved_to.is_none()));
        assert!(script.changes().iter().all(|c| c.moved_from.is_none()));
    }

    #[test]
    fn scattered_occurrences_are_not_moves() {
        let seq0 = seq(&["m", "q", "m"], &[1, 2, 1]);
        let seq1 = seq(&["q", "m", "m2"], &[2, 1, 3]);
        let mut script = script_from(&[true, false, true], &[false, true, true]);

        ClassBalanceMatcher.mark_moves(&mut script, &seq0, &seq1);
        assert!(script.changes().iter().all(|c| c.moved_to.is_none()));
    }
}
