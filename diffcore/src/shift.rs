use crate::sequence::ChangedFlags;

/// Slides runs of changed lines into the place a reader expects.
///
/// A run first moves backward while the line before it matches its last
/// line, merging with any run it touches, then forward while its first
/// line matches the line after it. Once it has gone as far forward as it
/// can, it backs up to the last position where it sat beside a change on
/// the other side, when there was one.
pub(crate) fn shift_boundaries(
    classes: &[usize],
    changed: &mut ChangedFlags,
    other_changed: &ChangedFlags,
) {
    let i_end = changed.len() as isize;
    let mut i = 0isize;
    let mut j = 0isize;

    loop {
        // Scan forward for the next run of changes, keeping track of the
        // corresponding point in the other file.
        while i < i_end && !changed.get(i) {
            while other_changed.get(j) {
                j += 1;
            }
            j += 1;
            i += 1;
        }
        if i == i_end {
            break;
        }

        let mut start = i;

        // Find the end of this run.
        i += 1;
        while changed.get(i) {
            i += 1;
        }
        while other_changed.get(j) {
            j += 1;
        }

        let mut corresponding;
        loop {
            let runlength = i - start;

            // Move the run back while the previous unchanged line
            // matches its last changed one.
            while start > 0 && classes[(start - 1) as usize] == classes[(i - 1) as usize] {
                start -= 1;
                changed.set(start as usize, true);
                i -= 1;
                changed.set(i as usize, false);
                while changed.get(start - 1) {
                    start -= 1;
                }
                j -= 1;
                while other_changed.get(j) {
                    j -= 1;
                }
            }

            // Last point where this run lined up with a changed run on
            // the other side; i_end when no such point has been seen.
            corresponding = if other_changed.get(j - 1) { i } else { i_end };

            // Move the run forward while its first changed line matches
            // the following unchanged one. Going second, this leaves the
            // run as far forward as possible when nothing merges.
            while i != i_end && classes[start as usize] == classes[i as usize] {
                changed.set(start as usize, false);
                start += 1;
                changed.set(i as usize, true);
                i += 1;
                while changed.get(i) {
                    i += 1;
                }
                j += 1;
                while other_changed.get(j) {
                    corresponding = i;
                    j += 1;
                }
            }

            if runlength == i - start {
                break;
            }
        }

        // If possible, take the merged run back to a position beside a
        // corresponding run in the other file.
        while corresponding < i {
            start -= 1;
            changed.set(start as usize, true);
            i -= 1;
            changed.set(i as usize, false);
            while changed.get(start - 1) {
                start -= 1;
            }
            j -= 1;
            while other_changed.get(j) {
                j -= 1;
            }
        }
    }
}
