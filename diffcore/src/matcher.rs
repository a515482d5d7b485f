use crate::discard::DiscardTables;
use crate::options::DiffOptions;
use crate::sequence::ChangedFlags;

/// A diagonal stretch this long counts as a big snake for the heuristics.
const SNAKE_LIMIT: isize = 20;

/// Floor for the cost ceiling when the caller does not set one.
const COST_LIMIT_FLOOR: usize = 4096;

/// Midpoint of a partitioned search, plus whether each half's cost is
/// known to be minimal or came out of a shortcut.
struct Partition {
    xmid: isize,
    ymid: isize,
    lo_minimal: bool,
    hi_minimal: bool,
}

/// State for one matching run over the undiscarded sequences.
///
/// `fdiag` and `bdiag` hold the furthest forward and backward reach per
/// diagonal, indexed by diagonal number shifted up by `diag_off` so the
/// one-slot overshoot at each end stays in bounds.
struct Matcher<'a> {
    xvec: &'a [usize],
    yvec: &'a [usize],
    real0: &'a [usize],
    real1: &'a [usize],
    changed0: &'a mut ChangedFlags,
    changed1: &'a mut ChangedFlags,
    fdiag: Vec<isize>,
    bdiag: Vec<isize>,
    diag_off: isize,
    heuristic: bool,
    too_expensive: usize,
}

impl Matcher<'_> {
    fn eq(&self, x: isize, y: isize) -> bool {
        self.xvec[x as usize] == self.yvec[y as usize]
    }

    fn fd(&self, d: isize) -> isize {
        self.fdiag[(d + self.diag_off) as usize]
    }

    fn set_fd(&mut self, d: isize, x: isize) {
        self.fdiag[(d + self.diag_off) as usize] = x;
    }

    fn bd(&self, d: isize) -> isize {
        self.bdiag[(d + self.diag_off) as usize]
    }

    fn set_bd(&mut self, d: isize, x: isize) {
        self.bdiag[(d + self.diag_off) as usize] = x;
    }

    fn note_delete(&mut self, x: isize) {
        self.changed0.set(self.real0[x as usize], true);
    }

    fn note_insert(&mut self, y: isize) {
        self.changed1.set(self.real1[y as usize], true);
    }

    /// Finds a midpoint splitting `xoff..xlim` x `yoff..ylim` by running
    /// the forward and backward searches until they overlap.
    ///
    /// When `minimal` holds the search runs to completion. Otherwise two
    /// shortcuts apply: a diagonal that got unusually far ahead ends the
    /// search early, and past the cost ceiling the best forward and
    /// backward reaches so far are accepted as a split point.
    fn diag(&mut self, xoff: isize, xlim: isize, yoff: isize, ylim: isize, minimal: bool) -> Partition {
        let dmin = xoff - ylim;
        let dmax = xlim - yoff;
        let fmid = xoff - yoff;
        let bmid = xlim - ylim;
        let mut fmin = fmid;
        let mut fmax = fmid;
        let mut bmin = bmid;
        let mut bmax = bmid;
        let odd = (fmid - bmid) & 1 != 0;

        self.set_fd(fmid, xoff);
        self.set_bd(bmid, xlim);

        for c in 1isize.. {
            let mut big_snake = false;

            // Extend the top-down search by an edit step per diagonal.
            if fmin > dmin {
                fmin -= 1;
                self.set_fd(fmin - 1, -1);
            } else {
                fmin += 1;
            }
            if fmax < dmax {
                fmax += 1;
                self.set_fd(fmax + 1, -1);
            } else {
                fmax -= 1;
            }
            let mut d = fmax;
            while d >= fmin {
                let tlo = self.fd(d - 1);
                let thi = self.fd(d + 1);
                let mut x = if tlo >= thi { tlo + 1 } else { thi };
                let oldx = x;
                let mut y = x - d;
                while x < xlim && y < ylim && self.eq(x, y) {
                    x += 1;
                    y += 1;
                }
                if x - oldx > SNAKE_LIMIT {
                    big_snake = true;
                }
                self.set_fd(d, x);
                if odd && bmin <= d && d <= bmax && self.bd(d) <= x {
                    return Partition {
                        xmid: x,
                        ymid: y,
                        lo_minimal: true,
                        hi_minimal: true,
                    };
                }
                d -= 2;
            }

            // Similarly extend the bottom-up search.
            if bmin > dmin {
                bmin -= 1;
                self.set_bd(bmin - 1, isize::MAX);
            } else {
                bmin += 1;
            }
            if bmax < dmax {
                bmax += 1;
                self.set_bd(bmax + 1, isize::MAX);
            } else {
                bmax -= 1;
            }
            let mut d = bmax;
            while d >= bmin {
                let tlo = self.bd(d - 1);
                let thi = self.bd(d + 1);
                let mut x = if tlo < thi { tlo } else { thi - 1 };
                let oldx = x;
                let mut y = x - d;
                while x > xoff && y > yoff && self.eq(x - 1, y - 1) {
                    x -= 1;
                    y -= 1;
                }
                if oldx - x > SNAKE_LIMIT {
                    big_snake = true;
                }
                self.set_bd(d, x);
                if !odd && fmin <= d && d <= fmax && x <= self.fd(d) {
                    return Partition {
                        xmid: x,
                        ymid: y,
                        lo_minimal: true,
                        hi_minimal: true,
                    };
                }
                d -= 2;
            }

            if minimal {
                continue;
            }

            // A diagonal well ahead of the edit distance, ending in a
            // long snake, is good enough to split at.
            if c > 200 && big_snake && self.heuristic {
                let mut best = 0isize;
                let mut xmid = 0isize;
                let mut ymid = 0isize;

                let mut d = fmax;
                while d >= fmin {
                    let dd = d - fmid;
                    let x = self.fd(d);
                    let y = x - d;
                    let v = (x - xoff) * 2 - dd;
                    if v > 12 * (c + dd.abs())
                        && v > best
                        && xoff + SNAKE_LIMIT <= x
                        && x < xlim
                        && yoff + SNAKE_LIMIT <= y
                        && y < ylim
                    {
                        let mut k = 1isize;
                        while self.eq(x - k, y - k) {
                            if k == SNAKE_LIMIT {
                                best = v;
                                xmid = x;
                                ymid = y;
                                break;
                            }
                            k += 1;
                        }
                    }
                    d -= 2;
                }
                if best > 0 {
                    return Partition {
                        xmid,
                        ymid,
                        lo_minimal: true,
                        hi_minimal: false,
                    };
                }

                let mut best = 0isize;
                let mut d = bmax;
                while d >= bmin {
                    let dd = d - bmid;
                    let x = self.bd(d);
                    let y = x - d;
                    let v = (xlim - x) * 2 + dd;
                    if v > 12 * (c + dd.abs())
                        && v > best
                        && xoff < x
                        && x <= xlim - SNAKE_LIMIT
                        && yoff < y
                        && y <= ylim - SNAKE_LIMIT
                    {
                        let mut k = 0isize;
                        while self.eq(x + k, y + k) {
                            if k == SNAKE_LIMIT - 1 {
                                best = v;
                                xmid = x;
                                ymid = y;
                                break;
                            }
                            k += 1;
                        }
                    }
                    d -= 2;
                }
                if best > 0 {
                    return Partition {
                        xmid,
                        ymid,
                        lo_minimal: false,
                        hi_minimal: true,
                    };
                }
            }

            // Past the cost ceiling, settle for the best reaches so far.
            if c as usize >= self.too_expensive {
                log::debug!("search cost {} hit the ceiling, splitting at the best reach", c);
                // Forward diagonal maximizing x + y.
                let mut fxybest = -1isize;
                let mut fxbest = 0isize;
                let mut d = fmax;
                while d >= fmin {
                    let mut x = self.fd(d).min(xlim);
                    let mut y = x - d;
                    if ylim < y {
                        x = ylim + d;
                        y = ylim;
                    }
                    if fxybest < x + y {
                        fxybest = x + y;
                        fxbest = x;
                    }
                    d -= 2;
                }

                // Backward diagonal minimizing x + y.
                let mut bxybest = isize::MAX;
                let mut bxbest = 0isize;
                let mut d = bmax;
                while d >= bmin {
                    let mut x = self.bd(d).max(xoff);
                    let mut y = x - d;
                    if y < yoff {
                        x = yoff + d;
                        y = yoff;
                    }
                    if x + y < bxybest {
                        bxybest = x + y;
                        bxbest = x;
                    }
                    d -= 2;
                }

                if (xlim + ylim) - bxybest < fxybest - (xoff + yoff) {
                    return Partition {
                        xmid: fxbest,
                        ymid: fxybest - fxbest,
                        lo_minimal: true,
                        hi_minimal: false,
                    };
                }
                return Partition {
                    xmid: bxbest,
                    ymid: bxybest - bxbest,
                    lo_minimal: false,
                    hi_minimal: true,
                };
            }
        }
        unreachable!("bidirectional search meets or hits the cost ceiling")
    }

    /// Marks changed lines in `xoff..xlim` x `yoff..ylim` by splitting at
    /// midpoints until a side of the subproblem is empty.
    fn compare_seq(
        &mut self,
        mut xoff: isize,
        mut xlim: isize,
        mut yoff: isize,
        mut ylim: isize,
        minimal: bool,
    ) {
        // Slide down the bottom initial diagonal, then up the top one.
        while xoff < xlim && yoff < ylim && self.eq(xoff, yoff) {
            xoff += 1;
            yoff += 1;
        }
        while xlim > xoff && ylim > yoff && self.eq(xlim - 1, ylim - 1) {
            xlim -= 1;
            ylim -= 1;
        }

        if xoff == xlim {
            while yoff < ylim {
                self.note_insert(yoff);
                yoff += 1;
            }
        } else if yoff == ylim {
            while xoff < xlim {
                self.note_delete(xoff);
                xoff += 1;
            }
        } else {
            let part = self.diag(xoff, xlim, yoff, ylim, minimal);
            self.compare_seq(xoff, part.xmid, yoff, part.ymid, part.lo_minimal);
            self.compare_seq(part.xmid, xlim, part.ymid, ylim, part.hi_minimal);
        }
    }
}

/// Runs the match over the undiscarded lines of both sides, setting the
/// changed flag of every line without a counterpart.
pub(crate) fn note_changes(
    tables0: &DiscardTables,
    tables1: &DiscardTables,
    options: &DiffOptions,
    changed0: &mut ChangedFlags,
    changed1: &mut ChangedFlags,
) {
    let xlim = tables0.undiscarded.len();
    let ylim = tables1.undiscarded.len();
    let diags = xlim + ylim + 3;

    // Cost ceiling near the square root of the problem size, floored so
    // small inputs never take the shortcut.
    let mut too_expensive = 1usize;
    let mut tem = diags;
    while tem != 0 {
        too_expensive <<= 1;
        tem >>= 2;
    }
    let too_expensive = too_expensive.max(options.cost_limit.unwrap_or(COST_LIMIT_FLOOR));

    let mut matcher = Matcher {
        xvec: &tables0.undiscarded,
        yvec: &tables1.undiscarded,
        real0: &tables0.real_indexes,
        real1: &tables1.real_indexes,
        changed0,
        changed1,
        fdiag: vec![0; diags],
        bdiag: vec![0; diags],
        diag_off: ylim as isize + 1,
        heuristic: options.heuristic,
        too_expensive,
    };
    matcher.compare_seq(0, xlim as isize, 0, ylim as isize, options.minimal);
    log::debug!(
        "matched {} against {} undiscarded lines, cost ceiling {}",
        xlim,
        ylim,
        too_expensive
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_match(xv: &[usize], yv: &[usize], minimal: bool) -> (Vec<bool>, Vec<bool>) {
        let tables0 = DiscardTables {
            undiscarded: xv.to_vec(),
            real_indexes: (0..xv.len()).collect(),
        };
        let tables1 = DiscardTables {
            undiscarded: yv.to_vec(),
            real_indexes: (0..yv.len()).collect(),
        };
        let options = DiffOptions {
            minimal,
            ..DiffOptions::default()
        };
        let mut changed0 = ChangedFlags::new(xv.len());
        let mut changed1 = ChangedFlags::new(yv.len());
        note_changes(&tables0, &tables1, &options, &mut changed0, &mut changed1);
        let flags0 = (0..xv.len()).map(|i| changed0.get(i as isize)).collect();
        let flags1 = (0..yv.len()).map(|i| changed1.get(i as isize)).collect();
        (flags0, flags1)
    }

    fn unchanged<'a>(vec: &'a [usize], flags: &[bool]) -> Vec<usize> {
        vec.iter()
            .zip(flags)
            .filter(|(_, &changed)| !changed)
            .map(|(&class, _)| class)
            .collect()
    }

    #[test_log::test]
    fn identical_sequences_stay_unmarked() {
        let (flags0, flags1) = run_match(&[1, 2, 3], &[1, 2, 3], false);
        assert!(flags0.iter().all(|&f| !f));
        assert!(flags1.iter().all(|&f| !f));
    }

    #[test]
    fn disjoint_sequences_are_fully_marked() {
        let (flags0, flags1) = run_match(&[1, 2], &[3, 4], false);
        assert!(flags0.iter().all(|&f| f));
        assert!(flags1.iter().all(|&f| f));
    }

    #[test]
    fn unmarked_lines_form_a_common_subsequence() {
        // The classic example pair with edit distance 5.
        let xv = [1, 2, 3, 1, 2, 2, 1];
        let yv = [3, 2, 1, 2, 1, 3];
        let (flags0, flags1) = run_match(&xv, &yv, false);
        let kept0 = unchanged(&xv, &flags0);
        let kept1 = unchanged(&yv, &flags1);
        assert_eq!(kept0, kept1);
        assert_eq!(kept0.len(), 4);
    }

    #[test]
    fn minimal_matches_the_default_on_small_inputs() {
        let xv = [1, 2, 3, 1, 2, 2, 1];
        let yv = [3, 2, 1, 2, 1, 3];
        let (fast0, fast1) = run_match(&xv, &yv, false);
        let (min0, min1) = run_match(&xv, &yv, true);
        assert_eq!(unchanged(&xv, &fast0).len(), unchanged(&xv, &min0).len());
        assert_eq!(unchanged(&yv, &fast1).len(), unchanged(&yv, &min1).len());
    }

    #[test]
    fn one_sided_input_marks_everything_on_that_side() {
        let (flags0, flags1) = run_match(&[], &[5, 6, 7], false);
        assert!(flags0.is_empty());
        assert!(flags1.iter().all(|&f| f));
    }

    #[test]
    fn common_subsequence_holds_across_shapes() {
        let cases: [(&[usize], &[usize]); 4] = [
            (&[1, 2, 3, 4, 5], &[1, 3, 5]),
            (&[2, 2, 2, 1], &[1, 2, 2]),
            (&[9, 8, 7], &[7, 8, 9]),
            (&[1, 1, 1, 1], &[1, 1]),
        ];
        for (xv, yv) in cases {
            let (flags0, flags1) = run_match(xv, yv, false);
            assert_eq!(
                unchanged(xv, &flags0),
                unchanged(yv, &flags1),
                "kept lines must pair up for {xv:?} / {yv:?}"
            );
        }
    }
}
