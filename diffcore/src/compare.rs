use crate::discard;
use crate::hunks;
use crate::matcher;
use crate::moved::{ClassBalanceMatcher, MovedBlockMatcher};
use crate::options::DiffOptions;
use crate::script::{build_script, EditScript};
use crate::sequence::{ChangedFlags, LineSequence};
use crate::shift;

/// Compares two classified sequences and returns the edit script.
///
/// When `detect_moved_blocks` is set the bundled [`ClassBalanceMatcher`]
/// annotates the script; the annotations never change what the script
/// prints, only the `moved_to`/`moved_from` fields.
pub fn compare(seq0: &LineSequence, seq1: &LineSequence, options: &DiffOptions) -> EditScript {
    if options.detect_moved_blocks {
        compare_with_matcher(seq0, seq1, options, &ClassBalanceMatcher)
    } else {
        compare_impl(seq0, seq1, options, None)
    }
}

/// Like [`compare`], but with a caller-supplied moved-block matcher.
pub fn compare_with_matcher(
    seq0: &LineSequence,
    seq1: &LineSequence,
    options: &DiffOptions,
    matcher: &dyn MovedBlockMatcher,
) -> EditScript {
    compare_impl(seq0, seq1, options, Some(matcher))
}

fn compare_impl(
    seq0: &LineSequence,
    seq1: &LineSequence,
    options: &DiffOptions,
    moved: Option<&dyn MovedBlockMatcher>,
) -> EditScript {
    let mut changed0 = ChangedFlags::new(seq0.compared());
    let mut changed1 = ChangedFlags::new(seq1.compared());

    let (tables0, tables1) =
        discard::discard_confusing_lines(seq0, seq1, options, &mut changed0, &mut changed1);
    matcher::note_changes(&tables0, &tables1, options, &mut changed0, &mut changed1);

    shift::shift_boundaries(seq0.classes(), &mut changed0, &changed1);
    shift::shift_boundaries(seq1.classes(), &mut changed1, &changed0);

    let mut script = build_script(&changed0, &changed1);
    if let Some(matcher) = moved {
        matcher.mark_moves(&mut script, seq0, seq1);
    }
    hunks::mark_ignorable(&mut script, seq0, seq1, options);
    log::debug!(
        "edit script: {} changes over {}/{} compared lines",
        script.len(),
        seq0.compared(),
        seq1.compared()
    );
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn run(text0: &str, text1: &str, options: &DiffOptions) -> EditScript {
        let (seq0, seq1) = classify(text0, text1, options);
        compare(&seq0, &seq1, options)
    }

    #[test_log::test]
    fn identical_inputs_produce_an_empty_script() {
        let script = run("a\nb\nc\n", "a\nb\nc\n", &DiffOptions::default());
        assert!(script.is_empty());
        assert!(!script.has_visible_changes());
    }

    #[test_log::test]
    fn script_replays_one_file_into_the_other() {
        let cases = [
            ("a\nb\nc\n", "a\nx\nc\n"),
            ("a\nb\nc\nd\n", "b\nd\n"),
            ("", "a\nb\n"),
            ("x\ny\n", ""),
            ("one\ntwo\nthree\nfour\n", "zero\none\nthree\nfive\nfour\n"),
        ];
        for (text0, text1) in cases {
            let options = DiffOptions::default();
            let (seq0, seq1) = classify(text0, text1, &options);
            let script = compare(&seq0, &seq1, &options);
            let rebuilt = script.apply(seq0.compared_lines(), seq1.compared_lines());
            assert_eq!(
                rebuilt,
                seq1.compared_lines(),
                "replay mismatch for {:?} vs {:?}",
                text0,
                text1
            );
        }
    }

    #[test_log::test]
    fn blank_line_changes_can_be_invisible() {
        let options = DiffOptions {
            ignore_blank_lines: true,
            ..Default::default()
        };
        let script = run("a\n\nb\n", "a\nb\n", &options);
        assert!(!script.is_empty());
        assert!(!script.has_visible_changes());
    }

    #[test_log::test]
    fn pattern_matched_changes_can_be_invisible() {
        let options = DiffOptions {
            ignore_pattern: Some(regex::Regex::new(r"^#").unwrap()),
            ..Default::default()
        };
        let script = run("a\n# old note\nb\n", "a\n# new note\nb\n", &options);
        assert!(!script.has_visible_changes());

        // A hunk that also touches unignored lines stays visible.
        let script = run("a\n# old note\nb\n", "a\n# new note\nc\n", &options);
        assert!(script.has_visible_changes());
    }

    #[test_log::test]
    fn moved_blocks_are_annotated_when_asked() {
        let options = DiffOptions {
            detect_moved_blocks: true,
            ..Default::default()
        };
        let (seq0, seq1) = classify(
            "alpha\nmove1\nmove2\nbeta\ngamma\n",
            "alpha\nbeta\ngamma\nmove1\nmove2\n",
            &options,
        );
        let script = compare(&seq0, &seq1, &options);

        let from: Vec<_> = script
            .changes()
            .iter()
            .filter(|c| c.moved_to.is_some())
            .collect();
        let to: Vec<_> = script
            .changes()
            .iter()
            .filter(|c| c.moved_from.is_some())
            .collect();
        assert_eq!(from.len(), 1);
        assert_eq!(to.len(), 1);
        assert_eq!(from[0].moved_to, Some(to[0].line1));
        assert_eq!(to[0].moved_from, Some(from[0].line0));

        // Annotation must leave the replayed output untouched.
        let rebuilt = script.apply(seq0.compared_lines(), seq1.compared_lines());
        assert_eq!(rebuilt, seq1.compared_lines());
    }

    #[test_log::test]
    fn minimal_mode_matches_default_on_small_inputs() {
        let text0 = "a\nb\nc\nd\ne\n";
        let text1 = "a\nc\ne\nf\n";
        let default_script = run(text0, text1, &DiffOptions::default());
        let minimal_script = run(
            text0,
            text1,
            &DiffOptions {
                minimal: true,
                ..Default::default()
            },
        );
        let cost = |script: &EditScript| {
            script
                .changes()
                .iter()
                .map(|c| c.deleted + c.inserted)
                .sum::<usize>()
        };
        assert_eq!(cost(&default_script), cost(&minimal_script));
    }
}
