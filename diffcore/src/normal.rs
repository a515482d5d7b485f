use std::io::{self, Write};

use crate::hunks::{self, HunkKind};
use crate::script::EditScript;
use crate::sequence::LineSequence;

fn change_letter(kind: HunkKind) -> char {
    match kind {
        HunkKind::Old => 'd',
        HunkKind::New => 'a',
        HunkKind::Changed => 'c',
        HunkKind::Unchanged => unreachable!("ignorable hunks are skipped before printing"),
    }
}

/// Renders the script in the default format: each change on its own,
/// no context, ranges in the coordinates of the file they belong to.
pub(crate) fn print_normal_script(
    out: &mut impl Write,
    script: &EditScript,
    seq0: &LineSequence,
    seq1: &LineSequence,
) -> io::Result<()> {
    for change in script.changes() {
        let extent = hunks::analyze_hunk(std::slice::from_ref(change));
        if extent.kind == HunkKind::Unchanged {
            continue;
        }
        let first0 = extent.first0 + seq0.prefix();
        let end0 = extent.end0 + seq0.prefix();
        let first1 = extent.first1 + seq1.prefix();
        let end1 = extent.end1 + seq1.prefix();

        hunks::print_number_range(out, ',', first0, end0)?;
        write!(out, "{}", change_letter(extent.kind))?;
        hunks::print_number_range(out, ',', first1, end1)?;
        writeln!(out)?;

        if extent.kind != HunkKind::New {
            for line in first0..end0 {
                hunks::print_line(out, "< ", seq0, line)?;
            }
        }
        if extent.kind == HunkKind::Changed {
            writeln!(out, "---")?;
        }
        if extent.kind != HunkKind::Old {
            for line in first1..end1 {
                hunks::print_line(out, "> ", seq1, line)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::compare::compare;
    use crate::options::DiffOptions;

    fn render_normal(text0: &str, text1: &str, options: &DiffOptions) -> String {
        let (seq0, seq1) = classify(text0, text1, options);
        let script = compare(&seq0, &seq1, options);
        let mut out = Vec::new();
        print_normal_script(&mut out, &script, &seq0, &seq1).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn replacement_prints_a_change_hunk() {
        let options = DiffOptions::default();
        let output = render_normal("a\nb\nc\n", "a\nx\nc\n", &options);
        assert_eq!(output, "2c2\n< b\n---\n> x\n");
    }

    #[test]
    fn insertion_names_the_line_it_follows() {
        let options = DiffOptions::default();
        let output = render_normal("b\n", "a\nb\n", &options);
        assert_eq!(output, "0a1\n> a\n");

        let output = render_normal("a\n", "a\nb\nc\n", &options);
        assert_eq!(output, "1a2,3\n> b\n> c\n");
    }

    #[test]
    fn deletion_names_the_surviving_line() {
        let options = DiffOptions::default();
        let output = render_normal("a\nb\nc\n", "a\nc\n", &options);
        assert_eq!(output, "2d1\n< b\n");
    }

    #[test]
    fn multi_line_ranges_use_comma_form() {
        let options = DiffOptions::default();
        let output = render_normal("a\nb\nc\nd\n", "a\nx\ny\nd\n", &options);
        assert_eq!(output, "2,3c2,3\n< b\n< c\n---\n> x\n> y\n");
    }

    #[test]
    fn missing_newline_gets_its_marker() {
        let options = DiffOptions::default();
        let output = render_normal("a\nb", "a\nz", &options);
        assert_eq!(
            output,
            "2c2\n< b\n\\ No newline at end of file\n---\n> z\n\\ No newline at end of file\n"
        );
    }

    #[test]
    fn identical_inputs_print_nothing() {
        let options = DiffOptions::default();
        assert_eq!(render_normal("same\n", "same\n", &options), "");
    }
}
