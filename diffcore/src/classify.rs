use std::collections::HashMap;

use crate::options::DiffOptions;
use crate::sequence::LineSequence;

/// Splits `text` into lines without their newlines, noting whether the
/// last line ended short of one.
fn split_lines(text: &str) -> (Vec<String>, bool) {
    if text.is_empty() {
        return (Vec::new(), false);
    }
    let missing_newline = !text.ends_with('\n');
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if !missing_newline {
        lines.pop();
    }
    (lines, missing_newline)
}

fn line_key<'a>(line: &'a str, options: &DiffOptions) -> &'a str {
    if options.ignore_trailing_space {
        line.trim_end()
    } else {
        line
    }
}

/// Equality key of one line. A last line missing its newline never equals
/// a complete line with the same text, so the key carries that bit too.
fn key_of<'a>(
    lines: &'a [String],
    missing_newline: bool,
    index: usize,
    options: &DiffOptions,
) -> (&'a str, bool) {
    let incomplete = missing_newline && index + 1 == lines.len();
    (line_key(&lines[index], options), incomplete)
}

fn class_for<'a>(
    key: (&'a str, bool),
    blank_is_reserved: bool,
    table: &mut HashMap<(&'a str, bool), usize>,
    next_class: &mut usize,
) -> usize {
    if blank_is_reserved && key.0.is_empty() {
        return 0;
    }
    *table.entry(key).or_insert_with(|| {
        *next_class += 1;
        *next_class
    })
}

/// Splits both texts into lines and assigns equivalence classes drawn from
/// one shared table, after trimming the identical prefix and suffix down
/// to a margin the renderers can still widen hunks into.
///
/// Class numbers start at 1; class 0 is reserved for blank lines when
/// `ignore_blank_lines` is set, and such lines never match anything.
pub fn classify(text0: &str, text1: &str, options: &DiffOptions) -> (LineSequence, LineSequence) {
    let (lines0, missing0) = split_lines(text0);
    let (lines1, missing1) = split_lines(text1);
    let len0 = lines0.len();
    let len1 = lines1.len();

    let mut prefix = 0;
    while prefix < len0
        && prefix < len1
        && key_of(&lines0, missing0, prefix, options)
            == key_of(&lines1, missing1, prefix, options)
    {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < len0 - prefix
        && suffix < len1 - prefix
        && key_of(&lines0, missing0, len0 - suffix - 1, options)
            == key_of(&lines1, missing1, len1 - suffix - 1, options)
    {
        suffix += 1;
    }

    // Keep a context margin comparable at each end, plus one extra suffix
    // line so the incomplete-line flag stays inside the compared region.
    let prefix = prefix.saturating_sub(options.context);
    let suffix = suffix.saturating_sub(options.context + 1);

    // The key table borrows from both line vectors, so it lives in its
    // own scope and is gone before the vectors move into the sequences.
    let (classes0, classes1, class_count) = {
        let mut table: HashMap<(&str, bool), usize> = HashMap::new();
        let mut next_class = 0usize;
        let blank_is_reserved = options.ignore_blank_lines;

        let mut classes0 = Vec::with_capacity(len0 - prefix - suffix);
        for index in prefix..len0 - suffix {
            let key = key_of(&lines0, missing0, index, options);
            classes0.push(class_for(key, blank_is_reserved, &mut table, &mut next_class));
        }
        let mut classes1 = Vec::with_capacity(len1 - prefix - suffix);
        for index in prefix..len1 - suffix {
            let key = key_of(&lines1, missing1, index, options);
            classes1.push(class_for(key, blank_is_reserved, &mut table, &mut next_class));
        }
        (classes0, classes1, next_class)
    };

    log::debug!(
        "classified {} and {} lines into {} classes, trimmed prefix {} suffix {}",
        len0,
        len1,
        class_count,
        prefix,
        suffix
    );

    (
        LineSequence::new(lines0, classes0, prefix, missing0),
        LineSequence::new(lines1, classes1, prefix, missing1),
    )
}
