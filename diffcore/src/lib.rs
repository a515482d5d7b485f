use std::io::{self, Write};

mod binary;
mod classify;
mod compare;
mod context;
mod discard;
pub mod error;
pub mod exit_status;
mod hunks;
mod matcher;
mod moved;
mod normal;
mod options;
mod script;
mod sequence;
mod shift;

pub use binary::{compare_binary, looks_binary, verdict_from_sizes, BinaryVerdict};
pub use classify::classify;
pub use compare::{compare, compare_with_matcher};
pub use moved::{ClassBalanceMatcher, MovedBlockMatcher};
pub use options::{DiffOptions, DiscardTuning, OutputFormat};
pub use script::{Change, EditScript};
pub use sequence::LineSequence;

/// Renders a finished script in one of the classic formats.
pub fn render(
    script: &EditScript,
    seq0: &LineSequence,
    seq1: &LineSequence,
    format: &OutputFormat,
    options: &DiffOptions,
    out: &mut impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Normal => normal::print_normal_script(out, script, seq0, seq1),
        OutputFormat::Context(radius) => {
            context::print_context_script(out, script, seq0, seq1, *radius, options)
        }
        OutputFormat::Unified(radius) => {
            context::print_unidiff_script(out, script, seq0, seq1, *radius, options)
        }
    }
}
