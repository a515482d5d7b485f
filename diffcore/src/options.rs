use regex::Regex;

/// Named thresholds for the confusing-line filter.
///
/// A line is provisionally discarded once the other file holds more than
/// `many_start` copies of it, and that threshold doubles for every factor
/// of four the file grows past `many_unit` lines. Inside a discardable run,
/// provisional lines survive when they make up more than one part in
/// `provisional_ratio` of the run, and the `edge_window`/`edge_anchor` pair
/// bounds the scan that re-admits provisional lines sitting next to the
/// run's edges.
#[derive(Debug, Clone)]
pub struct DiscardTuning {
    pub many_start: usize,
    pub many_unit: usize,
    pub provisional_ratio: usize,
    pub edge_window: usize,
    pub edge_anchor: usize,
}

impl Default for DiscardTuning {
    fn default() -> Self {
        DiscardTuning {
            many_start: 5,
            many_unit: 64,
            provisional_ratio: 4,
            edge_window: 8,
            edge_anchor: 3,
        }
    }
}

/// Output format, with the context radius carried where one applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Normal,
    Context(usize),
    Unified(usize),
}

impl OutputFormat {
    /// Lines of context shown around a hunk.
    pub fn context_radius(&self) -> usize {
        match self {
            OutputFormat::Normal => 0,
            OutputFormat::Context(radius) | OutputFormat::Unified(radius) => *radius,
        }
    }
}

/// Options steering classification, matching and rendering.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Lines kept comparable around trimmed identical ends. Callers that
    /// render with context set this to the radius they will render with.
    pub context: usize,
    /// Blank lines take the reserved class and never match anything.
    pub ignore_blank_lines: bool,
    /// Changes whose lines all match the pattern are flagged ignorable.
    pub ignore_pattern: Option<Regex>,
    /// Trailing whitespace is insignificant when lines are classified.
    pub ignore_trailing_space: bool,
    /// Locates the definition line named in context and unified headers.
    pub function_pattern: Option<Regex>,
    /// Lets the matcher take shortcuts when a search runs long.
    pub heuristic: bool,
    /// Replaces the default floor of the matcher's cost ceiling.
    pub cost_limit: Option<usize>,
    /// Spend whatever it takes to find the smallest script.
    pub minimal: bool,
    /// Run the bundled moved-block pass over the finished script.
    pub detect_moved_blocks: bool,
    pub discard: DiscardTuning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_matches_classic_thresholds() {
        let tuning = DiscardTuning::default();
        assert_eq!(tuning.many_start, 5);
        assert_eq!(tuning.many_unit, 64);
        assert_eq!(tuning.provisional_ratio, 4);
        assert_eq!(tuning.edge_window, 8);
        assert_eq!(tuning.edge_anchor, 3);
    }

    #[test]
    fn context_radius_per_format() {
        assert_eq!(OutputFormat::Normal.context_radius(), 0);
        assert_eq!(OutputFormat::Context(3).context_radius(), 3);
        assert_eq!(OutputFormat::Unified(0).context_radius(), 0);
    }
}
