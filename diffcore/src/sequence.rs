/// One file's worth of classified lines.
///
/// `lines` holds the whole file. Classification trims an identical prefix
/// and suffix before the matcher ever runs, so `classes` covers only the
/// compared region: `classes[i]` belongs to `lines[prefix + i]`. Two lines
/// are equal for matching purposes exactly when their class numbers are
/// equal, and class 0 is reserved for lines that never match anything.
#[derive(Debug)]
pub struct LineSequence {
    lines: Vec<String>,
    classes: Vec<usize>,
    prefix: usize,
    missing_newline: bool,
}

impl LineSequence {
    pub(crate) fn new(
        lines: Vec<String>,
        classes: Vec<usize>,
        prefix: usize,
        missing_newline: bool,
    ) -> Self {
        assert!(prefix + classes.len() <= lines.len());
        LineSequence {
            lines,
            classes,
            prefix,
            missing_newline,
        }
    }

    /// Number of lines in the compared region.
    pub fn compared(&self) -> usize {
        self.classes.len()
    }

    /// Class numbers of the compared region.
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Lines trimmed off the front as part of the common prefix.
    pub fn prefix(&self) -> usize {
        self.prefix
    }

    /// Total line count of the file.
    pub fn total(&self) -> usize {
        self.lines.len()
    }

    /// All lines of the file, in file order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// One line by its position in the file.
    pub fn line(&self, index: usize) -> &str {
        &self.lines[index]
    }

    /// The compared region's lines, without the trimmed ends.
    pub fn compared_lines(&self) -> &[String] {
        &self.lines[self.prefix..self.prefix + self.classes.len()]
    }

    /// True when the file's last line ends without a newline.
    pub fn missing_newline(&self) -> bool {
        self.missing_newline
    }
}

/// Changed-line flags for one side, padded with a sentinel slot on each
/// end so boundary scans can step one past the region without checks.
#[derive(Debug)]
pub(crate) struct ChangedFlags {
    flags: Vec<bool>,
}

impl ChangedFlags {
    pub(crate) fn new(len: usize) -> Self {
        ChangedFlags {
            flags: vec![false; len + 2],
        }
    }

    /// Flag count without the sentinels.
    pub(crate) fn len(&self) -> usize {
        self.flags.len() - 2
    }

    /// Reads a flag; index -1 and len() hit the sentinels, which stay false.
    pub(crate) fn get(&self, index: isize) -> bool {
        self.flags[(index + 1) as usize]
    }

    pub(crate) fn set(&mut self, index: usize, value: bool) {
        self.flags[index + 1] = value;
    }
}
