use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::Parser;
use gettextrs::{bind_textdomain_codeset, gettext, setlocale, textdomain, LocaleCategory};
use regex::Regex;

use diffcore::error::{DiffError, Result};
use diffcore::exit_status::DiffExitStatus;
use diffcore::{
    classify, compare, compare_binary, looks_binary, render, verdict_from_sizes, BinaryVerdict,
    DiffOptions, OutputFormat,
};

const PROJECT_NAME: &str = "diffcore";

#[derive(Parser)]
#[command(version, about = gettext("diff - compare two files line by line"))]
struct Args {
    #[arg(
        short = 'b',
        long = "ignore-space-change",
        help = gettext("Treat trailing whitespace on a line as insignificant")
    )]
    ignore_eol_space: bool,

    #[arg(
        short = 'B',
        long = "ignore-blank-lines",
        help = gettext("Do not report changes that only insert or delete blank lines")
    )]
    ignore_blank_lines: bool,

    #[arg(
        short = 'I',
        long = "ignore-matching-lines",
        value_name = "PATTERN",
        help = gettext("Do not report changes whose lines all match PATTERN (repeatable)")
    )]
    ignore_matching_lines: Vec<String>,

    #[arg(short, help = gettext("Output 3 lines of copied context"))]
    context3: bool,

    #[arg(
        short = 'C',
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        help = gettext("Output N lines of copied context")
    )]
    context: Option<u32>,

    #[arg(short, help = gettext("Output 3 lines of unified context"))]
    unified3: bool,

    #[arg(
        short = 'U',
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..),
        help = gettext("Output N lines of unified context")
    )]
    unified: Option<u32>,

    #[arg(
        short = 'F',
        long = "show-function-line",
        value_name = "PATTERN",
        help = gettext("In context formats, show the most recent line matching PATTERN")
    )]
    show_function_line: Option<String>,

    #[arg(
        long,
        value_name = "LABEL",
        help = gettext("Use LABEL instead of the first file name and time in headers")
    )]
    label: Option<String>,

    #[arg(
        long,
        value_name = "LABEL",
        help = gettext("Use LABEL instead of the second file name and time in headers")
    )]
    label2: Option<String>,

    #[arg(
        short = 'd',
        long,
        help = gettext("Spend extra time to find a smaller set of changes")
    )]
    minimal: bool,

    #[arg(
        long,
        help = gettext("Accept a larger set of changes to keep large inputs fast")
    )]
    speed_large_files: bool,

    #[arg(
        long,
        help = gettext("Annotate the change list with moved-block correspondences")
    )]
    moved_blocks: bool,

    #[arg(help = gettext("A pathname of the first file to be compared"))]
    file1: PathBuf,

    #[arg(help = gettext("A pathname of the second file to be compared"))]
    file2: PathBuf,
}

impl From<&Args> for OutputFormat {
    fn from(args: &Args) -> Self {
        if let Some(radius) = args.unified {
            OutputFormat::Unified(radius as usize)
        } else if args.unified3 {
            OutputFormat::Unified(3)
        } else if let Some(radius) = args.context {
            OutputFormat::Context(radius as usize)
        } else if args.context3 {
            OutputFormat::Context(3)
        } else {
            OutputFormat::Normal
        }
    }
}

fn build_options(args: &Args, format: &OutputFormat) -> Result<DiffOptions> {
    let ignore_pattern = match args.ignore_matching_lines.as_slice() {
        [] => None,
        patterns => {
            let joined = patterns
                .iter()
                .map(|pattern| format!("(?:{})", pattern))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&joined)?)
        }
    };
    let function_pattern = args
        .show_function_line
        .as_deref()
        .map(Regex::new)
        .transpose()?;

    Ok(DiffOptions {
        context: format.context_radius(),
        ignore_blank_lines: args.ignore_blank_lines,
        ignore_pattern,
        ignore_trailing_space: args.ignore_eol_space,
        function_pattern,
        heuristic: args.speed_large_files,
        minimal: args.minimal,
        detect_moved_blocks: args.moved_blocks,
        ..Default::default()
    })
}

fn metadata_for(path: &Path) -> Result<fs::Metadata> {
    let metadata = fs::metadata(path).map_err(|source| DiffError::FileAccess {
        path: path.display().to_string(),
        source,
    })?;
    if metadata.is_dir() {
        return Err(DiffError::IsDirectory(path.display().to_string()));
    }
    Ok(metadata)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| DiffError::FileAccess {
        path: path.display().to_string(),
        source,
    })
}

fn header(path: &Path, metadata: &fs::Metadata, label: &Option<String>) -> Result<String> {
    if let Some(label) = label {
        return Ok(label.clone());
    }
    let modified = metadata.modified()?;
    Ok(format!(
        "{}\t{}",
        path.display(),
        Into::<DateTime<Local>>::into(modified).to_rfc2822()
    ))
}

fn print_headers(
    args: &Args,
    format: &OutputFormat,
    metadata0: &fs::Metadata,
    metadata1: &fs::Metadata,
    out: &mut impl Write,
) -> Result<()> {
    match format {
        OutputFormat::Normal => {}
        OutputFormat::Context(_) => {
            writeln!(out, "*** {}", header(&args.file1, metadata0, &args.label)?)?;
            writeln!(out, "--- {}", header(&args.file2, metadata1, &args.label2)?)?;
        }
        OutputFormat::Unified(_) => {
            writeln!(out, "--- {}", header(&args.file1, metadata0, &args.label)?)?;
            writeln!(out, "+++ {}", header(&args.file2, metadata1, &args.label2)?)?;
        }
    }
    Ok(())
}

fn run_diff(args: &Args) -> Result<DiffExitStatus> {
    let format = OutputFormat::from(args);
    let options = build_options(args, &format)?;

    let metadata0 = metadata_for(&args.file1)?;
    let metadata1 = metadata_for(&args.file2)?;
    let bytes0 = read_bytes(&args.file1)?;
    let bytes1 = read_bytes(&args.file2)?;

    let text = match (std::str::from_utf8(&bytes0), std::str::from_utf8(&bytes1)) {
        (Ok(text0), Ok(text1)) if !looks_binary(&bytes0) && !looks_binary(&bytes1) => {
            Some((text0, text1))
        }
        _ => None,
    };

    let Some((text0, text1)) = text else {
        let verdict = match verdict_from_sizes(metadata0.len(), metadata1.len()) {
            BinaryVerdict::Unknown => {
                compare_binary(&mut Cursor::new(&bytes0), &mut Cursor::new(&bytes1))?
            }
            decided => decided,
        };
        if verdict == BinaryVerdict::Same {
            return Ok(DiffExitStatus::NotDifferent);
        }
        println!(
            "Binary files {} and {} differ",
            args.file1.display(),
            args.file2.display()
        );
        return Ok(DiffExitStatus::Different);
    };

    let (seq0, seq1) = classify(text0, text1, &options);
    let script = compare(&seq0, &seq1, &options);
    if !script.has_visible_changes() {
        return Ok(DiffExitStatus::NotDifferent);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_headers(args, &format, &metadata0, &metadata1, &mut out)?;
    render(&script, &seq0, &seq1, &format, &options, &mut out)?;
    Ok(DiffExitStatus::Different)
}

fn main() -> DiffExitStatus {
    setlocale(LocaleCategory::LcAll, "");
    textdomain(PROJECT_NAME).unwrap();
    bind_textdomain_codeset(PROJECT_NAME, "UTF-8").unwrap();
    env_logger::init();

    let args = Args::parse();

    match run_diff(&args) {
        Ok(status) => status,
        Err(error) => {
            eprintln!("diff: {}", error);
            DiffExitStatus::Trouble
        }
    }
}
