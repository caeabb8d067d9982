//! treedoc - Flatten a directory tree into one readable text document and back.
//!
//! Usage:
//!   treedoc pack <ROOT>          Write a document for a directory tree
//!   treedoc unpack <DOCUMENT>    Recreate the tree a document describes
//!   treedoc inspect <DOCUMENT>   Show what a document contains
//!   treedoc --help               Show help

mod logging;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, info_span, warn};

use treedoc_core::{ContentCleanup, MarkerSet, ParseOptions, ProjectStats, WalkConfig};
use treedoc_format::{DocumentParser, ParseReport, ParsedDocument, Serializer};
use treedoc_ops::{MaterializeConfig, Materializer};
use treedoc_scan::TreeScanner;

use crate::logging::LogContext;
use crate::settings::Settings;

/// Number of file paths listed by `inspect` and `unpack`.
const SAMPLE_PATHS: usize = 10;

#[derive(Parser)]
#[command(
    name = "treedoc",
    version,
    about = "Flatten a directory tree into one readable text document and recreate it",
    long_about = "treedoc writes a directory tree, file contents included, into a single \
                  plain-text document, and turns such documents back into directories.\n\n\
                  Set TREEDOC_LOG (e.g. `TREEDOC_LOG=debug`) to control logging."
)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Do not write a log file
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a document for a directory tree
    Pack {
        /// Root directory to pack
        root: PathBuf,

        /// Directory the document is written to (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Directory name or path to leave out (repeatable, comma-separated)
        #[arg(long = "exclude-dir", value_name = "NAME")]
        exclude_dirs: Vec<String>,

        /// File name or path to leave out (repeatable, comma-separated)
        #[arg(long = "exclude-file", value_name = "NAME")]
        exclude_files: Vec<String>,

        /// Write markers readable by older tools
        #[arg(long)]
        legacy: bool,
    },

    /// Recreate the directory tree a document describes
    Unpack {
        /// Document to read
        document: PathBuf,

        /// Parent directory for the recreated tree (defaults to the document's directory)
        #[arg(short, long, value_name = "DEST_PARENT")]
        destination: Option<PathBuf>,

        #[command(flatten)]
        parse: ParseArgs,

        /// Skip reading files back after writing them
        #[arg(long)]
        no_verify: bool,
    },

    /// Show the root name, files and warnings of a document
    Inspect {
        /// Document to read
        document: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(clap::Args)]
struct ParseArgs {
    /// The document uses `------` markers from older tools
    #[arg(long)]
    legacy: bool,

    /// Keep section content byte for byte instead of trimming it
    #[arg(long)]
    verbatim: bool,
}

impl ParseArgs {
    fn apply(&self, mut options: ParseOptions) -> ParseOptions {
        if self.legacy {
            options.markers = MarkerSet::Legacy;
        }
        if self.verbatim {
            options.cleanup = ContentCleanup::Verbatim;
        }
        options
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.no_log_file {
        settings.log.to_file = false;
    }

    match cli.command {
        Command::Pack {
            root,
            output,
            exclude_dirs,
            exclude_files,
            legacy,
        } => {
            let output_dir = match output {
                Some(dir) => dir,
                None => std::env::current_dir().context("Cannot determine current directory")?,
            };
            fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;

            let log = LogContext::new(&settings.log, cli.verbose, Some(&output_dir))?;
            log.run(|| {
                run_pack(
                    &root,
                    &output_dir,
                    &settings,
                    &exclude_dirs,
                    &exclude_files,
                    legacy,
                    log.log_file(),
                )
            })?;
        }
        Command::Unpack {
            document,
            destination,
            parse,
            no_verify,
        } => {
            let destination = match destination {
                Some(dir) => dir,
                None => document_dir(&document)?,
            };
            let log = LogContext::new(&settings.log, cli.verbose, Some(&destination))?;
            let options = parse.apply(settings.parse.clone());
            log.run(|| run_unpack(&document, &destination, options, !no_verify))?;
        }
        Command::Inspect {
            document,
            parse,
            format,
        } => {
            // Inspecting never writes anything, a log file included
            let log = LogContext::new(&settings.log, cli.verbose, None)?;
            let options = parse.apply(settings.parse.clone());
            log.run(|| run_inspect(&document, options, format))?;
        }
    }

    Ok(())
}

/// Scan a root and write its document.
fn run_pack(
    root: &Path,
    output_dir: &Path,
    settings: &Settings,
    exclude_dirs: &[String],
    exclude_files: &[String],
    legacy: bool,
    log_file: Option<&Path>,
) -> Result<()> {
    let span = info_span!("pack");
    let root = root
        .canonicalize()
        .with_context(|| format!("Invalid root path {}", root.display()))?;
    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string());

    let document_path = output_dir.join(document_name(&root_name));

    // Neither the document nor the log may end up inside the document
    let mut skip_paths = vec![document_path.clone()];
    skip_paths.extend(log_file.map(Path::to_path_buf));

    let config = WalkConfig::builder()
        .root(&root)
        .exclusions(settings.walk.exclusions(exclude_dirs, exclude_files))
        .skip_paths(skip_paths)
        .include_hidden(settings.walk.include_hidden)
        .build()
        .context("Invalid walk configuration")?;

    eprintln!("Scanning {}...", root.display());
    let tree = TreeScanner::new()
        .with_span(span.clone())
        .scan(&config)
        .context("Scan failed")?;

    let markers = if legacy {
        MarkerSet::Legacy
    } else {
        MarkerSet::Current
    };
    let document = Serializer::new()
        .with_markers(markers)
        .with_span(span)
        .render(&tree);

    fs::write(&document_path, &document)
        .with_context(|| format!("Failed to write {}", document_path.display()))?;
    info!(path = %document_path.display(), "Document written");

    println!();
    println!("{}", "─".repeat(60));
    println!(" {}", document_path.display());
    println!(
        " {} files, {} directories, {} of content",
        tree.stats.total_files,
        tree.stats.total_dirs,
        format_size(tree.stats.total_bytes)
    );
    if tree.stats.binary_files + tree.stats.unreadable_files > 0 {
        println!(
            " {} binary, {} unreadable (written as placeholders)",
            tree.stats.binary_files, tree.stats.unreadable_files
        );
    }
    println!(" Scanned in {:.2}s", tree.scan_duration.as_secs_f64());
    println!("{}", "─".repeat(60));

    if tree.has_warnings() {
        println!();
        println!("{} warning(s) during scan", tree.warnings.len());
    }

    Ok(())
}

/// Parse a document and recreate its tree under `destination`.
fn run_unpack(
    document: &Path,
    destination: &Path,
    options: ParseOptions,
    verify: bool,
) -> Result<()> {
    let span = info_span!("unpack");

    let parsed = DocumentParser::new(options)
        .with_span(span.clone())
        .parse_file(document)
        .with_context(|| format!("Failed to parse {}", document.display()))?;
    print_stats(&parsed.project.stats(SAMPLE_PATHS), &parsed.report);

    let config = MaterializeConfig::builder()
        .destination(destination)
        .verify(verify)
        .build()
        .context("Invalid destination")?;
    let report = Materializer::new(config)
        .with_span(span)
        .materialize(parsed.project)
        .context("Materialization failed")?;

    println!();
    println!(" Output: {}", report.output_root.display());
    println!(" {}", report.summary());
    for error in &report.errors {
        warn!(path = %error.path.display(), kind = %error.kind, "{}", error.message);
        println!("   {error}");
    }

    if !report.is_success() {
        bail!("No files were written to {}", report.output_root.display());
    }
    Ok(())
}

/// Output of `inspect --format json`.
#[derive(Serialize)]
struct Inspection<'a> {
    #[serde(flatten)]
    stats: ProjectStats,
    report: &'a ParseReport,
}

/// Parse a document and describe it without writing anything.
fn run_inspect(document: &Path, options: ParseOptions, format: OutputFormat) -> Result<()> {
    let ParsedDocument { project, report } = DocumentParser::new(options)
        .with_span(info_span!("inspect"))
        .parse_file(document)
        .with_context(|| format!("Failed to parse {}", document.display()))?;
    let stats = project.stats(SAMPLE_PATHS);

    match format {
        OutputFormat::Text => print_stats(&stats, &report),
        OutputFormat::Json => {
            let inspection = Inspection {
                stats,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&inspection)?);
        }
    }
    Ok(())
}

fn print_stats(stats: &ProjectStats, report: &ParseReport) {
    println!();
    println!("{}", "─".repeat(60));
    println!(" Root: {} ({:?})", stats.root_name, report.root_source);
    println!(
        " {} files, {} of content, {} placeholders",
        stats.files_parsed,
        format_size(stats.total_bytes),
        stats.placeholders
    );
    println!(
        " {} sections, {} skipped, {} overwritten ({} markers, {:?} cleanup)",
        report.sections_found,
        report.sections_skipped,
        report.overwritten,
        report.markers,
        report.cleanup
    );
    println!("{}", "─".repeat(60));

    for path in &stats.sample_paths {
        println!("   {}", path.display());
    }
    let remaining = stats.files_parsed.saturating_sub(stats.sample_paths.len());
    if remaining > 0 {
        println!("   ... and {} more", remaining);
    }

    if !report.warnings.is_empty() {
        println!();
        println!("{} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            println!("   line {}: {}", warning.line, warning.message);
        }
    }
}

/// `<root>_directory_structure_<YYYYmmdd_HHMMSS>.txt`
fn document_name(root_name: &str) -> String {
    format!(
        "{}_directory_structure_{}.txt",
        root_name,
        Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Directory containing a document, for relative and absolute paths alike.
fn document_dir(document: &Path) -> Result<PathBuf> {
    match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => std::env::current_dir().context("Cannot determine current directory"),
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
