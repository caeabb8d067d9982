//! Recover a [`ParsedProject`] from a document.
//!
//! Parsing is a single pass over lines:
//!
//! ```text
//! SeekingStart --START--> InSection --END--> emit, SeekingStart
//!                            |
//!                            +--START / EOF--> drop (MissingEnd)
//! ```
//!
//! Marker lines inside content can only confuse the parser when they start
//! a line; the nearest END always closes the open section.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{Span, debug, error, info, warn};
use treedoc_core::{
    ContentCleanup, MarkerSet, ParseError, ParseOptions, ParseWarning, ParseWarningKind,
    ParsedProject, first_component, is_safe_relative, normalize_separators,
};

use crate::grammar::{Grammar, MarkerKind, SectionHeader, parse_header, parse_root_hint};

/// A `( ... )` fragment on the last line of captured content.
static TRAILING_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\([^\n]*?\)\s*\z").expect("trailing fragment pattern is valid")
});

/// Where the recovered root name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootSource {
    /// The `Directory Structure for:` line.
    Hint,
    /// The first component of the first section's path.
    FirstSection,
    /// Nothing named a root; the configured default was used.
    Default,
}

/// What happened during a parse, beyond the recovered files.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub markers: MarkerSet,
    pub cleanup: ContentCleanup,
    /// Complete sections, duplicates included.
    pub sections_found: usize,
    /// Sections dropped for a missing path or END marker.
    pub sections_skipped: usize,
    /// Sections that replaced an earlier one with the same path.
    pub overwritten: usize,
    pub root_source: RootSource,
    pub warnings: Vec<ParseWarning>,
}

/// A recovered project together with its parse report.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub project: ParsedProject,
    pub report: ParseReport,
}

enum State<'a> {
    SeekingStart,
    InSection {
        /// `None` when the header had no usable path; the body is consumed
        /// and discarded.
        header: Option<SectionHeader>,
        line: usize,
        body: Vec<&'a str>,
    },
}

/// Section-by-section document parser.
pub struct DocumentParser {
    options: ParseOptions,
    grammar: Grammar,
    span: Span,
}

impl DocumentParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            grammar: Grammar::new(options.markers),
            options,
            span: Span::none(),
        }
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Read and parse a document file.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedDocument, ParseError> {
        let _entered = self.span.enter();

        if !path.is_file() {
            let listing = list_search_dir(path);
            error!(
                path = %path.display(),
                entries = ?listing,
                "Source document not found"
            );
            return Err(ParseError::SourceMissing {
                path: path.to_path_buf(),
                listing,
            });
        }

        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = text.len(), "Read document");
        self.parse(&text)
    }

    /// Parse a document, failing when no complete section was found.
    pub fn parse(&self, text: &str) -> Result<ParsedDocument, ParseError> {
        let parsed = self.parse_lenient(text);
        if parsed.project.is_empty() {
            error!(
                markers = %self.options.markers,
                skipped = parsed.report.sections_skipped,
                "No file sections found"
            );
            return Err(ParseError::NoSections {
                markers: self.options.markers,
                skipped: parsed.report.sections_skipped,
            });
        }
        Ok(parsed)
    }

    /// Parse a document, returning whatever was recovered, possibly nothing.
    pub fn parse_lenient(&self, text: &str) -> ParsedDocument {
        let _entered = self.span.enter();

        let mut project = ParsedProject::new(String::new());
        let mut warnings = Vec::new();
        let mut sections_found = 0;
        let mut overwritten = 0;
        let mut hint: Option<String> = None;
        let mut first_path: Option<String> = None;
        let mut seen_start = false;
        let mut state = State::SeekingStart;

        for (index, line) in text.split('\n').enumerate() {
            let number = index + 1;
            let marker = self.grammar.classify(line);

            state = match (state, marker) {
                (State::SeekingStart, None) => {
                    if !seen_start && hint.is_none() {
                        hint = parse_root_hint(line).map(str::to_string);
                    }
                    State::SeekingStart
                }
                (State::SeekingStart, Some(m)) if m.kind == MarkerKind::End => {
                    debug!(line = number, "Ignoring END marker outside a section");
                    State::SeekingStart
                }
                (
                    State::InSection {
                        header,
                        line: opened,
                        mut body,
                    },
                    None,
                ) => {
                    body.push(line);
                    State::InSection {
                        header,
                        line: opened,
                        body,
                    }
                }
                (State::InSection { header, line: opened, body }, Some(m))
                    if m.kind == MarkerKind::End =>
                {
                    if let Some(header) = header {
                        if let Some(closing) = parse_header(m.header) {
                            if normalize_separators(&closing.path)
                                != normalize_separators(&header.path)
                            {
                                warnings.push(ParseWarning::new(
                                    opened,
                                    ParseWarningKind::PathMismatch,
                                    format!(
                                        "Section for {} closed by END marker for {}",
                                        header.path, closing.path
                                    ),
                                ));
                            }
                        }

                        sections_found += 1;
                        first_path.get_or_insert_with(|| header.path.clone());
                        let content = self.clean(&body);

                        if !is_safe_relative(&normalize_separators(&header.path)) {
                            warnings.push(ParseWarning::new(
                                opened,
                                ParseWarningKind::UnsafePath,
                                format!("Path {} leaves its output directory", header.path),
                            ));
                        }
                        debug!(path = %header.path, bytes = content.len(), "Parsed section");
                        if project.insert(&header.path, content).is_some() {
                            overwritten += 1;
                            warnings.push(ParseWarning::new(
                                opened,
                                ParseWarningKind::Overwritten,
                                format!("Later section replaced {}", header.path),
                            ));
                        }
                    }
                    State::SeekingStart
                }
                (state, Some(m)) => {
                    // START while a section is open abandons it
                    if let State::InSection {
                        header: Some(header),
                        line: opened,
                        ..
                    } = state
                    {
                        warnings.push(missing_end(opened, &header));
                    }
                    seen_start = true;
                    self.open_section(m.header, number, &mut warnings)
                }
            };
        }

        if let State::InSection {
            header: Some(header),
            line,
            ..
        } = state
        {
            warnings.push(missing_end(line, &header));
        }

        for warning in &warnings {
            warn!(line = warning.line, kind = ?warning.kind, "{}", warning.message);
        }

        let (root_name, root_source) = self.recover_root(hint, first_path.as_deref());
        project.root_name = root_name;

        let sections_skipped = warnings.iter().filter(|w| w.is_skip()).count();
        info!(
            root = %project.root_name,
            files = project.len(),
            skipped = sections_skipped,
            overwritten,
            "Parsed document"
        );

        ParsedDocument {
            project,
            report: ParseReport {
                markers: self.options.markers,
                cleanup: self.options.cleanup,
                sections_found,
                sections_skipped,
                overwritten,
                root_source,
                warnings,
            },
        }
    }

    fn open_section<'a>(
        &self,
        raw_header: &str,
        number: usize,
        warnings: &mut Vec<ParseWarning>,
    ) -> State<'a> {
        let header = parse_header(raw_header);
        if header.is_none() {
            warnings.push(ParseWarning::new(
                number,
                ParseWarningKind::MissingPath,
                format!("Section header has no (path): {raw_header}"),
            ));
        }
        State::InSection {
            header,
            line: number,
            body: Vec::new(),
        }
    }

    fn clean(&self, body: &[&str]) -> String {
        let joined = body.join("\n");
        match self.options.cleanup {
            ContentCleanup::Verbatim => joined,
            ContentCleanup::Trim => {
                let trimmed = joined.trim();
                TRAILING_FRAGMENT.replace(trimmed, "").trim().to_string()
            }
        }
    }

    fn recover_root(&self, hint: Option<String>, first_path: Option<&str>) -> (String, RootSource) {
        if let Some(name) = hint {
            return (name, RootSource::Hint);
        }

        // A bare file name carries no root directory
        let from_section = first_path.and_then(|path| {
            let nested = normalize_separators(path).components().count() > 1;
            nested.then(|| first_component(path)).flatten()
        });
        match from_section {
            Some(name) => (name.to_string(), RootSource::FirstSection),
            None => (self.options.default_root_name.clone(), RootSource::Default),
        }
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

fn missing_end(line: usize, header: &SectionHeader) -> ParseWarning {
    ParseWarning::new(
        line,
        ParseWarningKind::MissingEnd,
        format!("Section for {} has no END marker", header.path),
    )
}

/// Entries of the directory a missing document was expected in.
fn list_search_dir(path: &Path) -> Vec<String> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
