//! Document grammar: marker lines, section headers and the root hint.
//!
//! ```text
//! Directory Structure for: /abs/path/proj
//!
//! proj/
//! ├── sub/
//! │   └── b.txt
//! └── a.txt
//!
//! ================================================================================
//!
//! FILE CONTENTS
//!
//! === Directory: /abs/path/proj/sub ===
//!
//! ────── FILE START: b.txt (proj/sub/b.txt) ──────
//! world
//! ────── FILE END: b.txt (proj/sub/b.txt) ──────
//! ```
//!
//! Only the framed sections and the root hint carry meaning for decoding;
//! the tree drawing and directory headers are for humans.

use std::sync::LazyLock;

use regex::Regex;
use treedoc_core::{MarkerSet, basename};

/// Rule drawn around current markers.
pub const CURRENT_RULE: &str = "──────";
/// Rule drawn around markers written by older serializers.
pub const LEGACY_RULE: &str = "------";
/// Prefix of the line naming the original root directory.
pub const ROOT_HINT_PREFIX: &str = "Directory Structure for:";
/// Label that opens the contents block.
pub const CONTENTS_LABEL: &str = "FILE CONTENTS";
/// Width of the `=` line between the structure and contents blocks.
pub const BLOCK_SEPARATOR_WIDTH: usize = 80;
/// Suffix appended to directories that could not be listed.
pub const DENIED_SUFFIX: &str = " [Permission Denied]";

static CURRENT_MARKER: LazyLock<Regex> = LazyLock::new(|| marker_regex(CURRENT_RULE));
static LEGACY_MARKER: LazyLock<Regex> = LazyLock::new(|| marker_regex(LEGACY_RULE));
static ROOT_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}\s*(.+?)\s*$", regex::escape(ROOT_HINT_PREFIX)))
        .expect("root hint pattern is valid")
});

fn marker_regex(rule: &str) -> Regex {
    Regex::new(&format!(
        r"^\s*{}\s*FILE (START|END):\s*(.*?)\s*$",
        regex::escape(rule)
    ))
    .expect("marker pattern is valid")
}

/// Which end of a section a marker line opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Start,
    End,
}

/// A recognised marker line; `header` is the text after `FILE START:`/`FILE END:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerLine<'a> {
    pub kind: MarkerKind,
    pub header: &'a str,
}

/// Declared name and path from a marker header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub name: String,
    pub path: String,
}

/// Marker spelling for one [`MarkerSet`].
#[derive(Debug, Clone, Copy)]
pub struct Grammar {
    markers: MarkerSet,
}

impl Grammar {
    pub fn new(markers: MarkerSet) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> MarkerSet {
        self.markers
    }

    fn rule(&self) -> &'static str {
        match self.markers {
            MarkerSet::Current => CURRENT_RULE,
            MarkerSet::Legacy => LEGACY_RULE,
        }
    }

    fn rule_char(&self) -> char {
        match self.markers {
            MarkerSet::Current => '─',
            MarkerSet::Legacy => '-',
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self.markers {
            MarkerSet::Current => &CURRENT_MARKER,
            MarkerSet::Legacy => &LEGACY_MARKER,
        }
    }

    /// Render the line that opens a section.
    pub fn start_line(&self, name: &str, path: &str) -> String {
        let rule = self.rule();
        format!("{rule} FILE START: {name} ({path}) {rule}")
    }

    /// Render the line that closes a section.
    pub fn end_line(&self, name: &str, path: &str) -> String {
        let rule = self.rule();
        format!("{rule} FILE END: {name} ({path}) {rule}")
    }

    /// Recognise a marker line. Markers must start their line, after
    /// optional indentation.
    pub fn classify<'a>(&self, line: &'a str) -> Option<MarkerLine<'a>> {
        let captures = self.pattern().captures(line)?;
        let kind = match &captures[1] {
            "START" => MarkerKind::Start,
            _ => MarkerKind::End,
        };
        let header = captures
            .get(2)
            .map_or("", |m| m.as_str())
            .trim_end_matches(self.rule_char())
            .trim_end();
        Some(MarkerLine { kind, header })
    }
}

/// Split a header of the form `<name> (<path>)`.
///
/// Names may contain ` (`, so the split point is the first one whose path
/// ends with the declared name; failing that, the last one. A header that
/// is only `(<path>)` takes its name from the path.
pub fn parse_header(header: &str) -> Option<SectionHeader> {
    let inner = header.trim().strip_suffix(')')?;

    if let Some(path) = inner.strip_prefix('(') {
        let path = path.trim();
        let name = basename(path)?;
        return Some(SectionHeader {
            name: name.to_string(),
            path: path.to_string(),
        });
    }

    let candidates: Vec<usize> = inner.match_indices(" (").map(|(i, _)| i).collect();
    let split = candidates
        .iter()
        .copied()
        .find(|&i| basename(&inner[i + 2..]) == Some(inner[..i].trim()))
        .or_else(|| candidates.last().copied())?;

    let path = inner[split + 2..].trim();
    if path.is_empty() {
        return None;
    }
    Some(SectionHeader {
        name: inner[..split].trim().to_string(),
        path: path.to_string(),
    })
}

/// Root directory name from a `Directory Structure for:` line.
pub fn parse_root_hint(line: &str) -> Option<&str> {
    let captures = ROOT_HINT.captures(line)?;
    basename(captures.get(1)?.as_str())
}
