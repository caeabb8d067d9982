//! The treedoc document format.
//!
//! A document is a plain-text archive of a directory tree: a drawing of the
//! tree followed by one framed section per file. [`Serializer`] writes
//! documents from a scanned [`SourceTree`](treedoc_core::SourceTree) and
//! [`DocumentParser`] reads them back into a
//! [`ParsedProject`](treedoc_core::ParsedProject).
//!
//! # Example
//!
//! ```rust,no_run
//! use treedoc_format::{DocumentParser, Serializer};
//! use treedoc_core::ParseOptions;
//! use treedoc_scan::{TreeScanner, WalkConfig};
//!
//! let tree = TreeScanner::new().scan(&WalkConfig::new("proj")).unwrap();
//! let document = Serializer::new().render(&tree);
//!
//! let parsed = DocumentParser::new(ParseOptions::verbatim())
//!     .parse(&document)
//!     .unwrap();
//! assert_eq!(parsed.project.root_name, "proj");
//! ```

pub mod grammar;
mod parser;
mod serializer;

pub use grammar::{Grammar, MarkerKind, MarkerLine, SectionHeader};
pub use parser::{DocumentParser, ParseReport, ParsedDocument, RootSource};
pub use serializer::Serializer;
