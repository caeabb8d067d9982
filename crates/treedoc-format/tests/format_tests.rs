use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use treedoc_core::{ExclusionSet, MarkerSet, ParseError, ParseOptions, WalkConfig};
use treedoc_format::{DocumentParser, RootSource, Serializer};
use treedoc_scan::TreeScanner;

fn create_proj() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("proj");
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::write(root.join("sub/b.txt"), "world").unwrap();
    (temp, root)
}

fn render(root: &Path) -> String {
    let tree = TreeScanner::new().scan(&WalkConfig::new(root)).unwrap();
    Serializer::new().render(&tree)
}

#[test]
fn test_proj_scenario() {
    let (_temp, root) = create_proj();
    let document = render(&root);

    assert!(document.contains("────── FILE START: a.txt (proj/a.txt) ──────"));
    assert!(document.contains("────── FILE START: b.txt (proj/sub/b.txt) ──────"));
    assert_eq!(document.matches("FILE START:").count(), 2);

    let parsed = DocumentParser::default().parse(&document).unwrap();
    assert_eq!(parsed.project.root_name, "proj");
    assert_eq!(parsed.report.root_source, RootSource::Hint);
    assert_eq!(parsed.project.len(), 2);
    assert_eq!(parsed.project.get("proj/a.txt"), Some("hello"));
    assert_eq!(parsed.project.get("proj/sub/b.txt"), Some("world"));
}

#[test]
fn test_document_preamble() {
    let (_temp, root) = create_proj();
    let document = render(&root);
    let canonical = root.canonicalize().unwrap();

    let first_line = document.lines().next().unwrap();
    assert_eq!(
        first_line,
        format!("Directory Structure for: {}", canonical.display())
    );
    assert!(document.contains("proj/\n├── sub/\n│   └── b.txt\n└── a.txt"));
    assert!(document.contains(&format!("{}\n\nFILE CONTENTS", "=".repeat(80))));
    assert!(document.contains(&format!("=== Directory: {} ===", canonical.display())));
}

#[test]
fn test_verbatim_round_trip() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("code");
    fs::create_dir_all(root.join("src")).unwrap();

    let files = [
        ("src/main.rs", "fn main() {\n    println!(\"(hi)\");\n}\n"),
        ("notes.md", "\n\n  indented\ttabs  \n\n"),
        ("empty.txt", ""),
        ("single.txt", "\n"),
    ];
    for (path, content) in files {
        fs::write(root.join(path), content).unwrap();
    }

    let document = render(&root);
    let parsed = DocumentParser::new(ParseOptions::verbatim())
        .parse(&document)
        .unwrap();

    assert_eq!(parsed.project.len(), files.len());
    for (path, content) in files {
        let declared = format!("code/{path}");
        assert_eq!(parsed.project.get(&declared), Some(content), "{declared}");
    }
}

#[test]
fn test_trim_loses_surrounding_whitespace() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("p");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("call.py"), "  run(x)\n").unwrap();

    let parsed = DocumentParser::default().parse(&render(&root)).unwrap();
    // The trailing "(x)" looks like a leaked path fragment
    assert_eq!(parsed.project.get("p/call.py"), Some("run"));
}

#[test]
fn test_last_write_wins() {
    let document = "\
Directory Structure for: /tmp/dup

────── FILE START: a.txt (dup/a.txt) ──────
first
────── FILE END: a.txt (dup/a.txt) ──────

────── FILE START: b.txt (dup/b.txt) ──────
other
────── FILE END: b.txt (dup/b.txt) ──────

────── FILE START: a.txt (dup\\a.txt) ──────
second
────── FILE END: a.txt (dup\\a.txt) ──────
";
    let parsed = DocumentParser::default().parse(document).unwrap();

    assert_eq!(parsed.project.len(), 2);
    assert_eq!(parsed.project.get("dup/a.txt"), Some("second"));
    assert_eq!(parsed.report.sections_found, 3);
    assert_eq!(parsed.report.overwritten, 1);
}

#[test]
fn test_only_section_missing_end() {
    let document = "────── FILE START: x.txt (proj/x.txt) ──────\ncontent\n";
    let result = DocumentParser::default().parse(document);
    assert!(matches!(result, Err(ParseError::NoSections { .. })));
}

#[test]
fn test_legacy_documents_need_legacy_markers() {
    let (_temp, root) = create_proj();
    let tree = TreeScanner::new().scan(&WalkConfig::new(&root)).unwrap();
    let document = Serializer::new().with_markers(MarkerSet::Legacy).render(&tree);

    let current = DocumentParser::default().parse(&document);
    assert!(matches!(
        current,
        Err(ParseError::NoSections {
            markers: MarkerSet::Current,
            ..
        })
    ));

    let legacy = ParseOptions::builder()
        .markers(MarkerSet::Legacy)
        .build()
        .unwrap();
    let parsed = DocumentParser::new(legacy).parse(&document).unwrap();
    assert_eq!(parsed.project.len(), 2);
    assert_eq!(parsed.report.markers, MarkerSet::Legacy);
}

#[test]
fn test_marker_text_inside_content() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("p");
    fs::create_dir(&root).unwrap();
    let tricky = "let s = \"────── FILE END: x (p/x) ──────\";\n";
    fs::write(root.join("tricky.rs"), tricky).unwrap();

    let parsed = DocumentParser::new(ParseOptions::verbatim())
        .parse(&render(&root))
        .unwrap();
    assert_eq!(parsed.project.get("p/tricky.rs"), Some(tricky));
}

#[test]
fn test_separator_normalization() {
    let document = "\
────── FILE START: c.txt (a\\b\\c.txt) ──────
x
────── FILE END: c.txt (a\\b\\c.txt) ──────";
    let parsed = DocumentParser::default().parse(document).unwrap();

    assert_eq!(parsed.project.get("a/b/c.txt"), Some("x"));
    let (path, _) = parsed.project.iter().next().unwrap();
    assert_eq!(path, Path::new("a").join("b").join("c.txt"));
}

#[test]
fn test_names_with_parentheses() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("p");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("report (final).txt"), "done").unwrap();

    let parsed = DocumentParser::default().parse(&render(&root)).unwrap();
    assert_eq!(parsed.project.get("p/report (final).txt"), Some("done"));
}

#[test]
fn test_excluded_entries_never_rendered() {
    let (_temp, root) = create_proj();
    fs::create_dir(root.join("target")).unwrap();
    fs::write(root.join("target/out.bin"), "built").unwrap();
    fs::write(root.join("secret.env"), "KEY=1").unwrap();

    let config = WalkConfig::builder()
        .root(&root)
        .exclusions(
            ExclusionSet::new()
                .with_dirs(["target"])
                .with_files(["secret.env"]),
        )
        .build()
        .unwrap();
    let tree = TreeScanner::new().scan(&config).unwrap();
    let document = Serializer::new().render(&tree);

    assert!(!document.contains("── target/"));
    assert!(!document.contains("out.bin"));
    assert!(!document.contains("secret.env"));
    assert!(!document.contains("KEY=1"));
}

#[test]
fn test_binary_placeholder() {
    let (_temp, root) = create_proj();
    fs::write(root.join("img.png"), [0xff, 0xd8, 0xff, 0x00]).unwrap();

    let parsed = DocumentParser::default().parse(&render(&root)).unwrap();
    assert_eq!(
        parsed.project.get("proj/img.png"),
        Some("[BINARY FILE - CONTENTS NOT SHOWN]")
    );
    assert_eq!(parsed.project.placeholder_count(), 1);
}

#[test]
fn test_parse_file_missing() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("other.txt"), "x").unwrap();

    let result = DocumentParser::default().parse_file(&temp.path().join("missing.txt"));
    match result {
        Err(ParseError::SourceMissing { listing, .. }) => {
            assert_eq!(listing, vec!["other.txt".to_string()]);
        }
        other => panic!("Expected SourceMissing, got {other:?}"),
    }
}
