use std::path::{Path, PathBuf};

use treedoc_core::{
    ContentCleanup, ExclusionSet, FileContent, MarkerSet, NodeKind, ParseOptions, ParsedProject,
    SourceTree, TreeNode, TreeStats, WalkConfig, normalize_separators,
};

#[test]
fn test_file_node_creation_and_properties() {
    let node = TreeNode::new_file("main.rs", "proj/src/main.rs", FileContent::Text("fn main() {}".into()));

    assert!(node.is_file());
    assert!(!node.is_dir());
    assert_eq!(node.name.as_str(), "main.rs");
    assert_eq!(node.file_count(), 1);
    assert_eq!(node.dir_count(), 0);

    match &node.kind {
        NodeKind::File {
            relative_path,
            content,
        } => {
            assert_eq!(relative_path, "proj/src/main.rs");
            assert_eq!(content.len(), 12);
        }
        _ => panic!("Expected File node kind"),
    }
}

#[test]
fn test_directory_counts() {
    let mut root = TreeNode::new_directory("proj");
    let mut src = TreeNode::new_directory("src");
    src.children.push(TreeNode::new_file(
        "lib.rs",
        "proj/src/lib.rs",
        FileContent::Text(String::new()),
    ));
    src.children.push(TreeNode::denied_directory("private"));
    root.children.push(TreeNode::new_file("README.md", "proj/README.md", FileContent::Binary));
    root.children.push(src);
    root.sort_children();

    assert_eq!(root.file_count(), 2);
    assert_eq!(root.dir_count(), 2);
    assert_eq!(root.children[0].name.as_str(), "src");
    // Inside src the denied directory sorts before the file
    assert!(root.children[0].children[0].is_denied());
}

#[test]
fn test_walk_config_with_exclusions() {
    let exclusions = ExclusionSet::new()
        .with_dirs(["venv", ".git"])
        .with_files(["secrets.json"]);
    let config = WalkConfig::builder()
        .root("/work/proj")
        .exclusions(exclusions)
        .skip_paths(vec![PathBuf::from("/work/proj/out.txt")])
        .build()
        .unwrap();

    assert!(config.exclusions.excludes_dir(".git", Path::new("/work/proj/.git"), ".git"));
    assert!(config.exclusions.excludes_file(
        "secrets.json",
        Path::new("/work/proj/conf/secrets.json"),
        "conf/secrets.json"
    ));
    assert!(config.is_skipped(Path::new("/work/proj/out.txt")));
    assert!(!config.is_skipped(Path::new("/work/proj/in.txt")));
    assert!(config.include_hidden);
}

#[test]
fn test_parse_options_serde_defaults() {
    let options: ParseOptions = serde_json::from_str(r#"{"cleanup":"verbatim"}"#).unwrap();
    assert_eq!(options.cleanup, ContentCleanup::Verbatim);
    assert_eq!(options.markers, MarkerSet::Current);
    assert_eq!(options.default_root_name, "recreated_project");
}

#[test]
fn test_parsed_project_separator_normalization() {
    let mut project = ParsedProject::new("a");
    project.insert(r"a\b\c.txt", "windows");
    project.insert("a/b/c.txt", "unix");

    assert_eq!(project.len(), 1);
    assert_eq!(project.get(r"a\b\c.txt"), Some("unix"));
    assert!(project.files.contains_key(&normalize_separators("a/b/c.txt")));
}

#[test]
fn test_source_tree_accessors() {
    let root = TreeNode::new_directory("proj");
    let tree = SourceTree::new(
        root,
        PathBuf::from("/work/proj"),
        TreeStats::new(),
        std::time::Duration::from_millis(3),
        Vec::new(),
    );

    assert_eq!(tree.root_name(), "proj");
    assert_eq!(tree.total_files(), 0);
    assert!(!tree.has_warnings());
}
