use ctxyank::test_utils::MemorySource;
use ctxyank::{
    ExclusionSet, FsSource, Session, TreeBuilder, WarningKind, estimate_tokens, generate_ascii_tree,
    minify,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

/// `<tmp>/proj` so the tree root is named `proj`.
fn project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("proj");
    fs::create_dir(&root).unwrap();
    for (relative, text) in files {
        write(&root, relative, text);
    }
    (tmp, root)
}

fn open(root: &Path) -> Session<FsSource> {
    let mut session = Session::new(FsSource::new(false), TreeBuilder::default());
    session.open_root(root).unwrap();
    session
}

#[test]
fn selecting_two_files_on_disk() {
    let (_tmp, root) = project(&[("a.ts", "x\ny"), ("sub/b.ts", "p")]);
    let mut session = open(&root);

    session.toggle("proj/a.ts").unwrap();
    session.toggle("proj/sub/b.ts").unwrap();

    let output = session.generate().unwrap();
    assert_eq!(output.text, "// proj/sub/b.ts\n\np\n\n// proj/a.ts\n\nx\ny");
    assert_eq!(output.files_included, 2);

    assert_eq!(
        session.node_statistics("proj/sub").unwrap().displayed_total(),
        2
    );
    assert_eq!(session.node_statistics("proj").unwrap().displayed_total(), 7);
}

#[test]
fn excluded_directories_never_appear() {
    let (_tmp, root) = project(&[
        ("node_modules/pkg/index.js", "module.exports = 1"),
        ("src/main.ts", "run()"),
    ]);
    let session = open(&root);
    let tree = session.tree().unwrap();

    assert!(tree.find("proj/node_modules").is_none());
    let mut paths = Vec::new();
    tree.root.walk(&mut |node| paths.push(node.path.clone()));
    assert!(paths.iter().all(|p| !p.contains("node_modules")));
    assert_eq!(paths, vec!["proj", "proj/src", "proj/src/main.ts"]);
}

#[test]
fn custom_exclusions_replace_the_defaults() {
    let (_tmp, root) = project(&[("node_modules/x.js", "x"), ("target/out", "o")]);
    let mut session = Session::new(
        FsSource::new(false),
        TreeBuilder::new(ExclusionSet::new(["target"])),
    );
    session.open_root(&root).unwrap();
    let tree = session.tree().unwrap();
    assert!(tree.find("proj/node_modules/x.js").is_some());
    assert!(tree.find("proj/target").is_none());
}

#[test]
fn refresh_after_deletion_keeps_the_stale_selection() {
    let (_tmp, root) = project(&[("a.ts", "a"), ("b.ts", "b")]);
    let mut session = open(&root);
    session.toggle("proj/a.ts").unwrap();
    session.toggle("proj/b.ts").unwrap();

    fs::remove_file(root.join("a.ts")).unwrap();
    session.refresh().unwrap();

    let tree = session.tree().unwrap();
    assert!(tree.find("proj/a.ts").is_none());
    assert!(session.selection().is_selected("proj/a.ts"));
    assert_eq!(session.generate().unwrap().text, "// proj/b.ts\n\nb");
}

#[test]
fn ascii_tree_has_one_line_per_node() {
    let (_tmp, root) = project(&[
        ("a.ts", ""),
        ("sub/b.ts", ""),
        ("sub/deeper/c.ts", ""),
        ("z/readme.md", ""),
    ]);
    let session = open(&root);
    let tree = session.tree().unwrap();
    let drawing = generate_ascii_tree(&tree);

    assert_eq!(drawing.lines().count(), tree.root.count());
    assert_eq!(
        drawing,
        "proj\n├── sub\n│   ├── deeper\n│   │   └── c.ts\n│   └── b.ts\n├── z\n│   └── readme.md\n└── a.ts\n"
    );
}

#[test]
fn binary_files_are_skipped_silently() {
    let (_tmp, root) = project(&[("logo.png", "not really a png"), ("notes.txt", "n")]);
    fs::write(root.join("blob.bin"), [0u8, 159, 146, 150]).unwrap();
    let mut session = open(&root);
    session.toggle("proj").unwrap();

    let output = session.generate().unwrap();
    assert_eq!(output.text, "// proj/notes.txt\n\nn");
    assert!(output.warnings.is_empty());
    // Directory toggles never count binary files.
    assert!(session.stats().get("proj/logo.png").is_none());
    assert!(session.stats().get("proj/blob.bin").is_none());
    assert_eq!(session.stats().get("proj/notes.txt"), Some(1));
}

#[test]
fn unreadable_file_becomes_a_warning() {
    let source = MemorySource::new("proj")
        .file("proj/a.ts", "a")
        .file("proj/b.ts", "b");
    let root = source.root().to_path_buf();
    let mut session = Session::new(source, TreeBuilder::default());
    session.open_root(&root).unwrap();
    session.toggle("proj").unwrap();

    session.source_mut().remove("proj/a.ts");
    let output = session.generate().unwrap();
    assert_eq!(output.text, "// proj/b.ts\n\nb");
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].kind, WarningKind::Read);
}

#[test]
fn minified_output_never_costs_more_tokens() {
    let (_tmp, root) = project(&[("a.rs", "fn main() {\n    println!(\"hi\");\n}\n\n\n")]);
    let mut session = open(&root);
    session.toggle("proj/a.rs").unwrap();
    let text = session.generate().unwrap().text;
    assert!(estimate_tokens(&minify(&text)) <= estimate_tokens(&text));
}
