use crate::error::Warning;
use crate::file_scanner::{FileSource, is_binary_by_extension, is_binary_content};
use crate::selection::PathSet;
use crate::tree_builder::{Node, Tree};

/// Concatenated text of the selected files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub text: String,
    pub files_included: usize,
    pub warnings: Vec<Warning>,
}

/// Walks the whole tree in order and concatenates every selected file as
/// `// <path>`, a blank line, the text and a blank line. Directories are
/// always descended regardless of their own membership. Binary or image files
/// are skipped silently; unreadable files are skipped with a warning.
pub fn generate(tree: &Tree, selected: &PathSet, source: &dyn FileSource) -> Aggregation {
    let mut out = Aggregation::default();
    append_node(&tree.root, selected, source, &mut out);

    let trimmed_len = out.text.trim_end().len();
    out.text.truncate(trimmed_len);

    log::debug!(
        "Generated {} bytes from {} files ({} skipped with warnings)",
        out.text.len(),
        out.files_included,
        out.warnings.len()
    );
    out
}

fn append_node(node: &Node, selected: &PathSet, source: &dyn FileSource, out: &mut Aggregation) {
    if !node.is_dir() && selected.contains(&node.path) {
        append_file(node, source, out);
    }
    for child in &node.children {
        append_node(child, selected, source, out);
    }
}

fn append_file(node: &Node, source: &dyn FileSource, out: &mut Aggregation) {
    if is_binary_by_extension(&node.name) {
        log::trace!("Skipping image/binary file {}", node.path);
        return;
    }
    let file = match source.read_file_text(&node.handle) {
        Ok(file) => file,
        Err(e) => {
            log::debug!("Skipping unreadable file {}: {}", node.path, e);
            out.warnings.push(Warning::from_error(&e, &node.path));
            return;
        }
    };
    if is_binary_content(&node.name, &file) {
        log::trace!("Skipping binary content in {}", node.path);
        return;
    }

    out.text.push_str("// ");
    out.text.push_str(&node.path);
    out.text.push_str("\n\n");
    out.text.push_str(&file.text);
    out.text.push_str("\n\n");
    out.files_included += 1;
}

/// Draws the whole tree, selection ignored. The root is its bare name; every
/// other node is one line with `├── ` or `└── ` after its ancestors' prefix.
pub fn generate_ascii_tree(tree: &Tree) -> String {
    let mut out = String::new();
    out.push_str(&tree.root.name);
    out.push('\n');
    draw_children(&tree.root, "", &mut out);
    out
}

fn draw_children(node: &Node, prefix: &str, out: &mut String) {
    let last_index = node.children.len().saturating_sub(1);
    for (idx, child) in node.children.iter().enumerate() {
        let is_last = idx == last_index;
        out.push_str(prefix);
        out.push_str(if is_last { "└── " } else { "├── " });
        out.push_str(&child.name);
        out.push('\n');

        if !child.children.is_empty() {
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            draw_children(child, &child_prefix, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;
    use crate::test_utils::MemorySource;
    use crate::tree_builder::TreeBuilder;

    fn build(source: &MemorySource) -> Tree {
        TreeBuilder::default().build(source, source.root()).unwrap()
    }

    fn select(paths: &[&str]) -> PathSet {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn concatenates_selected_files_in_tree_order() {
        let source = MemorySource::new("proj")
            .file("proj/a.ts", "x\ny")
            .file("proj/sub/b.ts", "p");
        let tree = build(&source);

        let out = generate(&tree, &select(&["proj/sub/b.ts", "proj/a.ts"]), &source);
        // Directories come before files, so sub/b.ts precedes a.ts.
        assert_eq!(out.text, "// proj/sub/b.ts\n\np\n\n// proj/a.ts\n\nx\ny");
        assert_eq!(out.files_included, 2);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn directory_membership_does_not_matter() {
        let source = MemorySource::new("proj").file("proj/sub/b.ts", "p");
        let tree = build(&source);

        let only_dir = generate(&tree, &select(&["proj", "proj/sub"]), &source);
        assert_eq!(only_dir.text, "");

        let only_file = generate(&tree, &select(&["proj/sub/b.ts"]), &source);
        assert_eq!(only_file.text, "// proj/sub/b.ts\n\np");
    }

    #[test]
    fn images_and_binary_content_are_skipped_silently() {
        let source = MemorySource::new("proj")
            .file("proj/favicon.ico", "ico")
            .file("proj/logo.png", "png")
            .binary("proj/blob.dat", "\0")
            .file("proj/main.rs", "fn main() {}");
        let tree = build(&source);
        let all = select(&[
            "proj/favicon.ico",
            "proj/logo.png",
            "proj/blob.dat",
            "proj/main.rs",
        ]);

        let out = generate(&tree, &all, &source);
        assert_eq!(out.text, "// proj/main.rs\n\nfn main() {}");
        assert_eq!(out.files_included, 1);
        assert!(out.warnings.is_empty());
        // Image extensions are rejected before any read.
        assert_eq!(source.reads(), 2);
    }

    #[test]
    fn unreadable_files_become_warnings() {
        let source = MemorySource::new("proj")
            .file("proj/a.ts", "a")
            .file("proj/b.ts", "b")
            .deny("proj/a.ts");
        let tree = build(&source);

        let out = generate(&tree, &select(&["proj/a.ts", "proj/b.ts"]), &source);
        assert_eq!(out.text, "// proj/b.ts\n\nb");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::Read);
        assert_eq!(out.warnings[0].path, "proj/a.ts");
    }

    #[test]
    fn trailing_whitespace_of_last_file_is_trimmed() {
        let source = MemorySource::new("proj").file("proj/a.txt", "text\n\n  \n");
        let tree = build(&source);
        let out = generate(&tree, &select(&["proj/a.txt"]), &source);
        assert_eq!(out.text, "// proj/a.txt\n\ntext");
    }

    #[test]
    fn ascii_tree_draws_connectors() {
        let source = MemorySource::new("proj")
            .file("proj/a.ts", "")
            .file("proj/sub/b.ts", "")
            .file("proj/sub/c.ts", "")
            .file("proj/z/deep/d.ts", "");
        let tree = build(&source);

        let expected = "\
proj
├── sub
│   ├── b.ts
│   └── c.ts
├── z
│   └── deep
│       └── d.ts
└── a.ts
";
        assert_eq!(generate_ascii_tree(&tree), expected);
    }

    #[test]
    fn ascii_tree_has_one_line_per_node() {
        let source = MemorySource::new("root")
            .file("root/one/two/three.txt", "")
            .file("root/one/x.txt", "")
            .dir("root/empty")
            .file("root/y.txt", "");
        let tree = build(&source);
        let rendered = generate_ascii_tree(&tree);
        assert_eq!(rendered.lines().count(), tree.root.count());
    }

    #[test]
    fn ascii_tree_of_empty_root_is_its_name() {
        let source = MemorySource::new("solo");
        let tree = build(&source);
        assert_eq!(generate_ascii_tree(&tree), "solo\n");
    }
}
