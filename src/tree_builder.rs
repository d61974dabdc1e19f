use crate::error::{Result, Warning, WarningKind};
use crate::file_scanner::{FileSource, SourceEntry};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Directory names skipped when no exclusion list is configured.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["node_modules", ".git", "dist"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Directory,
}

/// One file or directory of an immutable tree snapshot.
///
/// `path` is slash-joined and starts with the root name; it is the identity key
/// used by every other component. `handle` is only used to read the node back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub path: String,
    pub handle: PathBuf,
    pub children: Vec<Node>,
}

impl Node {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Looks up a descendant (or the node itself) by path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        if self.path == path {
            return Some(self);
        }
        let rest = path.strip_prefix(self.path.as_str())?;
        if !rest.starts_with('/') {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// Pre-order traversal: the node, then each child subtree in order.
    pub fn walk(&self, visit: &mut dyn FnMut(&Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Number of nodes in this subtree, the node included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Every directory path in this subtree, in traversal order.
    pub fn directory_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.walk(&mut |node| {
            if node.is_dir() {
                paths.push(node.path.clone());
            }
        });
        paths
    }
}

/// A built tree together with the subtrees that had to be left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub root: Node,
    pub warnings: Vec<Warning>,
}

impl Tree {
    pub fn find(&self, path: &str) -> Option<&Node> {
        self.root.find(path)
    }
}

/// Entry names that are never part of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExclusionSet {
            names: names
                .into_iter()
                .map(Into::<String>::into)
                .filter(|name| !name.trim().is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        ExclusionSet::new(DEFAULT_EXCLUSIONS.iter().copied())
    }
}

/// Punctuation and spaces sort before digits, digits before letters.
fn char_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

fn collation_key(name: &str) -> Vec<(u8, char)> {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
        .collect()
}

/// Name order used for siblings of the same kind: case-insensitive first,
/// lowercase before uppercase when the names only differ by case.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = collation_key(a).cmp(&collation_key(b));
    if folded != Ordering::Equal {
        return folded;
    }
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return ca.cmp(&cb),
        }
    }
    a.len().cmp(&b.len())
}

/// Directories first, then files; each group by [`compare_names`].
pub fn compare_nodes(a: &Node, b: &Node) -> Ordering {
    match (a.kind, b.kind) {
        (NodeKind::Directory, NodeKind::File) => Ordering::Less,
        (NodeKind::File, NodeKind::Directory) => Ordering::Greater,
        _ => compare_names(&a.name, &b.name),
    }
}

/// Name shown for the root of a tree built from `handle`.
pub fn root_name(handle: &Path) -> String {
    handle
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| handle.display().to_string())
}

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    exclusions: ExclusionSet,
}

impl TreeBuilder {
    pub fn new(exclusions: ExclusionSet) -> Self {
        TreeBuilder { exclusions }
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Walks `root` depth-first. Fails only when the root itself cannot be
    /// listed; any other directory that cannot be listed is left out of the
    /// tree and reported in [`Tree::warnings`].
    pub fn build(&self, source: &dyn FileSource, root: &Path) -> Result<Tree> {
        let name = root_name(root);
        log::debug!("Building tree for {} ({})", name, root.display());

        let entries = source.list_directory(root)?;
        let mut warnings = Vec::new();
        let children = self.build_children(source, &name, entries, &mut warnings);

        let root = Node {
            path: name.clone(),
            name,
            kind: NodeKind::Directory,
            handle: root.to_path_buf(),
            children,
        };
        log::debug!(
            "Tree built: {} nodes, {} omitted subtrees",
            root.count(),
            warnings.len()
        );
        Ok(Tree { root, warnings })
    }

    fn build_children(
        &self,
        source: &dyn FileSource,
        parent_path: &str,
        entries: Vec<SourceEntry>,
        warnings: &mut Vec<Warning>,
    ) -> Vec<Node> {
        let mut children = Vec::with_capacity(entries.len());

        for entry in entries {
            if self.exclusions.contains(&entry.name) {
                log::trace!("Excluded {}/{}", parent_path, entry.name);
                continue;
            }
            let path = format!("{}/{}", parent_path, entry.name);

            let grandchildren = match entry.kind {
                NodeKind::File => Vec::new(),
                NodeKind::Directory => match source.list_directory(&entry.handle) {
                    Ok(listing) => self.build_children(source, &path, listing, warnings),
                    Err(e) => {
                        log::debug!("Omitting subtree {}: {}", path, e);
                        warnings.push(Warning {
                            kind: WarningKind::Enumeration,
                            path,
                            message: e.to_string(),
                        });
                        continue;
                    }
                },
            };

            children.push(Node {
                name: entry.name,
                kind: entry.kind,
                path,
                handle: entry.handle,
                children: grandchildren,
            });
        }

        children.sort_by(compare_nodes);
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemorySource;

    fn names(node: &Node) -> Vec<&str> {
        node.children.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn directories_sort_before_files() {
        let source = MemorySource::new("proj")
            .file("proj/b.ts", "")
            .file("proj/A.ts", "")
            .dir("proj/zeta")
            .dir("proj/alpha");
        let tree = TreeBuilder::default().build(&source, source.root()).unwrap();
        assert_eq!(names(&tree.root), vec!["alpha", "zeta", "A.ts", "b.ts"]);
    }

    #[test]
    fn case_only_differences_put_lowercase_first() {
        assert_eq!(compare_names("readme", "README"), Ordering::Less);
        assert_eq!(compare_names("Apple", "banana"), Ordering::Less);
        assert_eq!(compare_names("a", "ab"), Ordering::Less);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn symbols_sort_before_digits_and_letters() {
        assert_eq!(compare_names("~notes", "alpha"), Ordering::Less);
        assert_eq!(compare_names("{x}", "a"), Ordering::Less);
        assert_eq!(compare_names("_init", "Zeta"), Ordering::Less);
        assert_eq!(compare_names("9lives", "apple"), Ordering::Less);
        assert_eq!(compare_names("a_b", "ab"), Ordering::Less);
    }

    #[test]
    fn paths_are_joined_from_the_root_name() {
        let source = MemorySource::new("proj").file("proj/sub/b.ts", "p");
        let tree = TreeBuilder::default().build(&source, source.root()).unwrap();
        assert_eq!(tree.root.path, "proj");
        let b = tree.find("proj/sub/b.ts").unwrap();
        assert_eq!(b.name, "b.ts");
        assert_eq!(b.kind, NodeKind::File);
        assert!(tree.find("proj/sub").unwrap().is_dir());
        assert!(tree.find("proj/su").is_none());
        assert!(tree.find("other/sub").is_none());
    }

    #[test]
    fn excluded_names_yield_no_nodes_at_any_depth() {
        let source = MemorySource::new("proj")
            .file("proj/node_modules/lib/index.js", "x")
            .file("proj/pkg/node_modules/dep.js", "y")
            .file("proj/pkg/main.js", "z")
            .file("proj/.git/HEAD", "ref");
        let tree = TreeBuilder::default().build(&source, source.root()).unwrap();

        let mut all = Vec::new();
        tree.root.walk(&mut |n| all.push(n.path.clone()));
        assert!(all.iter().all(|p| !p.contains("node_modules")));
        assert!(all.iter().all(|p| !p.contains(".git")));
        assert_eq!(all, vec!["proj", "proj/pkg", "proj/pkg/main.js"]);
    }

    #[test]
    fn exclusion_set_is_configurable() {
        let source = MemorySource::new("proj")
            .file("proj/dist/out.js", "")
            .file("proj/target/debug", "");
        let tree = TreeBuilder::new(ExclusionSet::new(["target"]))
            .build(&source, source.root())
            .unwrap();
        assert_eq!(names(&tree.root), vec!["dist"]);
    }

    #[test]
    fn unlistable_subtree_is_omitted_with_warning() {
        let source = MemorySource::new("proj")
            .file("proj/ok/a.txt", "a")
            .file("proj/locked/b.txt", "b")
            .deny("proj/locked");
        let tree = TreeBuilder::default().build(&source, source.root()).unwrap();
        assert_eq!(names(&tree.root), vec!["ok"]);
        assert_eq!(tree.warnings.len(), 1);
        assert_eq!(tree.warnings[0].kind, WarningKind::Enumeration);
        assert_eq!(tree.warnings[0].path, "proj/locked");
    }

    #[test]
    fn unlistable_root_fails_the_build() {
        let source = MemorySource::new("proj").file("proj/a.txt", "").deny("proj");
        assert!(TreeBuilder::default().build(&source, source.root()).is_err());
    }

    #[test]
    fn empty_directories_are_kept() {
        let source = MemorySource::new("proj").dir("proj/empty");
        let tree = TreeBuilder::default().build(&source, source.root()).unwrap();
        let empty = tree.find("proj/empty").unwrap();
        assert!(empty.is_dir());
        assert!(empty.children.is_empty());
        assert_eq!(tree.root.count(), 2);
        assert_eq!(tree.root.directory_paths(), vec!["proj", "proj/empty"]);
    }
}
