use crate::error::Warning;
use crate::file_scanner::FileSource;
use crate::stats::StatsCache;
use crate::tree_builder::{Node, Tree};
use std::collections::{HashMap, HashSet};

pub type PathSet = HashSet<String>;

/// Per-file overhead of the header and separator lines the aggregation adds.
pub const LINES_PER_FILE_OVERHEAD: usize = 3;
/// The last file's trailing separator is trimmed from the output.
pub const TRAILING_SEPARATOR_LINES: usize = 2;

/// A new selection set plus the files it selects, which still need a line
/// count unless the cache already has one.
#[derive(Debug)]
pub struct SelectionToggle<'t> {
    pub selected: PathSet,
    pub files_to_count: Vec<&'t Node>,
}

/// Toggles `node` and forces its whole subtree to the opposite of the node's
/// own current membership.
///
/// A directory's membership only records its own toggle history, so this can
/// select a subtree where some descendants were already selected, or clear one
/// where some were not.
pub fn toggled_subtree<'t>(selected: &PathSet, node: &'t Node) -> SelectionToggle<'t> {
    let select = !selected.contains(&node.path);
    let mut next = selected.clone();
    let mut files_to_count = Vec::new();

    force_subtree(node, select, &mut next, &mut files_to_count);

    SelectionToggle {
        selected: next,
        files_to_count,
    }
}

// Files already selected are reported too, so a count that failed earlier is retried.
fn force_subtree<'t>(node: &'t Node, select: bool, set: &mut PathSet, files: &mut Vec<&'t Node>) {
    if select {
        set.insert(node.path.clone());
        if !node.is_dir() {
            files.push(node);
        }
    } else {
        set.remove(&node.path);
    }
    for child in &node.children {
        force_subtree(child, select, set, files);
    }
}

/// Presence toggle of a single node, no propagation.
pub fn toggled_single<'t>(selected: &PathSet, node: &'t Node) -> SelectionToggle<'t> {
    let mut next = selected.clone();
    let mut files_to_count = Vec::new();
    if !next.remove(&node.path) {
        next.insert(node.path.clone());
        if !node.is_dir() {
            files_to_count.push(node);
        }
    }
    SelectionToggle {
        selected: next,
        files_to_count,
    }
}

/// Presence toggle of a bare path.
pub fn toggled_path(set: &PathSet, path: &str) -> PathSet {
    let mut next = set.clone();
    if !next.remove(path) {
        next.insert(path.to_string());
    }
    next
}

/// Every directory path reachable from `root`.
pub fn fully_expanded(root: &Node) -> PathSet {
    root.directory_paths().into_iter().collect()
}

/// Selected lines and files below a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStatistics {
    pub raw_lines: usize,
    pub file_count: usize,
}

impl NodeStatistics {
    /// Lines this node's files occupy in the generated output, headers included.
    pub fn displayed_total(&self) -> usize {
        if self.file_count == 0 {
            return 0;
        }
        self.raw_lines + self.file_count * LINES_PER_FILE_OVERHEAD - TRAILING_SEPARATOR_LINES
    }
}

impl std::ops::Add for NodeStatistics {
    type Output = NodeStatistics;

    fn add(self, rhs: NodeStatistics) -> NodeStatistics {
        NodeStatistics {
            raw_lines: self.raw_lines + rhs.raw_lines,
            file_count: self.file_count + rhs.file_count,
        }
    }
}

/// Rollup of selected, already-counted files below `node`.
pub fn compute_node_statistics(node: &Node, selected: &PathSet, stats: &StatsCache) -> NodeStatistics {
    if !node.is_dir() {
        return match stats.get(&node.path) {
            Some(lines) if selected.contains(&node.path) => NodeStatistics {
                raw_lines: lines,
                file_count: 1,
            },
            _ => NodeStatistics::default(),
        };
    }
    node.children
        .iter()
        .map(|child| compute_node_statistics(child, selected, stats))
        .fold(NodeStatistics::default(), |acc, s| acc + s)
}

/// [`compute_node_statistics`] for every node below `root`, in one walk.
pub fn statistics_by_path(
    root: &Node,
    selected: &PathSet,
    stats: &StatsCache,
) -> HashMap<String, NodeStatistics> {
    let mut out = HashMap::new();
    collect_statistics(root, selected, stats, &mut out);
    out
}

fn collect_statistics(
    node: &Node,
    selected: &PathSet,
    stats: &StatsCache,
    out: &mut HashMap<String, NodeStatistics>,
) -> NodeStatistics {
    let total = if node.is_dir() {
        node.children
            .iter()
            .map(|child| collect_statistics(child, selected, stats, out))
            .fold(NodeStatistics::default(), |acc, s| acc + s)
    } else {
        compute_node_statistics(node, selected, stats)
    };
    out.insert(node.path.clone(), total);
    total
}

/// Selected and expanded paths of one open folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: PathSet,
    expanded: PathSet,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for a freshly opened folder: nothing selected, root expanded.
    pub fn fresh(root_path: &str) -> Self {
        SelectionModel {
            selected: PathSet::new(),
            expanded: PathSet::from([root_path.to_string()]),
        }
    }

    pub fn selected(&self) -> &PathSet {
        &self.selected
    }

    pub fn expanded(&self) -> &PathSet {
        &self.expanded
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected.contains(path)
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// Toggles `path`; directories propagate to their whole subtree.
    ///
    /// Selected files without a cached count are line-counted through `stats`. Files that
    /// cannot be read are returned as warnings and stay selected. A path that
    /// is no longer in `tree` is toggled on its own.
    pub fn toggle_selection(
        &mut self,
        tree: &Tree,
        path: &str,
        is_directory: bool,
        stats: &mut StatsCache,
        source: &dyn FileSource,
    ) -> Vec<Warning> {
        let Some(node) = tree.find(path) else {
            log::debug!("Toggling path not in tree: {}", path);
            self.selected = toggled_path(&self.selected, path);
            return Vec::new();
        };

        let change = if is_directory {
            toggled_subtree(&self.selected, node)
        } else {
            toggled_single(&self.selected, node)
        };
        log::debug!(
            "Toggled {}: {} paths selected, {} files to count",
            path,
            change.selected.len(),
            change.files_to_count.len()
        );

        let mut warnings = Vec::new();
        for file in &change.files_to_count {
            if let Err(e) =
                stats.ensure_counted(&file.path, &file.name, || source.read_file_text(&file.handle))
            {
                warnings.push(Warning::from_error(&e, &file.path));
            }
        }
        self.selected = change.selected;
        warnings
    }

    /// Expands or collapses a directory. Paths that are not directories of
    /// `tree` are ignored unless they are already expanded.
    pub fn toggle_expand(&mut self, tree: &Tree, path: &str) {
        let is_dir = tree.find(path).is_some_and(Node::is_dir);
        if is_dir || self.expanded.contains(path) {
            self.expanded = toggled_path(&self.expanded, path);
        }
    }

    pub fn set_all_expanded(&mut self, tree: &Tree, expand: bool) {
        self.expanded = if expand {
            fully_expanded(&tree.root)
        } else {
            PathSet::new()
        };
    }

    pub fn node_statistics(&self, node: &Node, stats: &StatsCache) -> NodeStatistics {
        compute_node_statistics(node, &self.selected, stats)
    }
}
