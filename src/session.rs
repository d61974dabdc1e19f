use crate::aggregate::{self, Aggregation};
use crate::error::{CoreError, Result, Warning};
use crate::file_scanner::{FileSource, RootPicker};
use crate::selection::{self, NodeStatistics, SelectionModel};
use crate::stats::StatsCache;
use crate::tree_builder::{Tree, TreeBuilder};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderOpen {
    Opened,
    /// The picker was dismissed; nothing changed.
    Cancelled,
}

/// One opened root: its current tree snapshot, selection and line counts.
///
/// A fresh open resets selection, expansion and counts. A refresh swaps in a
/// new tree and keeps all three, even for paths that no longer exist.
///
/// Warnings are kept per origin. The latest scan and the latest generation
/// each replace their own list; counting warnings are kept once per path
/// until that file is counted.
pub struct Session<S: FileSource> {
    source: S,
    builder: TreeBuilder,
    root_handle: Option<PathBuf>,
    tree: Option<Arc<Tree>>,
    selection: SelectionModel,
    stats: StatsCache,
    scan_warnings: Vec<Warning>,
    count_warnings: Vec<Warning>,
    generation_warnings: Vec<Warning>,
}

impl<S: FileSource> Session<S> {
    pub fn new(source: S, builder: TreeBuilder) -> Self {
        Session {
            source,
            builder,
            root_handle: None,
            tree: None,
            selection: SelectionModel::new(),
            stats: StatsCache::new(),
            scan_warnings: Vec::new(),
            count_warnings: Vec::new(),
            generation_warnings: Vec::new(),
        }
    }

    pub fn open_folder(&mut self, picker: &mut dyn RootPicker) -> Result<FolderOpen> {
        let Some(root) = picker.pick_root_directory() else {
            log::debug!("Folder picker cancelled");
            return Ok(FolderOpen::Cancelled);
        };
        self.open_root(&root)?;
        Ok(FolderOpen::Opened)
    }

    /// Opens `root` fresh. On failure the previous folder stays open.
    pub fn open_root(&mut self, root: &Path) -> Result<()> {
        let tree = self.builder.build(&self.source, root)?;
        log::info!("Opened {}", root.display());

        self.selection = SelectionModel::fresh(&tree.root.path);
        self.stats = StatsCache::new();
        self.scan_warnings = tree.warnings.clone();
        self.count_warnings.clear();
        self.generation_warnings.clear();
        self.root_handle = Some(root.to_path_buf());
        self.tree = Some(Arc::new(tree));
        Ok(())
    }

    /// Re-scans the open root. The new tree replaces the old one only once it
    /// is complete; on failure the old tree stays in place.
    pub fn refresh(&mut self) -> Result<()> {
        let root = self.root_handle.clone().ok_or(CoreError::NoFolderOpen)?;
        let tree = self.builder.build(&self.source, &root)?;
        log::info!("Refreshed {} ({} nodes)", root.display(), tree.root.count());

        self.scan_warnings = tree.warnings.clone();
        self.tree = Some(Arc::new(tree));
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.tree.is_some()
    }

    /// Current snapshot. Cheap to clone and unaffected by later refreshes.
    pub fn tree(&self) -> Option<Arc<Tree>> {
        self.tree.clone()
    }

    fn current_tree(&self) -> Result<Arc<Tree>> {
        self.tree.clone().ok_or(CoreError::NoFolderOpen)
    }

    pub fn root_handle(&self) -> Option<&Path> {
        self.root_handle.as_deref()
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn stats(&self) -> &StatsCache {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Outstanding warnings, at most one per kind and path.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut seen = HashSet::new();
        self.scan_warnings
            .iter()
            .chain(&self.count_warnings)
            .chain(&self.generation_warnings)
            .filter(|w| seen.insert((w.kind, w.path.as_str())))
            .cloned()
            .collect()
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        let warnings = self.warnings();
        self.scan_warnings.clear();
        self.count_warnings.clear();
        self.generation_warnings.clear();
        warnings
    }

    pub fn toggle_selection(&mut self, path: &str, is_directory: bool) -> Result<Vec<Warning>> {
        let tree = self.current_tree()?;
        let warnings = self.selection.toggle_selection(
            &tree,
            path,
            is_directory,
            &mut self.stats,
            &self.source,
        );
        let stats = &self.stats;
        self.count_warnings.retain(|w| !stats.contains(&w.path));
        for warning in &warnings {
            let known = self
                .count_warnings
                .iter()
                .any(|w| w.kind == warning.kind && w.path == warning.path);
            if !known {
                self.count_warnings.push(warning.clone());
            }
        }
        Ok(warnings)
    }

    /// Toggles `path`, taking its kind from the current tree.
    pub fn toggle(&mut self, path: &str) -> Result<Vec<Warning>> {
        let tree = self.current_tree()?;
        let is_directory = tree.find(path).is_some_and(|node| node.is_dir());
        self.toggle_selection(path, is_directory)
    }

    pub fn toggle_expand(&mut self, path: &str) -> Result<()> {
        let tree = self.current_tree()?;
        self.selection.toggle_expand(&tree, path);
        Ok(())
    }

    pub fn set_all_expanded(&mut self, expand: bool) -> Result<()> {
        let tree = self.current_tree()?;
        self.selection.set_all_expanded(&tree, expand);
        Ok(())
    }

    pub fn node_statistics(&self, path: &str) -> Option<NodeStatistics> {
        let tree = self.tree.as_ref()?;
        let node = tree.find(path)?;
        Some(self.selection.node_statistics(node, &self.stats))
    }

    /// Rollups for every node of the current tree, keyed by path.
    pub fn all_node_statistics(&self) -> HashMap<String, NodeStatistics> {
        match &self.tree {
            Some(tree) => {
                selection::statistics_by_path(&tree.root, self.selection.selected(), &self.stats)
            }
            None => HashMap::new(),
        }
    }

    /// Concatenated text of the selected files.
    pub fn generate(&mut self) -> Result<Aggregation> {
        let tree = self.current_tree()?;
        let output = aggregate::generate(&tree, self.selection.selected(), &self.source);
        self.generation_warnings = output.warnings.clone();
        Ok(output)
    }

    /// ASCII drawing of the whole tree.
    pub fn structure(&self) -> Result<String> {
        let tree = self.current_tree()?;
        Ok(aggregate::generate_ascii_tree(&tree))
    }
}
