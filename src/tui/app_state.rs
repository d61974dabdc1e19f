use ctxyank::{Node, TextMetrics};

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(super) enum AppMode {
    Normal,
    /// Typing a directory path into the open-folder prompt.
    OpenFolder,
}

/// Which generated text the preview pane shows and `y` yanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewTab {
    #[default]
    Code,
    Structure,
}

impl ViewTab {
    pub(super) fn switched(self) -> Self {
        match self {
            ViewTab::Code => ViewTab::Structure,
            ViewTab::Structure => ViewTab::Code,
        }
    }

    pub(super) fn title(self) -> &'static str {
        match self {
            ViewTab::Code => "Code Context",
            ViewTab::Structure => "File Structure",
        }
    }
}

/// What the user asked to copy when leaving the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YankRequest {
    pub view: ViewTab,
    pub minified: bool,
}

/// One line of the tree pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct VisibleRow {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub is_dir: bool,
}

impl VisibleRow {
    pub(super) fn of(node: &Node, depth: usize) -> Self {
        VisibleRow {
            path: node.path.clone(),
            name: node.name.clone(),
            depth,
            is_dir: node.is_dir(),
        }
    }
}

/// Latest generated text for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Preview {
    pub text: String,
    pub metrics: TextMetrics,
}

impl Preview {
    pub(super) fn new(text: String) -> Self {
        let metrics = TextMetrics::of(&text);
        Preview { text, metrics }
    }
}

impl Default for Preview {
    fn default() -> Self {
        Preview::new(String::new())
    }
}
