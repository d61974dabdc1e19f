use super::app_state::{AppMode, Preview, ViewTab, VisibleRow, YankRequest};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ctxyank::{
    FileSource, FolderOpen, GenerationScheduler, Node, NodeStatistics, PathPicker, Preferences,
    Session, Theme,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub struct TuiApp<'s, S: FileSource> {
    pub(super) session: &'s mut Session<S>,
    pub(super) rows: Vec<VisibleRow>,
    /// Line rollups per path, recomputed whenever the selection or tree changes.
    pub(super) rollups: HashMap<String, NodeStatistics>,
    pub(super) current_row: usize,
    pub(super) scroll_offset: usize,
    pub(super) list_viewport_height: usize,
    pub(super) preview_scroll: u16,
    pub(super) quit: bool,
    pub(super) request: Option<YankRequest>,
    pub(super) mode: AppMode,
    pub(super) folder_input: String,
    pub(super) folder_cursor_pos: usize,
    pub(super) view: ViewTab,
    pub(super) code: Preview,
    pub(super) structure: Preview,
    pub(super) scheduler: GenerationScheduler,
    pub(super) preferences: Preferences,
    preferences_path: Option<PathBuf>,
    pub(super) status: Option<String>,
}

impl<'s, S: FileSource> TuiApp<'s, S> {
    pub fn new(
        session: &'s mut Session<S>,
        preferences: Preferences,
        preferences_path: Option<PathBuf>,
        quiet_period: Duration,
    ) -> Self {
        let mut app = TuiApp {
            session,
            rows: Vec::new(),
            rollups: HashMap::new(),
            current_row: 0,
            scroll_offset: 0,
            list_viewport_height: 0, // set by the renderer
            preview_scroll: 0,
            quit: false,
            request: None,
            mode: AppMode::Normal,
            folder_input: String::new(),
            folder_cursor_pos: 0,
            view: ViewTab::default(),
            code: Preview::default(),
            structure: Preview::default(),
            scheduler: GenerationScheduler::new(quiet_period),
            preferences,
            preferences_path,
            status: None,
        };
        app.rebuild_rows();
        app.refresh_rollups();
        app.regenerate_structure();
        app.regenerate_code();
        app
    }

    pub(super) fn refresh_rollups(&mut self) {
        self.rollups = self.session.all_node_statistics();
    }

    pub(super) fn theme(&self) -> Theme {
        self.preferences.theme
    }

    pub(super) fn current_preview(&self) -> &Preview {
        match self.view {
            ViewTab::Code => &self.code,
            ViewTab::Structure => &self.structure,
        }
    }

    pub(super) fn current_path(&self) -> Option<&str> {
        self.rows.get(self.current_row).map(|row| row.path.as_str())
    }

    /// Flattens the expanded part of the tree, keeping the cursor on the same
    /// path when it is still visible.
    pub(super) fn rebuild_rows(&mut self) {
        let previous = self.current_path().map(str::to_string);
        let mut rows = Vec::new();
        if let Some(tree) = self.session.tree() {
            let expanded = self.session.selection().expanded();
            push_visible(&tree.root, 0, &mut |path| expanded.contains(path), &mut rows);
        }
        self.rows = rows;

        self.current_row = previous
            .and_then(|path| self.row_of_self_or_ancestor(&path))
            .unwrap_or(0);
        self.ensure_selection_is_visible_in_viewport();
    }

    fn row_of_self_or_ancestor(&self, path: &str) -> Option<usize> {
        let mut candidate = path;
        loop {
            if let Some(idx) = self.rows.iter().position(|row| row.path == candidate) {
                return Some(idx);
            }
            candidate = candidate.rsplit_once('/')?.0;
        }
    }

    pub(super) fn move_selection(&mut self, delta: i32) {
        if self.rows.is_empty() {
            return;
        }
        self.current_row =
            (self.current_row as i32 + delta).rem_euclid(self.rows.len() as i32) as usize;
        self.ensure_selection_is_visible_in_viewport();
    }

    pub(super) fn ensure_selection_is_visible_in_viewport(&mut self) {
        let list_height = self.list_viewport_height;
        if self.rows.is_empty() || list_height == 0 {
            self.scroll_offset = 0;
            return;
        }
        if self.current_row < self.scroll_offset {
            self.scroll_offset = self.current_row;
        } else if self.current_row >= self.scroll_offset + list_height {
            self.scroll_offset = self.current_row + 1 - list_height;
        }
        let max_offset = self.rows.len().saturating_sub(list_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub(super) fn toggle_current_selection(&mut self) {
        let Some(row) = self.rows.get(self.current_row) else {
            return;
        };
        let (path, is_dir) = (row.path.clone(), row.is_dir);
        match self.session.toggle_selection(&path, is_dir) {
            Ok(warnings) => {
                if let Some(last) = warnings.last() {
                    self.status = Some(format!("⚠️ {}", last));
                }
            }
            Err(e) => self.status = Some(e.to_string()),
        }
        self.refresh_rollups();
        self.scheduler.request(Instant::now());
    }

    pub(super) fn toggle_current_expansion(&mut self) {
        let Some(row) = self.rows.get(self.current_row) else {
            return;
        };
        if !row.is_dir {
            return;
        }
        let path = row.path.clone();
        if let Err(e) = self.session.toggle_expand(&path) {
            self.status = Some(e.to_string());
        }
        self.rebuild_rows();
    }

    pub(super) fn set_all_expanded(&mut self, expand: bool) {
        if let Err(e) = self.session.set_all_expanded(expand) {
            self.status = Some(e.to_string());
        }
        self.rebuild_rows();
    }

    pub(super) fn refresh(&mut self) {
        match self.session.refresh() {
            Ok(()) => self.status = Some("Refreshed".to_string()),
            Err(e) => self.status = Some(format!("Refresh failed: {}", e)),
        }
        self.rebuild_rows();
        self.refresh_rollups();
        self.regenerate_structure();
        self.scheduler.request(Instant::now());
    }

    pub(super) fn open_folder_from_input(&mut self) {
        let input = self.folder_input.trim().to_string();
        let mut picker = PathPicker::new(&input);
        match self.session.open_folder(&mut picker) {
            Ok(FolderOpen::Opened) => {
                self.status = Some(format!("Opened {}", input));
                self.current_row = 0;
                self.scroll_offset = 0;
                self.preview_scroll = 0;
                self.rebuild_rows();
                self.refresh_rollups();
                self.regenerate_structure();
                self.scheduler.cancel();
                self.regenerate_code();
            }
            Ok(FolderOpen::Cancelled) => {
                self.status = Some(format!("Not a directory: {}", input));
            }
            Err(e) => self.status = Some(format!("Could not open {}: {}", input, e)),
        }
        self.folder_input.clear();
        self.folder_cursor_pos = 0;
        self.mode = AppMode::Normal;
    }

    pub(super) fn toggle_theme(&mut self) {
        self.preferences.theme = self.preferences.theme.toggled();
        if let Some(path) = &self.preferences_path {
            if let Err(e) = self.preferences.save(path) {
                self.status = Some(format!("Could not save preferences: {}", e));
            }
        }
    }

    pub(super) fn regenerate_code(&mut self) {
        match self.session.generate() {
            Ok(output) => self.code = Preview::new(output.text),
            Err(e) => {
                log::debug!("Skipping generation: {}", e);
                self.code = Preview::default();
            }
        }
    }

    fn regenerate_structure(&mut self) {
        self.structure = Preview::new(self.session.structure().unwrap_or_default());
    }

    /// Runs the debounced generation once it is due.
    pub(super) fn on_tick(&mut self, now: Instant) {
        if let Some(ticket) = self.scheduler.take_due(now) {
            log::trace!("Running generation {:?}", ticket);
            self.regenerate_code();
        }
    }

    fn confirm(&mut self, minified: bool) {
        if self.scheduler.is_pending() {
            self.scheduler.cancel();
            self.regenerate_code();
        }
        self.request = Some(YankRequest {
            view: self.view,
            minified,
        });
        self.quit = true;
    }

    pub(super) fn handle_normal_mode_input(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if key_event.modifiers == KeyModifiers::CONTROL => self.quit = true,
            KeyCode::Char('y') => self.confirm(false),
            KeyCode::Char('m') => self.confirm(true),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current_selection(),
            KeyCode::Char('o') | KeyCode::Right | KeyCode::Left => {
                self.toggle_current_expansion()
            }
            KeyCode::Char('*') => self.set_all_expanded(true),
            KeyCode::Char('-') => self.set_all_expanded(false),
            KeyCode::Tab => {
                self.view = self.view.switched();
                self.preview_scroll = 0;
            }
            KeyCode::PageDown => self.preview_scroll = self.preview_scroll.saturating_add(10),
            KeyCode::PageUp => self.preview_scroll = self.preview_scroll.saturating_sub(10),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('O') | KeyCode::Char('/') => {
                self.mode = AppMode::OpenFolder;
                self.status = None;
            }
            _ => {}
        }
    }

    pub(super) fn handle_open_folder_input(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter => self.open_folder_from_input(),
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.folder_input.clear();
                self.folder_cursor_pos = 0;
            }
            KeyCode::Char(c) => {
                self.folder_input.insert(self.folder_cursor_pos, c);
                self.folder_cursor_pos += c.len_utf8();
            }
            KeyCode::Backspace => {
                if let Some(c) = self.folder_input[..self.folder_cursor_pos].chars().next_back() {
                    self.folder_cursor_pos -= c.len_utf8();
                    self.folder_input.remove(self.folder_cursor_pos);
                }
            }
            KeyCode::Left => {
                if let Some(c) = self.folder_input[..self.folder_cursor_pos].chars().next_back() {
                    self.folder_cursor_pos -= c.len_utf8();
                }
            }
            KeyCode::Right => {
                if let Some(c) = self.folder_input[self.folder_cursor_pos..].chars().next() {
                    self.folder_cursor_pos += c.len_utf8();
                }
            }
            _ => {}
        }
    }
}

fn push_visible(
    node: &Node,
    depth: usize,
    is_expanded: &mut dyn FnMut(&str) -> bool,
    rows: &mut Vec<VisibleRow>,
) {
    rows.push(VisibleRow::of(node, depth));
    if node.is_dir() && is_expanded(&node.path) {
        for child in &node.children {
            push_visible(child, depth + 1, is_expanded, rows);
        }
    }
}
