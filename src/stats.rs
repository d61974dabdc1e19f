use crate::error::Result;
use crate::file_scanner::{FileText, is_binary_by_extension, is_binary_content};
use std::collections::HashMap;

/// Number of `\n`-separated segments. An empty text counts as one line.
pub fn count_lines(text: &str) -> usize {
    text.split('\n').count()
}

/// Line counts per file path, filled lazily and never recomputed.
///
/// Entries are only ever added; the whole cache is replaced when a folder is
/// opened fresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsCache {
    lines: HashMap<String, usize>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<usize> {
        self.lines.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lines.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Counts the lines of `path` unless they are already cached.
    ///
    /// `load` is not called for cached paths. Binary or image content is
    /// skipped without caching anything. A failed load leaves the cache
    /// untouched and is returned to the caller.
    pub fn ensure_counted<F>(&mut self, path: &str, name: &str, load: F) -> Result<()>
    where
        F: FnOnce() -> Result<FileText>,
    {
        if self.lines.contains_key(path) || is_binary_by_extension(name) {
            return Ok(());
        }
        let file = load()?;
        if is_binary_content(name, &file) {
            log::trace!("Not counting binary file {}", path);
            return Ok(());
        }
        let lines = count_lines(&file.text);
        log::trace!("Counted {} lines in {}", lines, path);
        self.lines.insert(path.to_string(), lines);
        Ok(())
    }
}
