//! In-memory file source for tests.
//!
//! Only compiled for tests or with the `test-utils` feature.

use crate::error::{CoreError, Result};
use crate::file_scanner::{FileSource, FileText, SourceEntry};
use crate::tree_builder::NodeKind;
use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum MemEntry {
    Dir,
    File { text: String, binary: bool },
}

/// A directory tree held in memory. Handles are the node paths themselves,
/// so `proj/sub/b.ts` is both the handle and the tree path of that file.
#[derive(Debug)]
pub struct MemorySource {
    root: PathBuf,
    entries: BTreeMap<PathBuf, MemEntry>,
    denied: HashSet<PathBuf>,
    reads: Cell<usize>,
}

impl MemorySource {
    pub fn new(root: &str) -> Self {
        let root = PathBuf::from(root);
        let mut entries = BTreeMap::new();
        entries.insert(root.clone(), MemEntry::Dir);
        MemorySource {
            root,
            entries,
            denied: HashSet::new(),
            reads: Cell::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.insert_dir(Path::new(path));
        self
    }

    pub fn file(mut self, path: &str, text: &str) -> Self {
        self.write(path, text);
        self
    }

    /// A file whose source reports it as binary.
    pub fn binary(mut self, path: &str, text: &str) -> Self {
        self.insert_file(path, text, true);
        self
    }

    /// Listing (for directories) or reading (for files) `path` fails.
    pub fn deny(mut self, path: &str) -> Self {
        self.denied.insert(PathBuf::from(path));
        self
    }

    /// Undoes [`MemorySource::deny`].
    pub fn allow(&mut self, path: &str) {
        self.denied.remove(Path::new(path));
    }

    pub fn write(&mut self, path: &str, text: &str) {
        self.insert_file(path, text, false);
    }

    /// Removes `path` and everything below it.
    pub fn remove(&mut self, path: &str) {
        let target = Path::new(path);
        self.entries.retain(|p, _| !p.starts_with(target));
    }

    /// Number of successful `read_file_text` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    fn insert_dir(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.entries.insert(ancestor.to_path_buf(), MemEntry::Dir);
        }
    }

    fn insert_file(&mut self, path: &str, text: &str, binary: bool) {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            self.insert_dir(parent);
        }
        self.entries.insert(
            path,
            MemEntry::File {
                text: text.to_string(),
                binary,
            },
        );
    }
}

impl FileSource for MemorySource {
    fn list_directory(&self, dir: &Path) -> Result<Vec<SourceEntry>> {
        let failure = |kind: io::ErrorKind| CoreError::Enumeration {
            path: dir.display().to_string(),
            source: io::Error::new(kind, "cannot list directory"),
        };
        if self.denied.contains(dir) {
            return Err(failure(io::ErrorKind::PermissionDenied));
        }
        match self.entries.get(dir) {
            Some(MemEntry::Dir) => {}
            _ => return Err(failure(io::ErrorKind::NotFound)),
        }

        Ok(self
            .entries
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .filter_map(|(path, entry)| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                let kind = match entry {
                    MemEntry::Dir => NodeKind::Directory,
                    MemEntry::File { .. } => NodeKind::File,
                };
                Some(SourceEntry {
                    name,
                    kind,
                    handle: path.clone(),
                })
            })
            .collect())
    }

    fn read_file_text(&self, file: &Path) -> Result<FileText> {
        let failure = |kind: io::ErrorKind| CoreError::Read {
            path: file.display().to_string(),
            source: io::Error::new(kind, "cannot read file"),
        };
        if self.denied.contains(file) {
            return Err(failure(io::ErrorKind::PermissionDenied));
        }
        match self.entries.get(file) {
            Some(MemEntry::File { text, binary }) => {
                self.reads.set(self.reads.get() + 1);
                Ok(FileText {
                    text: text.clone(),
                    is_binary_hint: *binary,
                })
            }
            _ => Err(failure(io::ErrorKind::NotFound)),
        }
    }
}
