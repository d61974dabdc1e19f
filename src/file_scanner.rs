use crate::error::{CoreError, Result};
use crate::tree_builder::NodeKind;
use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions whose content is never treated as text.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "ico", "tif", "tiff", "avif", "heic",
];

/// How much of a file is sniffed for NUL bytes.
const SNIFF_LEN: usize = 8 * 1024;

/// One entry returned by [`FileSource::list_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub kind: NodeKind,
    pub handle: PathBuf,
}

/// File contents as delivered by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileText {
    pub text: String,
    /// Set when the source believes the bytes are not text.
    pub is_binary_hint: bool,
}

/// What the core needs from its host to look at a directory tree.
pub trait FileSource {
    fn list_directory(&self, dir: &Path) -> Result<Vec<SourceEntry>>;
    fn read_file_text(&self, file: &Path) -> Result<FileText>;
}

/// Asks the user for a root directory. `None` means the choice was cancelled.
pub trait RootPicker {
    fn pick_root_directory(&mut self) -> Option<PathBuf>;
}

/// Picks a directory typed on the command line or into the open-folder prompt.
#[derive(Debug, Clone, Default)]
pub struct PathPicker {
    candidate: Option<PathBuf>,
}

impl PathPicker {
    pub fn new(candidate: impl Into<PathBuf>) -> Self {
        PathPicker {
            candidate: Some(candidate.into()),
        }
    }

    pub fn cancelled() -> Self {
        PathPicker { candidate: None }
    }
}

impl RootPicker for PathPicker {
    fn pick_root_directory(&mut self) -> Option<PathBuf> {
        let candidate = self.candidate.take()?;
        if candidate.as_os_str().is_empty() || !candidate.is_dir() {
            log::debug!("Picker candidate is not a directory: {}", candidate.display());
            return None;
        }
        Some(candidate.canonicalize().unwrap_or(candidate))
    }
}

/// True for files that are skipped from counting and aggregation by name alone.
pub fn is_binary_by_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            BINARY_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// True when a loaded file must be treated as binary/image content.
pub fn is_binary_content(name: &str, file: &FileText) -> bool {
    file.is_binary_hint || is_binary_by_extension(name)
}

/// Reads the real filesystem, one directory level per listing.
#[derive(Debug, Clone, Default)]
pub struct FsSource {
    respect_gitignore: bool,
}

impl FsSource {
    pub fn new(respect_gitignore: bool) -> Self {
        FsSource { respect_gitignore }
    }

    fn walker_for(&self, dir: &Path) -> WalkBuilder {
        let respect = self.respect_gitignore;
        let mut walker = WalkBuilder::new(dir);
        walker
            .max_depth(Some(1))
            .hidden(false)
            .follow_links(false)
            .parents(respect)
            .ignore(respect)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .require_git(false);
        walker
    }
}

fn enumeration_error(dir: &Path, err: ignore::Error) -> CoreError {
    let message = err.to_string();
    CoreError::Enumeration {
        path: dir.display().to_string(),
        source: err
            .into_io_error()
            .unwrap_or_else(|| io::Error::other(message)),
    }
}

impl FileSource for FsSource {
    fn list_directory(&self, dir: &Path) -> Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();

        for result in self.walker_for(dir).build() {
            let dirent = result.map_err(|e| enumeration_error(dir, e))?;
            if dirent.depth() == 0 {
                continue;
            }
            let Some(file_type) = dirent.file_type() else {
                continue;
            };
            let path = dirent.into_path();
            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };

            let kind = if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(meta) if meta.is_dir() => {
                        log::debug!("Not descending into symlinked directory: {}", path.display());
                        continue;
                    }
                    Ok(_) => NodeKind::File,
                    Err(e) => {
                        log::debug!("Skipping dangling symlink {}: {}", path.display(), e);
                        continue;
                    }
                }
            } else if file_type.is_dir() {
                NodeKind::Directory
            } else {
                NodeKind::File
            };

            entries.push(SourceEntry {
                name,
                kind,
                handle: path,
            });
        }

        log::trace!("Listed {} entries in {}", entries.len(), dir.display());
        Ok(entries)
    }

    fn read_file_text(&self, file: &Path) -> Result<FileText> {
        let bytes = fs::read(file).map_err(|e| CoreError::Read {
            path: file.display().to_string(),
            source: e,
        })?;
        let sniff = &bytes[..bytes.len().min(SNIFF_LEN)];
        let has_nul = sniff.contains(&0);

        Ok(match String::from_utf8(bytes) {
            Ok(text) => FileText {
                text,
                is_binary_hint: has_nul,
            },
            Err(e) => FileText {
                text: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                is_binary_hint: true,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn binary_extensions_are_case_insensitive() {
        assert!(is_binary_by_extension("logo.PNG"));
        assert!(is_binary_by_extension("favicon.ico"));
        assert!(is_binary_by_extension("icon.svg"));
        assert!(!is_binary_by_extension("main.rs"));
        assert!(!is_binary_by_extension("Makefile"));
    }

    #[test]
    fn lists_one_level_with_kinds() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/deep.txt"), "deep").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join(".hidden"), "h").unwrap();

        let mut entries = FsSource::new(false).list_directory(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let names: Vec<(&str, NodeKind)> =
            entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            vec![
                (".hidden", NodeKind::File),
                ("a.txt", NodeKind::File),
                ("sub", NodeKind::Directory),
            ]
        );
    }

    #[test]
    fn gitignore_is_respected_only_when_enabled() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "secret.txt\n").unwrap();
        fs::write(dir.path().join("secret.txt"), "s").unwrap();
        fs::write(dir.path().join("public.txt"), "p").unwrap();

        let names = |respect: bool| -> Vec<String> {
            let mut names: Vec<String> = FsSource::new(respect)
                .list_directory(dir.path())
                .unwrap()
                .into_iter()
                .map(|e| e.name)
                .collect();
            names.sort();
            names
        };
        assert!(names(false).contains(&"secret.txt".to_string()));
        assert!(!names(true).contains(&"secret.txt".to_string()));
        assert!(names(true).contains(&"public.txt".to_string()));
    }

    #[test]
    fn missing_directory_is_an_enumeration_error() {
        let dir = TempDir::new().unwrap();
        let err = FsSource::default()
            .list_directory(&dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Enumeration { .. }));
    }

    #[test]
    fn nul_bytes_set_the_binary_hint() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("text.txt"), "hello\nworld").unwrap();
        fs::write(dir.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();

        let source = FsSource::default();
        let text = source.read_file_text(&dir.path().join("text.txt")).unwrap();
        assert_eq!(text.text, "hello\nworld");
        assert!(!text.is_binary_hint);

        let blob = source.read_file_text(&dir.path().join("blob.bin")).unwrap();
        assert!(blob.is_binary_hint);
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let err = FsSource::default()
            .read_file_text(&dir.path().join("gone.txt"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Read { .. }));
    }

    #[test]
    fn path_picker_cancels_on_missing_or_file_paths() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.txt"), "").unwrap();

        assert!(PathPicker::new(dir.path().join("f.txt"))
            .pick_root_directory()
            .is_none());
        assert!(PathPicker::new(dir.path().join("missing"))
            .pick_root_directory()
            .is_none());
        assert!(PathPicker::cancelled().pick_root_directory().is_none());
        assert!(PathPicker::new(dir.path()).pick_root_directory().is_some());
    }
}
