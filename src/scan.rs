//! Source directory scanning.
//!
//! The comics directory is flat: every supported image file directly inside
//! it is one comic. Subdirectories, hidden files, and OS metadata files are
//! ignored.
//!
//! ```text
//! comics/
//! ├── .DS_Store                 # hidden, ignored
//! ├── Thumbs.db                 # OS metadata, ignored
//! ├── drafts/                   # directory, ignored
//! ├── first-strip.png           # comic
//! └── late_night_snack.jpg      # comic
//! ```
//!
//! Access goes through the [`SourceDir`] trait so the catalog logic can be
//! exercised with in-memory fixtures whose creation times are controlled.

use crate::types::Timestamp;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot list source directory {0}: {1}")]
    List(PathBuf, #[source] walkdir::Error),
    #[error("Cannot read creation time of {0}: {1}")]
    Stat(PathBuf, #[source] io::Error),
}

/// Image extensions recognised as comics (compared case-insensitively).
pub const COMIC_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Files that operating systems drop into folders uninvited.
const SYSTEM_ENTRIES: &[&str] = &["Thumbs.db", "desktop.ini", "Icon\r"];

/// Read access to the directory of source comics.
pub trait SourceDir: Sync {
    /// Directory the filenames are relative to.
    fn root(&self) -> &Path;

    /// Comic filenames in the directory, sorted.
    fn list(&self) -> Result<Vec<String>, ScanError>;

    /// When the file was first created.
    fn created_at(&self, filename: &str) -> Result<Timestamp, ScanError>;

    fn path_of(&self, filename: &str) -> PathBuf {
        self.root().join(filename)
    }
}

/// A comics directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalDir {
    root: PathBuf,
}

impl LocalDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceDir for LocalDir {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> Result<Vec<String>, ScanError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ScanError::List(self.root.clone(), e))?;
            // Follows symlinks so linked comics are listed like regular files
            if !entry.path().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 filename");
                continue;
            };
            if is_comic_file(name) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn created_at(&self, filename: &str) -> Result<Timestamp, ScanError> {
        let path = self.path_of(filename);
        let meta = fs::symlink_metadata(&path).map_err(|e| ScanError::Stat(path.clone(), e))?;
        let time = match meta.created() {
            Ok(time) => time,
            // Filesystems without birth time (some Linux mounts) report Unsupported.
            Err(e) if e.kind() == io::ErrorKind::Unsupported => {
                tracing::debug!(file = filename, "birth time unavailable, using mtime");
                meta.modified().map_err(|e| ScanError::Stat(path.clone(), e))?
            }
            Err(e) => return Err(ScanError::Stat(path, e)),
        };
        Ok(Timestamp::from_system_time(time))
    }
}

/// Whether a directory entry name is a comic: visible, not OS metadata,
/// and carrying a supported image extension.
pub fn is_comic_file(name: &str) -> bool {
    if name.starts_with('.') || SYSTEM_ENTRIES.contains(&name) {
        return false;
    }
    name.rsplit_once('.')
        .map(|(_, ext)| {
            COMIC_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn comic_file_accepts_images() {
        assert!(is_comic_file("first-strip.png"));
        assert!(is_comic_file("SHOUTY.JPG"));
        assert!(is_comic_file("loop.gif"));
        assert!(is_comic_file("cat.final.webp"));
    }

    #[test]
    fn comic_file_rejects_hidden_and_system_entries() {
        assert!(!is_comic_file(".hidden.png"));
        assert!(!is_comic_file(".DS_Store"));
        assert!(!is_comic_file("Thumbs.db"));
        assert!(!is_comic_file("desktop.ini"));
    }

    #[test]
    fn comic_file_rejects_other_extensions() {
        assert!(!is_comic_file("notes.txt"));
        assert!(!is_comic_file("index.json"));
        assert!(!is_comic_file("no-extension"));
    }

    #[test]
    fn list_returns_sorted_comics_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.png"), "x").unwrap();
        fs::write(tmp.path().join("a.jpg"), "x").unwrap();
        fs::write(tmp.path().join(".DS_Store"), "x").unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(tmp.path().join("drafts.png")).unwrap();

        let names = LocalDir::new(tmp.path()).list().unwrap();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn list_ignores_nested_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("drafts")).unwrap();
        fs::write(tmp.path().join("drafts/wip.png"), "x").unwrap();

        let names = LocalDir::new(tmp.path()).list().unwrap();
        assert!(names.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn list_includes_symlinked_comics() {
        let tmp = TempDir::new().unwrap();
        let art = tmp.path().join("art");
        let comics = tmp.path().join("comics");
        fs::create_dir(&art).unwrap();
        fs::create_dir(&comics).unwrap();
        fs::write(art.join("strip.png"), "x").unwrap();
        std::os::unix::fs::symlink(art.join("strip.png"), comics.join("strip.png")).unwrap();
        std::os::unix::fs::symlink(&art, comics.join("linked-dir.png")).unwrap();

        let names = LocalDir::new(&comics).list().unwrap();

        assert_eq!(names, vec!["strip.png"]);
        assert!(LocalDir::new(&comics).created_at("strip.png").is_ok());
    }

    #[test]
    fn list_missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = LocalDir::new(tmp.path().join("nope")).list();
        assert!(matches!(result, Err(ScanError::List(_, _))));
    }

    #[test]
    fn created_at_reads_file_time() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.png"), "x").unwrap();

        let before = Timestamp::from_system_time(
            std::time::SystemTime::now() - std::time::Duration::from_secs(60),
        );
        let ts = LocalDir::new(tmp.path()).created_at("a.png").unwrap();
        assert!(ts > before);
    }

    #[test]
    fn created_at_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = LocalDir::new(tmp.path()).created_at("ghost.png");
        assert!(matches!(result, Err(ScanError::Stat(_, _))));
    }

    #[test]
    fn path_of_joins_root() {
        let dir = LocalDir::new("/srv/comics");
        assert_eq!(dir.path_of("a.png"), PathBuf::from("/srv/comics/a.png"));
    }
}
