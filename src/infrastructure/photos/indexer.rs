//! Photo directory scanner producing the gallery index.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::entities::{DirectoryNode, FileDetails};

/// Extensions counted as photos, lowercase.
pub const PHOTO_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

/// Errors raised while building or writing the photo index.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum IndexError {
    #[error("failed to read omit list {path}: {source}")]
    OmitListRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed omit list {path}: {source}")]
    OmitListParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write index {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Photo names left out of the index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmitList {
    #[serde(default)]
    filtered: HashSet<String>,
}

impl OmitList {
    /// Reads an omit list file of the form `{"filtered": [...]}`.
    ///
    /// A missing file omits nothing.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?path, "No omit list found");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(IndexError::OmitListRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| IndexError::OmitListParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds a list from names.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filtered: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `name` is omitted.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.filtered.contains(name)
    }

    /// Number of omitted names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    /// Returns true if nothing is omitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Builds a [`DirectoryNode`] tree from a photos directory.
#[derive(Debug, Clone)]
pub struct PhotoIndexer {
    root: PathBuf,
    omit: OmitList,
}

impl PhotoIndexer {
    /// Creates an indexer for the photos directory at `root`.
    #[must_use]
    pub const fn new(root: PathBuf, omit: OmitList) -> Self {
        Self { root, omit }
    }

    /// Scans the photos directory.
    ///
    /// A missing or unreadable directory produces an empty node.
    #[must_use]
    pub fn scan(&self) -> DirectoryNode {
        info!(root = ?self.root, omitted = self.omit.len(), "Scanning photos directory");
        let node = self.build(&self.root, String::new());
        info!(
            total_photos = node.total_photos,
            directories = node.subdirs.len(),
            "Photo scan finished"
        );
        node
    }

    /// Scans and writes the index as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns error if the index cannot be serialized or written.
    pub fn write_index(&self, output: &Path) -> Result<DirectoryNode, IndexError> {
        let node = self.scan();
        let json = serde_json::to_string_pretty(&node)?;

        let write_err = |source| IndexError::Write {
            path: output.to_path_buf(),
            source,
        };
        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(write_err)?;
        let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
        temp_file.write_all(json.as_bytes()).map_err(write_err)?;
        temp_file.persist(output).map_err(|e| write_err(e.error))?;

        info!(path = ?output, total_photos = node.total_photos, "Photo index written");
        Ok(node)
    }

    fn build(&self, dir: &Path, relative: String) -> DirectoryNode {
        let (files, file_details, subdirs) = self.read_directory(dir);

        let mut node = DirectoryNode {
            path: relative,
            photo_count: files.len(),
            total_photos: files.len(),
            files,
            file_details,
            subdirs,
            ..DirectoryNode::default()
        };

        for subdir in &node.subdirs {
            let child_relative = if node.path.is_empty() {
                subdir.clone()
            } else {
                format!("{}/{subdir}", node.path)
            };
            let child = self.build(&dir.join(subdir), child_relative);
            node.total_photos += child.total_photos;
            node.children.insert(subdir.clone(), child);
        }

        node
    }

    fn read_directory(&self, dir: &Path) -> (Vec<String>, Vec<FileDetails>, Vec<String>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = ?dir, "Photos directory not found");
                return (Vec::new(), Vec::new(), Vec::new());
            }
            Err(e) => {
                warn!(path = ?dir, error = %e, "Failed to read photos directory");
                return (Vec::new(), Vec::new(), Vec::new());
            }
        };

        let mut files = Vec::new();
        let mut file_details = Vec::new();
        let mut subdirs = Vec::new();

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if path.is_dir() {
                subdirs.push(name);
            } else if path.is_file() && is_photo(&path) && !self.omit.contains(&name) {
                file_details.push(file_details_for(&path, &name));
                files.push(name);
            }
        }

        files.sort();
        subdirs.sort();
        file_details.sort_by(|a, b| a.name.cmp(&b.name));
        (files, file_details, subdirs)
    }
}

fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            PHOTO_EXTENSIONS.contains(&ext.as_str())
        })
}

fn file_details_for(path: &Path, name: &str) -> FileDetails {
    match fs::metadata(path) {
        Ok(meta) => FileDetails {
            name: name.to_string(),
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            created: meta.created().ok().map(DateTime::<Utc>::from),
        },
        Err(e) => {
            debug!(path = ?path, error = %e, "Failed to stat photo");
            FileDetails {
                name: name.to_string(),
                size: 0,
                modified: None,
                created: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_case::test_case;

    fn touch(path: &Path, bytes: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[test_case("a.jpg", true ; "jpg")]
    #[test_case("a.JPEG", true ; "uppercase jpeg")]
    #[test_case("a.svg", true ; "svg")]
    #[test_case("a.txt", false ; "text")]
    #[test_case("jpg", false ; "no extension")]
    fn test_is_photo(name: &str, expected: bool) {
        assert_eq!(is_photo(Path::new(name)), expected);
    }

    #[test]
    fn test_scan_builds_sorted_tree() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.png"), b"12345");
        touch(&root.join("a.jpg"), b"1");
        touch(&root.join("notes.txt"), b"x");
        touch(&root.join("trips/beach.webp"), b"1");
        touch(&root.join("trips/2024/alps.JPG"), b"1");
        touch(&root.join("trips/2024/snow.gif"), b"1");
        fs::create_dir_all(root.join("empty")).unwrap();

        let node = PhotoIndexer::new(root.to_path_buf(), OmitList::default()).scan();

        assert_eq!(node.path, "");
        assert_eq!(node.files, vec!["a.jpg", "b.png"]);
        assert_eq!(node.subdirs, vec!["empty", "trips"]);
        assert_eq!(node.photo_count, 2);
        assert_eq!(node.total_photos, 5);
        assert_eq!(node.file_details[1].name, "b.png");
        assert_eq!(node.file_details[1].size, 5);
        assert!(node.file_details[1].modified.is_some());

        let trips = &node.children["trips"];
        assert_eq!(trips.path, "trips");
        assert_eq!(trips.photo_count, 1);
        assert_eq!(trips.total_photos, 3);
        assert_eq!(trips.children["2024"].path, "trips/2024");
        assert_eq!(node.children["empty"].total_photos, 0);

        assert_eq!(
            node.photo_paths(),
            vec![
                "a.jpg",
                "b.png",
                "trips/beach.webp",
                "trips/2024/alps.JPG",
                "trips/2024/snow.gif"
            ]
        );
    }

    #[test]
    fn test_scan_skips_omitted_names() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("keep.jpg"), b"1");
        touch(&dir.path().join("private.jpg"), b"1");
        touch(&dir.path().join("sub/private.jpg"), b"1");

        let node = PhotoIndexer::new(
            dir.path().to_path_buf(),
            OmitList::from_names(["private.jpg"]),
        )
        .scan();

        assert_eq!(node.files, vec!["keep.jpg"]);
        assert_eq!(node.total_photos, 1);
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let node =
            PhotoIndexer::new(dir.path().join("missing"), OmitList::default()).scan();

        assert_eq!(node, DirectoryNode::default());
    }

    #[test]
    fn test_omit_list_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dont-show.json");

        assert!(OmitList::load(&path).unwrap().is_empty());

        fs::write(&path, r#"{"filtered": ["a.jpg", "b.jpg"]}"#).unwrap();
        let list = OmitList::load(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("a.jpg"));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            OmitList::load(&path),
            Err(IndexError::OmitListParse { .. })
        ));
    }

    #[test]
    fn test_write_index_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("photos/a.jpg"), b"1");
        let output = dir.path().join("out/nested/photo-index.json");

        let node = PhotoIndexer::new(dir.path().join("photos"), OmitList::default())
            .write_index(&output)
            .unwrap();

        let written: DirectoryNode =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, node);
        assert_eq!(written.total_photos, 1);
    }
}
