//! Photo directory index.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one photo file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetails {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, if known.
    pub modified: Option<DateTime<Utc>>,
    /// Creation time, if known.
    pub created: Option<DateTime<Utc>>,
}

/// One directory of the photo tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Path relative to the photos root, empty for the root itself.
    pub path: String,
    /// Photo file names in this directory, sorted.
    pub files: Vec<String>,
    /// Details of each photo file, sorted by name.
    pub file_details: Vec<FileDetails>,
    /// Subdirectory names, sorted.
    pub subdirs: Vec<String>,
    /// Subdirectory nodes keyed by name.
    pub children: BTreeMap<String, DirectoryNode>,
    /// Photos directly in this directory.
    pub photo_count: usize,
    /// Photos in this directory and every descendant.
    pub total_photos: usize,
}

impl DirectoryNode {
    /// Flattens the tree into photo paths relative to the photos root.
    #[must_use]
    pub fn photo_paths(&self) -> Vec<String> {
        let mut paths = Vec::with_capacity(self.total_photos);
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths(&self, out: &mut Vec<String>) {
        for file in &self.files {
            if self.path.is_empty() {
                out.push(file.clone());
            } else {
                out.push(format!("{}/{}", self.path, file));
            }
        }
        for child in self.children.values() {
            child.collect_paths(out);
        }
    }
}
