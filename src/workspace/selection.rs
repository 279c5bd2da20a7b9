//! Ordered list of files copied into folders

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// One collected file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    /// Where the file was copied from
    pub source: PathBuf,
    /// The copy inside the folder; this is what gets compiled
    pub destination: PathBuf,
    /// Registry name of the folder
    pub folder: String,
}

impl SelectedFile {
    /// Display name of the copy
    pub fn file_name(&self) -> String {
        self.destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.destination.display().to_string())
    }
}

/// Selected files in the order they were added
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    files: Vec<SelectedFile>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `source` can be copied to `destination` without clashing
    ///
    /// Both paths are expected in the same form (absolute) as the stored entries.
    pub fn check_new(&self, source: &Path, destination: &Path) -> Result<()> {
        let already_added = self
            .files
            .iter()
            .any(|f| f.source == source || f.destination == source);
        if already_added {
            return Err(Error::DuplicateFile(display_name(source)));
        }

        if self.files.iter().any(|f| f.destination == destination) {
            return Err(Error::DestinationTaken(destination.to_path_buf()));
        }

        Ok(())
    }

    pub fn push(&mut self, file: SelectedFile) {
        self.files.push(file);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectedFile> {
        self.files.iter()
    }

    /// Destination paths, in order
    pub fn destinations(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.destination.as_path()).collect()
    }

    pub fn last(&self) -> Option<&SelectedFile> {
        self.files.last()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a SelectedFile;
    type IntoIter = std::slice::Iter<'a, SelectedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
