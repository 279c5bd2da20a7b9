//! Folder registry: user-chosen folder names mapped to directories

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Name → path mapping, kept sorted by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderRegistry {
    folders: BTreeMap<String, PathBuf>,
}

/// Trim and validate a folder name. A folder is always a direct child of the root.
fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyFolderName);
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::InvalidFolderName(name.to_string()));
    }
    Ok(name)
}

impl FolderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `root/name` on disk and register it
    ///
    /// Fails if the name is blank, already registered, or the directory
    /// already exists.
    pub fn create_folder(&mut self, root: &Path, name: &str) -> Result<PathBuf> {
        let name = validate_name(name)?;
        if self.folders.contains_key(name) {
            return Err(Error::FolderExists(name.to_string()));
        }

        let path = root.join(name);
        if path.exists() {
            return Err(Error::FolderExists(name.to_string()));
        }

        fs::create_dir_all(&path)?;
        self.folders.insert(name.to_string(), path.clone());
        log::debug!("Registered folder '{}' at {}", name, path.display());

        Ok(path)
    }

    /// Path of a registered folder
    pub fn resolve(&self, name: &str) -> Result<&Path> {
        if self.folders.is_empty() {
            return Err(Error::NoFolders);
        }
        self.get(name)
            .ok_or_else(|| Error::UnknownFolder(name.trim().to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.folders.get(name.trim()).map(PathBuf::as_path)
    }

    /// Folder names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.folders.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.folders.iter().map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}
