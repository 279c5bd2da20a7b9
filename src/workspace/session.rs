//! Workspace session: registry, selection and last directory, persisted as JSON

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::Local;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pdf::{compile, CompileOptions, CompileReport};
use super::registry::FolderRegistry;
use super::selection::{SelectedFile, Selection};

/// Manifest file kept inside the workspace root
pub const MANIFEST_FILE: &str = ".output-compiler.json";

/// Everything that survives between invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    folders: FolderRegistry,
    #[serde(default)]
    selected: Selection,
    #[serde(default)]
    last_directory: Option<PathBuf>,
}

/// An output folder with its folders and selected files
#[derive(Debug)]
pub struct Workspace {
    config: Config,
    manifest: Manifest,
}

/// Copy a file, keeping permissions and modification time
fn copy_preserving(source: &Path, destination: &Path) -> Result<()> {
    fs::copy(source, destination)?;
    let modified = fs::metadata(source)?.modified()?;
    let copy = fs::OpenOptions::new().write(true).open(destination)?;
    copy.set_modified(modified)?;
    Ok(())
}

impl Workspace {
    /// Open the workspace at `config.root`, creating the directory if needed
    pub fn open(mut config: Config) -> Result<Self> {
        fs::create_dir_all(&config.root)?;
        // Stored paths are absolute so the workspace works from any directory
        config.root = fs::canonicalize(&config.root)?;

        let manifest_path = config.root.join(MANIFEST_FILE);
        let manifest = if manifest_path.is_file() {
            serde_json::from_str(&fs::read_to_string(&manifest_path)?)?
        } else {
            Manifest::default()
        };

        log::debug!(
            "Opened workspace {} ({} folder(s), {} file(s))",
            config.root.display(),
            manifest.folders.len(),
            manifest.selected.len()
        );

        Ok(Self { config, manifest })
    }

    /// Persist folders and selection to the manifest
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.manifest)?;
        let mut temp = tempfile::Builder::new()
            .prefix(".manifest")
            .tempfile_in(&self.config.root)?;
        temp.write_all(json.as_bytes())?;
        temp.persist(self.config.root.join(MANIFEST_FILE))?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn folders(&self) -> &FolderRegistry {
        &self.manifest.folders
    }

    pub fn selected(&self) -> &Selection {
        &self.manifest.selected
    }

    /// Directory of the most recently added file
    pub fn last_directory(&self) -> Option<&Path> {
        self.manifest.last_directory.as_deref()
    }

    /// Create and register `root/name`
    pub fn create_folder(&mut self, name: &str) -> Result<PathBuf> {
        self.manifest.folders.create_folder(&self.config.root, name)
    }

    /// Find `source`, falling back to the last directory for relative paths
    fn locate(&self, source: &Path) -> Result<PathBuf> {
        if source.exists() {
            return Ok(source.to_path_buf());
        }
        if source.is_relative() {
            if let Some(dir) = self.last_directory() {
                let candidate = dir.join(source);
                if candidate.exists() {
                    return Ok(candidate);
                }
            }
        }
        Err(Error::FileNotFound(source.to_path_buf()))
    }

    /// Copy `source` into `folder` and append the copy to the selection
    pub fn add_file(&mut self, source: &Path, folder: &str) -> Result<&SelectedFile> {
        let located = self.locate(source)?;
        if !located.is_file() {
            return Err(Error::NotAFile(located));
        }
        let source = fs::canonicalize(&located)?;
        self.manifest.last_directory = source.parent().map(Path::to_path_buf);

        let folder = folder.trim();
        let folder_path = self.manifest.folders.resolve(folder)?.to_path_buf();
        if !folder_path.exists() {
            fs::create_dir_all(&folder_path)?;
        }
        let folder_path = fs::canonicalize(&folder_path)?;

        let file_name = source
            .file_name()
            .ok_or_else(|| Error::NotAFile(source.clone()))?;
        let destination = folder_path.join(file_name);

        self.manifest.selected.check_new(&source, &destination)?;

        // A file already sitting in the folder is selected in place
        if source != destination {
            copy_preserving(&source, &destination)?;
        }
        log::info!("Copied {} to {}", source.display(), destination.display());

        self.manifest.selected.push(SelectedFile {
            source,
            destination,
            folder: folder.to_string(),
        });
        self.last_added()
    }

    fn last_added(&self) -> Result<&SelectedFile> {
        self.manifest
            .selected
            .last()
            .ok_or_else(|| Error::General("selection is empty after adding".to_string()))
    }

    /// Store a scanned image as `scan_<timestamp>.png` in the root, then add it to `folder`
    pub fn capture(&mut self, image: &Path, folder: &str) -> Result<&SelectedFile> {
        // Fail before writing anything if the folder cannot take the scan
        self.manifest.folders.resolve(folder)?;

        if !image.is_file() {
            return Err(Error::FileNotFound(image.to_path_buf()));
        }
        let img = ::image::io::Reader::open(image)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| Error::CaptureFailed(e.to_string()))?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S%3f").to_string();
        let mut scan_path = self.config.root.join(format!("scan_{}.png", stamp));
        let mut n = 1;
        while scan_path.exists() {
            scan_path = self.config.root.join(format!("scan_{}_{}.png", stamp, n));
            n += 1;
        }

        img.save_with_format(&scan_path, ImageFormat::Png)
            .map_err(|e| Error::CaptureFailed(e.to_string()))?;
        if !scan_path.exists() {
            return Err(Error::CaptureFailed(scan_path.display().to_string()));
        }
        log::info!("Captured {} as {}", image.display(), scan_path.display());

        // Scans land in the root; the file picker keeps its own last directory
        let previous = self.manifest.last_directory.clone();
        let added = self.add_file(&scan_path, folder).map(|_| ());
        self.manifest.last_directory = previous;
        added?;
        self.last_added()
    }

    /// Compile the selection using the workspace config
    pub fn compile(&self) -> Result<CompileReport> {
        self.compile_with(&self.config.compile_options())
    }

    /// Compile the selection with explicit options
    pub fn compile_with(&self, options: &CompileOptions) -> Result<CompileReport> {
        compile(&self.manifest.selected.destinations(), options)
    }
}
