//! Error types for the output compiler library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the output compiler library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Workspace manifest or config file could not be (de)serialized
    #[error("Manifest error: {0}")]
    Json(#[from] serde_json::Error),

    /// Temporary output could not be moved into place
    #[error("Could not write output: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path exists but is not a regular file
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Folder name was blank
    #[error("Please enter a folder name")]
    EmptyFolderName,

    /// Folder name would escape the workspace root
    #[error("Invalid folder name: {0}")]
    InvalidFolderName(String),

    /// Folder already registered or already on disk
    #[error("Folder already exists: {0}")]
    FolderExists(String),

    /// No folders have been created yet
    #[error("Please create a folder first")]
    NoFolders,

    /// Folder name not in the registry
    #[error("Unknown folder: {0}")]
    UnknownFolder(String),

    /// Source file was already added
    #[error("File {0} is already added")]
    DuplicateFile(String),

    /// Another selected file already lives at this destination
    #[error("A file named {} is already in that folder", .0.display())]
    DestinationTaken(PathBuf),

    /// Merge called without inputs
    #[error("No input files provided")]
    NoInputFiles,

    /// Compile called with an empty selection
    #[error("No files selected")]
    NoFilesSelected,

    /// Nothing produced a page
    #[error("No pages to write")]
    NoPages,

    /// Extension is not a supported raster image
    #[error("Unsupported image: {}", .0.display())]
    UnsupportedImage(PathBuf),

    /// Scanned image could not be stored
    #[error("Failed to capture image: {0}")]
    CaptureFailed(String),

    /// General error
    #[error("{0}")]
    General(String),
}
