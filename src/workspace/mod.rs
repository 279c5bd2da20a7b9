//! Folder registry, selected files and their persistence

pub mod registry;
pub mod selection;
pub mod session;

pub use registry::FolderRegistry;
pub use selection::{SelectedFile, Selection};
pub use session::{Workspace, MANIFEST_FILE};
