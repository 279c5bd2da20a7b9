//! PDF manipulation module

pub mod compile;
pub mod raster;
pub mod merge;
pub mod metadata;

// Re-export commonly used items
pub use compile::{compile, CompileOptions, CompileReport, FileKind};
pub use raster::{image_to_pdf, write_image_pdf, ImageKind};
pub use merge::{merge_pdfs, MergeOptions, PageCollector};
pub use metadata::{count_pages, extract_metadata, PdfMetadata};
