//! Compile selected PDFs and images into one output PDF

use std::fs;
use std::path::{Path, PathBuf};
use lopdf::Document;
use crate::error::{Error, Result};
use crate::layout::PagePlacement;
use super::raster::{write_image_pdf, ImageKind};
use super::merge::PageCollector;

/// What a selected file contributes to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// All pages, in order
    Pdf,
    /// One page holding the image
    Image(ImageKind),
    /// Skipped
    Unsupported,
}

impl FileKind {
    /// Classify a file by its extension (case-insensitive)
    pub fn classify(path: &Path) -> Self {
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            return FileKind::Pdf;
        }
        match ImageKind::from_path(path) {
            Some(kind) => FileKind::Image(kind),
            None => FileKind::Unsupported,
        }
    }
}

/// Options for compiling
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Output PDF file path
    pub output_path: PathBuf,
    /// Page sizing for image pages
    pub placement: PagePlacement,
    /// Flate-compress uncompressed streams before writing
    pub compress: bool,
}

impl CompileOptions {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            placement: PagePlacement::default(),
            compress: true,
        }
    }
}

/// Outcome of a successful compilation
#[derive(Debug, Clone)]
pub struct CompileReport {
    pub output: PathBuf,
    pub pages: usize,
    pub files_compiled: usize,
    /// Files with an extension that is neither PDF nor a supported image
    pub skipped: Vec<PathBuf>,
}

/// Render an image to a temporary single-page PDF next to the output and load it back
///
/// The temporary file is removed when this returns, on success or failure.
fn image_page(path: &Path, placement: &PagePlacement, scratch_dir: &Path) -> Result<Document> {
    let mut temp = tempfile::Builder::new()
        .prefix("temp")
        .suffix(".pdf")
        .tempfile_in(scratch_dir)?;
    write_image_pdf(path, placement, temp.as_file_mut())?;
    let doc = Document::load(temp.path())?;
    Ok(doc)
}

fn load_pdf(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(Document::load(path)?)
}

/// Compile `files` into a single PDF
///
/// PDFs contribute all their pages, images one page each, in the given order.
/// Any failure aborts the whole run; the output is written to a temporary
/// file in the destination directory and renamed into place at the end, so a
/// failed run never leaves a partial output behind.
///
/// # Example
///
/// ```no_run
/// use output_compiler::pdf::{compile, CompileOptions};
///
/// let files = ["OutputCompiler/Taxes/w2.pdf", "OutputCompiler/Taxes/receipt.jpg"];
/// let report = compile(&files, &CompileOptions::new("OutputCompiler/compiled_output.pdf"))
///     .expect("Failed to compile PDF");
/// println!("{} pages", report.pages);
/// ```
pub fn compile<P: AsRef<Path>>(files: &[P], options: &CompileOptions) -> Result<CompileReport> {
    if files.is_empty() {
        return Err(Error::NoFilesSelected);
    }

    let output_dir = match options.output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&output_dir)?;

    let mut collector = PageCollector::new();
    let mut skipped = Vec::new();
    let mut files_compiled = 0;

    for file in files {
        let path = file.as_ref();
        let added = match FileKind::classify(path) {
            FileKind::Pdf => {
                let added = collector.append(load_pdf(path)?)?;
                if added == 0 {
                    return Err(Error::EmptyPdf(path.to_path_buf()));
                }
                added
            }
            FileKind::Image(_) => {
                collector.append(image_page(path, &options.placement, &output_dir)?)?
            }
            FileKind::Unsupported => {
                log::warn!("Skipping {}: not a PDF or supported image", path.display());
                skipped.push(path.to_path_buf());
                continue;
            }
        };
        files_compiled += 1;
        log::info!("Added {} ({} page(s))", path.display(), added);
    }

    let pages = collector.page_count();
    let mut merged = collector.finish()?;
    if options.compress {
        merged.compress();
    }

    let mut output = tempfile::Builder::new()
        .prefix(".compiling")
        .suffix(".pdf")
        .tempfile_in(&output_dir)?;
    merged.save_to(output.as_file_mut())?;
    output.as_file().sync_all()?;
    output.persist(&options.output_path)?;

    log::debug!("Wrote {} page(s) to {}", pages, options.output_path.display());

    Ok(CompileReport {
        output: options.output_path.clone(),
        pages,
        files_compiled,
        skipped,
    })
}
