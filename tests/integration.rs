//! Integration tests for the output compiler library

use image::{Rgb, RgbImage};
use lopdf::{dictionary, Document, Object, Stream};
use output_compiler::config::Config;
use output_compiler::pdf::{count_pages, merge_pdfs, MergeOptions};
use output_compiler::workspace::Workspace;
use output_compiler::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a PDF with `pages` pages, all `width` points wide
fn write_pdf(path: &Path, pages: usize, width: i64) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|i| {
            let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", i + 1);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), 792.into()],
            }))
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("Failed to write fixture PDF");
}

/// Page widths of a PDF, in page order
fn page_widths(path: &Path) -> Vec<f32> {
    let doc = Document::load(path).expect("Failed to load PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_object(id).unwrap().as_dict().unwrap();
            page.get(b"MediaBox").unwrap().as_array().unwrap()[2]
                .as_float()
                .unwrap()
        })
        .collect()
}

fn open_workspace(dir: &TempDir) -> Workspace {
    let config = Config::load(dir.path().join("OutputCompiler")).expect("Failed to load config");
    Workspace::open(config).expect("Failed to open workspace")
}

#[test]
fn test_compile_workspace_selection() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let inbox = dir.path().join("inbox");
    fs::create_dir(&inbox).unwrap();

    let w2 = inbox.join("w2.pdf");
    write_pdf(&w2, 2, 612);
    let receipt = inbox.join("receipt.jpg");
    RgbImage::from_pixel(300, 400, Rgb([240, 240, 240])).save(&receipt).unwrap();
    let statement = inbox.join("statement.pdf");
    write_pdf(&statement, 3, 595);

    let mut workspace = open_workspace(&dir);
    workspace.create_folder("Taxes").unwrap();
    workspace.create_folder("Receipts").unwrap();
    workspace.add_file(&w2, "Taxes").unwrap();
    workspace.add_file(&receipt, "Receipts").unwrap();
    workspace.add_file(&statement, "Taxes").unwrap();

    let report = workspace.compile().expect("Failed to compile PDF");

    assert_eq!(report.output, workspace.root().join("compiled_output.pdf"));
    assert_eq!(report.pages, 6);
    assert_eq!(report.files_compiled, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(count_pages(&report.output).unwrap(), 6);

    // Pages follow the selection order
    assert_eq!(
        page_widths(&report.output),
        vec![612.0, 612.0, 300.0, 595.0, 595.0, 595.0]
    );

    // Copies live in their folders, sources are untouched
    assert!(workspace.root().join("Taxes/w2.pdf").is_file());
    assert!(workspace.root().join("Receipts/receipt.jpg").is_file());
    assert!(w2.is_file());
}

#[test]
fn test_selection_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let scan = dir.path().join("page.png");
    RgbImage::from_pixel(20, 10, Rgb([0, 0, 0])).save(&scan).unwrap();

    {
        let mut workspace = open_workspace(&dir);
        workspace.create_folder("Scans").unwrap();
        workspace.add_file(&scan, "Scans").unwrap();
        workspace.save().unwrap();
    }

    let mut workspace = open_workspace(&dir);
    assert_eq!(workspace.selected().len(), 1);

    // Duplicate detection also works against the persisted selection
    let again = workspace.add_file(&scan, "Scans");
    assert!(matches!(again, Err(Error::DuplicateFile(_))));

    let report = workspace.compile().unwrap();
    assert_eq!(report.pages, 1);
}

#[test]
fn test_compile_without_selection() {
    let dir = TempDir::new().unwrap();
    let workspace = open_workspace(&dir);

    let result = workspace.compile();
    assert!(matches!(result, Err(Error::NoFilesSelected)));
    assert_eq!(result.unwrap_err().to_string(), "No files selected");
    assert!(!workspace.root().join("compiled_output.pdf").exists());
}

#[test]
fn test_failed_compile_keeps_previous_output() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.pdf");
    write_pdf(&good, 1, 612);

    let mut workspace = open_workspace(&dir);
    workspace.create_folder("Docs").unwrap();
    workspace.add_file(&good, "Docs").unwrap();
    let first = workspace.compile().unwrap();
    let before = fs::read(&first.output).unwrap();

    // Corrupt a selected copy so the next run fails midway
    let bad = dir.path().join("bad.pdf");
    fs::write(&bad, b"this is not a pdf").unwrap();
    workspace.add_file(&bad, "Docs").unwrap();

    assert!(workspace.compile().is_err());
    assert_eq!(fs::read(&first.output).unwrap(), before);

    // No temporary files are left in the workspace root
    let leftovers: Vec<PathBuf> = fs::read_dir(workspace.root())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "pdf"))
        .filter(|p| p != &first.output)
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
}

#[test]
fn test_folder_creation_rules() {
    let dir = TempDir::new().unwrap();
    let mut workspace = open_workspace(&dir);

    assert!(matches!(workspace.create_folder("  "), Err(Error::EmptyFolderName)));
    workspace.create_folder("Taxes").unwrap();
    assert!(matches!(workspace.create_folder("Taxes"), Err(Error::FolderExists(_))));

    fs::create_dir(workspace.root().join("Stray")).unwrap();
    assert!(matches!(workspace.create_folder("Stray"), Err(Error::FolderExists(_))));
}

#[test]
fn test_merge_pdfs_page_count() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("1. intro.pdf");
    let b = dir.path().join("2. advanced.pdf");
    write_pdf(&a, 1, 612);
    write_pdf(&b, 6, 500);

    let output_path = dir.path().join("merged.pdf");
    let options = MergeOptions {
        input_paths: vec![a, b],
        output_path: output_path.clone(),
    };

    let pages = merge_pdfs(&options).expect("Failed to merge PDFs");
    assert_eq!(pages, 7);
    assert_eq!(count_pages(&output_path).unwrap(), 7);
}

#[test]
fn test_merge_empty_input_list() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = MergeOptions {
        input_paths: vec![],
        output_path: temp_dir.path().join("empty.pdf"),
    };

    let result = merge_pdfs(&options);
    assert!(
        result.unwrap_err().to_string().contains("No input files"),
        "Error message should mention no input files"
    );
}

#[test]
fn test_merge_nonexistent_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let options = MergeOptions {
        input_paths: vec![PathBuf::from("nonexistent.pdf")],
        output_path: temp_dir.path().join("output.pdf"),
    };

    let result = merge_pdfs(&options);
    assert!(matches!(result, Err(Error::FileNotFound(_))));
    assert!(!temp_dir.path().join("output.pdf").exists());
}
