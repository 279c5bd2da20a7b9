//! Output Compiler CLI tool
//!
//! A command-line tool for collecting files into folders and compiling them into one PDF.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use std::path::{Path, PathBuf};
use std::process;

use output_compiler::config::{Config, DEFAULT_ROOT};
use output_compiler::layout::{Length, Margins, PageSize};
use output_compiler::pdf::{extract_metadata, merge_pdfs, MergeOptions};
use output_compiler::workspace::Workspace;

/// Output Compiler - Collect images and PDFs into folders and compile them into one PDF
#[derive(Parser)]
#[command(name = "output-compiler")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Create a folder and add files to it
    output-compiler folder create Taxes
    output-compiler add --folder Taxes ~/Downloads/w2.pdf \"~/Pictures/receipt*.jpg\"

    # Store a scanned page as PNG in a folder
    output-compiler scan --folder Taxes ~/scans/page1.jpg

    # Compile everything that was added, images on A4 pages
    output-compiler compile --page-size a4 --open")]
struct Cli {
    /// Workspace directory holding folders, scans and the compiled PDF
    #[arg(long, global = true, env = "OUTPUT_COMPILER_ROOT", default_value = DEFAULT_ROOT)]
    root: PathBuf,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the workspace directory
    Init,

    /// Manage folders
    Folder {
        #[command(subcommand)]
        action: FolderCommand,
    },

    /// Copy files into a folder and add them to the selection
    Add {
        /// Folder to copy the files into
        #[arg(short, long)]
        folder: String,

        /// Files to add (in order). Supports glob patterns like "*.jpg"
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Store a scanned or photographed image as PNG and add it to a folder
    Scan {
        /// Folder to add the scan to
        #[arg(short, long)]
        folder: String,

        /// Image produced by the scanner or camera
        image: PathBuf,
    },

    /// Show the selected files in compile order
    List,

    /// Compile the selected files into one PDF
    Compile {
        /// Output PDF file path (defaults to <root>/compiled_output.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page size for image pages: fit, a4 or letter
        #[arg(long)]
        page_size: Option<PageSize>,

        /// Margin around images on a4/letter pages, in millimeters
        #[arg(long)]
        margin: Option<f64>,

        /// Write streams without Flate compression
        #[arg(long)]
        no_compress: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Merge PDF files into one, outside of any workspace
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

#[derive(Subcommand)]
enum FolderCommand {
    /// Create a new folder inside the workspace
    Create {
        /// Folder name
        name: String,
    },

    /// List folders
    List,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let root = cli.root;
    let result = match cli.command {
        Commands::Init => cmd_init(&root),
        Commands::Folder { action: FolderCommand::Create { name } } => cmd_folder_create(&root, &name),
        Commands::Folder { action: FolderCommand::List } => cmd_folder_list(&root),
        Commands::Add { folder, inputs } => cmd_add(&root, &folder, inputs),
        Commands::Scan { folder, image } => cmd_scan(&root, &folder, &image),
        Commands::List => cmd_list(&root),
        Commands::Compile { output, page_size, margin, no_compress, open } => {
            cmd_compile(&root, output, page_size, margin, no_compress, open)
        }
        Commands::Merge { inputs, output, open } => cmd_merge(inputs, output, open),
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn open_workspace(root: &Path) -> Result<Workspace> {
    let config = Config::load(root)
        .with_context(|| format!("Failed to read config in {}", root.display()))?;
    Workspace::open(config)
        .with_context(|| format!("Failed to open workspace {}", root.display()))
}

/// Expand glob patterns in input paths, keeping the given order
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => log::warn!("glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            // Sort each pattern's matches for consistent ordering
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

fn cmd_init(root: &Path) -> Result<()> {
    let workspace = open_workspace(root)?;
    workspace.save()?;
    println!("Workspace: {}", workspace.root().display());
    Ok(())
}

fn cmd_folder_create(root: &Path, name: &str) -> Result<()> {
    let mut workspace = open_workspace(root)?;
    workspace.create_folder(name)?;
    workspace.save()?;
    println!("Folder '{}' created", name.trim());
    Ok(())
}

fn cmd_folder_list(root: &Path) -> Result<()> {
    let workspace = open_workspace(root)?;
    if workspace.folders().is_empty() {
        println!("No folders yet. Create one with: output-compiler folder create <NAME>");
        return Ok(());
    }
    for (name, path) in workspace.folders().iter() {
        println!("{}\t{}", name, path.display());
    }
    Ok(())
}

/// Add files one by one; a failing file is reported and the rest still go in
fn cmd_add(root: &Path, folder: &str, inputs: Vec<String>) -> Result<()> {
    let inputs = expand_globs(inputs)?;
    let mut workspace = open_workspace(root)?;

    let mut failures = 0;
    for path in &inputs {
        match workspace.add_file(path, folder) {
            Ok(added) => println!("File added to {}: {}", added.folder, added.file_name()),
            Err(e) => {
                eprintln!("Error: {}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    workspace.save()?;

    if failures > 0 {
        bail!("{} of {} file(s) could not be added", failures, inputs.len());
    }
    Ok(())
}

fn cmd_scan(root: &Path, folder: &str, image: &Path) -> Result<()> {
    let mut workspace = open_workspace(root)?;
    let added = workspace.capture(image, folder)?;
    println!("File added to {}: {}", added.folder, added.file_name());
    workspace.save()?;
    Ok(())
}

fn cmd_list(root: &Path) -> Result<()> {
    let workspace = open_workspace(root)?;
    if workspace.selected().is_empty() {
        println!("No files selected");
        return Ok(());
    }
    for (i, file) in workspace.selected().iter().enumerate() {
        println!("{:>3}. [{}] {}", i + 1, file.folder, file.file_name());
    }
    Ok(())
}

fn cmd_compile(
    root: &Path,
    output: Option<PathBuf>,
    page_size: Option<PageSize>,
    margin: Option<f64>,
    no_compress: bool,
    open: bool,
) -> Result<()> {
    let workspace = open_workspace(root)?;

    let mut options = workspace.config().compile_options();
    if let Some(output) = output {
        options.output_path = output;
    }
    if let Some(size) = page_size {
        options.placement.size = size;
    }
    if let Some(mm) = margin {
        options.placement.margins = Margins::uniform(Length::from_mm(mm.max(0.0)));
    }
    if no_compress {
        options.compress = false;
    }

    log::info!("Compiling {} file(s)...", workspace.selected().len());
    let report = workspace
        .compile_with(&options)
        .context("Failed to compile PDF")?;

    for skipped in &report.skipped {
        eprintln!("Skipped (not a PDF or image): {}", skipped.display());
    }
    println!(
        "PDF compiled successfully: {} ({} pages)",
        report.output.display(),
        report.pages
    );

    if open {
        open_file(&report.output)?;
    }

    Ok(())
}

/// Merge multiple PDFs into one
fn cmd_merge(inputs: Vec<String>, output: PathBuf, open: bool) -> Result<()> {
    let inputs = expand_globs(inputs)?;

    log::info!("Merging {} PDF files...", inputs.len());

    let options = MergeOptions {
        input_paths: inputs,
        output_path: output.clone(),
    };

    let pages = merge_pdfs(&options)?;

    println!("Merged {} pages to: {}", pages, output.display());

    if open {
        open_file(&output)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> Result<()> {
    let metadata = extract_metadata(input)?;

    println!("File: {}", input.display());
    println!("PDF version: {}", metadata.version);
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}
