//! Output Compiler Library
//!
//! Collects images and PDFs into named folders and compiles them into a
//! single PDF. This library provides functionality to:
//! - Register folders inside a workspace directory
//! - Copy files into folders while keeping an ordered selection
//! - Convert PNG and JPEG images to single-page PDFs
//! - Merge PDF pages and image pages into one output document
//!
//! # Example
//!
//! ```no_run
//! use output_compiler::config::Config;
//! use output_compiler::workspace::Workspace;
//! use std::path::Path;
//!
//! let mut workspace = Workspace::open(Config::load("OutputCompiler")?)?;
//! workspace.create_folder("Taxes")?;
//! workspace.add_file(Path::new("w2.pdf"), "Taxes")?;
//! workspace.add_file(Path::new("receipt.jpg"), "Taxes")?;
//! workspace.save()?;
//!
//! let report = workspace.compile()?;
//! println!("PDF compiled successfully: {}", report.output.display());
//! # Ok::<(), output_compiler::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod workspace;

// Re-export commonly used items
pub use error::{Error, Result};
