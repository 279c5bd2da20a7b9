//! Workspace configuration
//!
//! Values come from three layers: built-in defaults, an optional
//! `config.json` inside the workspace root, and command-line flags applied
//! by the binary on top of the loaded value.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::layout::{Length, Margins, PagePlacement, PageSize};
use crate::pdf::CompileOptions;

/// Default workspace directory, relative to the current directory
pub const DEFAULT_ROOT: &str = "OutputCompiler";

/// Default name of the compiled PDF inside the workspace
pub const DEFAULT_OUTPUT_NAME: &str = "compiled_output.pdf";

/// Config file looked up inside the workspace root
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace root; never read from the file that lives inside it
    #[serde(skip)]
    pub root: PathBuf,
    /// File name of the compiled PDF
    pub output_name: String,
    /// Page size used for image pages
    pub page_size: PageSize,
    /// Margin around images on fixed-size pages
    pub margin_mm: f64,
    /// Flate-compress the compiled PDF
    pub compress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            page_size: PageSize::Fit,
            margin_mm: 10.0,
            compress: true,
        }
    }
}

impl Config {
    /// Defaults for `root`, overlaid with `root/config.json` when present
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let path = root.join(CONFIG_FILE);

        let mut config = if path.is_file() {
            log::debug!("Loading config from {}", path.display());
            serde_json::from_str::<Config>(&fs::read_to_string(&path)?)?
        } else {
            Config::default()
        };
        config.root = root;
        Ok(config)
    }

    /// Write the current settings to `root/config.json`
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.root.join(CONFIG_FILE), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_name)
    }

    pub fn placement(&self) -> PagePlacement {
        PagePlacement {
            size: self.page_size,
            margins: Margins::uniform(Length::from_mm(self.margin_mm.max(0.0))),
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            output_path: self.output_path(),
            placement: self.placement(),
            compress: self.compress,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
