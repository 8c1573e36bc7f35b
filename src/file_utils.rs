use anyhow::{Context, Result, anyhow};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::render::{CONTENT_PLACEHOLDER, DEFAULT_TEMPLATE};

// @module: File and directory utilities

/// Path argument meaning standard input
pub const STDIN_PATH: &str = "-";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path for a translated book
    // @params: input_file, output_dir, target_language
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();

        let stem = match input_file.file_stem() {
            Some(stem) if input_file.as_os_str() != STDIN_PATH => stem.to_string_lossy().to_string(),
            _ => "book".to_string(),
        };

        output_dir
            .as_ref()
            .join(format!("{}.{}.html", stem, target_language.to_lowercase()))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read the input text from a file, or from stdin when the path is `-`
    pub fn read_input<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        if path.as_os_str() == STDIN_PATH {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read text from stdin")?;
            return Ok(text);
        }

        if !Self::file_exists(path) {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }
        Self::read_to_string(path)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load an HTML template, or the bundled one when no path is given
    pub fn load_template(path: Option<&Path>) -> Result<String> {
        let Some(path) = path else {
            return Ok(DEFAULT_TEMPLATE.to_string());
        };

        let template = Self::read_to_string(path)?;
        if !template.contains(CONTENT_PLACEHOLDER) {
            return Err(anyhow!(
                "Template {:?} has no {} placeholder",
                path,
                CONTENT_PLACEHOLDER
            ));
        }
        Ok(template)
    }
}
