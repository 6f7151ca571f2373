//! Writing rendered documents to an output directory.
//!
//! Each documentation target becomes `<name>.rst`. A `config-generated.txt` marker file is
//! touched alongside so build tooling can tell when generation last ran.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the empty marker file written next to the generated documents
pub const MARKER_FILE: &str = "config-generated.txt";

/// Path of the document for target `name` inside `output_dir`.
pub fn document_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(format!("{}.rst", name))
}

/// Writes the rendered document for target `name` and returns its path.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be written.
pub fn write_document(output_dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = document_path(output_dir, name);
    write_to_file(content, &path)?;
    Ok(path)
}

/// Creates or truncates the marker file in `output_dir` and returns its path.
pub fn touch_marker(output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(MARKER_FILE);
    write_to_file("", &path)?;
    Ok(path)
}

/// Writes string content to a file.
///
/// Creates the file and any missing parent directories, or overwrites an existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
