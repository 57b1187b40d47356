//! Read → sanitize → write over a single specification file.
//!
//! The file is overwritten in place with `std::fs::write`: no backup and no
//! temporary file plus rename. A failed read leaves the file untouched.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::sanitize::{SanitizeMode, Sanitizer};

/// Options for one patch run.
#[derive(Debug, Clone)]
pub struct PatchOptions {
    pub field: String,
    pub mode: SanitizeMode,
    /// Compute the result but do not write it.
    pub dry_run: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            field: crate::sanitize::DEFAULT_FIELD.to_string(),
            mode: SanitizeMode::default(),
            dry_run: false,
        }
    }
}

/// Outcome of [`patch_file`], printed with `--json`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PatchReport {
    pub path: PathBuf,
    pub field: String,
    pub mode: SanitizeMode,
    pub removed_leading: usize,
    pub removed_trailing: usize,
    pub bytes_before: usize,
    pub bytes_after: usize,
    pub written: bool,
}

impl PatchReport {
    pub fn removed(&self) -> usize {
        self.removed_leading + self.removed_trailing
    }
}

/// Strip the configured field from the document at `path` and write it back.
///
/// The file is rewritten even when nothing matched, so a successful run
/// always leaves exactly the sanitized text on disk. With `dry_run` nothing
/// is written.
pub fn patch_file(path: &Path, options: &PatchOptions) -> Result<PatchReport> {
    info!("Looking for file at: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read specification: {}", path.display()))?;

    info!("File found. Patching...");

    let sanitizer = Sanitizer::new(&options.field)?;
    let result = sanitizer
        .sanitize(&content, options.mode)
        .with_context(|| format!("Failed to sanitize {}", path.display()))?;

    debug!(
        leading = result.leading,
        trailing = result.trailing,
        mode = %options.mode,
        "removed '{}' fields",
        sanitizer.field()
    );

    let written = if options.dry_run {
        info!("Dry run: {} not modified", path.display());
        false
    } else {
        std::fs::write(path, &result.text)
            .with_context(|| format!("Failed to write specification: {}", path.display()))?;
        info!("Successfully patched {}", path.display());
        true
    };

    Ok(PatchReport {
        path: path.to_path_buf(),
        field: sanitizer.field().to_string(),
        mode: options.mode,
        removed_leading: result.leading,
        removed_trailing: result.trailing,
        bytes_before: content.len(),
        bytes_after: result.text.len(),
        written,
    })
}

/// Report how many fields a patch would remove, without writing.
pub fn check_file(path: &Path, field: &str, mode: SanitizeMode) -> Result<PatchReport> {
    let options = PatchOptions {
        field: field.to_string(),
        mode,
        dry_run: true,
    };
    patch_file(path, &options)
}
