//! JSON artifact writing.
//!
//! One document per dataset plus a run-level `index.json`. Writes are
//! atomic (write to `.tmp`, rename into place) so a crashed run never
//! leaves a half-written document for the site build to pick up.

use anyhow::{Context, Result};
use marketbrief_core::transform::DatasetDocument;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::RunSummary;

/// Output path for one dataset document.
pub fn document_path(output_dir: &Path, id: &str) -> PathBuf {
    output_dir.join(format!("{id}.json"))
}

/// Output path for the run summary index.
pub fn summary_path(output_dir: &Path) -> PathBuf {
    output_dir.join("index.json")
}

pub fn write_document(output_dir: &Path, id: &str, document: &DatasetDocument) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(document)
        .with_context(|| format!("failed to serialize document for '{id}'"))?;
    let path = document_path(output_dir, id);
    write_atomic(&path, &json)?;
    Ok(path)
}

pub fn write_summary(output_dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    let json =
        serde_json::to_string_pretty(summary).context("failed to serialize run summary")?;
    let path = summary_path(output_dir);
    write_atomic(&path, &json)?;
    Ok(path)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        anyhow::anyhow!("atomic rename to {} failed: {e}", path.display())
    })?;
    Ok(())
}
