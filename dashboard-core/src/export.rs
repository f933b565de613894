use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::dashboard::CurrentSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// The raw API document, pretty-printed.
    Json,
    /// The rendered report text.
    Text,
}

impl ExportFormat {
    /// `.json` (any case) exports JSON; everything else is text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Write the snapshot to `path`, choosing the format from its extension.
pub fn export_snapshot(snapshot: &CurrentSnapshot, path: &Path) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path);
    let contents = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&snapshot.payload)
            .context("Failed to serialize weather snapshot")?,
        ExportFormat::Text => snapshot.report.clone(),
    };

    fs::write(path, contents)
        .with_context(|| format!("Failed to write weather snapshot: {}", path.display()))?;

    tracing::info!(
        city = %snapshot.city,
        path = %path.display(),
        ?format,
        "Saved weather snapshot"
    );
    Ok(format)
}
