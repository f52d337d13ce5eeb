use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::models::{Request, RequestStatus, Snapshot};

/// File name for the fulfilled-requests download
pub const FULFILLED_CSV_FILENAME: &str = "permintaan_terpenuhi.csv";
/// MIME type of the fulfilled-requests download
pub const CSV_MIME_TYPE: &str = "text/csv; charset=utf-8";

/// A generated CSV file ready to be offered as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub content: String,
    /// Number of data rows (excluding the header)
    pub rows: usize,
}

impl CsvExport {
    /// Writes the file into `dir` and returns the full path
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory: {:?}", dir))?;
        let path = dir.join(self.filename);
        fs::write(&path, &self.content)
            .with_context(|| format!("Failed to write export file: {:?}", path))?;
        log::info!("Exported {} fulfilled requests to {}", self.rows, path.display());
        Ok(path)
    }
}

/// Builds the CSV of fulfilled requests.
///
/// The header is the request field names in declaration order; each row is
/// the raw values joined by commas without quoting.
///
/// `buktiTerkait` holds several evidence ids, which are joined with `;`
/// (`BKT-001;BKT-003`) rather than commas so each request stays one row of
/// exactly ten cells. Consumers reading the column should split on `;`.
pub fn export_fulfilled_csv(requests: &[Request]) -> StoreResult<CsvExport> {
    let fulfilled: Vec<&Request> = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Fulfilled)
        .collect();

    if fulfilled.is_empty() {
        return Err(StoreError::EmptyExport);
    }

    let mut lines = Vec::with_capacity(fulfilled.len() + 1);
    lines.push(Request::FIELD_NAMES.join(","));
    for req in &fulfilled {
        lines.push(req.field_values().join(","));
    }

    Ok(CsvExport {
        filename: FULFILLED_CSV_FILENAME,
        mime_type: CSV_MIME_TYPE,
        content: lines.join("\n"),
        rows: fulfilled.len(),
    })
}

/// Export the whole snapshot to JSON format
pub fn export_snapshot_json(snapshot: &Snapshot, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON export: {:?}", output_path))?;

    log::info!(
        "Exported snapshot to {} ({} projects, {} requests, {} evidence)",
        output_path.display(),
        snapshot.audit_projects.len(),
        snapshot.requests.len(),
        snapshot.evidence.len()
    );

    Ok(())
}
