//! Report sink: CSV records and the grouped text document.
//!
//! Both artifacts are written to temporary files next to their targets and
//! only moved into place once both are complete, so a failed export never
//! leaves one report updated and the other stale.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Result, ScanError};
use crate::models::MatchRecord;
use crate::report::Report;

/// Where a report was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub txt: PathBuf,
}

fn staging_file(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).map_err(|e| ScanError::io(target, e))
}

/// Stage records with the header `Keyword,Lyrics,Song,Album,Artist`.
fn stage_csv(target: &Path, records: &[MatchRecord]) -> Result<NamedTempFile> {
    let mut staged = staging_file(target)?;
    {
        let mut writer = csv::Writer::from_writer(staged.as_file_mut());
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush().map_err(|e| ScanError::io(target, e))?;
    }
    Ok(staged)
}

fn stage_text(target: &Path, lines: &[String]) -> Result<NamedTempFile> {
    let mut staged = staging_file(target)?;
    staged
        .write_all(lines.join("\n").as_bytes())
        .and_then(|_| staged.flush())
        .map_err(|e| ScanError::io(target, e))?;
    Ok(staged)
}

fn persist(staged: NamedTempFile, target: &Path) -> Result<()> {
    staged
        .persist(target)
        .map(|_| ())
        .map_err(|e| ScanError::io(target, e.error))
}

/// Export both artifacts. Nothing is written for an empty report; returns
/// `None` in that case.
pub fn export_report(report: &Report, csv: &Path, txt: &Path) -> Result<Option<ExportPaths>> {
    if report.is_empty() {
        info!("No records produced, skipping export");
        return Ok(None);
    }

    let staged_csv = stage_csv(csv, &report.records)?;
    let staged_txt = stage_text(txt, &report.text)?;

    persist(staged_csv, csv)?;
    info!("Wrote {} records to {}", report.records.len(), csv.display());
    persist(staged_txt, txt)?;
    info!("Wrote {} text lines to {}", report.text.len(), txt.display());

    Ok(Some(ExportPaths {
        csv: csv.to_path_buf(),
        txt: txt.to_path_buf(),
    }))
}
