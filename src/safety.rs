//! Safety checks for report output paths.
//!
//! The exporter truncates its targets, so the keyword source and the two
//! report files must never resolve to the same path. Paths are compared after
//! resolution: `./keywords.txt` and `keywords.txt` are the same file.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, ScanError};

/// Validates that the report paths are safe to overwrite.
///
/// Checks:
/// - The CSV and text reports go to different files
/// - Neither report overwrites the keyword source
pub fn validate_output_paths(csv: &Path, txt: &Path, keyword_source: &Path) -> Result<()> {
    let csv_resolved = resolve(csv);
    let txt_resolved = resolve(txt);
    let source_resolved = resolve(keyword_source);

    if csv_resolved == txt_resolved {
        return Err(ScanError::configuration(format!(
            "Safety check failed: CSV report '{}' and text report '{}' are the same file",
            csv.display(),
            txt.display()
        )));
    }

    for (output, resolved) in [(csv, &csv_resolved), (txt, &txt_resolved)] {
        if *resolved == source_resolved {
            return Err(ScanError::configuration(format!(
                "Safety check failed: output '{}' cannot be the keyword source '{}'",
                output.display(),
                keyword_source.display()
            )));
        }
    }

    Ok(())
}

/// Best-effort absolute form of a path that may not exist yet.
///
/// Existing files are canonicalized. For a new file the parent directory is
/// canonicalized and the file name appended; if the parent is missing too the
/// lexically normalized absolute path is used.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    let normalized = normalize_lexically(&absolute);

    match (normalized.parent(), normalized.file_name()) {
        (Some(parent), Some(name)) => std::fs::canonicalize(parent)
            .map(|dir| dir.join(name))
            .unwrap_or(normalized),
        _ => normalized,
    }
}

/// Drop `.` components and fold `..` into its parent without touching the disk.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
