use crate::core::reconciler::{sorted_entries, SubfolderReconciler};
use crate::core::ScanSettings;
use crate::domain::model::{ReportIndex, ResolvedRecord};
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::path::Path;

/// Scans every immediate subfolder of `main_folder` and buckets the resolved records by
/// modification date. Files directly under `main_folder` are ignored.
///
/// Any listing or stat failure aborts the whole scan; no partial index is returned.
pub fn scan_main_folder(main_folder: &Path, settings: &ScanSettings) -> Result<ReportIndex> {
    let reconciler = SubfolderReconciler::new(settings)?;
    let mut records: Vec<ResolvedRecord> = Vec::new();
    let mut subfolders = 0usize;

    for path in sorted_entries(main_folder)? {
        let metadata = fs::metadata(&path).map_err(|e| EtlError::scan(&path, e))?;
        if !metadata.is_dir() {
            tracing::debug!("Ignoring top-level entry {}", path.display());
            continue;
        }

        subfolders += 1;
        let found = reconciler.reconcile(&path)?;
        tracing::info!("📂 {}: {} record(s)", path.display(), found.len());
        records.extend(found);
    }

    let index: ReportIndex = records.into_iter().collect();
    tracing::info!(
        "Scanned {} subfolder(s): {} record(s) across {} date(s)",
        subfolders,
        index.record_count(),
        index.bucket_count()
    );

    Ok(index)
}
