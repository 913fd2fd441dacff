use crate::core::extractor::LastLineExtractor;
use crate::core::parser::FileRecordParser;
use crate::core::ScanSettings;
use crate::domain::model::{GroupKey, RawFileEntry, ResolvedRecord};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Collapses the data files of one subfolder into one record per logical reading.
#[derive(Debug, Clone)]
pub struct SubfolderReconciler {
    parser: FileRecordParser,
    extractor: LastLineExtractor,
}

impl SubfolderReconciler {
    pub fn new(settings: &ScanSettings) -> Result<Self> {
        Ok(Self {
            parser: FileRecordParser::new(&settings.extension)?,
            extractor: LastLineExtractor::new(
                settings.delimiter,
                settings.in_offset,
                settings.out_offset,
            ),
        })
    }

    pub fn reconcile(&self, subfolder: &Path) -> Result<Vec<ResolvedRecord>> {
        let groups = self.collect_groups(subfolder)?;
        tracing::debug!(
            "{}: {} group(s) after reconciliation",
            subfolder.display(),
            groups.len()
        );

        let records = groups
            .into_iter()
            .filter_map(|(key, entries)| {
                let winner = entries.into_iter().min_by(newest_first)?;
                tracing::trace!("{} resolved to {}", key, winner.file_name);
                let values = self.extractor.extract(&winner.file_path);
                Some(ResolvedRecord::from_entry(&winner, values))
            })
            .collect();

        Ok(records)
    }

    /// Groups matching files by key, keyed in first-encounter order.
    fn collect_groups(&self, subfolder: &Path) -> Result<IndexMap<GroupKey, Vec<RawFileEntry>>> {
        let mut groups: IndexMap<GroupKey, Vec<RawFileEntry>> = IndexMap::new();

        for path in sorted_entries(subfolder)? {
            let metadata = fs::metadata(&path).map_err(|e| EtlError::scan(&path, e))?;
            if !metadata.is_file() {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(parsed) = self.parser.parse(file_name) else {
                tracing::debug!("Skipping {}: not a data file", path.display());
                continue;
            };

            let modified_at = metadata.modified().map_err(|e| EtlError::scan(&path, e))?;
            let entry = RawFileEntry {
                file_name: file_name.to_string(),
                file_path: path.clone(),
                magazine_code: parsed.magazine_code,
                date_from_filename: parsed.date,
                modification_date: local_date(modified_at),
                modified_at,
            };

            groups.entry(entry.group_key()).or_default().push(entry);
        }

        Ok(groups)
    }
}

/// Directory entries sorted by name, so repeated scans visit files in the same order.
pub(crate) fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| EtlError::scan(dir, e))? {
        let entry = entry.map_err(|e| EtlError::scan(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

pub(crate) fn local_date(time: SystemTime) -> chrono::NaiveDate {
    DateTime::<Local>::from(time).date_naive()
}

/// Latest modification first; equal timestamps fall back to the smaller file name.
fn newest_first(a: &RawFileEntry, b: &RawFileEntry) -> Ordering {
    b.modified_at
        .cmp(&a.modified_at)
        .then_with(|| a.file_name.cmp(&b.file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use std::fs::File;
    use tempfile::TempDir;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> SystemTime {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .into()
    }

    fn write_dat(dir: &Path, name: &str, content: &str, modified: SystemTime) {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    fn reconciler() -> SubfolderReconciler {
        SubfolderReconciler::new(&ScanSettings::default()).unwrap()
    }

    #[test]
    fn test_single_file_fields() {
        let dir = TempDir::new().unwrap();
        write_dat(
            dir.path(),
            "7_01022024_1_1.dat",
            "a|b|c|10|20|d|e\n",
            at(2024, 2, 3, 12, 0),
        );

        let records = reconciler().reconcile(dir.path()).unwrap();
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.file_name, "7_01022024_1_1.dat");
        assert_eq!(r.magazine_code, "7");
        assert_eq!(r.date_from_filename.to_string(), "01/02/2024");
        assert_eq!(r.modification_date, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert_eq!(r.in_value, "10");
        assert_eq!(r.out_value, "20");
    }

    #[test]
    fn test_duplicates_resolve_to_latest_modification() {
        let dir = TempDir::new().unwrap();
        write_dat(dir.path(), "7_01022024_1_1.dat", "a|1|2|x|y", at(2024, 2, 3, 18, 0));
        write_dat(dir.path(), "7_01022024_2_1.dat", "a|3|4|x|y", at(2024, 2, 3, 9, 0));
        write_dat(dir.path(), "7_01022024_3_1.dat", "a|5|6|x|y", at(2024, 2, 3, 11, 0));

        let records = reconciler().reconcile(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "7_01022024_1_1.dat");
        assert_eq!(records[0].in_value, "1");
        assert_eq!(records[0].out_value, "2");
    }

    #[test]
    fn test_different_keys_stay_separate_in_encounter_order() {
        let dir = TempDir::new().unwrap();
        // same reading, different modification days
        write_dat(dir.path(), "7_01022024_1_1.dat", "", at(2024, 2, 3, 12, 0));
        write_dat(dir.path(), "7_01022024_2_1.dat", "", at(2024, 2, 4, 12, 0));
        // different magazine
        write_dat(dir.path(), "8_01022024_1_1.dat", "", at(2024, 2, 3, 12, 0));
        // different filename date
        write_dat(dir.path(), "7_02022024_1_1.dat", "", at(2024, 2, 3, 12, 0));

        let records = reconciler().reconcile(dir.path()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "7_01022024_1_1.dat",
                "7_01022024_2_1.dat",
                "7_02022024_1_1.dat",
                "8_01022024_1_1.dat",
            ]
        );
    }

    #[test]
    fn test_foreign_entries_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.txt"), "notes").unwrap();
        fs::write(dir.path().join(".hidden"), "x").unwrap();
        fs::create_dir(dir.path().join("5_01012024_1_1.dat")).unwrap();
        write_dat(dir.path(), "5_01012024_1_2.dat", "1|2|3|4", at(2024, 1, 2, 8, 0));

        let records = reconciler().reconcile(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "5_01012024_1_2.dat");
    }

    #[test]
    fn test_unreadable_content_keeps_record_with_blank_values() {
        let dir = TempDir::new().unwrap();
        write_dat(dir.path(), "9_10102024_1_1.dat", "", at(2024, 10, 11, 7, 0));
        write_dat(dir.path(), "9_11102024_1_1.dat", "too|few", at(2024, 10, 11, 7, 0));

        let records = reconciler().reconcile(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.in_value.is_empty() && r.out_value.is_empty()));
    }

    #[test]
    fn test_exact_tie_prefers_smaller_file_name() {
        let dir = TempDir::new().unwrap();
        let same = at(2024, 3, 1, 10, 30);
        write_dat(dir.path(), "2_01032024_9_1.dat", "a|b|c|d", same);
        write_dat(dir.path(), "2_01032024_1_1.dat", "a|b|c|d", same);

        let records = reconciler().reconcile(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "2_01032024_1_1.dat");
    }

    #[test]
    fn test_missing_subfolder_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = reconciler()
            .reconcile(&dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, EtlError::Scan { .. }));
    }
}
