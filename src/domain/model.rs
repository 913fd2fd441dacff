use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

pub const MODIFICATION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Column set handed to every renderer, in display order.
pub const REPORT_COLUMNS: [&str; 6] = [
    "Modification Date",
    "File Name",
    "Magazine Code",
    "Date From Filename",
    "In Value",
    "Out Value",
];

/// Date digits as written in a data file name. Not checked against the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilenameDate {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl FilenameDate {
    /// `DDMMYYYY`, the form used inside group keys.
    pub fn compact(&self) -> String {
        format!("{}{}{}", self.day, self.month, self.year)
    }
}

impl fmt::Display for FilenameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.day, self.month, self.year)
    }
}

impl Serialize for FilenameDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameMatch {
    pub magazine_code: String,
    pub date: FilenameDate,
}

#[derive(Debug, Clone)]
pub struct RawFileEntry {
    pub file_path: PathBuf,
    pub file_name: String,
    pub magazine_code: String,
    pub date_from_filename: FilenameDate,
    pub modification_date: NaiveDate,
    pub modified_at: SystemTime,
}

impl RawFileEntry {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            modification_date: self.modification_date,
            magazine_code: self.magazine_code.clone(),
            date_from_filename: self.date_from_filename.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub modification_date: NaiveDate,
    pub magazine_code: String,
    pub date_from_filename: FilenameDate,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.modification_date.format(MODIFICATION_DATE_FORMAT),
            self.magazine_code,
            self.date_from_filename.compact()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedValues {
    pub in_value: String,
    pub out_value: String,
}

impl ExtractedValues {
    pub fn is_empty(&self) -> bool {
        self.in_value.is_empty() && self.out_value.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord {
    pub file_name: String,
    pub magazine_code: String,
    pub date_from_filename: FilenameDate,
    pub modification_date: NaiveDate,
    pub in_value: String,
    pub out_value: String,
}

impl ResolvedRecord {
    pub fn from_entry(entry: &RawFileEntry, values: ExtractedValues) -> Self {
        Self {
            file_name: entry.file_name.clone(),
            magazine_code: entry.magazine_code.clone(),
            date_from_filename: entry.date_from_filename.clone(),
            modification_date: entry.modification_date,
            in_value: values.in_value,
            out_value: values.out_value,
        }
    }

    /// One table row, ordered as [`REPORT_COLUMNS`].
    pub fn row(&self) -> [String; 6] {
        [
            self.modification_date
                .format(MODIFICATION_DATE_FORMAT)
                .to_string(),
            self.file_name.clone(),
            self.magazine_code.clone(),
            self.date_from_filename.to_string(),
            self.in_value.clone(),
            self.out_value.clone(),
        ]
    }
}

/// Records bucketed by modification date. Buckets keep first-seen order and records keep
/// arrival order within a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportIndex {
    buckets: IndexMap<NaiveDate, Vec<ResolvedRecord>>,
}

impl ReportIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResolvedRecord) {
        self.buckets
            .entry(record.modification_date)
            .or_default()
            .push(record);
    }

    pub fn get(&self, date: &NaiveDate) -> Option<&[ResolvedRecord]> {
        self.buckets.get(date).map(Vec::as_slice)
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &[ResolvedRecord])> {
        self.buckets.iter().map(|(date, records)| (date, records.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn record_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

impl FromIterator<ResolvedRecord> for ReportIndex {
    fn from_iter<I: IntoIterator<Item = ResolvedRecord>>(iter: I) -> Self {
        let mut index = ReportIndex::new();
        for record in iter {
            index.push(record);
        }
        index
    }
}

impl Serialize for ReportIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (date, records) in &self.buckets {
            map.serialize_entry(date, records)?;
        }
        map.end()
    }
}

/// Rendered tables, ready to be archived.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    /// (entry name, CSV body) per date bucket, in bucket order.
    pub tables: Vec<(String, String)>,
    pub json_output: Option<String>,
    pub record_count: usize,
}
