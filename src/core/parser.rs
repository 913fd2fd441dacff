use crate::domain::model::{FileNameMatch, FilenameDate};
use crate::utils::error::{EtlError, Result};
use regex::Regex;

pub const DEFAULT_EXTENSION: &str = "dat";

/// Matches `<code>_<DD><MM><YYYY>_<n>_<m>.<ext>` against the whole file name.
#[derive(Debug, Clone)]
pub struct FileRecordParser {
    pattern: Regex,
}

impl FileRecordParser {
    pub fn new(extension: &str) -> Result<Self> {
        let pattern = format!(
            r"^([0-9]+)_([0-9]{{2}})([0-9]{{2}})([0-9]{{4}})_[0-9]+_[0-9]+\.{}$",
            regex::escape(extension)
        );
        let pattern = Regex::new(&pattern).map_err(|e| EtlError::InvalidConfigValueError {
            field: "extension".to_string(),
            value: extension.to_string(),
            reason: format!("Cannot build file name pattern: {}", e),
        })?;
        Ok(Self { pattern })
    }

    /// Returns `None` for anything that is not a data file name.
    pub fn parse(&self, file_name: &str) -> Option<FileNameMatch> {
        let caps = self.pattern.captures(file_name)?;
        Some(FileNameMatch {
            magazine_code: caps[1].to_string(),
            date: FilenameDate {
                day: caps[2].to_string(),
                month: caps[3].to_string(),
                year: caps[4].to_string(),
            },
        })
    }
}

impl Default for FileRecordParser {
    fn default() -> Self {
        // the default extension is a literal word, so the pattern always compiles
        Self::new(DEFAULT_EXTENSION).expect("default file name pattern is valid")
    }
}
