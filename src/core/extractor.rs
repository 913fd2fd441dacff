use crate::domain::model::ExtractedValues;
use std::fs;
use std::path::Path;

pub const DEFAULT_DELIMITER: char = '|';
pub const DEFAULT_IN_OFFSET: usize = 4;
pub const DEFAULT_OUT_OFFSET: usize = 3;

/// Pulls the "in" and "out" measurements from the last line of a data file.
///
/// Offsets count fields from the end of the line, `1` being the last field.
/// Nothing here is fatal: a file that cannot be read or does not carry enough fields
/// yields empty values so that one bad file does not blank the whole report.
#[derive(Debug, Clone, Copy)]
pub struct LastLineExtractor {
    delimiter: char,
    in_offset: usize,
    out_offset: usize,
}

impl LastLineExtractor {
    pub fn new(delimiter: char, in_offset: usize, out_offset: usize) -> Self {
        Self {
            delimiter,
            in_offset,
            out_offset,
        }
    }

    pub fn extract(&self, path: &Path) -> ExtractedValues {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                return ExtractedValues::default();
            }
        };

        let content = String::from_utf8_lossy(&bytes);
        match self.extract_from_str(&content) {
            Some(values) => values,
            None => {
                tracing::warn!(
                    "No usable last line in {}, leaving values blank",
                    path.display()
                );
                ExtractedValues::default()
            }
        }
    }

    pub fn extract_from_str(&self, content: &str) -> Option<ExtractedValues> {
        let last_line = content.trim_end().lines().last()?;
        let fields: Vec<&str> = last_line.split(self.delimiter).collect();

        let in_value = field_from_end(&fields, self.in_offset)?;
        let out_value = field_from_end(&fields, self.out_offset)?;

        Some(ExtractedValues {
            in_value: in_value.to_string(),
            out_value: out_value.to_string(),
        })
    }
}

impl Default for LastLineExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER, DEFAULT_IN_OFFSET, DEFAULT_OUT_OFFSET)
    }
}

fn field_from_end<'a>(fields: &[&'a str], offset: usize) -> Option<&'a str> {
    if offset == 0 || offset > fields.len() {
        return None;
    }
    fields.get(fields.len() - offset).copied()
}
