pub mod aggregator;
pub mod etl;
pub mod extractor;
pub mod parser;
pub mod pipeline;
pub mod reconciler;

pub use crate::domain::model::{ReportIndex, ReportOutput, ResolvedRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

/// Knobs of the folder scan that are not the folder itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub extension: String,
    pub delimiter: char,
    pub in_offset: usize,
    pub out_offset: usize,
}

impl ScanSettings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            extension: config.extension().to_string(),
            delimiter: config.delimiter(),
            in_offset: config.in_offset(),
            out_offset: config.out_offset(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            extension: parser::DEFAULT_EXTENSION.to_string(),
            delimiter: extractor::DEFAULT_DELIMITER,
            in_offset: extractor::DEFAULT_IN_OFFSET,
            out_offset: extractor::DEFAULT_OUT_OFFSET,
        }
    }
}
