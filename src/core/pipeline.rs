use crate::core::aggregator::scan_main_folder;
use crate::core::{
    ConfigProvider, Pipeline, ReportIndex, ReportOutput, ResolvedRecord, ScanSettings, Storage,
};
use crate::domain::model::{MODIFICATION_DATE_FORMAT, REPORT_COLUMNS};
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::path::PathBuf;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const JSON_ENTRY_NAME: &str = "report.json";

/// Scans the configured main folder and writes one CSV table per modification date into
/// a ZIP archive, plus an optional JSON dump of the whole index.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

/// Renders one date bucket with the fixed report header.
pub fn render_table(records: &[ResolvedRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REPORT_COLUMNS)?;
    for record in records {
        writer.write_record(record.row())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::ProcessingError {
            message: format!("Failed to flush CSV table: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV table is not valid UTF-8: {}", e),
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<ReportIndex> {
        // reject the request before touching the file system
        let main_folder = match self.config.main_folder() {
            Some(folder) if !folder.trim().is_empty() => PathBuf::from(folder),
            _ => {
                return Err(EtlError::MissingConfigError {
                    field: "main_folder".to_string(),
                })
            }
        };
        let settings = ScanSettings::from_config(&self.config);

        tracing::debug!("Scanning {} with {:?}", main_folder.display(), settings);
        tokio::task::spawn_blocking(move || scan_main_folder(&main_folder, &settings))
            .await
            .map_err(|e| EtlError::ProcessingError {
                message: format!("Scan task failed: {}", e),
            })?
    }

    async fn transform(&self, index: ReportIndex) -> Result<ReportOutput> {
        let mut tables = Vec::with_capacity(index.bucket_count());
        for (date, records) in index.iter() {
            let name = format!("{}.csv", date.format(MODIFICATION_DATE_FORMAT));
            tables.push((name, render_table(records)?));
        }

        let json_output = if self.config.include_json() {
            Some(serde_json::to_string_pretty(&index)?)
        } else {
            None
        };

        Ok(ReportOutput {
            tables,
            json_output,
            record_count: index.record_count(),
        })
    }

    async fn load(&self, output: ReportOutput) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        tracing::debug!(
            "Creating ZIP file with {} table(s) for {} record(s)",
            output.tables.len(),
            output.record_count
        );

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for (name, body) in &output.tables {
                zip.start_file(name.as_str(), SimpleFileOptions::default())?;
                zip.write_all(body.as_bytes())?;
            }

            if let Some(json) = &output.json_output {
                zip.start_file(JSON_ENTRY_NAME, SimpleFileOptions::default())?;
                zip.write_all(json.as_bytes())?;
            }

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(output_path)
    }
}
