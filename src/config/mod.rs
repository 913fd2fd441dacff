#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::{extractor, parser, ConfigProvider};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_ARCHIVE_NAME: &str = "magazine_report.zip";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "magazine-report")]
#[command(about = "Reconcile dated magazine data files into a per-day report")]
pub struct CliConfig {
    /// Folder whose subfolders hold the data files
    #[arg(long, short = 'm')]
    pub main_folder: Option<String>,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    /// Data file extension, without the dot
    #[arg(long, default_value = parser::DEFAULT_EXTENSION)]
    pub extension: String,

    #[arg(long, default_value_t = extractor::DEFAULT_DELIMITER)]
    pub delimiter: char,

    #[arg(long, help = "Do not add report.json to the archive")]
    pub no_json: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn main_folder(&self) -> Option<&str> {
        self.main_folder.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    fn delimiter(&self) -> char {
        self.delimiter
    }

    fn in_offset(&self) -> usize {
        extractor::DEFAULT_IN_OFFSET
    }

    fn out_offset(&self) -> usize {
        extractor::DEFAULT_OUT_OFFSET
    }

    fn include_json(&self) -> bool {
        !self.no_json
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let folder = validation::validate_required_field("main_folder", &self.main_folder)?;
        validation::validate_path("main_folder", folder)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_archive_name("archive_name", &self.archive_name)?;
        validation::validate_extension("extension", &self.extension)?;
        validation::validate_single_char("delimiter", &self.delimiter.to_string())?;
        Ok(())
    }
}
