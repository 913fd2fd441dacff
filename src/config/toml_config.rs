use crate::config::{DEFAULT_ARCHIVE_NAME, DEFAULT_OUTPUT_PATH};
use crate::core::{extractor, parser, ConfigProvider};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportConfig,
    pub scan: ScanConfig,
    #[serde(default)]
    pub load: LoadConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub main_folder: Option<String>,
    pub extension: Option<String>,
    pub delimiter: Option<String>,
    pub in_offset: Option<usize>,
    pub out_offset: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub archive_name: Option<String>,
    pub include_json: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_ROOT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("report.name", &self.report.name)?;

        let folder = validation::validate_required_field("scan.main_folder", &self.scan.main_folder)?;
        validation::validate_path("scan.main_folder", folder)?;
        if folder.contains("${") {
            return Err(EtlError::InvalidConfigValueError {
                field: "scan.main_folder".to_string(),
                value: folder.clone(),
                reason: "Unresolved environment variable".to_string(),
            });
        }

        validation::validate_extension("scan.extension", self.extension())?;
        if let Some(delimiter) = &self.scan.delimiter {
            validation::validate_single_char("scan.delimiter", delimiter)?;
        }

        validation::validate_positive_number("scan.in_offset", self.in_offset(), 1)?;
        validation::validate_positive_number("scan.out_offset", self.out_offset(), 1)?;
        if self.in_offset() == self.out_offset() {
            return Err(EtlError::ConfigValidationError {
                field: "scan.out_offset".to_string(),
                message: "in_offset and out_offset must point at different fields".to_string(),
            });
        }

        validation::validate_path("load.output_path", self.output_path())?;
        validation::validate_archive_name("load.archive_name", self.archive_name())?;

        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn main_folder(&self) -> Option<&str> {
        self.scan.main_folder.as_deref()
    }

    fn output_path(&self) -> &str {
        self.load.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn archive_name(&self) -> &str {
        self.load
            .archive_name
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_NAME)
    }

    fn extension(&self) -> &str {
        self.scan
            .extension
            .as_deref()
            .unwrap_or(parser::DEFAULT_EXTENSION)
    }

    fn delimiter(&self) -> char {
        self.scan
            .delimiter
            .as_deref()
            .and_then(|d| d.chars().next())
            .unwrap_or(extractor::DEFAULT_DELIMITER)
    }

    fn in_offset(&self) -> usize {
        self.scan.in_offset.unwrap_or(extractor::DEFAULT_IN_OFFSET)
    }

    fn out_offset(&self) -> usize {
        self.scan.out_offset.unwrap_or(extractor::DEFAULT_OUT_OFFSET)
    }

    fn include_json(&self) -> bool {
        self.load.include_json.unwrap_or(true)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
