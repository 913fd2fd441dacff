pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::TomlConfig;
pub use core::{
    aggregator::scan_main_folder, etl::EtlEngine, pipeline::ReportPipeline, ScanSettings,
};
pub use domain::model::{ReportIndex, ResolvedRecord};
pub use utils::error::{EtlError, Result};
