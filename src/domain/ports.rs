use crate::domain::model::{ReportIndex, ReportOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn main_folder(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn archive_name(&self) -> &str;
    fn extension(&self) -> &str;
    fn delimiter(&self) -> char;
    fn in_offset(&self) -> usize;
    fn out_offset(&self) -> usize;
    fn include_json(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ReportIndex>;
    async fn transform(&self, index: ReportIndex) -> Result<ReportOutput>;
    async fn load(&self, output: ReportOutput) -> Result<String>;
}
