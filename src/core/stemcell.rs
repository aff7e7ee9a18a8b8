use crate::core::download::Downloader;
use crate::domain::model::{DownloadOutcome, StemcellDescriptor};
use crate::utils::error::Result;

/// 依序下載設定檔中列出的 stemcell
pub struct StemcellFetcher {
    downloader: Downloader,
    catalog: Vec<StemcellDescriptor>,
}

impl StemcellFetcher {
    pub fn new(downloader: Downloader, catalog: Vec<StemcellDescriptor>) -> Self {
        Self {
            downloader,
            catalog,
        }
    }

    pub fn catalog(&self) -> &[StemcellDescriptor] {
        &self.catalog
    }

    /// 下載單一 stemcell；descriptor 自帶版本時優先使用
    pub async fn fetch(&self, stemcell: &StemcellDescriptor, version: u32) -> Result<DownloadOutcome> {
        let version = stemcell.version.unwrap_or(version);
        tracing::info!(
            "📦 Fetching {} stemcell {} (v{})",
            stemcell.platform_product_name,
            stemcell.content_host_name,
            version
        );
        self.downloader
            .download(&stemcell.content_host_name, version, None)
            .await
    }

    /// 逐一下載，遇到第一個錯誤即停止
    pub async fn fetch_all(&self, version: u32) -> Result<Vec<(StemcellDescriptor, DownloadOutcome)>> {
        let mut outcomes = Vec::with_capacity(self.catalog.len());
        for stemcell in &self.catalog {
            let outcome = self.fetch(stemcell, version).await?;
            tracing::info!("✅ {}", outcome);
            outcomes.push((stemcell.clone(), outcome));
        }
        Ok(outcomes)
    }
}
