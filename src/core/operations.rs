use crate::adapters::{FileTokenProvider, ReqwestTransport};
use crate::config::{PivnetConfig, ProductFileDefaults, ReleaseDefaults};
use crate::core::client::{ApiClient, RetryPolicy};
use crate::domain::model::{
    ApiMethod, NewProductFile, ProductFile, ProductFileInner, Release, ReleaseInner,
};
use crate::domain::ports::{HttpTransport, TokenProvider};
use crate::utils::error::{PivnetError, Result};
use chrono::{Months, NaiveDate};
use std::collections::BTreeMap;

const API_DATE_FORMAT: &str = "%Y-%m-%d";
const RELEASED_AT_FORMAT: &str = "%m/%d/%Y";

/// 平台 API 的四個操作：驗證 token、建立/刪除 release、建立 product file
pub struct PivnetApi<T: HttpTransport, P: TokenProvider> {
    client: ApiClient<T, P>,
    release_defaults: ReleaseDefaults,
    product_file_defaults: ProductFileDefaults,
}

impl PivnetApi<ReqwestTransport, FileTokenProvider> {
    pub fn from_config(config: &PivnetConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        let tokens = FileTokenProvider::new(config.token_file.clone());
        let client = ApiClient::new(transport, tokens, config.api_host.clone()).with_retry(
            RetryPolicy {
                attempts: config.retry_attempts,
                delay: config.retry_delay(),
            },
        );
        Ok(Self::new(
            client,
            config.release.clone(),
            config.product_file.clone(),
        ))
    }
}

impl<T: HttpTransport, P: TokenProvider> PivnetApi<T, P> {
    pub fn new(
        client: ApiClient<T, P>,
        release_defaults: ReleaseDefaults,
        product_file_defaults: ProductFileDefaults,
    ) -> Self {
        Self {
            client,
            release_defaults,
            product_file_defaults,
        }
    }

    /// `GET /api/v2/authentication`，只用來確認 token 可用
    pub async fn verify_authentication(&self) -> Result<()> {
        let response = self
            .client
            .request(ApiMethod::Get, "/api/v2/authentication", None)
            .await?;
        tracing::info!("✅ Authentication verified ({})", response.status_message);
        Ok(())
    }

    /// 組出 release payload；支援期限為 `today` 加上 `support_years` 年
    pub fn build_release(&self, version: &str, description: &str, today: NaiveDate) -> Result<Release> {
        let defaults = &self.release_defaults;
        let end_date = today
            .checked_add_months(Months::new(defaults.support_years * 12))
            .ok_or_else(|| PivnetError::config("release support window overflows the calendar"))?;
        let end = end_date.format(API_DATE_FORMAT).to_string();

        let mut eula = BTreeMap::new();
        eula.insert("slug".to_string(), defaults.eula_slug.clone());

        Ok(Release {
            release: ReleaseInner {
                version: version.to_string(),
                release_notes_url: defaults.release_notes_url.clone(),
                description: description.to_string(),
                release_date: today.format(API_DATE_FORMAT).to_string(),
                release_type: defaults.release_type.clone(),
                end_of_support_date: end.clone(),
                end_of_guidance_date: end.clone(),
                end_of_availability_date: end,
                availability: defaults.availability.clone(),
                eula,
                oss_compliant: defaults.oss_compliant.clone(),
                eccn: defaults.eccn.clone(),
                license_exception: defaults.license_exception.clone(),
                controlled: defaults.controlled,
            },
        })
    }

    /// 建立 release 並回傳 API 指派的 id（`release.id`）
    pub async fn create_release(
        &self,
        product_slug: &str,
        version: &str,
        description: &str,
    ) -> Result<u64> {
        let today = chrono::Local::now().date_naive();
        let release = self.build_release(version, description, today)?;
        let body = serde_json::to_vec_pretty(&release)?;
        tracing::debug!("POST release payload:\n{}", String::from_utf8_lossy(&body));

        let path = format!("/api/v2/products/{}/releases", product_slug);
        let response = self.client.request(ApiMethod::Post, &path, Some(body)).await?;
        let payload = response
            .payload
            .ok_or_else(|| PivnetError::malformed("create release returned an empty body"))?;
        let release_id = payload.require_id(&["release", "id"])?;

        tracing::info!(
            "✅ Created release {} of '{}' (id {}, {})",
            version,
            product_slug,
            release_id,
            response.status_message
        );
        Ok(release_id)
    }

    /// 刪除 release；不解析回應內容
    pub async fn delete_release(&self, product_slug: &str, release_id: u64) -> Result<()> {
        let path = format!("/api/v2/products/{}/releases/{}", product_slug, release_id);
        let response = self
            .client
            .request_status_only(ApiMethod::Delete, &path, None)
            .await?;
        tracing::info!(
            "🗑️ Deleted release {} of '{}' ({})",
            release_id,
            product_slug,
            response.status_message
        );
        Ok(())
    }

    pub fn build_product_file(&self, file: &NewProductFile) -> ProductFile {
        ProductFile {
            product_file: ProductFileInner {
                aws_object_key: file.storage_key.clone(),
                description: file.description.clone(),
                docs_url: file.docs_url.clone(),
                file_type: self.product_file_defaults.file_type.clone(),
                file_version: file.version.clone(),
                included_files: Vec::new(),
                md5: file.content_hash.clone(),
                name: file.display_name.clone(),
                platforms: Vec::new(),
                released_at: Some(file.release_date.format(RELEASED_AT_FORMAT).to_string()),
                size: file.size,
                system_requirements: Vec::new(),
            },
        }
    }

    /// 建立 product file 並回傳 API 指派的 id（`product_file.id`）
    pub async fn create_product_file(&self, product_slug: &str, file: &NewProductFile) -> Result<u64> {
        let product_file = self.build_product_file(file);
        let body = serde_json::to_vec_pretty(&product_file)?;
        tracing::debug!("POST product file payload:\n{}", String::from_utf8_lossy(&body));

        let path = format!("/api/v2/products/{}/product_files", product_slug);
        let response = self.client.request(ApiMethod::Post, &path, Some(body)).await?;
        let payload = response
            .payload
            .ok_or_else(|| PivnetError::malformed("create product file returned an empty body"))?;
        let product_file_id = payload.require_id(&["product_file", "id"])?;

        tracing::info!(
            "✅ Created product file '{}' in '{}' (id {}, {})",
            file.display_name,
            product_slug,
            product_file_id,
            response.status_message
        );
        Ok(product_file_id)
    }
}
