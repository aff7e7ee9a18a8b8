use crate::domain::model::{ApiRequest, RawHttpResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 執行一次 HTTP 交換並回傳完整的原始回應
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<RawHttpResponse>;
}

/// 提供 API token；每次呼叫都重新讀取
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Result<String>;
}
