use crate::core::classifier::{classify_response, classify_status_only, ClassifiedResponse};
use crate::domain::model::{ApiMethod, ApiRequest, RawHttpResponse};
use crate::domain::ports::{HttpTransport, TokenProvider};
use crate::utils::error::Result;
use std::time::Duration;

/// 重試設定；只套用在 GET/DELETE 的傳輸層錯誤
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            attempts: 0,
            delay: Duration::ZERO,
        }
    }
}

/// token、傳輸層與回應分類的組合
pub struct ApiClient<T: HttpTransport, P: TokenProvider> {
    transport: T,
    tokens: P,
    base_url: String,
    retry: RetryPolicy,
}

impl<T: HttpTransport, P: TokenProvider> ApiClient<T, P> {
    pub fn new(transport: T, tokens: P, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            tokens,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 送出一次 API 請求並分類回應
    pub async fn request(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ClassifiedResponse> {
        let raw = self.send(method, path, body).await?;
        classify_response(&raw.to_text())
    }

    /// 只看 status 行，成功時不解析 body
    pub async fn request_status_only(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ClassifiedResponse> {
        let raw = self.send(method, path, body).await?;
        classify_status_only(&raw.to_text())
    }

    async fn send(&self, method: ApiMethod, path: &str, body: Option<Vec<u8>>) -> Result<RawHttpResponse> {
        let token = self.tokens.token()?;
        let request = ApiRequest {
            method,
            url: self.url(path),
            body,
            token,
        };

        let max_attempts = if method.is_idempotent() {
            self.retry.attempts + 1
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            match self.transport.execute(request.clone()).await {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(
                        "⚠️ {} {} failed (attempt {}/{}): {}",
                        method,
                        request.url,
                        attempt,
                        max_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticTokenProvider;
    use crate::utils::error::PivnetError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// 前 `failures` 次回傳連線錯誤，之後回傳固定回應
    struct FlakyTransport {
        failures: u32,
        calls: Arc<AtomicU32>,
    }

    async fn transport_error() -> PivnetError {
        // 連到保留的無效埠以取得真實的 reqwest::Error
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:0/")
            .send()
            .await
            .unwrap_err();
        PivnetError::TransportError(err)
    }

    #[async_trait]
    impl HttpTransport for FlakyTransport {
        async fn execute(&self, _request: ApiRequest) -> Result<RawHttpResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(transport_error().await);
            }
            Ok(RawHttpResponse {
                header_lines: vec!["HTTP/1.1 204 No Content".to_string(), "Status: 204 No Content".to_string()],
                body: String::new(),
            })
        }
    }

    fn client(failures: u32, calls: Arc<AtomicU32>) -> ApiClient<FlakyTransport, StaticTokenProvider> {
        ApiClient::new(
            FlakyTransport { failures, calls },
            StaticTokenProvider::new("t0ken"),
            "http://pivnet.test/",
        )
        .with_retry(RetryPolicy {
            attempts: 2,
            delay: Duration::from_millis(1),
        })
    }

    #[test]
    fn test_idempotent_request_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = client(2, calls.clone());

        let result = tokio_test::block_on(client.request(ApiMethod::Delete, "/api/v2/x", None)).unwrap();
        assert_eq!(result.status_message, "204 No Content");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_retries_are_bounded() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = client(5, calls.clone());

        let err = tokio_test::block_on(client.request(ApiMethod::Get, "/api/v2/x", None)).unwrap_err();
        assert!(matches!(err, PivnetError::TransportError(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_post_is_never_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = client(1, calls.clone());

        let err = tokio_test::block_on(client.request(ApiMethod::Post, "/api/v2/x", Some(b"{}".to_vec())))
            .unwrap_err();
        assert!(matches!(err, PivnetError::TransportError(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let client = client(0, Arc::new(AtomicU32::new(0)));
        assert_eq!(client.url("/api/v2/authentication"), "http://pivnet.test/api/v2/authentication");
    }
}
