use crate::domain::model::{ApiMethod, ApiRequest, RawHttpResponse};
use crate::domain::ports::HttpTransport;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;

pub const AUTH_SCHEME: &str = "Token";

/// reqwest 實作的傳輸層。每次呼叫只送出一次請求，重試由上層決定。
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

/// `200 OK` 形式的狀態文字；未知狀態碼以 `Unknown` 作為 reason
pub fn status_text(status: StatusCode) -> String {
    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawHttpResponse> {
        let method = match request.method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Delete => Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("{} {}", AUTH_SCHEME, request.token));

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("{} {} -> {}", request.method, request.url, status);

        // 傳輸層的狀態固定放在 `Status:` 行，伺服器自己送的 Status header 略過
        let mut header_lines = vec![
            format!("{:?} {}", response.version(), status_text(status)),
            format!("Status: {}", status_text(status)),
        ];
        for (name, value) in response.headers() {
            if name.as_str().eq_ignore_ascii_case("status") {
                continue;
            }
            header_lines.push(format!(
                "{}: {}",
                name,
                value.to_str().unwrap_or("<binary>")
            ));
        }

        let body = response.text().await?;
        Ok(RawHttpResponse { header_lines, body })
    }
}
