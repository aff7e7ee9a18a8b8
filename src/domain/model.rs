use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReleaseInner {
    pub version: String,
    pub release_notes_url: String,
    pub description: String,
    pub release_date: String,
    pub release_type: String,
    pub end_of_support_date: String,
    pub end_of_guidance_date: String,
    pub end_of_availability_date: String,
    pub availability: String,
    pub eula: BTreeMap<String, String>,
    pub oss_compliant: String,
    pub eccn: String,
    pub license_exception: String,
    pub controlled: bool,
}

/// `POST /products/{slug}/releases` 的 request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    pub release: ReleaseInner,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFileInner {
    pub aws_object_key: String,
    pub description: String,
    pub docs_url: String,
    pub file_type: String,
    pub file_version: String,
    pub included_files: Vec<String>,
    pub md5: String,
    pub name: String,
    pub platforms: Vec<String>,
    /// MM/DD/YYYY
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub system_requirements: Vec<String>,
}

/// `POST /products/{slug}/product_files` 的 request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFile {
    pub product_file: ProductFileInner,
}

/// 建立 product file 時由呼叫端提供的欄位
#[derive(Debug, Clone)]
pub struct NewProductFile {
    pub display_name: String,
    pub storage_key: String,
    pub description: String,
    pub content_hash: String,
    pub version: String,
    pub docs_url: String,
    pub release_date: NaiveDate,
    pub size: Option<u64>,
}

/// 要從 content host 下載的 stemcell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StemcellDescriptor {
    pub content_host_name: String,
    pub platform_product_name: String,
    #[serde(default)]
    pub version: Option<u32>,
}

impl StemcellDescriptor {
    pub fn new(content_host_name: &str, platform_product_name: &str) -> Self {
        Self {
            content_host_name: content_host_name.to_string(),
            platform_product_name: platform_product_name.to_string(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub filename: String,
    pub path: PathBuf,
    pub bytes_written: u64,
    pub md5_hex: String,
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} bytes, {})",
            self.filename, self.bytes_written, self.md5_hex
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Delete,
}

impl ApiMethod {
    /// 可安全重送的方法
    pub fn is_idempotent(self) -> bool {
        matches!(self, ApiMethod::Get | ApiMethod::Delete)
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// 單次 HTTP 交換的輸入
#[derive(Clone)]
pub struct ApiRequest {
    pub method: ApiMethod,
    pub url: String,
    pub body: Option<Vec<u8>>,
    pub token: String,
}

// token 不可出現在日誌中
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("body_len", &self.body.as_ref().map(|b| b.len()))
            .field("token", &"<redacted>")
            .finish()
    }
}

/// 傳輸層收到的完整回應：header 行（依序）與 body 文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHttpResponse {
    pub header_lines: Vec<String>,
    pub body: String,
}

impl RawHttpResponse {
    /// 以 header、空白行、body 的順序組回原始文字
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.header_lines {
            text.push_str(line);
            text.push_str("\r\n");
        }
        text.push_str("\r\n");
        text.push_str(&self.body);
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_file_serialization_skips_absent_fields() {
        let file = ProductFile {
            product_file: ProductFileInner {
                aws_object_key: "product_files/stemcells/a.tgz".to_string(),
                description: "desc".to_string(),
                docs_url: "http://docs".to_string(),
                file_type: "Software".to_string(),
                file_version: "3026".to_string(),
                included_files: vec![],
                md5: "abc".to_string(),
                name: "AWS stemcell".to_string(),
                platforms: vec![],
                released_at: None,
                size: None,
                system_requirements: vec![],
            },
        };
        let json = serde_json::to_value(&file).unwrap();
        let inner = json.get("product_file").unwrap();
        assert!(inner.get("released_at").is_none());
        assert!(inner.get("size").is_none());
        assert_eq!(inner["included_files"], serde_json::json!([]));
        assert_eq!(inner["aws_object_key"], "product_files/stemcells/a.tgz");
    }

    #[test]
    fn test_api_request_debug_redacts_token() {
        let request = ApiRequest {
            method: ApiMethod::Get,
            url: "https://example.com".to_string(),
            body: None,
            token: "s3cret".to_string(),
        };
        let text = format!("{:?}", request);
        assert!(!text.contains("s3cret"));
        assert!(text.contains("<redacted>"));
    }

    #[test]
    fn test_raw_response_text_layout() {
        let raw = RawHttpResponse {
            header_lines: vec!["HTTP/1.1 204 No Content".to_string(), "Status: 204 No Content".to_string()],
            body: String::new(),
        };
        assert_eq!(
            raw.to_text(),
            "HTTP/1.1 204 No Content\r\nStatus: 204 No Content\r\n\r\n"
        );
    }
}
