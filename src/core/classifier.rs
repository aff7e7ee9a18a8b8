use crate::domain::payload::StructuredPayload;
use crate::utils::error::{PivnetError, Result};

/// 分類後的成功回應
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedResponse {
    /// `204 No Content` 形式，不含 `Status: ` 前綴
    pub status_message: String,
    /// header 區塊（含結尾的空白行），每行已去除前後空白
    pub headers: String,
    /// body 為空時為 `None`
    pub payload: Option<StructuredPayload>,
}

/// 拆開後的原始回應
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResponse {
    pub header_lines: Vec<String>,
    pub body: String,
}

fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c == ' ' || c == '\r' || c == '\n')
}

/// 第一個空白行（含）之前為 header，其後為 body
pub fn split_response(raw: &str) -> SplitResponse {
    let mut header_lines = Vec::new();
    let mut body_lines = Vec::new();
    let mut in_headers = true;

    for line in raw.split('\n') {
        let line = trim_line(line);
        if in_headers {
            header_lines.push(line.to_string());
            if line.is_empty() {
                in_headers = false;
            }
        } else {
            body_lines.push(line);
        }
    }

    let body = trim_line(&body_lines.join("\n")).to_string();
    SplitResponse { header_lines, body }
}

/// 解析 `Status: <code> <reason>`，回傳 `<code> <reason>`
pub fn parse_status_line(line: &str) -> Option<String> {
    let rest = line.strip_prefix("Status: ")?;
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || rest.as_bytes().get(digits) != Some(&b' ') {
        return None;
    }
    Some(rest.to_string())
}

pub fn is_success_status(status_message: &str) -> bool {
    status_message.starts_with('2')
}

/// 只判斷 status 行：找不到時為 `MalformedResponseError`，非 2xx 為 `ApiStatusError`
fn check_status(split: &SplitResponse) -> Result<String> {
    let status_message = split
        .header_lines
        .iter()
        .find_map(|line| parse_status_line(line))
        .ok_or_else(|| PivnetError::malformed("response has no 'Status:' line"))?;

    if !is_success_status(&status_message) {
        let detail = if split.body.is_empty() {
            None
        } else {
            StructuredPayload::parse(&split.body)
                .ok()
                .and_then(|payload| payload.error_message())
        };
        tracing::debug!("Request failed with status '{}'", status_message);
        return Err(PivnetError::ApiStatusError {
            status: status_message,
            detail,
        });
    }
    Ok(status_message)
}

/// 判斷回應成功與否並解析 body。
///
/// - 找不到 status 行：`MalformedResponseError`
/// - 非 2xx：`ApiStatusError`，帶原始 status 文字與 API 的錯誤訊息（若有）
/// - 2xx 但 body 不是合法 JSON：`MalformedResponseError`
pub fn classify_response(raw: &str) -> Result<ClassifiedResponse> {
    let split = split_response(raw);
    let status_message = check_status(&split)?;

    let payload = if split.body.is_empty() {
        None
    } else {
        let payload = StructuredPayload::parse(&split.body)?;
        tracing::debug!("Response payload:\n{}", payload.describe());
        Some(payload)
    };

    Ok(ClassifiedResponse {
        status_message,
        headers: split.header_lines.join("\n"),
        payload,
    })
}

/// 與 `classify_response` 相同的成功判斷，但 2xx 的 body 不解析，`payload` 一律為 `None`
pub fn classify_status_only(raw: &str) -> Result<ClassifiedResponse> {
    let split = split_response(raw);
    let status_message = check_status(&split)?;
    if !split.body.is_empty() {
        tracing::debug!("Ignoring {} byte response body", split.body.len());
    }

    Ok(ClassifiedResponse {
        status_message,
        headers: split.header_lines.join("\n"),
        payload: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nStatus: {status}\r\n\r\n{body}"
        )
    }

    #[test]
    fn test_2xx_is_success() {
        for status in ["200 OK", "201 Created", "204 No Content", "299 Whatever"] {
            let result = classify_response(&raw(status, "")).unwrap();
            assert_eq!(result.status_message, status);
        }
    }

    #[test]
    fn test_non_2xx_carries_status_line() {
        for status in ["301 Moved Permanently", "401 Unauthorized", "404 Not Found", "500 Internal Server Error"] {
            match classify_response(&raw(status, "")) {
                Err(PivnetError::ApiStatusError { status: got, detail }) => {
                    assert_eq!(got, status);
                    assert!(detail.is_none());
                }
                other => panic!("expected ApiStatusError for {}, got {:?}", status, other),
            }
        }
    }

    #[test]
    fn test_non_2xx_with_api_message() {
        let err = classify_response(&raw(
            "422 Unprocessable Entity",
            r#"{"status":422,"message":"Version already exists"}"#,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            PivnetError::ApiStatusError { ref detail, .. } if detail.as_deref() == Some("Version already exists")
        ));
    }

    #[test]
    fn test_non_2xx_with_html_body_is_still_status_error() {
        let err = classify_response(&raw("502 Bad Gateway", "<html>bad gateway</html>")).unwrap_err();
        assert!(matches!(err, PivnetError::ApiStatusError { .. }));
    }

    #[test]
    fn test_header_body_split() {
        let text = "HTTP/1.1 200 OK \r\nStatus: 200 OK\r\n  X-Id: 1  \r\n\r\n  {\"a\":\r\n 1}\r\n\r\n";
        let split = split_response(text);
        assert_eq!(
            split.header_lines,
            vec!["HTTP/1.1 200 OK", "Status: 200 OK", "X-Id: 1", ""]
        );
        assert_eq!(split.body, "{\"a\":\n1}");

        let result = classify_response(text).unwrap();
        assert_eq!(result.headers, "HTTP/1.1 200 OK\nStatus: 200 OK\nX-Id: 1\n");
        assert_eq!(result.payload.unwrap().require_id(&["a"]).unwrap(), 1);
    }

    #[test]
    fn test_empty_body_success_has_no_payload() {
        let result = classify_response(&raw("204 No Content", "  \r\n")).unwrap();
        assert_eq!(result.status_message, "204 No Content");
        assert!(result.payload.is_none());
    }

    #[test]
    fn test_malformed_body_overrides_success() {
        let err = classify_response(&raw("200 OK", "{not json")).unwrap_err();
        assert!(matches!(err, PivnetError::MalformedResponseError { .. }));
    }

    #[test]
    fn test_missing_status_line_is_malformed() {
        let err = classify_response("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n{}").unwrap_err();
        assert!(matches!(err, PivnetError::MalformedResponseError { .. }));
    }

    #[test]
    fn test_status_line_in_body_is_ignored() {
        let err = classify_response("HTTP/1.1 200 OK\r\n\r\nStatus: 200 OK").unwrap_err();
        assert!(matches!(err, PivnetError::MalformedResponseError { .. }));
    }

    #[test]
    fn test_status_only_skips_body() {
        let result = classify_status_only(&raw("200 OK", "Release deleted")).unwrap();
        assert_eq!(result.status_message, "200 OK");
        assert!(result.payload.is_none());

        let result = classify_status_only(&raw("204 No Content", "<html>gone</html>")).unwrap();
        assert!(result.payload.is_none());
    }

    #[test]
    fn test_status_only_still_reports_failures() {
        let err = classify_status_only(&raw("404 Not Found", r#"{"message":"release not found"}"#)).unwrap_err();
        assert!(matches!(
            err,
            PivnetError::ApiStatusError { ref detail, .. } if detail.as_deref() == Some("release not found")
        ));

        let err = classify_status_only("HTTP/1.1 200 OK\r\n\r\nok").unwrap_err();
        assert!(matches!(err, PivnetError::MalformedResponseError { .. }));
    }

    #[test]
    fn test_parse_status_line() {
        assert_eq!(parse_status_line("Status: 201 Created").as_deref(), Some("201 Created"));
        assert_eq!(parse_status_line("Status: OK"), None);
        assert_eq!(parse_status_line("Status: 200"), None);
        assert_eq!(parse_status_line("X-Status: 200 OK"), None);
    }
}
