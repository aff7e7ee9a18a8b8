use crate::utils::error::{PivnetError, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// 解析後的回應內容樹，取代直接對 `serde_json::Value` 做未檢查的型別轉換。
/// 所有欄位存取都透過會回傳 `MalformedResponseError` 的 checked accessor。
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredPayload {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<StructuredPayload>),
    Map(BTreeMap<String, StructuredPayload>),
}

impl StructuredPayload {
    /// 將去除空白後的回應 body 解析為內容樹
    pub fn parse(body: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            PivnetError::malformed(format!("body is not valid JSON ({})", e))
        })?;
        Ok(Self::from(value))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "mapping",
        }
    }

    pub fn get(&self, key: &str) -> Option<&StructuredPayload> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 整數欄位；API 的 id 可能以 `42` 或 `42.0` 出現
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            _ => None,
        }
    }

    /// 依路徑逐層取出 mapping 欄位，任何一層形狀不符都視為格式錯誤
    pub fn require(&self, path: &[&str]) -> Result<&StructuredPayload> {
        let mut node = self;
        for (depth, key) in path.iter().enumerate() {
            let Self::Map(map) = node else {
                return Err(PivnetError::malformed(format!(
                    "expected a mapping at '{}', found {}",
                    path[..depth].join("."),
                    node.kind()
                )));
            };
            node = map.get(*key).ok_or_else(|| {
                PivnetError::malformed(format!("missing field '{}'", path[..=depth].join(".")))
            })?;
        }
        Ok(node)
    }

    /// 取出 API 指派的整數 id，例如 `["release", "id"]`
    pub fn require_id(&self, path: &[&str]) -> Result<u64> {
        let node = self.require(path)?;
        node.as_i64()
            .filter(|id| *id > 0)
            .map(|id| id as u64)
            .ok_or_else(|| {
                PivnetError::malformed(format!(
                    "field '{}' is not a positive integer (found {})",
                    path.join("."),
                    node.kind()
                ))
            })
    }

    /// API 錯誤回應中的說明文字（`message` 或 `errors`）
    pub fn error_message(&self) -> Option<String> {
        if let Some(message) = self.get("message").and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
        match self.get("errors") {
            Some(Self::List(items)) => {
                let parts: Vec<&str> = items.iter().filter_map(|i| i.as_str()).collect();
                (!parts.is_empty()).then(|| parts.join("; "))
            }
            Some(Self::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// 以縮排樹狀格式描述內容，供 debug 日誌使用
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, "", "");
        out
    }

    fn describe_into(&self, out: &mut String, label: &str, indent: &str) {
        let child_indent = format!("{}  ", indent);
        match self {
            Self::Map(map) => {
                let _ = writeln!(out, "{}{}mapping:", indent, label);
                for (key, value) in map {
                    value.describe_into(out, &format!("'{}' ", key), &child_indent);
                }
            }
            Self::List(items) => {
                let _ = writeln!(out, "{}{}list:", indent, label);
                for (i, value) in items.iter().enumerate() {
                    value.describe_into(out, &format!("[{}] ", i), &child_indent);
                }
            }
            Self::String(s) => {
                let _ = writeln!(out, "{}{}string '{}'", indent, label, s);
            }
            Self::Number(n) => {
                let _ = writeln!(out, "{}{}number {}", indent, label, n);
            }
            Self::Bool(b) => {
                let _ = writeln!(out, "{}{}boolean {}", indent, label, b);
            }
            Self::Null => {
                let _ = writeln!(out, "{}{}null", indent, label);
            }
        }
    }
}

impl From<serde_json::Value> for StructuredPayload {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Self::Map(obj.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id_nested() {
        let payload =
            StructuredPayload::parse(r#"{"release":{"id": 42, "version": "3026"}}"#).unwrap();
        assert_eq!(payload.require_id(&["release", "id"]).unwrap(), 42);

        let payload = StructuredPayload::parse(r#"{"product_file":{"id": 7.0}}"#).unwrap();
        assert_eq!(payload.require_id(&["product_file", "id"]).unwrap(), 7);
    }

    #[test]
    fn test_require_id_shape_mismatch_is_malformed() {
        let cases = [
            r#"{"release":{"id":"42"}}"#,
            r#"{"release":{}}"#,
            r#"{"release":[1,2]}"#,
            r#"[{"release":{"id":1}}]"#,
            r#"{"release":{"id":1.5}}"#,
            r#"{"release":{"id":null}}"#,
        ];
        for body in cases {
            let payload = StructuredPayload::parse(body).unwrap();
            let err = payload.require_id(&["release", "id"]).unwrap_err();
            assert!(
                matches!(err, PivnetError::MalformedResponseError { .. }),
                "{} should be malformed, got {:?}",
                body,
                err
            );
        }
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = StructuredPayload::parse("<html>oops</html>").unwrap_err();
        assert!(matches!(err, PivnetError::MalformedResponseError { .. }));
    }

    #[test]
    fn test_error_message() {
        let payload = StructuredPayload::parse(r#"{"status":422,"message":"Version taken"}"#).unwrap();
        assert_eq!(payload.error_message().as_deref(), Some("Version taken"));

        let payload = StructuredPayload::parse(r#"{"errors":["a","b"]}"#).unwrap();
        assert_eq!(payload.error_message().as_deref(), Some("a; b"));

        let payload = StructuredPayload::parse(r#"{"ok":true}"#).unwrap();
        assert_eq!(payload.error_message(), None);
    }

    #[test]
    fn test_describe_tree() {
        let payload = StructuredPayload::parse(r#"{"a":{"b":[1,"x"]},"c":true}"#).unwrap();
        let text = payload.describe();
        assert!(text.starts_with("mapping:\n"));
        assert!(text.contains("  'a' mapping:\n"));
        assert!(text.contains("      [1] string 'x'\n"));
        assert!(text.contains("  'c' boolean true\n"));
    }
}
