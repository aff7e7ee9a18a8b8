use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PivnetError {
    #[error("Cannot read credential file {}: {source}", .path.display())]
    CredentialError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("HTTP transport failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Failed ('Status: {status}'){}", detail_suffix(.detail))]
    ApiStatusError {
        status: String,
        detail: Option<String>,
    },

    #[error("Malformed response: {message}")]
    MalformedResponseError { message: String },

    #[error("No redirect returned for {url}")]
    RedirectMissing { url: String },

    #[error("Filesystem error on {}: {source}", .path.display())]
    FilesystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Api,
    Data,
    Filesystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PivnetError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponseError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CredentialError { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::TransportError(_) => ErrorCategory::Network,
            Self::ApiStatusError { .. } | Self::RedirectMissing { .. } => ErrorCategory::Api,
            Self::MalformedResponseError { .. }
            | Self::ChecksumMismatch { .. }
            | Self::SerializationError(_) => ErrorCategory::Data,
            Self::FilesystemError { .. } => ErrorCategory::Filesystem,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Api => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Data | ErrorCategory::Filesystem => {
                ErrorSeverity::Critical
            }
        }
    }

    /// 程序結束碼：設定/回應格式錯誤 = 3，API 狀態錯誤 = 1，網路錯誤 = 2
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::CredentialError { .. } => {
                "Put your API token in the token file (or set PIVNET_TOKEN_FILE)"
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the configuration file and command-line arguments"
            }
            Self::TransportError(_) => "Check network connectivity and retry the command",
            Self::ApiStatusError { .. } => {
                "Verify the token has access to the product and the ids are correct"
            }
            Self::RedirectMissing { .. } => "Check that the artifact name and version exist",
            Self::MalformedResponseError { .. } | Self::SerializationError(_) => {
                "The API returned an unexpected payload; rerun with --verbose to inspect it"
            }
            Self::FilesystemError { .. } => "Check permissions and free space in the output directory",
            Self::ChecksumMismatch { .. } => "Delete the file and download it again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::CredentialError { path, .. } => {
                format!("No usable API token found at {}", path.display())
            }
            Self::ApiStatusError { status, .. } => format!("The API rejected the request ({})", status),
            Self::TransportError(_) => "Could not reach the server".to_string(),
            Self::RedirectMissing { url } => format!("No download location available for {}", url),
            other => other.to_string(),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, PivnetError>;
