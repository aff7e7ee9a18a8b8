use crate::domain::ports::TokenProvider;
use crate::utils::error::{PivnetError, Result};
use std::path::PathBuf;

/// 從本機檔案讀取 API token
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenProvider for FileTokenProvider {
    fn token(&self) -> Result<String> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| PivnetError::CredentialError {
                path: self.path.clone(),
                source,
            })?;

        let token = contents.trim_matches(|c: char| c == ' ' || c == '\n' || c == '\r');
        if token.is_empty() {
            return Err(PivnetError::CredentialError {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "token file is empty"),
            });
        }

        tracing::debug!("Loaded API token from {}", self.path.display());
        Ok(token.to_string())
    }
}

#[derive(Clone)]
pub struct StaticTokenProvider(String);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticTokenProvider {
    fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
