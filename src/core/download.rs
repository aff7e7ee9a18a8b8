use crate::adapters::http::status_text;
use crate::config::StemcellConfig;
use crate::domain::model::DownloadOutcome;
use crate::utils::error::{PivnetError, Result};
use crate::utils::progress::DownloadProgress;
use md5::{Digest, Md5};
use reqwest::header::LOCATION;
use reqwest::{redirect, Client};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// 從 content host 下載檔案：先用不跟隨 redirect 的請求取得檔名，
/// 再跟隨 redirect 下載，邊寫檔邊計算 MD5。
pub struct Downloader {
    probe_client: Client,
    download_client: Client,
    content_host_prefix: String,
    output_dir: PathBuf,
    remove_partial: bool,
}

impl Downloader {
    pub fn new(content_host_prefix: impl Into<String>, output_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_connect_timeout(content_host_prefix, output_dir, Duration::from_secs(30))
    }

    pub fn with_connect_timeout(
        content_host_prefix: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let probe_client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(connect_timeout)
            .build()?;
        let download_client = Client::builder()
            .redirect(redirect::Policy::limited(10))
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            probe_client,
            download_client,
            content_host_prefix: content_host_prefix.into(),
            output_dir: output_dir.into(),
            remove_partial: true,
        })
    }

    pub fn from_config(config: &StemcellConfig) -> Result<Self> {
        Ok(Self::with_connect_timeout(
            config.content_host_prefix.clone(),
            config.output_dir.clone(),
            Duration::from_secs(config.connect_timeout_seconds),
        )?
        .remove_partial(config.remove_partial))
    }

    /// 下載失敗時是否刪除寫到一半的檔案
    pub fn remove_partial(mut self, remove: bool) -> Self {
        self.remove_partial = remove;
        self
    }

    pub fn artifact_url(&self, artifact_name: &str, version: u32) -> String {
        format!("{}{}?v={}", self.content_host_prefix, artifact_name, version)
    }

    /// 不跟隨 redirect，讀出 `Location` 指向的網址；body 直接丟棄
    pub async fn resolve_redirect(&self, url: &str) -> Result<String> {
        let response = self.probe_client.get(url).send().await?;
        let status = response.status();

        if !status.is_redirection() {
            tracing::debug!("Probe of {} returned {} without redirect", url, status);
            return Err(PivnetError::RedirectMissing {
                url: url.to_string(),
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| PivnetError::RedirectMissing {
                url: url.to_string(),
            })?;

        // 相對路徑的 Location 以原始網址為基準
        let resolved = match Url::parse(location) {
            Ok(absolute) => absolute.to_string(),
            Err(_) => Url::parse(url)
                .and_then(|base| base.join(location))
                .map(|u| u.to_string())
                .map_err(|e| PivnetError::malformed(format!("invalid redirect target '{}': {}", location, e)))?,
        };

        tracing::debug!("{} redirects to {}", url, resolved);
        Ok(resolved)
    }

    /// 下載 `artifact_name` 的指定版本到輸出目錄。
    ///
    /// 有提供 `expected_md5` 時會比對下載結果，不符則刪檔並回傳 `ChecksumMismatch`。
    pub async fn download(
        &self,
        artifact_name: &str,
        version: u32,
        expected_md5: Option<&str>,
    ) -> Result<DownloadOutcome> {
        let url = self.artifact_url(artifact_name, version);
        let location = self.resolve_redirect(&url).await?;
        let filename = filename_from_url(&location)?;
        let path = self.output_dir.join(&filename);

        tracing::info!("⬇️ Downloading {} -> {}", url, path.display());

        let file = File::create(&path)
            .await
            .map_err(|source| PivnetError::FilesystemError {
                path: path.clone(),
                source,
            })?;

        let (bytes_written, md5_hex) = match self.stream_to_file(&url, file, &path, &filename).await {
            Ok(result) => result,
            Err(e) => {
                self.discard_partial(&path).await;
                return Err(e);
            }
        };

        if let Some(expected) = expected_md5 {
            if !expected.eq_ignore_ascii_case(&md5_hex) {
                self.discard_partial(&path).await;
                return Err(PivnetError::ChecksumMismatch {
                    expected: expected.to_string(),
                    actual: md5_hex,
                });
            }
        }

        Ok(DownloadOutcome {
            filename,
            path,
            bytes_written,
            md5_hex,
        })
    }

    async fn stream_to_file(
        &self,
        url: &str,
        mut file: File,
        path: &Path,
        label: &str,
    ) -> Result<(u64, String)> {
        let mut response = self.download_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PivnetError::ApiStatusError {
                status: status_text(status),
                detail: Some(format!("downloading {}", url)),
            });
        }

        let progress = DownloadProgress::new(label, response.content_length());
        let mut hasher = Md5::new();
        let mut bytes_written: u64 = 0;

        let fs_error = |source| PivnetError::FilesystemError {
            path: path.to_path_buf(),
            source,
        };

        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    progress.abandon();
                    return Err(e.into());
                }
            };
            if let Err(e) = file.write_all(&chunk).await {
                progress.abandon();
                return Err(fs_error(e));
            }
            hasher.update(&chunk);
            bytes_written += chunk.len() as u64;
            progress.step(chunk.len() as u64);
        }

        file.flush().await.map_err(fs_error)?;
        progress.finish();

        let md5_hex = hex::encode(hasher.finalize());
        tracing::debug!("Wrote {} bytes to {} (md5 {})", bytes_written, path.display(), md5_hex);
        Ok((bytes_written, md5_hex))
    }

    async fn discard_partial(&self, path: &Path) {
        if !self.remove_partial {
            tracing::warn!("⚠️ Leaving partial download at {}", path.display());
            return;
        }
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!("⚠️ Could not remove partial download {}: {}", path.display(), e);
        }
    }
}

/// redirect 目標網址的最後一段路徑即為本地檔名
pub fn filename_from_url(url: &str) -> Result<String> {
    let last_segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|s| s.to_string()),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(|s| s.to_string()),
    };

    match last_segment {
        Some(name) if !name.is_empty() && name != "." && name != ".." && !name.contains('\\') => Ok(name),
        _ => Err(PivnetError::malformed(format!(
            "redirect target '{}' has no file name",
            url
        ))),
    }
}
