#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::StemcellDescriptor;
use crate::utils::error::{PivnetError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_HOST: &str = "https://network.pivotal.io";
pub const DEFAULT_CONTENT_HOST_PREFIX: &str = "https://bosh.io/d/stemcells/";
pub const TOKEN_FILE_ENV: &str = "PIVNET_TOKEN_FILE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PivnetConfig {
    pub api_host: String,
    pub token_file: PathBuf,
    pub product_slug: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub release: ReleaseDefaults,
    pub product_file: ProductFileDefaults,
    pub stemcells: StemcellConfig,
}

/// 建立 release 時套用的合規預設值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseDefaults {
    pub release_notes_url: String,
    pub release_type: String,
    pub availability: String,
    pub eula_slug: String,
    pub oss_compliant: String,
    pub eccn: String,
    pub license_exception: String,
    pub controlled: bool,
    pub support_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFileDefaults {
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StemcellConfig {
    pub content_host_prefix: String,
    pub output_dir: PathBuf,
    pub remove_partial: bool,
    pub connect_timeout_seconds: u64,
    pub catalog: Vec<StemcellDescriptor>,
}

impl Default for PivnetConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            token_file: default_token_file(),
            product_slug: "stemcells".to_string(),
            timeout_seconds: 30,
            retry_attempts: 2,
            retry_delay_ms: 500,
            release: ReleaseDefaults::default(),
            product_file: ProductFileDefaults::default(),
            stemcells: StemcellConfig::default(),
        }
    }
}

impl Default for ReleaseDefaults {
    fn default() -> Self {
        Self {
            release_notes_url: "http://docs.pivotal.io".to_string(),
            release_type: "Minor Release".to_string(),
            availability: "Admins Only".to_string(),
            eula_slug: "pivotal_software_eula".to_string(),
            oss_compliant: "confirm".to_string(),
            eccn: "5D002".to_string(),
            license_exception: "ENC Unrestricted".to_string(),
            controlled: true,
            support_years: 3,
        }
    }
}

impl Default for ProductFileDefaults {
    fn default() -> Self {
        Self {
            file_type: "Software".to_string(),
        }
    }
}

impl Default for StemcellConfig {
    fn default() -> Self {
        Self {
            content_host_prefix: DEFAULT_CONTENT_HOST_PREFIX.to_string(),
            output_dir: PathBuf::from("."),
            remove_partial: true,
            connect_timeout_seconds: 30,
            catalog: vec![
                StemcellDescriptor::new("bosh-aws-xen-hvm-ubuntu-trusty-go_agent", "aws"),
                StemcellDescriptor::new("bosh-vsphere-esxi-ubuntu-trusty-go_agent", "vsphere"),
                StemcellDescriptor::new("bosh-vcloud-esxi-ubuntu-trusty-go_agent", "vcloud"),
                StemcellDescriptor::new("bosh-openstack-kvm-ubuntu-trusty-go_agent-raw", "openstack"),
            ],
        }
    }
}

/// `$PIVNET_TOKEN_FILE`，否則 `$HOME/.pivnet_token`
pub fn default_token_file() -> PathBuf {
    if let Ok(path) = std::env::var(TOKEN_FILE_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    std::env::var("HOME")
        .map(|home| Path::new(&home).join(".pivnet_token"))
        .unwrap_or_else(|_| PathBuf::from(".pivnet_token"))
}

impl PivnetConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|source| PivnetError::FilesystemError {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未指定的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| PivnetError::config(format!("TOML parsing error: {}", e)))
    }

    /// 有指定檔案就載入，否則使用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${HOME})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| PivnetError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Validate for PivnetConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_host", &self.api_host)?;
        validation::validate_slug("product_slug", &self.product_slug)?;
        validation::validate_path(
            "token_file",
            &self.token_file.to_string_lossy(),
        )?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 3600)?;
        validation::validate_range("retry_attempts", self.retry_attempts, 0, 10)?;
        validation::validate_range("release.support_years", self.release.support_years, 0, 50)?;
        validation::validate_non_empty_string("release.eula_slug", &self.release.eula_slug)?;
        validation::validate_non_empty_string("product_file.file_type", &self.product_file.file_type)?;
        validation::validate_url(
            "stemcells.content_host_prefix",
            &self.stemcells.content_host_prefix,
        )?;
        validation::validate_path(
            "stemcells.output_dir",
            &self.stemcells.output_dir.to_string_lossy(),
        )?;
        for stemcell in &self.stemcells.catalog {
            validation::validate_non_empty_string(
                "stemcells.catalog.content_host_name",
                &stemcell.content_host_name,
            )?;
        }
        Ok(())
    }
}
