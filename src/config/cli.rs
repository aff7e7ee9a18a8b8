use crate::config::PivnetConfig;
use crate::utils::error::{PivnetError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 參數錯誤時的結束碼
pub const USAGE_EXIT_CODE: i32 = 255;

pub const MAX_RELEASE_ID: u64 = 999_999;
pub const MAX_STEMCELL_VERSION: u32 = 99_999;

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// File holding the API token (overrides the configuration)
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// API host, e.g. https://network.pivotal.io
    #[arg(long, global = true)]
    pub api_host: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl GlobalArgs {
    /// 載入設定檔、套用命令列覆寫並驗證
    pub fn resolve_config(&self) -> Result<PivnetConfig> {
        let mut config = PivnetConfig::load(self.config.as_deref())?;
        if let Some(token_file) = &self.token_file {
            config.token_file = token_file.clone();
        }
        if let Some(api_host) = &self.api_host {
            config.api_host = api_host.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn init_logging(&self) {
        if self.log_json {
            crate::utils::logger::init_json_logger(self.verbose);
        } else {
            crate::utils::logger::init_cli_logger(self.verbose);
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pivnet")]
#[command(version, about = "Manage stemcell releases and product files on the distribution platform")]
pub struct PivnetCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the API token is accepted
    VerifyAuth,

    /// Create a release and print its id
    CreateRelease {
        version: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        product_slug: Option<String>,
    },

    /// Delete a release by id
    DeleteRelease {
        #[arg(value_parser = clap::value_parser!(u64).range(1..=MAX_RELEASE_ID))]
        release_id: u64,
        #[arg(long)]
        product_slug: Option<String>,
    },

    /// Register a product file and print its id
    CreateProductFile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        storage_key: String,
        #[arg(long)]
        md5: String,
        #[arg(long)]
        file_version: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        docs_url: String,
        /// Release date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        release_date: Option<NaiveDate>,
        #[arg(long)]
        size: Option<u64>,
        #[arg(long)]
        product_slug: Option<String>,
    },

    /// Download one artifact from the content host
    Fetch {
        artifact: String,
        #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_STEMCELL_VERSION as i64))]
        version: u32,
        #[arg(long)]
        expected_md5: Option<String>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Download every configured stemcell for a version
    FetchStemcells {
        #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_STEMCELL_VERSION as i64))]
        version: u32,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// `delete_release RELEASE_ID`
#[derive(Debug, Parser)]
#[command(name = "delete_release")]
#[command(version, about = "Deletes a stemcell release from the distribution platform")]
pub struct DeleteReleaseCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[arg(value_parser = clap::value_parser!(u64).range(1..=MAX_RELEASE_ID))]
    pub release_id: u64,

    #[arg(long)]
    pub product_slug: Option<String>,
}

/// `stemcell VERSION`
#[derive(Debug, Parser)]
#[command(name = "stemcell")]
#[command(version, about = "Fetches stemcells for vSphere, vCD, OpenStack and AWS")]
pub struct StemcellCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[arg(
        value_name = "VERSION",
        value_parser = clap::value_parser!(u32).range(1..=MAX_STEMCELL_VERSION as i64)
    )]
    pub stemcell_version: u32,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// 命令列的 `--product-slug` 優先於設定檔，兩者都要通過 slug 檢查
pub fn resolve_product_slug(override_slug: Option<String>, config: &PivnetConfig) -> Result<String> {
    let slug = override_slug.unwrap_or_else(|| config.product_slug.clone());
    validation::validate_slug("product_slug", &slug)?;
    Ok(slug)
}

/// 解析命令列；`--help`/`--version` 以 0 結束，其餘參數錯誤以 255 結束
pub fn parse_or_exit<T: Parser>() -> T {
    match T::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() { USAGE_EXIT_CODE } else { 0 };
            std::process::exit(code);
        }
    }
}

/// 記錄錯誤並依錯誤類型結束程序
pub fn exit_with_error(e: &PivnetError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_release_args() {
        let cli = DeleteReleaseCli::try_parse_from(["delete_release", "512"]).unwrap();
        assert_eq!(cli.release_id, 512);
        assert!(!cli.global.verbose);

        assert!(DeleteReleaseCli::try_parse_from(["delete_release"]).is_err());
        assert!(DeleteReleaseCli::try_parse_from(["delete_release", "0"]).is_err());
        assert!(DeleteReleaseCli::try_parse_from(["delete_release", "1000000"]).is_err());
        assert!(DeleteReleaseCli::try_parse_from(["delete_release", "abc"]).is_err());
        assert!(DeleteReleaseCli::try_parse_from(["delete_release", "1", "2"]).is_err());
    }

    #[test]
    fn test_stemcell_args() {
        let cli = StemcellCli::try_parse_from(["stemcell", "3026", "--output-dir", "/tmp/x", "-v"]).unwrap();
        assert_eq!(cli.stemcell_version, 3026);
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/x")));
        assert!(cli.global.verbose);

        assert!(StemcellCli::try_parse_from(["stemcell", "100000"]).is_err());
        assert!(StemcellCli::try_parse_from(["stemcell", "-5"]).is_err());
    }

    #[test]
    fn test_pivnet_subcommands() {
        let cli = PivnetCli::try_parse_from([
            "pivnet",
            "create-product-file",
            "--name",
            "AWS",
            "--storage-key",
            "product_files/aws.tgz",
            "--md5",
            "abc",
            "--file-version",
            "3026",
            "--release-date",
            "2015-07-04",
        ])
        .unwrap();
        match cli.command {
            Command::CreateProductFile { release_date, size, .. } => {
                assert_eq!(release_date, NaiveDate::from_ymd_opt(2015, 7, 4));
                assert_eq!(size, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_product_slug_override_is_validated() {
        let config = PivnetConfig::default();
        assert_eq!(resolve_product_slug(None, &config).unwrap(), "stemcells");
        assert_eq!(
            resolve_product_slug(Some("my-stemcells".to_string()), &config).unwrap(),
            "my-stemcells"
        );

        for bad in ["../x", "stemcells/releases", "Bad Slug", ""] {
            let err = resolve_product_slug(Some(bad.to_string()), &config).unwrap_err();
            assert!(
                matches!(err, PivnetError::InvalidConfigValueError { .. }),
                "expected rejection of {:?}, got {:?}",
                bad,
                err
            );
        }

        let cli = DeleteReleaseCli::try_parse_from(["delete_release", "512", "--product-slug", "../x"]).unwrap();
        assert!(resolve_product_slug(cli.product_slug, &config).is_err());
    }

    #[test]
    fn test_global_overrides() {
        let cli = PivnetCli::try_parse_from([
            "pivnet",
            "verify-auth",
            "--api-host",
            "http://127.0.0.1:9999",
            "--token-file",
            "/tmp/token",
        ])
        .unwrap();
        let config = cli.global.resolve_config().unwrap();
        assert_eq!(config.api_host, "http://127.0.0.1:9999");
        assert_eq!(config.token_file, PathBuf::from("/tmp/token"));

        let cli = PivnetCli::try_parse_from(["pivnet", "verify-auth", "--api-host", "nope"]).unwrap();
        assert!(cli.global.resolve_config().is_err());
    }
}
