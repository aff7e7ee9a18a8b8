use pivnet_stemcells::config::cli::{
    exit_with_error, parse_or_exit, resolve_product_slug, Command, PivnetCli,
};
use pivnet_stemcells::core::NewProductFile;
use pivnet_stemcells::{Downloader, PivnetApi, PivnetConfig, Result, StemcellFetcher};

#[tokio::main]
async fn main() {
    let cli: PivnetCli = parse_or_exit();

    // 初始化日誌
    cli.global.init_logging();
    tracing::debug!("CLI args: {:?}", cli);

    let config = match cli.global.resolve_config() {
        Ok(config) => config,
        Err(e) => exit_with_error(&e),
    };

    if let Err(e) = run(cli.command, config).await {
        exit_with_error(&e);
    }
}

async fn run(command: Command, mut config: PivnetConfig) -> Result<()> {
    match command {
        Command::VerifyAuth => {
            PivnetApi::from_config(&config)?.verify_authentication().await?;
            println!("Authentication: ok");
        }
        Command::CreateRelease {
            version,
            description,
            product_slug,
        } => {
            let slug = resolve_product_slug(product_slug, &config)?;
            let release_id = PivnetApi::from_config(&config)?
                .create_release(&slug, &version, &description)
                .await?;
            println!("{}", release_id);
        }
        Command::DeleteRelease {
            release_id,
            product_slug,
        } => {
            let slug = resolve_product_slug(product_slug, &config)?;
            PivnetApi::from_config(&config)?
                .delete_release(&slug, release_id)
                .await?;
            println!("DeleteRelease on {}: ok", release_id);
        }
        Command::CreateProductFile {
            name,
            storage_key,
            md5,
            file_version,
            description,
            docs_url,
            release_date,
            size,
            product_slug,
        } => {
            let slug = resolve_product_slug(product_slug, &config)?;
            let file = NewProductFile {
                display_name: name,
                storage_key,
                description,
                content_hash: md5,
                version: file_version,
                docs_url,
                release_date: release_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                size,
            };
            let product_file_id = PivnetApi::from_config(&config)?
                .create_product_file(&slug, &file)
                .await?;
            println!("{}", product_file_id);
        }
        Command::Fetch {
            artifact,
            version,
            expected_md5,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.stemcells.output_dir = dir;
            }
            let outcome = Downloader::from_config(&config.stemcells)?
                .download(&artifact, version, expected_md5.as_deref())
                .await?;
            println!("{}", outcome);
        }
        Command::FetchStemcells {
            version,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.stemcells.output_dir = dir;
            }
            let fetcher = StemcellFetcher::new(
                Downloader::from_config(&config.stemcells)?,
                config.stemcells.catalog.clone(),
            );
            for (_, outcome) in fetcher.fetch_all(version).await? {
                println!("{}", outcome);
            }
        }
    }
    Ok(())
}
