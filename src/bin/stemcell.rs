use pivnet_stemcells::config::cli::{exit_with_error, parse_or_exit, StemcellCli};
use pivnet_stemcells::{Downloader, Result, StemcellFetcher};

#[tokio::main]
async fn main() {
    let cli: StemcellCli = parse_or_exit();
    cli.global.init_logging();

    if let Err(e) = run(&cli).await {
        exit_with_error(&e);
    }
}

async fn run(cli: &StemcellCli) -> Result<()> {
    let mut config = cli.global.resolve_config()?;
    if let Some(dir) = &cli.output_dir {
        config.stemcells.output_dir = dir.clone();
    }

    let fetcher = StemcellFetcher::new(
        Downloader::from_config(&config.stemcells)?,
        config.stemcells.catalog.clone(),
    );

    // 逐一輸出，前面的結果在後續失敗時仍可見
    for stemcell in fetcher.catalog() {
        let outcome = fetcher.fetch(stemcell, cli.stemcell_version).await?;
        println!("{}", outcome);
    }
    Ok(())
}
