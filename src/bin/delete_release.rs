use pivnet_stemcells::config::cli::{
    exit_with_error, parse_or_exit, resolve_product_slug, DeleteReleaseCli,
};
use pivnet_stemcells::{PivnetApi, Result};

#[tokio::main]
async fn main() {
    let cli: DeleteReleaseCli = parse_or_exit();
    cli.global.init_logging();

    if let Err(e) = run(&cli).await {
        exit_with_error(&e);
    }
    println!("DeleteRelease on {}: ok", cli.release_id);
}

async fn run(cli: &DeleteReleaseCli) -> Result<()> {
    let config = cli.global.resolve_config()?;
    let slug = resolve_product_slug(cli.product_slug.clone(), &config)?;

    PivnetApi::from_config(&config)?
        .delete_release(&slug, cli.release_id)
        .await
}
