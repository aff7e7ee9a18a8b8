pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::PivnetConfig;
pub use core::{
    client::{ApiClient, RetryPolicy},
    download::Downloader,
    operations::PivnetApi,
    stemcell::StemcellFetcher,
};
pub use utils::error::{PivnetError, Result};
