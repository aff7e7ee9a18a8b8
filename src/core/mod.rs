pub mod classifier;
pub mod client;
pub mod download;
pub mod operations;
pub mod stemcell;

pub use crate::domain::model::{DownloadOutcome, NewProductFile, StemcellDescriptor};
pub use crate::domain::ports::{HttpTransport, TokenProvider};
pub use crate::utils::error::Result;
