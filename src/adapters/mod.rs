// Adapters layer: concrete implementations of the domain ports (credentials, http).

pub mod credentials;
pub mod http;

pub use credentials::{FileTokenProvider, StaticTokenProvider};
pub use http::ReqwestTransport;
