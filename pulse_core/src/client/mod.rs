//! `reqwest` glue: client configuration and the progress interceptor.

pub mod config;
pub mod interceptor;
pub mod response;

pub use config::ClientConfig;
pub use interceptor::{url_key, ProgressInterceptor};
pub use response::{BodyStream, TrackedResponse};
