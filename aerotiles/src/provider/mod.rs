//! Upstream tile source abstraction
//!
//! This module provides the HTTP client seam used to download raw tile bytes
//! and the URL template that maps a tile address to a request URL.
//!
//! # Example
//!
//! ```ignore
//! use aerotiles::provider::{AsyncHttpClient, AsyncReqwestClient, UrlTemplate};
//!
//! let client = AsyncReqwestClient::build(Duration::from_secs(30), DEFAULT_USER_AGENT)?;
//! let template = UrlTemplate::parse("https://tiles.example.com/{z}/{x}/{y}.png")?;
//! let bytes = client.get(&template.render(&tile, "2502")).await?;
//! ```

mod http;
mod template;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_USER_AGENT};
pub use template::{UrlTemplate, DEFAULT_URL_TEMPLATE};
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
