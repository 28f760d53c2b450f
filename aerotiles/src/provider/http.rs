//! Tile download client seam

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, trace};

use super::types::ProviderError;

/// User-Agent sent with every tile request.
///
/// The chart server refuses anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("aerotiles/", env!("CARGO_PKG_VERSION"));

/// Idle connections kept per host; matches the upper end of sensible
/// `parallel_downloads` values.
const IDLE_CONNECTIONS_PER_HOST: usize = 32;

/// Fetches one tile body.
///
/// The pipeline only ever issues GETs against rendered tile URLs, so the
/// seam is a single method. Tests substitute scripted clients.
pub trait AsyncHttpClient: Send + Sync {
    /// Downloads `url` and returns the non-empty body of a 2xx response.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Production client backed by a pooled [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct AsyncReqwestClient {
    inner: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Builds a client with a per-request `timeout` and `user_agent`.
    pub fn build(timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_max_idle_per_host(IDLE_CONNECTIONS_PER_HOST)
            .tcp_nodelay(true)
            .build()
            .map(|inner| Self { inner })
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        check_status(url, response.status())?;

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;
        if body.is_empty() {
            return Err(ProviderError::InvalidResponse(format!(
                "empty body from {}",
                url
            )));
        }

        trace!(url, bytes = body.len(), "Tile body received");
        Ok(body.to_vec())
    }
}

fn check_status(url: &str, status: StatusCode) -> Result<(), ProviderError> {
    if status.is_success() {
        return Ok(());
    }
    debug!(url, status = status.as_u16(), "Tile server refused request");
    Err(ProviderError::HttpStatus {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

/// Failures while sending or while reading the body are both retryable:
/// a stream cut short surfaces from reqwest as a body or decode error.
fn transport_error(url: &str, e: &reqwest::Error) -> ProviderError {
    debug!(url, error = %e, timeout = e.is_timeout(), "Tile request failed");
    let detail = format!("{}: {}", url, e);
    if e.is_timeout() {
        ProviderError::Timeout(detail)
    } else {
        ProviderError::Connection(detail)
    }
}
