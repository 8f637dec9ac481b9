use std::sync::Arc;

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};

use super::config::ClientConfig;
use super::response::{BodyStream, TrackedResponse};
use crate::body::TrackingBodyStream;
use crate::progress::ProgressRegistry;
use crate::types::types::{ProgressError, Result};

/// Normalise a URL into the key the interceptor tracks it under.
///
/// Register observers with this form: `https://example.com` is tracked as
/// `https://example.com/`.
pub fn url_key(url: &str) -> Result<String> {
    parse_url(url).map(|parsed| parsed.as_str().to_owned())
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ProgressError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Sits between an HTTP client and its caller and swaps every response body
/// for a `TrackingBodyStream` keyed by the request URL.
pub struct ProgressInterceptor {
    client: Client,
    registry: Arc<ProgressRegistry>,
}

impl ProgressInterceptor {
    pub fn new(client: Client, registry: Arc<ProgressRegistry>) -> Self {
        Self { client, registry }
    }

    pub fn from_config(config: &ClientConfig, registry: Arc<ProgressRegistry>) -> Result<Self> {
        Ok(Self::new(config.build_client()?, registry))
    }

    pub fn registry(&self) -> &Arc<ProgressRegistry> {
        &self.registry
    }

    /// Send a GET for `url` and return the response with a tracked body.
    ///
    /// Only transport failures are errors; any HTTP status is handed back.
    pub async fn get(&self, url: &str) -> Result<TrackedResponse> {
        let parsed = parse_url(url)?;
        let key = parsed.as_str().to_owned();
        log::debug!("[ProgressInterceptor] GET {}", key);
        let response = self.client.get(parsed).send().await?;
        log::debug!(
            "[ProgressInterceptor] {}: status={}, content_length={:?}",
            key,
            response.status(),
            response.content_length()
        );
        Ok(self.wrap(key, response))
    }

    /// Wrap a response obtained elsewhere. `request_url` must be the key
    /// observers were registered under.
    pub fn wrap(&self, request_url: impl Into<String>, response: Response) -> TrackedResponse {
        let url = request_url.into();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let content_length = response.content_length();
        let raw: BodyStream = response.bytes_stream().boxed();

        TrackedResponse {
            body: TrackingBodyStream::new(
                url.clone(),
                content_length,
                raw,
                Arc::clone(&self.registry),
            ),
            url,
            status,
            content_type,
            content_length,
        }
    }
}
