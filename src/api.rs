//! Access to the paginated news backend.
//!
//! # Architecture
//!
//! - [`NewsSource`]: the trait the session fetches through
//! - [`HttpNewsSource`]: the real backend, `GET <base>/api/v1/news?page=&size=`
//!
//! No retry: a failed fetch is returned as an error and the container decides
//! what the screen shows.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::PageResponse;
use crate::utils::truncate_for_log;
use reqwest::header::ACCEPT;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Something that can produce one page of articles.
///
/// `page_index` is 0-based, as the backend expects.
pub trait NewsSource {
    fn fetch_page(
        &self,
        page_index: u32,
        size: u32,
    ) -> impl Future<Output = Result<PageResponse>> + Send;
}

/// [`NewsSource`] backed by the HTTP news API.
#[derive(Debug, Clone)]
pub struct HttpNewsSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpNewsSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Use a pre-built client, e.g. one with custom proxy settings.
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// The listing URL for one page. Any path prefix on the base URL is kept.
    pub fn endpoint(&self, page_index: u32, size: u32) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("base URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1", "news"]);
        url.query_pairs_mut()
            .clear()
            .append_pair("page", &page_index.to_string())
            .append_pair("size", &size.to_string());
        Ok(url)
    }
}

impl NewsSource for HttpNewsSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch_page(&self, page_index: u32, size: u32) -> Result<PageResponse> {
        let url = self.endpoint(page_index, size)?;
        let t0 = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        // The body is decoded regardless; a JSON error document degrades to
        // an empty page.
        let status = response.status();
        if !status.is_success() {
            warn!(%status, %url, "Backend returned a non-success status");
        }

        let body = response.bytes().await?;
        let elapsed_ms = t0.elapsed().as_millis();
        debug!(bytes = body.len(), elapsed_ms, "Received page body");

        match PageResponse::from_slice(&body) {
            Ok(page) => {
                info!(
                    articles = page.content.len(),
                    total_pages = page.total_pages,
                    elapsed_ms,
                    "Fetched news page"
                );
                Ok(page)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    body_preview = %truncate_for_log(&String::from_utf8_lossy(&body), 300),
                    "Backend returned a non-JSON body"
                );
                Err(e)
            }
        }
    }
}
