//! Read-only client for the bookstore's public review-listing API.
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Book URLs look like `https://www.rokomari.com/book/123456/book-name`;
/// the numeric segment after `/book/` is the identifier the review API keys on.
static BOOK_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://www\.rokomari\.com/book/(\d+)/").expect("valid book URL pattern")
});

/// Extracts the numeric book identifier from a bookstore URL, if present.
#[must_use]
pub(crate) fn extract_book_id(url: &str) -> Option<String> {
    BOOK_URL_PATTERN
        .captures(url)
        .map(|captures| captures[1].to_string())
}

/// One raw item from the review listing. Only the review text is consumed;
/// every other field in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewRecord {
    #[serde(default)]
    pub(crate) review_detail: Option<String>,
}

impl ReviewRecord {
    /// Review text with surrounding whitespace removed; empty when the source
    /// omitted or nulled the field.
    #[must_use]
    pub(crate) fn text(&self) -> &str {
        self.review_detail.as_deref().unwrap_or("").trim()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// The review listing endpoint answered with a non-success status.
    #[error("Failed to fetch reviews")]
    Status(reqwest::StatusCode),
    /// Transport failure, unresolvable URL, or a body that failed to decode.
    #[error("Error scraping reviews: {0}")]
    Scrape(anyhow::Error),
}

/// HTTP client for `GET {base}/productreviews/{book_id}/{page_size}`.
#[derive(Debug, Clone)]
pub(crate) struct BookstoreClient {
    client: Client,
    base_url: Url,
    page_size: u32,
}

impl BookstoreClient {
    pub(crate) fn new(
        base_url: impl Into<String>,
        page_size: u32,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build bookstore client")?;
        let base_url = Url::parse(&base_url.into()).context("invalid bookstore base URL")?;

        Ok(Self {
            client,
            base_url,
            page_size,
        })
    }

    /// Fetches the raw review listing for one book in a single request.
    ///
    /// The endpoint is asked for a large page so no pagination is needed;
    /// items come back in source order.
    ///
    /// # Errors
    /// [`FetchError::Status`] for a non-success response, [`FetchError::Scrape`]
    /// for transport or decode failures.
    pub(crate) async fn fetch_reviews(
        &self,
        book_id: &str,
    ) -> Result<Vec<ReviewRecord>, FetchError> {
        let url = self
            .base_url
            .join(&format!("productreviews/{book_id}/{}", self.page_size))
            .map_err(|error| FetchError::Scrape(anyhow::Error::new(error)))?;

        debug!(%book_id, %url, "fetching review listing");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::Scrape(anyhow::Error::new(error)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response
            .json::<Vec<ReviewRecord>>()
            .await
            .map_err(|error| FetchError::Scrape(anyhow::Error::new(error)))
    }
}
