use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::profile::{DetailRecord, ProfileId, SummaryRecord};
use crate::{FeedError, Result};

/// Where profile data comes from.
///
/// Implementations report every failure as an error; the callers decide
/// what to substitute.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_index(&self) -> Result<Vec<SummaryRecord>>;

    async fn fetch_detail(&self, id: ProfileId) -> Result<DetailRecord>;
}

/// [`ProfileSource`] backed by two JSON REST resources.
pub struct HttpSource {
    client: Client,
    index_url: Url,
    detail_base: Url,
}

impl HttpSource {
    pub fn new(index_url: Url, detail_base: Url) -> Result<Self> {
        // Detail URLs are built by appending a path segment.
        if detail_base.cannot_be_a_base() {
            return Err(FeedError::Config(format!(
                "detail URL {} cannot be used as a base",
                detail_base
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                "cardfeed/",
                env!("CARGO_PKG_VERSION")
            )),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            index_url,
            detail_base,
        })
    }

    pub fn detail_url(&self, id: ProfileId) -> Result<Url> {
        let mut url = self.detail_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                FeedError::Config(format!(
                    "detail URL {} cannot be used as a base",
                    self.detail_base
                ))
            })?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!("source: GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let body = Self::successful(response).await?;
        serde_json::from_slice(&body).map_err(|err| {
            log::warn!("source: malformed body from {}: {}", url, err);
            FeedError::Parse
        })
    }

    async fn successful(response: Response) -> Result<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ProfileSource for HttpSource {
    async fn fetch_index(&self) -> Result<Vec<SummaryRecord>> {
        self.get_json(self.index_url.clone()).await
    }

    async fn fetch_detail(&self, id: ProfileId) -> Result<DetailRecord> {
        let url = self.detail_url(id)?;
        self.get_json(url).await
    }
}
