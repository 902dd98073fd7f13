use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{
    BlockSource, FetchInitialRequest, FetchNewRequest, FetchResponse, RawContent, SourceError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Block source backed by the repeater endpoint of the host application.
///
/// Both exchanges are JSON POSTs to the same URL; the request body tells the
/// server which one is meant.
#[derive(Debug, Clone)]
pub struct HttpBlockSource {
    client: Client,
    endpoint_url: String,
}

impl HttpBlockSource {
    pub fn new(endpoint_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, endpoint_url))
    }

    pub fn with_client(client: Client, endpoint_url: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_url: endpoint_url.into(),
        }
    }

    async fn post<B: Serialize + Sync>(&self, body: &B) -> Result<Vec<RawContent>, SourceError> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let parsed: FetchResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.results)
    }
}

#[async_trait]
impl BlockSource for HttpBlockSource {
    async fn fetch_initial(
        &self,
        field_name: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<RawContent>, SourceError> {
        self.post(&FetchInitialRequest {
            value: value.clone(),
            repeater_name: field_name.to_string(),
        })
        .await
    }

    async fn fetch_new(
        &self,
        field_name: &str,
        existing: usize,
        requested: usize,
    ) -> Result<Vec<RawContent>, SourceError> {
        self.post(&FetchNewRequest {
            repeater_name: field_name.to_string(),
            blocks: existing,
            num: requested,
        })
        .await
    }
}
