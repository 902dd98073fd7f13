//! Remote source of block content.
//!
//! The server renders block content; the repeater only asks for it. Two
//! exchanges exist: fetching the blocks for a persisted value, and fetching
//! blank blocks to append.

pub mod http;
pub mod memory;
pub mod wire;

use async_trait::async_trait;

pub use http::HttpBlockSource;
pub use memory::MemoryBlockSource;
pub use wire::{FetchInitialRequest, FetchNewRequest, FetchResponse, RawContent};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Endpoint responded with status {status}")]
    Status { status: u16 },
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Blocks for a previously persisted value, in display order.
    async fn fetch_initial(
        &self,
        field_name: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<RawContent>, SourceError>;

    /// `requested` blank blocks to follow the `existing` ones.
    async fn fetch_new(
        &self,
        field_name: &str,
        existing: usize,
        requested: usize,
    ) -> Result<Vec<RawContent>, SourceError>;
}
