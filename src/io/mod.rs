mod http;
mod local;
mod memory;

pub use http::HttpRangeFetcher;
pub use local::LocalFileFetcher;
pub use memory::MemoryFetcher;

use anyhow::Result;
use async_trait::async_trait;

/// What a metadata-only request reveals about a remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Total size of the resource in bytes
    pub size: u64,
    /// Whether the server advertises byte-range support
    pub supports_ranges: bool,
}

/// Trait for byte-range access to a resource identified by URL
#[async_trait]
pub trait RangeFetcher: Send + Sync {
    /// Report the size of the resource and whether it can be fetched by range
    async fn probe(&self, url: &str) -> Result<Probe>;

    /// Fetch the inclusive byte range `[start, end]`
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>>;
}
