use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{Probe, RangeFetcher};
use crate::config::HttpOptions;
use anyhow::{Result, anyhow, bail};

/// HTTP Range fetcher for remote ZIP files
pub struct HttpRangeFetcher {
    client: Client,
    max_retries: u32,
    transferred_bytes: AtomicU64,
}

impl HttpRangeFetcher {
    pub fn new(options: HttpOptions) -> Result<Self> {
        let client = Client::builder().timeout(options.timeout).build()?;

        Ok(Self {
            client,
            max_retries: options.max_retries,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RangeFetcher for HttpRangeFetcher {
    /// Send a HEAD request to get the file size and check Range support
    async fn probe(&self, url: &str) -> Result<Probe> {
        let resp = self.client.head(url).send().await?;

        if !resp.status().is_success() {
            bail!("HTTP request failed with status: {}", resp.status());
        }

        let supports_ranges = resp
            .headers()
            .get("accept-ranges")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("bytes"));

        let size = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow!("Remote server did not return Content-Length"))?;

        log::debug!("probed {url}: {size} bytes, ranges supported: {supports_ranges}");

        Ok(Probe {
            size,
            supports_ranges,
        })
    }

    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        if end < start {
            bail!("Invalid byte range: {start}-{end}");
        }

        let expected_size = usize::try_from(end - start + 1)?;
        let mut buf = Vec::with_capacity(expected_size);
        let mut retry_count = 0;

        // A server may answer with fewer bytes than asked; keep asking for the rest
        while buf.len() < expected_size {
            let current_start = start + buf.len() as u64;
            let range = format!("bytes={current_start}-{end}");

            let result = self.client.get(url).header("Range", &range).send().await;

            match result {
                Ok(resp) => {
                    if resp.status() != reqwest::StatusCode::PARTIAL_CONTENT {
                        bail!("HTTP request failed with status: {}", resp.status());
                    }

                    let bytes = resp.bytes().await?;
                    if bytes.is_empty() {
                        bail!("Server returned an empty body for range {range}");
                    }
                    let chunk_len = bytes.len().min(expected_size - buf.len());
                    buf.extend_from_slice(&bytes[..chunk_len]);

                    self.transferred_bytes
                        .fetch_add(chunk_len as u64, Ordering::Relaxed);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retries {
                        bail!("Max retries exceeded");
                    }
                    log::warn!(
                        "Connection error, retry {}/{}: {}",
                        retry_count,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(buf)
    }
}
