use super::{Probe, RangeFetcher};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Local file fetcher, treating the URL as a filesystem path
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileFetcher;

impl LocalFileFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RangeFetcher for LocalFileFetcher {
    async fn probe(&self, url: &str) -> Result<Probe> {
        let metadata = tokio::fs::metadata(url)
            .await
            .with_context(|| format!("Failed to stat {url}"))?;

        Ok(Probe {
            size: metadata.len(),
            supports_ranges: true,
        })
    }

    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        if end < start {
            bail!("Invalid byte range: {start}-{end}");
        }

        let mut file = File::open(url)
            .await
            .with_context(|| format!("Failed to open {url}"))?;
        file.seek(SeekFrom::Start(start)).await?;

        let mut buf = vec![0u8; usize::try_from(end - start + 1)?];
        file.read_exact(&mut buf)
            .await
            .with_context(|| format!("Failed to read bytes {start}-{end} of {url}"))?;

        Ok(buf)
    }
}
