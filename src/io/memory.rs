use super::{Probe, RangeFetcher};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory fetcher serving a single archive under any URL.
///
/// Every range request is recorded so callers can check exactly which
/// bytes an operation pulled.
#[derive(Debug)]
pub struct MemoryFetcher {
    data: Vec<u8>,
    supports_ranges: bool,
    requests: Mutex<Vec<(u64, u64)>>,
}

impl MemoryFetcher {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            supports_ranges: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Pretend the server does not advertise range support
    pub fn without_ranges(mut self) -> Self {
        self.supports_ranges = false;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Inclusive ranges requested so far, in request order
    pub fn requests(&self) -> Vec<(u64, u64)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RangeFetcher for MemoryFetcher {
    async fn probe(&self, _url: &str) -> Result<Probe> {
        Ok(Probe {
            size: self.data.len() as u64,
            supports_ranges: self.supports_ranges,
        })
    }

    async fn fetch_range(&self, _url: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        if end < start || end >= self.data.len() as u64 {
            bail!(
                "Range {start}-{end} not satisfiable for {} bytes",
                self.data.len()
            );
        }

        if let Ok(mut requests) = self.requests.lock() {
            requests.push((start, end));
        }

        Ok(self.data[start as usize..=end as usize].to_vec())
    }
}
