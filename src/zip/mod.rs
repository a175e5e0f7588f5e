//! Remote ZIP archive parsing and extraction.
//!
//! ## Architecture
//!
//! The module is organized into the stages a remote read goes through:
//!
//! - [`structures`]: Data structures representing ZIP format elements and the
//!   values threaded between stages ([`ArchiveHandle`], [`DirectoryLocation`], [`TocEntry`])
//! - [`locator`]: Finding the End of Central Directory record in the archive's tail
//! - [`toc`]: Walking the Central Directory into a table of contents
//! - [`extractor`]: Fetching and decoding one member
//!
//! [`RemoteZip`] ties them together behind a small API.
//!
//! ## Fetch pattern
//!
//! Listing an archive costs one range request, or two if the Central
//! Directory does not fit in the first 64 KiB tail. Extracting a member costs
//! one request for its local header and data, or two if the header's extra
//! field is unusually long. Nothing is cached between calls.
//!
//! ## Limitations
//!
//! - No ZIP64 support
//! - No encryption support
//! - No multi-disk archive support
//! - Central directories larger than 1 MiB are refused
//! - Only STORED and DEFLATE compression methods

pub mod extractor;
pub mod locator;
pub mod structures;
pub mod toc;

pub use structures::*;
pub use toc::{DirectoryEnd, TableOfContents};

use std::sync::Arc;

use crate::config::FetchPolicy;
use crate::error::{Result, ZipError};
use crate::io::RangeFetcher;

/// Entry point for reading remote archives through a [`RangeFetcher`].
///
/// Holds no per-archive state: every call takes the [`ArchiveHandle`] and
/// table of contents it needs, so concurrent extractions are independent.
pub struct RemoteZip<F: RangeFetcher + ?Sized> {
    fetcher: Arc<F>,
    policy: FetchPolicy,
}

impl<F: RangeFetcher + ?Sized> RemoteZip<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self::with_policy(fetcher, FetchPolicy::default())
    }

    pub fn with_policy(fetcher: Arc<F>, policy: FetchPolicy) -> Self {
        Self { fetcher, policy }
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Probe `url` and check it can be read by range.
    pub async fn open_archive(&self, url: &str) -> Result<ArchiveHandle> {
        let probe = self.fetcher.probe(url).await?;
        if !probe.supports_ranges {
            return Err(ZipError::RangeUnsupported {
                url: url.to_string(),
            });
        }

        Ok(ArchiveHandle::new(url, probe.size, probe.supports_ranges))
    }

    /// Locate the Central Directory and walk it.
    ///
    /// The returned [`TableOfContents`] says whether the walk reached the end
    /// of the directory cleanly.
    pub async fn read_directory(&self, archive: &ArchiveHandle) -> Result<TableOfContents> {
        let location = locator::locate(self.fetcher.as_ref(), archive, &self.policy).await?;
        Ok(toc::build(&location))
    }

    /// List the entries of the archive in on-disk order.
    ///
    /// With [`FetchPolicy::strict_directory`] set, a directory that ends
    /// mid-record or holds a corrupt record is an error; otherwise the
    /// entries read before that point are returned.
    pub async fn list_contents(&self, archive: &ArchiveHandle) -> Result<Vec<TocEntry>> {
        let toc = self.read_directory(archive).await?;

        if self.policy.strict_directory || toc.is_complete() {
            let entries = toc.into_entries()?;
            log::info!("{}: {} entries", archive.url(), entries.len());
            return Ok(entries);
        }

        log::warn!(
            "{}: directory ended early ({:?}), listing the first {} entries",
            archive.url(),
            toc.end,
            toc.entries.len()
        );
        Ok(toc.entries)
    }

    /// Extract the first member named `file_name`.
    pub async fn extract_member(
        &self,
        archive: &ArchiveHandle,
        toc: &[TocEntry],
        file_name: &[u8],
    ) -> Result<Vec<u8>> {
        extractor::extract(self.fetcher.as_ref(), archive, toc, file_name, &self.policy).await
    }

    /// Extract the member described by `entry`.
    pub async fn extract_entry(&self, archive: &ArchiveHandle, entry: &TocEntry) -> Result<Vec<u8>> {
        extractor::extract_entry(self.fetcher.as_ref(), archive, entry, &self.policy).await
    }
}
