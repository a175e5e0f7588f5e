//! Tunables for range fetching.

use std::time::Duration;

/// How much of a remote archive the core is willing to fetch at once.
///
/// The defaults follow the ZIP format's practical limits: a 64 KiB tail
/// covers the end of central directory record plus the largest possible
/// comment, and directories larger than 1 MiB are refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Size of the first tail fetch used to find the EOCD record. Values
    /// below the 22-byte record size are raised to it.
    pub tail_window: u64,
    /// Size of the second tail fetch, and the hard limit for a directory.
    pub max_tail_window: u64,
    /// Extra bytes fetched past a member's compressed data to cover its
    /// local header, file name and extra field.
    pub header_headroom: u64,
    /// Report a malformed directory instead of returning the entries read so far.
    pub strict_directory: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            tail_window: 64 * 1024,
            max_tail_window: 1024 * 1024,
            header_headroom: 1024,
            strict_directory: true,
        }
    }
}

/// Transport settings for [`HttpRangeFetcher`](crate::io::HttpRangeFetcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 10,
        }
    }
}
