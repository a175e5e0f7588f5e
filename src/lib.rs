//! # remotezip
//!
//! List and extract single members of remote ZIP archives using HTTP Range requests.
//!
//! Only the regions of the archive that matter are downloaded: the tail holding
//! the End of Central Directory record, the Central Directory itself, and the
//! local header and data of each requested member.
//!
//! ## Features
//!
//! - List ZIP archives on HTTP/HTTPS servers that support Range requests
//! - Extract single members without downloading the whole archive
//! - Support for STORED (uncompressed) and DEFLATE compression methods
//! - Header cross-validation and CRC-32 checks on every extracted member
//! - Local files through the same interface
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use remotezip::{HttpOptions, HttpRangeFetcher, RemoteZip};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Arc::new(HttpRangeFetcher::new(HttpOptions::default())?);
//!     let zip = RemoteZip::new(fetcher);
//!
//!     let archive = zip.open_archive("https://example.com/archive.zip").await?;
//!     let toc = zip.list_contents(&archive).await?;
//!     for entry in &toc {
//!         println!("{}", entry.display_name());
//!     }
//!
//!     let readme = zip.extract_member(&archive, &toc, b"README.md").await?;
//!     println!("{}", String::from_utf8_lossy(&readme));
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use config::{FetchPolicy, HttpOptions};
pub use error::{Result, ZipError};
pub use io::{HttpRangeFetcher, LocalFileFetcher, MemoryFetcher, Probe, RangeFetcher};
pub use crate::zip::{ArchiveHandle, DirectoryEnd, DirectoryLocation, RemoteZip, TableOfContents, TocEntry};
