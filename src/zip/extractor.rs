//! Fetching and decoding a single member.
//!
//! The local file header has variable-length fields that are not known until
//! it is fetched, so the member is requested together with a fixed headroom
//! that normally covers the header, its file name and its extra field. The
//! header's compressed size must agree with the central directory before any
//! of its offsets are trusted.

use flate2::read::DeflateDecoder;
use std::io::Read;

use crate::config::FetchPolicy;
use crate::error::{Result, ZipError};
use crate::io::RangeFetcher;
use anyhow::anyhow;

use super::structures::{ArchiveHandle, CompressionMethod, LFH_SIZE, LocalFileHeader, TocEntry};

/// First entry whose name matches `file_name` byte for byte
pub fn find_entry<'a>(toc: &'a [TocEntry], file_name: &[u8]) -> Option<&'a TocEntry> {
    toc.iter().find(|e| e.file_name == file_name)
}

/// Extract the member named `file_name`.
///
/// Names are compared byte for byte; if the directory lists a name more than
/// once, the first entry wins.
pub async fn extract<F: RangeFetcher + ?Sized>(
    fetcher: &F,
    archive: &ArchiveHandle,
    toc: &[TocEntry],
    file_name: &[u8],
    policy: &FetchPolicy,
) -> Result<Vec<u8>> {
    let entry = find_entry(toc, file_name).ok_or_else(|| ZipError::MemberNotFound {
        name: String::from_utf8_lossy(file_name).into_owned(),
    })?;

    extract_entry(fetcher, archive, entry, policy).await
}

/// Extract the member described by `entry`.
///
/// # Errors
///
/// - [`ZipError::InvalidOffset`] if the entry points outside the archive
/// - [`ZipError::InvalidLocalHeader`] if no local header is found there
/// - [`ZipError::SizeMismatch`] if the header disagrees with `entry`
/// - [`ZipError::UnsupportedCompressionMethod`] for anything but STORED or DEFLATE
/// - [`ZipError::Decompress`], [`ZipError::LengthMismatch`] or
///   [`ZipError::ChecksumMismatch`] if the data does not decode to what `entry` describes
pub async fn extract_entry<F: RangeFetcher + ?Sized>(
    fetcher: &F,
    archive: &ArchiveHandle,
    entry: &TocEntry,
    policy: &FetchPolicy,
) -> Result<Vec<u8>> {
    let size = archive.size();
    let header_offset = entry.local_header_offset as u64;
    let compressed_size = entry.compressed_size as u64;

    if header_offset + LFH_SIZE as u64 > size {
        return Err(ZipError::out_of_bounds(
            "local header",
            header_offset,
            LFH_SIZE as u64,
            size,
        ));
    }

    // The fixed header must always arrive in the first fetch
    let first_len = (compressed_size + policy.header_headroom).max(LFH_SIZE as u64);
    let window_end = (header_offset + first_len).min(size) - 1;
    let mut data = fetcher
        .fetch_range(archive.url(), header_offset, window_end)
        .await?;

    let header = LocalFileHeader::from_bytes(&data).ok_or(ZipError::InvalidLocalHeader {
        offset: header_offset,
    })?;

    if header.compressed_size != entry.compressed_size {
        return Err(ZipError::SizeMismatch {
            name: entry.display_name().into_owned(),
            directory: entry.compressed_size,
            local: header.compressed_size,
        });
    }

    let method = CompressionMethod::from_u16(header.compression_method);
    if let CompressionMethod::Unknown(m) = method {
        return Err(ZipError::UnsupportedCompressionMethod(m));
    }

    let data_start = header.data_offset();
    let data_end = data_start + compressed_size;
    if header_offset + data_end > size {
        return Err(ZipError::out_of_bounds(
            "member data",
            header_offset + data_start,
            compressed_size,
            size,
        ));
    }

    // An unusually long extra field can push the data past the headroom
    let fetched = data.len() as u64;
    if data_end > fetched {
        log::debug!(
            "member {} extends {} bytes past the first fetch",
            entry.display_name(),
            data_end - fetched
        );
        let rest = fetcher
            .fetch_range(
                archive.url(),
                header_offset + fetched,
                header_offset + data_end - 1,
            )
            .await?;
        data.extend(rest);
    }

    let payload = data
        .get(data_start as usize..data_end as usize)
        .ok_or_else(|| anyhow!("Fetch of member {} returned short data", entry.display_name()))?;

    let expected = entry.uncompressed_size as u64;
    let output = match method {
        CompressionMethod::Stored => payload.to_vec(),
        CompressionMethod::Deflate => {
            // The directory's size is untrusted; deflate expands at most 1032:1
            let hint = expected.min(compressed_size.saturating_mul(1032));
            let mut output = Vec::with_capacity(hint as usize);
            // One byte more than expected is enough to detect overlong output
            DeflateDecoder::new(payload)
                .take(expected + 1)
                .read_to_end(&mut output)
                .map_err(ZipError::Decompress)?;
            output
        }
        CompressionMethod::Unknown(m) => return Err(ZipError::UnsupportedCompressionMethod(m)),
    };

    if output.len() as u64 != expected {
        return Err(ZipError::LengthMismatch {
            expected,
            actual: output.len() as u64,
        });
    }

    let actual = crc32fast::hash(&output);
    if actual != entry.crc32 {
        return Err(ZipError::ChecksumMismatch {
            expected: entry.crc32,
            actual,
        });
    }

    log::info!(
        "extracted {} ({} -> {} bytes)",
        entry.display_name(),
        compressed_size,
        output.len()
    );

    Ok(output)
}
