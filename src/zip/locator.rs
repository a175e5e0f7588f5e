//! Locating the central directory from the tail of a remote archive.
//!
//! The EOCD record sits at the very end of a ZIP file, followed only by an
//! optional comment of at most 65535 bytes. Fetching the last 64 KiB is
//! therefore enough to find it, and for most archives the central directory
//! itself is inside that same window. When it is not, one larger tail fetch
//! is made, and a directory that does not fit in that larger window is refused.

use crate::config::FetchPolicy;
use crate::error::{Result, ZipError};
use crate::io::RangeFetcher;
use anyhow::anyhow;

use super::structures::{ArchiveHandle, DirectoryLocation, EndOfCentralDirectory};

/// Find the EOCD record in `window`, scanning backward from its end.
///
/// A candidate must leave room for the whole 22-byte record. Since the window
/// always ends at the end of the archive, a genuine record's comment length
/// reaches exactly to the end of the window; such a candidate wins over one
/// that merely carries the signature. Failing that, the rightmost complete
/// candidate is used.
pub fn find_eocd(window: &[u8]) -> Option<(usize, EndOfCentralDirectory)> {
    let last = window.len().checked_sub(EndOfCentralDirectory::SIZE)?;
    let mut fallback = None;

    for i in (0..=last).rev() {
        if &window[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
            continue;
        }
        let Some(eocd) = EndOfCentralDirectory::from_bytes(&window[i..]) else {
            continue;
        };
        if eocd.comment_len as usize == window.len() - i - EndOfCentralDirectory::SIZE {
            return Some((i, eocd));
        }
        fallback.get_or_insert((i, eocd));
    }

    fallback
}

/// Fetch the last `min(len, archive size)` bytes.
///
/// Returns the bytes together with the absolute offset they start at.
async fn fetch_tail<F: RangeFetcher + ?Sized>(
    fetcher: &F,
    archive: &ArchiveHandle,
    len: u64,
) -> Result<(Vec<u8>, u64)> {
    let size = archive.size();
    let len = len.min(size);
    let start = size - len;

    log::debug!("fetching tail window {}-{} of {}", start, size - 1, archive.url());
    let window = fetcher.fetch_range(archive.url(), start, size - 1).await?;

    if window.len() as u64 != len {
        return Err(anyhow!(
            "Tail fetch returned {} bytes, expected {}",
            window.len(),
            len
        )
        .into());
    }

    Ok((window, start))
}

/// Parse the directory geometry out of a tail window and check it against
/// the archive bounds.
fn locate_in_window(window: Vec<u8>, window_start: u64) -> Result<DirectoryLocation> {
    let (eocd_offset, eocd) = find_eocd(&window).ok_or(ZipError::DirectoryNotFound)?;

    // The directory precedes the EOCD record, which itself lies inside the archive
    let eocd_position = window_start + eocd_offset as u64;
    let directory_end = eocd.cd_offset as u64 + eocd.cd_size as u64;
    if directory_end > eocd_position {
        return Err(ZipError::out_of_bounds(
            "central directory",
            eocd.cd_offset as u64,
            eocd.cd_size as u64,
            eocd_position,
        ));
    }

    log::debug!(
        "EOCD at {}: directory of {} bytes at {}, {} entries",
        eocd_position,
        eocd.cd_size,
        eocd.cd_offset,
        eocd.total_entries
    );

    Ok(DirectoryLocation {
        eocd_offset,
        directory_size: eocd.cd_size,
        directory_start: eocd.cd_offset,
        total_entries: eocd.total_entries,
        window,
        window_start,
    })
}

/// Locate the central directory of `archive`.
///
/// The returned location's window always contains the whole directory.
///
/// # Errors
///
/// - [`ZipError::RangeUnsupported`] if the archive cannot be fetched by range
/// - [`ZipError::DirectoryNotFound`] if no EOCD record is present in the tail
/// - [`ZipError::DirectoryTooLarge`] if the directory does not fit in
///   [`FetchPolicy::max_tail_window`]
/// - [`ZipError::InvalidOffset`] if the EOCD points outside the archive
pub async fn locate<F: RangeFetcher + ?Sized>(
    fetcher: &F,
    archive: &ArchiveHandle,
    policy: &FetchPolicy,
) -> Result<DirectoryLocation> {
    if !archive.supports_ranges() {
        return Err(ZipError::RangeUnsupported {
            url: archive.url().to_string(),
        });
    }
    if archive.size() < EndOfCentralDirectory::SIZE as u64 {
        return Err(ZipError::DirectoryNotFound);
    }

    // Neither window can be smaller than the record it searches for
    let tail_window = policy.tail_window.max(EndOfCentralDirectory::SIZE as u64);
    let max_tail_window = policy.max_tail_window.max(tail_window);

    let (window, window_start) = fetch_tail(fetcher, archive, tail_window).await?;
    let location = locate_in_window(window, window_start)?;
    if location.directory_bytes().is_some() {
        return Ok(location);
    }

    let too_large = ZipError::DirectoryTooLarge {
        size: location.directory_size as u64,
        limit: max_tail_window,
    };
    if location.directory_size as u64 > max_tail_window || max_tail_window <= tail_window {
        return Err(too_large);
    }

    log::debug!(
        "directory of {} bytes is outside the first window, widening to {}",
        location.directory_size,
        max_tail_window
    );
    let (window, window_start) = fetch_tail(fetcher, archive, max_tail_window).await?;
    let location = locate_in_window(window, window_start)?;
    if location.directory_bytes().is_none() {
        return Err(too_large);
    }

    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eocd(cd_size: u32, cd_offset: u32, comment: &[u8]) -> Vec<u8> {
        let mut record = Vec::new();
        record.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
        record.extend_from_slice(&[0, 0, 0, 0]);
        record.extend_from_slice(&3u16.to_le_bytes());
        record.extend_from_slice(&3u16.to_le_bytes());
        record.extend_from_slice(&cd_size.to_le_bytes());
        record.extend_from_slice(&cd_offset.to_le_bytes());
        record.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        record.extend_from_slice(comment);
        record
    }

    #[test]
    fn finds_record_at_end() {
        let mut window = vec![0xAA; 100];
        window.extend(eocd(40, 60, b""));

        let (offset, record) = find_eocd(&window).unwrap();
        assert_eq!(offset, 100);
        assert_eq!(record.cd_size, 40);
        assert_eq!(record.cd_offset, 60);
        assert_eq!(record.total_entries, 3);
    }

    #[test]
    fn finds_record_before_comment() {
        let mut window = vec![0u8; 10];
        window.extend(eocd(1, 2, b"archive comment"));

        let (offset, record) = find_eocd(&window).unwrap();
        assert_eq!(offset, 10);
        assert_eq!(record.comment_len, 15);
    }

    #[test]
    fn ignores_signature_inside_comment() {
        // The comment embeds a complete fake record whose comment length
        // does not reach the end of the window.
        let mut comment = eocd(999, 999, b"");
        comment.extend_from_slice(b"trailing text");

        let mut window = vec![0u8; 8];
        window.extend(eocd(5, 3, &comment));

        let (offset, record) = find_eocd(&window).unwrap();
        assert_eq!(offset, 8);
        assert_eq!(record.cd_size, 5);
    }

    #[test]
    fn prefers_rightmost_when_nothing_is_consistent() {
        let mut window = eocd(1, 1, b"");
        window.extend(eocd(2, 2, b""));
        window.extend_from_slice(b"garbage after the archive");

        let (offset, record) = find_eocd(&window).unwrap();
        assert_eq!(offset, EndOfCentralDirectory::SIZE);
        assert_eq!(record.cd_size, 2);
    }

    #[test]
    fn missing_or_incomplete_record() {
        assert!(find_eocd(&[0u8; 100]).is_none());
        assert!(find_eocd(b"PK\x05\x06").is_none());

        let mut window = vec![0u8; 30];
        window.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
        window.extend_from_slice(&[0u8; 10]);
        assert!(find_eocd(&window).is_none());
    }
}
