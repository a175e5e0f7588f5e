//! Walking central directory records into a table of contents.

use crate::error::{Result, ZipError};

use super::structures::{
    CDFH_MIN_SIZE, CDFH_SIGNATURE, CompressionMethod, DirectoryLocation, TocEntry, read_u16_at,
    read_u32_at,
};

/// How the directory walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryEnd {
    /// The last record ended exactly at the end of the directory
    Complete,
    /// The bytes ran out part way through the record at `offset`
    Truncated { offset: u64 },
    /// The record at `offset` does not start with the directory signature
    Corrupt { offset: u64 },
}

/// The entries of a central directory, in on-disk order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOfContents {
    pub entries: Vec<TocEntry>,
    pub end: DirectoryEnd,
}

impl TableOfContents {
    pub fn is_complete(&self) -> bool {
        self.end == DirectoryEnd::Complete
    }

    /// The entries, or an error describing why the walk stopped early
    pub fn into_entries(self) -> Result<Vec<TocEntry>> {
        match self.end {
            DirectoryEnd::Complete => Ok(self.entries),
            DirectoryEnd::Truncated { offset } => Err(ZipError::TruncatedDirectory {
                offset,
                entries: self.entries.len(),
            }),
            DirectoryEnd::Corrupt { offset } => Err(ZipError::CorruptDirectory { offset }),
        }
    }
}

/// Parse the record at the start of `record`, which must already carry the
/// directory signature.
///
/// Returns the entry and the record's total length, or `None` if `record` is
/// too short to hold it.
fn parse_record(record: &[u8]) -> Option<(TocEntry, usize)> {
    let file_name_length = read_u16_at(record, 28)? as usize;
    let extra_field_length = read_u16_at(record, 30)? as usize;
    let comment_length = read_u16_at(record, 32)? as usize;
    let record_length = CDFH_MIN_SIZE + file_name_length + extra_field_length + comment_length;
    if record.len() < record_length {
        return None;
    }

    let entry = TocEntry {
        file_name: record[CDFH_MIN_SIZE..CDFH_MIN_SIZE + file_name_length].to_vec(),
        compressed_size: read_u32_at(record, 20)?,
        uncompressed_size: read_u32_at(record, 24)?,
        local_header_offset: read_u32_at(record, 42)?,
        compression_method: CompressionMethod::from_u16(read_u16_at(record, 10)?),
        crc32: read_u32_at(record, 16)?,
        last_mod_time: read_u16_at(record, 12)?,
        last_mod_date: read_u16_at(record, 14)?,
    };

    Some((entry, record_length))
}

/// Walk the directory records held in `location`'s window.
///
/// The walk covers the directory region the EOCD describes, clipped to the
/// bytes actually fetched. It never fails: a record that runs past the
/// available bytes or lacks its signature ends the walk, and the returned
/// [`DirectoryEnd`] says which case occurred.
pub fn build(location: &DirectoryLocation) -> TableOfContents {
    let directory_start = location.directory_start as u64;
    let mut entries = Vec::new();

    let Some(relative_start) = directory_start.checked_sub(location.window_start) else {
        return TableOfContents {
            entries,
            end: DirectoryEnd::Truncated {
                offset: directory_start,
            },
        };
    };

    let window_len = location.window.len() as u64;
    let relative_end = (relative_start + location.directory_size as u64).min(window_len);
    let region = match (usize::try_from(relative_start), usize::try_from(relative_end)) {
        (Ok(start), Ok(end)) if start <= end => &location.window[start..end],
        _ => &[][..],
    };
    let clipped = relative_start + (location.directory_size as u64) > window_len;

    let mut pos = 0usize;
    let end = loop {
        let offset = directory_start + pos as u64;
        let remaining = &region[pos..];

        if remaining.is_empty() {
            break if clipped {
                DirectoryEnd::Truncated { offset }
            } else {
                DirectoryEnd::Complete
            };
        }
        if remaining.len() >= CDFH_SIGNATURE.len() && !remaining.starts_with(CDFH_SIGNATURE) {
            break DirectoryEnd::Corrupt { offset };
        }

        match parse_record(remaining) {
            Some((entry, length)) => {
                entries.push(entry);
                pos += length;
            }
            None => break DirectoryEnd::Truncated { offset },
        }
    };

    match end {
        DirectoryEnd::Complete if entries.len() != location.total_entries as usize => {
            log::warn!(
                "EOCD claims {} entries but the directory holds {}",
                location.total_entries,
                entries.len()
            );
        }
        DirectoryEnd::Complete => {}
        _ => log::debug!("directory walk stopped early: {:?}", end),
    }

    TableOfContents { entries, end }
}
