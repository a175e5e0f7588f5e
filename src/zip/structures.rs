//! ZIP record layouts and the values passed between the locate, list and
//! extract stages.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }
}

/// Read a little-endian u16 at `offset`, or `None` if it runs past the buffer.
pub(crate) fn read_u16_at(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset.checked_add(2)?)
        .map(LittleEndian::read_u16)
}

/// Read a little-endian u32 at `offset`, or `None` if it runs past the buffer.
pub(crate) fn read_u32_at(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset.checked_add(4)?)
        .map(LittleEndian::read_u32)
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Parse the record starting at `data[0]`; `None` if it is short or unsigned.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return None;
        }

        let mut cursor = Cursor::new(&data[4..Self::SIZE]);

        Some(Self {
            disk_number: cursor.read_u16::<LittleEndian>().ok()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>().ok()?,
            disk_entries: cursor.read_u16::<LittleEndian>().ok()?,
            total_entries: cursor.read_u16::<LittleEndian>().ok()?,
            cd_size: cursor.read_u32::<LittleEndian>().ok()?,
            cd_offset: cursor.read_u32::<LittleEndian>().ok()?,
            comment_len: cursor.read_u16::<LittleEndian>().ok()?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// The fields of a local file header the extractor cross-checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub compression_method: u16,
    pub compressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    /// Parse the header at the start of `data`; `None` if it is short or unsigned.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < LFH_SIZE || &data[0..4] != LFH_SIGNATURE {
            return None;
        }

        Some(Self {
            compression_method: read_u16_at(data, 8)?,
            compressed_size: read_u32_at(data, 18)?,
            file_name_length: read_u16_at(data, 26)?,
            extra_field_length: read_u16_at(data, 28)?,
        })
    }

    /// Offset of the member data relative to the start of the header
    pub fn data_offset(&self) -> u64 {
        LFH_SIZE as u64 + self.file_name_length as u64 + self.extra_field_length as u64
    }
}

/// One remote archive, as reported by a metadata probe.
///
/// Immutable once opened; every later operation takes it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    url: String,
    size: u64,
    supports_ranges: bool,
}

impl ArchiveHandle {
    pub fn new(url: impl Into<String>, size: u64, supports_ranges: bool) -> Self {
        Self {
            url: url.into(),
            size,
            supports_ranges,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn supports_ranges(&self) -> bool {
        self.supports_ranges
    }
}

/// Where the central directory lives, plus the tail window it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLocation {
    /// Offset of the EOCD signature within `window`
    pub eocd_offset: usize,
    pub directory_size: u32,
    /// Absolute offset of the first directory record
    pub directory_start: u32,
    /// Entry count claimed by the EOCD record
    pub total_entries: u16,
    /// Tail bytes of the archive containing the directory and the EOCD
    pub window: Vec<u8>,
    /// Absolute offset of `window[0]`
    pub window_start: u64,
}

impl DirectoryLocation {
    /// The directory bytes, if the directory lies wholly inside the window
    pub fn directory_bytes(&self) -> Option<&[u8]> {
        let start = (self.directory_start as u64).checked_sub(self.window_start)?;
        let end = start + self.directory_size as u64;
        self.window
            .get(usize::try_from(start).ok()?..usize::try_from(end).ok()?)
    }
}

/// One central directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Raw name bytes; ZIP does not promise any particular encoding
    pub file_name: Vec<u8>,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    /// Absolute offset of the member's local file header
    pub local_header_offset: u32,
    pub compression_method: CompressionMethod,
    pub crc32: u32,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
}

impl TocEntry {
    /// File name for display, with invalid UTF-8 replaced
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.file_name)
    }

    /// Directory entries end with '/'
    pub fn is_dir(&self) -> bool {
        self.file_name.last() == Some(&b'/')
    }

    /// Relative path this entry may safely be written to.
    ///
    /// Returns `None` for absolute names, names containing `..`, and names
    /// with embedded NUL bytes.
    pub fn enclosed_name(&self) -> Option<PathBuf> {
        if self.file_name.contains(&0) {
            return None;
        }
        let name = self.display_name();
        let path = Path::new(name.as_ref());

        let mut enclosed = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => enclosed.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if enclosed.as_os_str().is_empty() {
            None
        } else {
            Some(enclosed)
        }
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}
