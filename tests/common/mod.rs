//! Fixture archives for the integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write an archive holding `members` in order, with an optional comment.
pub fn build_archive_with_comment(
    members: &[(&str, &[u8], CompressionMethod)],
    comment: Option<&str>,
) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, data, method) in members {
        let options = SimpleFileOptions::default().compression_method(*method);
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    if let Some(comment) = comment {
        writer.set_comment(comment);
    }

    writer.finish().unwrap().into_inner()
}

pub fn build_archive(members: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
    build_archive_with_comment(members, None)
}

/// An archive of `count` empty stored members whose names are `name_len`
/// bytes long, so its central directory is roughly
/// `count * (46 + name_len)` bytes.
pub fn archive_with_many_members(count: usize, name_len: usize) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for i in 0..count {
        let name = format!("{i:06}-{}", "n".repeat(name_len - 7));
        writer.start_file(name, options).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Every offset at which `needle` occurs in `haystack`
pub fn positions(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, w)| *w == needle)
        .map(|(i, _)| i)
        .collect()
}

/// Replace every occurrence of `from` with `to`, which must be the same length
pub fn replace_all(data: &mut [u8], from: &[u8], to: &[u8]) {
    assert_eq!(from.len(), to.len());
    for pos in positions(data, from) {
        data[pos..pos + to.len()].copy_from_slice(to);
    }
}

/// Text that deflates well
pub fn compressible(len: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    getrandom::getrandom(&mut buf).unwrap();
    buf
}
