//! Reading archives from the local filesystem through the same interface

mod common;

use std::io::Write;
use std::sync::Arc;

use common::*;
use remotezip::{LocalFileFetcher, RangeFetcher, RemoteZip};
use zip::CompressionMethod;

#[tokio::test]
async fn lists_and_extracts_local_archive() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&build_archive(&[
        ("a.txt", b"alpha", CompressionMethod::Stored),
        ("b.txt", &compressible(3000), CompressionMethod::Deflated),
    ]))
    .unwrap();
    file.flush().unwrap();
    let path = file.path().to_str().unwrap();

    let zip = RemoteZip::new(Arc::new(LocalFileFetcher::new()));
    let archive = zip.open_archive(path).await.unwrap();
    let toc = zip.list_contents(&archive).await.unwrap();
    assert_eq!(toc.len(), 2);

    assert_eq!(
        zip.extract_member(&archive, &toc, b"b.txt").await.unwrap(),
        compressible(3000)
    );
}

#[tokio::test]
async fn reads_exact_ranges() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"0123456789").unwrap();
    file.flush().unwrap();
    let path = file.path().to_str().unwrap();

    let fetcher = LocalFileFetcher::new();
    let probe = fetcher.probe(path).await.unwrap();
    assert_eq!(probe.size, 10);
    assert!(probe.supports_ranges);

    assert_eq!(fetcher.fetch_range(path, 2, 5).await.unwrap(), b"2345");
    assert!(fetcher.fetch_range(path, 8, 12).await.is_err());
    assert!(fetcher.probe("/nonexistent/archive.zip").await.is_err());
}
