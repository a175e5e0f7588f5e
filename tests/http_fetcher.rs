//! HttpRangeFetcher against a minimal HTTP/1.1 server with Range support

mod common;

use std::sync::Arc;

use common::*;
use remotezip::{HttpOptions, HttpRangeFetcher, RangeFetcher, RemoteZip, ZipError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use zip::CompressionMethod;

/// Serve `data` on a local port; returns the archive URL.
async fn serve(data: Vec<u8>, accept_ranges: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let data = Arc::new(data);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let data = data.clone();
            tokio::spawn(async move {
                let _ = respond(&mut socket, &data, accept_ranges).await;
            });
        }
    });

    format!("http://{addr}/archive.zip")
}

async fn respond(socket: &mut TcpStream, data: &[u8], accept_ranges: bool) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split(' ').next())
        .unwrap_or_default()
        .to_string();
    let range = lines.find_map(|l| {
        let (name, value) = l.split_once(':')?;
        name.eq_ignore_ascii_case("range")
            .then(|| value.trim().to_string())
    });

    let ranges_header = if accept_ranges {
        "Accept-Ranges: bytes\r\n"
    } else {
        ""
    };

    let (head, body): (String, &[u8]) = match (method.as_str(), range) {
        ("HEAD", _) => (
            format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{ranges_header}Connection: close\r\n\r\n",
                data.len()
            ),
            &[],
        ),
        ("GET", Some(range)) if accept_ranges => {
            let (start, end) = range
                .trim_start_matches("bytes=")
                .split_once('-')
                .unwrap();
            let start: usize = start.parse().unwrap();
            let end = end.parse::<usize>().unwrap().min(data.len() - 1);
            let body = &data[start..=end];
            (
                format!(
                    "HTTP/1.1 206 Partial Content\r\nContent-Range: bytes {start}-{end}/{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    data.len(),
                    body.len()
                ),
                body,
            )
        }
        _ => (
            format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                data.len()
            ),
            data,
        ),
    };

    socket.write_all(head.as_bytes()).await?;
    socket.write_all(body).await?;
    socket.shutdown().await
}

fn large_archive() -> Vec<u8> {
    let filler = random_bytes(300_000);
    build_archive(&[
        ("filler.bin", &filler, CompressionMethod::Stored),
        ("notes.txt", &compressible(20_000), CompressionMethod::Deflated),
        ("small.txt", b"tiny", CompressionMethod::Stored),
    ])
}

#[tokio::test]
async fn probe_reports_size_and_range_support() {
    let data = large_archive();
    let size = data.len() as u64;
    let url = serve(data, true).await;

    let fetcher = HttpRangeFetcher::new(HttpOptions::default()).unwrap();
    let probe = fetcher.probe(&url).await.unwrap();
    assert_eq!(probe.size, size);
    assert!(probe.supports_ranges);

    let bytes = fetcher.fetch_range(&url, 0, 3).await.unwrap();
    assert_eq!(bytes, b"PK\x03\x04");
    assert_eq!(fetcher.transferred_bytes(), 4);
}

#[tokio::test]
async fn extracts_member_without_downloading_archive() {
    let data = large_archive();
    let size = data.len() as u64;
    let url = serve(data, true).await;

    let fetcher = Arc::new(HttpRangeFetcher::new(HttpOptions::default()).unwrap());
    let zip = RemoteZip::new(fetcher.clone());

    let archive = zip.open_archive(&url).await.unwrap();
    let toc = zip.list_contents(&archive).await.unwrap();
    assert_eq!(toc.len(), 3);

    let notes = zip
        .extract_member(&archive, &toc, b"notes.txt")
        .await
        .unwrap();
    assert_eq!(notes, compressible(20_000));

    let small = zip
        .extract_member(&archive, &toc, b"small.txt")
        .await
        .unwrap();
    assert_eq!(small, b"tiny");

    // The 300 KB filler member was never fetched
    assert!(fetcher.transferred_bytes() < size / 2);
}

#[tokio::test]
async fn server_without_range_support() {
    let url = serve(large_archive(), false).await;

    let fetcher = Arc::new(HttpRangeFetcher::new(HttpOptions::default()).unwrap());
    let probe = fetcher.probe(&url).await.unwrap();
    assert!(!probe.supports_ranges);

    let zip = RemoteZip::new(fetcher);
    match zip.open_archive(&url).await {
        Err(ZipError::RangeUnsupported { url: reported }) => assert_eq!(reported, url),
        other => panic!("expected RangeUnsupported, got {other:?}"),
    }
}

#[tokio::test]
async fn non_partial_response_is_a_transport_error() {
    let url = serve(large_archive(), false).await;
    let fetcher = HttpRangeFetcher::new(HttpOptions::default()).unwrap();

    let err = fetcher.fetch_range(&url, 0, 10).await.unwrap_err();
    assert!(err.to_string().contains("200"));
}
