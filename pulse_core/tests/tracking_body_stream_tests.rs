mod common;

use std::io::{self, Cursor, Read};

use bytes::Bytes;
use futures::{stream, StreamExt};

use common::{generate_test_data, inline_registry, RecordingObserver};
use pulse_core::{TrackingBodyStream, TrackingReader};

const URL: &str = "https://cdn.example.com/video.mp4";

fn chunked(data: &[u8], chunk: usize) -> Vec<Result<Bytes, io::Error>> {
    data.chunks(chunk)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect()
}

// ---------------------------------------------------------------
// TrackingBodyStream
// ---------------------------------------------------------------

#[tokio::test]
async fn test_stream_is_transparent_for_any_chunk_size() {
    let data = generate_test_data(10_000);
    for chunk in [1, 13, 512, 4096, 10_000] {
        let registry = inline_registry();
        let inner = stream::iter(chunked(&data, chunk));
        let tracked = TrackingBodyStream::new(URL, Some(data.len() as u64), inner, registry);

        let items: Vec<Bytes> = tracked.map(|r| r.unwrap()).collect().await;
        let expected: Vec<Bytes> = chunked(&data, chunk).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(items, expected, "chunk={}", chunk);
    }
}

#[tokio::test]
async fn test_stream_reports_progress_and_completion() {
    let data = generate_test_data(1000);
    let registry = inline_registry();
    let observer = RecordingObserver::new(0.0);
    registry.expect(URL, observer.clone());

    let mut tracked = TrackingBodyStream::new(
        URL,
        Some(1000),
        stream::iter(chunked(&data, 300)),
        registry.clone(),
    );
    while let Some(chunk) = tracked.next().await {
        chunk.unwrap();
    }

    assert_eq!(
        observer.calls(),
        vec![(300, Some(1000)), (600, Some(1000)), (900, Some(1000)), (1000, Some(1000))]
    );
    assert_eq!(tracked.bytes_read(), 1000);
    assert!(tracked.is_exhausted());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_stream_end_raises_total_to_declared_length() {
    // server announced more than it sent
    let registry = inline_registry();
    let observer = RecordingObserver::new(10.0);
    registry.expect(URL, observer.clone());

    let tracked = TrackingBodyStream::new(
        URL,
        Some(1000),
        stream::iter(chunked(&generate_test_data(400), 400)),
        registry.clone(),
    );
    let _: Vec<_> = tracked.collect().await;

    assert_eq!(observer.calls(), vec![(400, Some(1000)), (1000, Some(1000))]);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_stream_over_delivery_reports_completion() {
    // server sent more than it announced; last two reads share a bucket
    let registry = inline_registry();
    let observer = RecordingObserver::new(3.0);
    registry.expect(URL, observer.clone());

    let items: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from(generate_test_data(990))),
        Ok(Bytes::from(generate_test_data(20))),
    ];
    let tracked = TrackingBodyStream::new(URL, Some(1000), stream::iter(items), registry.clone());
    let received: Vec<Bytes> = tracked.map(|r| r.unwrap()).collect().await;

    assert_eq!(received.iter().map(|b| b.len()).sum::<usize>(), 1010);
    assert_eq!(observer.calls(), vec![(990, Some(1000)), (1010, Some(1000))]);
    assert!(registry.is_empty());
}

#[test]
fn test_reader_over_delivery_reports_completion() {
    let registry = inline_registry();
    let observer = RecordingObserver::new(3.0);
    registry.expect(URL, observer.clone());

    let data = generate_test_data(1010);
    let mut reader = TrackingReader::new(URL, Some(1000), Cursor::new(data.clone()), registry.clone());
    let mut first = vec![0u8; 990];
    reader.read_exact(&mut first).unwrap();
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).unwrap();

    assert_eq!([first, rest].concat(), data);
    assert_eq!(observer.calls().last(), Some(&(1010, Some(1000))));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_stream_unknown_length_reports_first_and_final() {
    let data = generate_test_data(5000);
    let registry = inline_registry();
    let observer = RecordingObserver::new(1.0);
    registry.expect(URL, observer.clone());

    let tracked = TrackingBodyStream::new(URL, None, stream::iter(chunked(&data, 1000)), registry.clone());
    assert_eq!(tracked.content_length(), None);
    let _: Vec<_> = tracked.collect().await;

    assert_eq!(observer.calls(), vec![(1000, None), (5000, Some(5000))]);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_stream_errors_pass_through_without_dispatch() {
    let registry = inline_registry();
    let observer = RecordingObserver::new(0.0);
    registry.expect(URL, observer.clone());

    let items: Vec<Result<Bytes, io::Error>> = vec![
        Ok(Bytes::from_static(b"hello")),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        Ok(Bytes::from_static(b"world")),
    ];
    let mut tracked = TrackingBodyStream::new(URL, Some(100), stream::iter(items), registry.clone());

    assert_eq!(tracked.next().await.unwrap().unwrap(), Bytes::from_static(b"hello"));
    let err = tracked.next().await.unwrap().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    assert_eq!(tracked.bytes_read(), 5);
    assert_eq!(tracked.next().await.unwrap().unwrap(), Bytes::from_static(b"world"));

    assert_eq!(observer.calls(), vec![(5, Some(100)), (10, Some(100))]);
    assert!(registry.is_expected(URL));
}

#[tokio::test]
async fn test_stream_end_is_reported_once() {
    let registry = inline_registry();
    let observer = RecordingObserver::new(0.0);
    // registered after the body finished, so only a repeated end could reach it
    let mut tracked = TrackingBodyStream::new(
        URL,
        Some(3),
        stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"abc"))]),
        registry.clone(),
    );
    assert!(tracked.next().await.is_some());
    assert!(tracked.next().await.is_none());

    registry.expect(URL, observer.clone());
    assert!(tracked.next().await.is_none());

    assert!(observer.calls().is_empty());
}

#[tokio::test]
async fn test_abandoned_stream_keeps_registration() {
    let data = generate_test_data(1000);
    let registry = inline_registry();
    registry.expect(URL, RecordingObserver::new(1.0));

    let mut tracked = TrackingBodyStream::new(URL, Some(1000), stream::iter(chunked(&data, 100)), registry.clone());
    tracked.next().await.unwrap().unwrap();
    drop(tracked);

    assert!(registry.is_expected(URL));
}

// ---------------------------------------------------------------
// TrackingReader
// ---------------------------------------------------------------

#[test]
fn test_reader_is_transparent_for_any_buffer_size() {
    let data = generate_test_data(20_000);
    for buf_size in [1, 7, 1024, 8192, 40_000] {
        let registry = inline_registry();
        let mut reader = TrackingReader::new(URL, Some(data.len() as u64), Cursor::new(data.clone()), registry);

        let mut out = Vec::new();
        let mut buf = vec![0u8; buf_size];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, data, "buf_size={}", buf_size);
        assert!(reader.is_exhausted());
        // end-of-stream stays end-of-stream
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}

#[test]
fn test_reader_reports_progress() {
    let data = generate_test_data(1000);
    let registry = inline_registry();
    let observer = RecordingObserver::new(25.0);
    registry.expect(URL, observer.clone());

    let mut reader = TrackingReader::new(URL, Some(1000), Cursor::new(data.clone()), registry.clone());
    let mut buf = [0u8; 100];
    while reader.read(&mut buf).unwrap() > 0 {}

    // buckets 0, 1, 2, 3 then completion
    assert_eq!(observer.bytes_seen(), vec![100, 300, 500, 800, 1000]);
    assert!(registry.is_empty());
}

#[test]
fn test_reader_read_to_end() {
    let data = generate_test_data(4096);
    let registry = inline_registry();
    let observer = RecordingObserver::new(50.0);
    registry.expect(URL, observer.clone());

    let mut reader = TrackingReader::new(URL, Some(4096), Cursor::new(data.clone()), registry.clone());
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();

    assert_eq!(out, data);
    assert_eq!(observer.calls().last(), Some(&(4096, Some(4096))));
    assert!(registry.is_empty());
}

#[test]
fn test_reader_empty_buffer_is_not_end_of_stream() {
    let registry = inline_registry();
    let observer = RecordingObserver::new(0.0);
    registry.expect(URL, observer.clone());

    let mut reader = TrackingReader::new(URL, Some(4), Cursor::new(b"data".to_vec()), registry.clone());
    assert_eq!(reader.read(&mut [0u8; 0]).unwrap(), 0);
    assert!(!reader.is_exhausted());
    assert!(observer.calls().is_empty());
    assert!(registry.is_expected(URL));
}

/// Fails on the second read.
struct FlakyReader {
    reads: usize,
}

impl Read for FlakyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        if self.reads == 2 {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        }
        buf[0] = 1;
        Ok(1)
    }
}

#[test]
fn test_reader_errors_pass_through_without_dispatch() {
    let registry = inline_registry();
    let observer = RecordingObserver::new(0.0);
    registry.expect(URL, observer.clone());

    let mut reader = TrackingReader::new(URL, Some(10), FlakyReader { reads: 0 }, registry.clone());
    let mut buf = [0u8; 4];
    assert_eq!(reader.read(&mut buf).unwrap(), 1);
    assert_eq!(reader.read(&mut buf).unwrap_err().kind(), io::ErrorKind::TimedOut);
    assert_eq!(reader.read(&mut buf).unwrap(), 1);

    assert_eq!(observer.bytes_seen(), vec![1, 2]);
    assert_eq!(reader.bytes_read(), 2);
}
