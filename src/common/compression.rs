//! Response-side content decompression.
//!
//! The transport advertises `br, zstd, gzip` and transparently decodes the
//! `Content-Encoding` chain of the response before anything else sees the
//! body. Callers that need identity bodies (e.g. OPTIONS against servers
//! that mishandle compressed responses, or ETag-stable GETs) override the
//! `Accept-Encoding` header per request.

use async_compression::tokio::bufread::{BrotliDecoder, GzipDecoder, ZstdDecoder};
use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::BodyStream;
use hyper::body::Incoming;
use hyper::{HeaderMap, header, http};
use tokio::io::{AsyncBufRead, AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

use crate::webdav::error::DavError;

/// Supported content encodings for response decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Br,
    Gzip,
    Zstd,
}

impl ContentEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Identity => "identity",
            ContentEncoding::Br => "br",
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Zstd => "zstd",
        }
    }
}

/// Parse the `Content-Encoding` header into the applied encoding chain, in
/// application order. Unknown tokens map to identity.
pub fn detect_encodings(headers: &HeaderMap) -> Vec<ContentEncoding> {
    let Some(value) = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
    else {
        return Vec::new();
    };
    value
        .split(',')
        .map(|token| match token.trim().to_ascii_lowercase().as_str() {
            "br" => ContentEncoding::Br,
            "gzip" | "x-gzip" => ContentEncoding::Gzip,
            "zstd" | "zst" => ContentEncoding::Zstd,
            _ => ContentEncoding::Identity,
        })
        .collect()
}

/// Insert an `Accept-Encoding: br, zstd, gzip` header if none is set.
pub fn add_accept_encoding(headers: &mut HeaderMap) {
    if !headers.contains_key(http::header::ACCEPT_ENCODING) {
        headers.insert(
            http::header::ACCEPT_ENCODING,
            http::HeaderValue::from_static("br, zstd, gzip"),
        );
    }
}

/// Aggregate a response body, undoing the encoding chain (last applied,
/// first removed).
pub async fn decompress_body(
    body: Incoming,
    encodings: &[ContentEncoding],
) -> Result<Bytes, DavError> {
    let stream = BodyStream::new(body)
        .map_ok(|frame| frame.into_data().unwrap_or_default())
        .map_err(std::io::Error::other);
    let mut reader: Box<dyn AsyncBufRead + Unpin + Send> =
        Box::new(BufReader::new(StreamReader::new(stream)));
    for encoding in encodings.iter().rev() {
        reader = match encoding {
            ContentEncoding::Identity => reader,
            ContentEncoding::Br => Box::new(BufReader::new(BrotliDecoder::new(reader))),
            ContentEncoding::Gzip => Box::new(BufReader::new(GzipDecoder::new(reader))),
            ContentEncoding::Zstd => Box::new(BufReader::new(ZstdDecoder::new(reader))),
        };
    }

    let mut out = Vec::with_capacity(32 * 1024);
    reader.read_to_end(&mut out).await?;
    Ok(Bytes::from(out))
}
