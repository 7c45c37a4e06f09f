//! Response post-processing applied by the server after dispatch.

use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use std::io::Write;
use tracing::warn;

use crate::http::request::Request;
use crate::http::response::{Body, Response, ResponseHeader};

// Content codings this server can produce, as listed in MDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    Gzip,
    Deflate,
}

impl CompressionAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            CompressionAlgorithm::Gzip => "gzip",
            CompressionAlgorithm::Deflate => "deflate",
        }
    }
}

/// Picks a coding from an `Accept-Encoding` value. Gzip is preferred;
/// codings listed with `q=0` are refused, and `*` only stands for codings
/// that are not refused.
pub fn negotiate(accept_encoding: &str) -> Option<CompressionAlgorithm> {
    let mut accepted: Vec<&str> = Vec::new();
    let mut refused: Vec<&str> = Vec::new();
    for item in accept_encoding.split(',') {
        let mut parts = item.split(';');
        let Some(coding) = parts.next().map(str::trim) else {
            continue;
        };
        let zero = parts.any(|p| {
            p.trim()
                .strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                .is_some_and(|q| q == 0.0)
        });
        if zero {
            refused.push(coding);
        } else {
            accepted.push(coding);
        }
    }

    let listed = |list: &[&str], name: &str| list.iter().any(|c| c.eq_ignore_ascii_case(name));
    let wildcard = listed(accepted.as_slice(), "*");
    let has = |name: &str| {
        listed(accepted.as_slice(), name) || (wildcard && !listed(refused.as_slice(), name))
    };
    if has("gzip") {
        Some(CompressionAlgorithm::Gzip)
    } else if has("deflate") {
        Some(CompressionAlgorithm::Deflate)
    } else {
        None
    }
}

/// Compresses in-memory bodies the client accepts compressed. Streamed file
/// bodies and responses that already carry a coding are left alone.
pub fn apply(req: &Request, res: &mut Response) {
    if res.headers.contains(ResponseHeader::ContentEncoding.as_str()) {
        return;
    }
    let Some(algo) = req.headers.get("Accept-Encoding").and_then(negotiate) else {
        return;
    };
    let Body::Bytes(bytes) = &res.body else {
        return;
    };
    if bytes.is_empty() {
        return;
    }

    match compress_body(bytes, algo) {
        Ok(compressed) => {
            res.set_body(compressed);
            res.set_header(ResponseHeader::ContentEncoding, algo.as_str());
            res.headers.set("Vary", "Accept-Encoding");
        }
        Err(err) => warn!(error = %err, coding = algo.as_str(), "compression failed"),
    }
}

fn compress_body(body: &[u8], algo: CompressionAlgorithm) -> std::io::Result<Vec<u8>> {
    match algo {
        CompressionAlgorithm::Gzip => {
            let mut e = GzEncoder::new(Vec::new(), Compression::default());
            e.write_all(body)?;
            e.finish()
        }
        CompressionAlgorithm::Deflate => {
            let mut e = DeflateEncoder::new(Vec::new(), Compression::default());
            e.write_all(body)?;
            e.finish()
        }
    }
}
