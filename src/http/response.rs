use std::fs::File;
use std::io::{self, Read};

use crate::http::headers::Headers;
use crate::http::status::Status;

pub enum ResponseHeader {
    ContentLength,
    ContentType,
    ContentEncoding,
    LastModified,
    Connection,
    Server,
    Date,
}

impl ResponseHeader {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseHeader::ContentLength => "Content-Length",
            ResponseHeader::ContentType => "Content-Type",
            ResponseHeader::ContentEncoding => "Content-Encoding",
            ResponseHeader::LastModified => "Last-Modified",
            ResponseHeader::Connection => "Connection",
            ResponseHeader::Server => "Server",
            ResponseHeader::Date => "Date",
        }
    }
}

/// Response payload: either bytes already in memory or an open file that is
/// streamed to the client. The file handle is closed when the body is dropped.
#[derive(Debug)]
pub enum Body {
    Bytes(Vec<u8>),
    File { file: File, len: u64 },
}

impl Body {
    pub fn empty() -> Self {
        Body::Bytes(Vec::new())
    }

    pub fn len(&self) -> u64 {
        match self {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Bytes(bytes) => Some(bytes),
            Body::File { .. } => None,
        }
    }

    /// Reads the whole body into memory, consuming any file handle.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            Body::Bytes(bytes) => Ok(bytes),
            Body::File { mut file, len } => {
                let mut buf = Vec::with_capacity(len as usize);
                file.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Bytes(s.as_bytes().to_vec())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(s.into_bytes())
    }
}

#[derive(Debug)]
pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: Body,
}

impl Response {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Body::empty(),
        }
    }

    /// Response with `body` and a matching `Content-Type`/`Content-Length`.
    pub fn with_body(status: Status, content_type: &str, body: impl Into<Body>) -> Self {
        let mut res = Self::new(status);
        res.set_header(ResponseHeader::ContentType, content_type);
        res.set_body(body);
        res
    }

    pub fn html(status: Status, body: impl Into<Body>) -> Self {
        Self::with_body(status, "text/html", body)
    }

    pub fn text(body: impl Into<Body>) -> Self {
        Self::with_body(Status::Ok, "text/plain", body)
    }

    pub fn set_header(&mut self, h: ResponseHeader, value: &str) {
        self.headers.set(h.as_str(), value);
    }

    /// Replaces the body and keeps `Content-Length` in sync.
    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
        let len = self.body.len().to_string();
        self.set_header(ResponseHeader::ContentLength, &len);
    }

    /// Status line and headers, terminated by the blank line.
    ///
    /// HTTP/1.1 <status> <reason>\r\n
    /// <header_name>: <header_value>\r\n
    /// ...
    /// \r\n
    pub fn head(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n{}\r\n",
            self.status.code(),
            self.status.reason(),
            self.headers.stringify(),
        )
    }
}
