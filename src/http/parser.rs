//! Incremental HTTP/1.x request parser.
//!
//! Bytes are pushed with [`Parser::feed`] as they arrive from the network and
//! [`Parser::advance`] moves through the request line, the headers and an
//! optional `Content-Length` body. The parser writes straight into a
//! [`Request`], normalizing the target into path/query and the `Host` header
//! into a bare lower-cased host name.

use crate::config::ServerConfig;
use crate::http::Method;
use crate::http::request::Request;
use crate::http::status::Status;

// Method, two spaces, "HTTP/x.y" and CRLF around the target.
const REQUEST_LINE_OVERHEAD: usize = 32;

#[derive(PartialEq, Debug)]
pub enum ParserOk {
    /// More bytes are needed to make progress.
    Incomplete,
    /// Request line and headers are parsed; the body may still be pending.
    HeadersDone,
    /// The request is complete.
    Done,
}

// To keep parser logic separate from HTTP status codes,
// errors are mapped to a status only when a response is built.
#[derive(PartialEq, Debug)]
pub enum ParserError {
    Malformed,
    HeadersTooLarge,
    PayloadTooLarge,
    UriTooLong,
    HttpVersionNotSupported,
}

impl ParserError {
    pub fn into_status(self) -> Status {
        match self {
            ParserError::Malformed => Status::BadRequest,
            ParserError::HeadersTooLarge => Status::BadRequest,
            ParserError::PayloadTooLarge => Status::PayloadTooLarge,
            ParserError::UriTooLong => Status::UriTooLong,
            ParserError::HttpVersionNotSupported => Status::HttpVersionNotSupported,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParserLimits {
    pub max_path_size: usize,
    pub max_header_size: usize,
    pub max_body_size: usize,
}

impl From<&ServerConfig> for ParserLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_path_size: config.max_path_size,
            max_header_size: config.max_header_size,
            max_body_size: config.max_body_size,
        }
    }
}

#[derive(PartialEq, Debug)]
enum ParserState {
    RequestLine,
    Headers,
    Body,
    Done,
}

pub struct Parser {
    buf: Vec<u8>,
    state: ParserState,
    limits: ParserLimits,
    content_length: Option<usize>,
    // Host taken from an absolute-form target; the Host header is ignored.
    host_from_target: bool,
}

impl Parser {
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            buf: Vec::new(),
            state: ParserState::RequestLine,
            limits,
            content_length: None,
            host_from_target: false,
        }
    }

    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Parses as much of the buffered input as possible.
    pub fn advance(&mut self, req: &mut Request) -> Result<ParserOk, ParserError> {
        loop {
            match self.state {
                ParserState::RequestLine => {
                    if !self.parse_request_line(req)? {
                        return Ok(ParserOk::Incomplete);
                    }
                }
                ParserState::Headers => {
                    if !self.parse_headers(req)? {
                        return Ok(ParserOk::Incomplete);
                    }
                    return Ok(ParserOk::HeadersDone);
                }
                ParserState::Body => return Ok(self.parse_body(req)),
                ParserState::Done => return Ok(ParserOk::Done),
            }
        }
    }

    fn parse_request_line(&mut self, req: &mut Request) -> Result<bool, ParserError> {
        let Some(line_end) = find(&self.buf, b"\r\n") else {
            if self.buf.len() > self.limits.max_path_size + REQUEST_LINE_OVERHEAD {
                return Err(ParserError::UriTooLong);
            }
            return Ok(false);
        };

        // Request line: METHOD TARGET HTTP/VERSION
        let line = std::str::from_utf8(&self.buf[..line_end]).map_err(|_| ParserError::Malformed)?;
        let mut parts = line.split(' ');
        let (Some(method), Some(target), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ParserError::Malformed);
        };

        let method = Method::parse(&method.to_ascii_uppercase()).ok_or(ParserError::Malformed)?;

        if target.is_empty() {
            return Err(ParserError::Malformed);
        }
        if target.len() > self.limits.max_path_size {
            return Err(ParserError::UriTooLong);
        }

        let (major, minor) = version
            .strip_prefix("HTTP/")
            .and_then(|v| v.split_once('.'))
            .and_then(|(maj, min)| Some((maj.parse::<u8>().ok()?, min.parse::<u8>().ok()?)))
            .ok_or(ParserError::Malformed)?;
        if major != 1 || minor > 1 {
            return Err(ParserError::HttpVersionNotSupported);
        }

        req.method = method;
        req.http_version = (major, minor);
        self.host_from_target = req.set_target(target);

        self.buf.drain(..line_end + 2);
        self.state = ParserState::Headers;
        Ok(true)
    }

    fn parse_headers(&mut self, req: &mut Request) -> Result<bool, ParserError> {
        // A request without headers ends right after the request line.
        let (headers_end, terminator) = if self.buf.starts_with(b"\r\n") {
            (0, 2)
        } else {
            match find(&self.buf, b"\r\n\r\n") {
                Some(end) => (end, 4),
                None => {
                    if self.buf.len() > self.limits.max_header_size {
                        return Err(ParserError::HeadersTooLarge);
                    }
                    return Ok(false);
                }
            }
        };

        if headers_end > self.limits.max_header_size {
            return Err(ParserError::HeadersTooLarge);
        }

        let block = std::str::from_utf8(&self.buf[..headers_end]).map_err(|_| ParserError::Malformed)?;
        for line in block.split("\r\n") {
            if line.is_empty() {
                continue;
            }
            let (name, value) = line.split_once(':').ok_or(ParserError::Malformed)?;
            if name.is_empty() || name.bytes().any(|b| b.is_ascii_whitespace()) {
                return Err(ParserError::Malformed);
            }
            let value = value.trim();

            if name.eq_ignore_ascii_case("host") {
                if !self.host_from_target {
                    req.set_host(value);
                }
            } else if name.eq_ignore_ascii_case("content-length") {
                let len = value.parse::<usize>().map_err(|_| ParserError::Malformed)?;
                if self.content_length.is_some_and(|seen| seen != len) {
                    return Err(ParserError::Malformed);
                }
                if len > self.limits.max_body_size {
                    return Err(ParserError::PayloadTooLarge);
                }
                self.content_length = Some(len);
            }
            req.headers.set(name, value);
        }

        if req.http_version == (1, 1) && !req.headers.contains("Host") {
            return Err(ParserError::Malformed);
        }

        self.buf.drain(..headers_end + terminator);
        self.state = if self.content_length.unwrap_or(0) > 0 {
            ParserState::Body
        } else {
            ParserState::Done
        };
        Ok(true)
    }

    fn parse_body(&mut self, req: &mut Request) -> ParserOk {
        let content_length = self.content_length.unwrap_or(0);
        let to_copy = std::cmp::min(self.buf.len(), content_length - req.body.len());
        req.body.extend(self.buf.drain(..to_copy));

        if req.body.len() == content_length {
            self.state = ParserState::Done;
            return ParserOk::Done;
        }
        ParserOk::Incomplete
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
