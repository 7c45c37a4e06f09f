//! Normalized request handed to the dispatch layer.
//!
//! Routing only looks at [`Request::host`], [`Request::path`] and
//! [`Request::client_ip`]. Everything else is passed through untouched for
//! user handlers.

use std::net::{IpAddr, Ipv4Addr};

use crate::http::Method;
use crate::http::headers::Headers;

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub http_version: (u8, u8),

    /// Lower-cased host name without port, if the client sent one.
    pub host: Option<String>,
    /// Request target without the query string.
    pub path: Option<String>,
    pub query: Option<String>,
    pub client_ip: IpAddr,

    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            http_version: (1, 1),
            host: None,
            path: None,
            query: None,
            client_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Shorthand for a `GET` of `target` without a host.
    pub fn get(target: &str) -> Self {
        Self::new().with_target(target)
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.set_host(host);
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.set_target(target);
        self
    }

    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = ip;
        self
    }

    /// Splits a request target into path and query. An absolute-form
    /// target (`http://host:port/path`) also sets the host from its
    /// authority; the return value tells whether it did.
    pub fn set_target(&mut self, target: &str) -> bool {
        let (authority, target) = match split_absolute_form(target) {
            Some((authority, rest)) => (Some(authority), rest),
            None => (None, target),
        };

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };
        self.path = Some(if path.is_empty() { "/" } else { path }.to_string());
        self.query = query;

        match authority {
            Some(authority) => {
                self.set_host(authority);
                true
            }
            None => false,
        }
    }

    /// Normalizes a `Host` header value: lower-cased, port dropped.
    /// An empty value leaves the host absent.
    pub fn set_host(&mut self, value: &str) {
        let value = value.trim();
        let name = if let Some(rest) = value.strip_prefix('[') {
            // [v6]:port
            rest.split_once(']').map(|(addr, _)| addr).unwrap_or(rest)
        } else {
            match value.rsplit_once(':') {
                Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
                _ => value,
            }
        };

        self.host = if name.is_empty() {
            None
        } else {
            Some(name.to_ascii_lowercase())
        };
    }
}

/// `scheme://authority/rest` into authority and `/rest`. Userinfo is dropped
/// from the authority.
fn split_absolute_form(target: &str) -> Option<(&str, &str)> {
    if target.starts_with('/') {
        return None;
    }
    let (scheme, rest) = target.split_once("://")?;
    let scheme_char = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.');
    if scheme.is_empty() || !scheme.bytes().all(scheme_char) {
        return None;
    }
    let end = rest.find(['/', '?']).unwrap_or(rest.len());
    let (authority, path) = rest.split_at(end);
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    Some((authority, path))
}
