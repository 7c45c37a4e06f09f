//! Dispatch by client address.
//!
//! An [`IpFilter`] wraps an inner application and holds an ordered list of
//! network ranges, each bound to its own handler. A request whose client IP
//! falls in a range goes to that range's handler, the first registered range
//! winning when several overlap. Everything else goes to the inner
//! application.
//!
//! ```
//! use rustyroute::{Dispatch, Handler, IpFilter, Request, Response};
//!
//! let filter = IpFilter::build(Handler::func(|_: &Request| Response::text("public")), |f| {
//!     f.map("10.0.0.0/8", Handler::func(|_: &Request| Response::text("internal")))?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let req = Request::get("/").with_client_ip("10.1.2.3".parse().unwrap());
//! assert_eq!(filter.call(&req).body.as_bytes(), Some(&b"internal"[..]));
//! ```

use std::net::IpAddr;

use ipnet::IpNet;
use tracing::trace;

use crate::error::RouteError;
use crate::handler::{Dispatch, Handler};
use crate::http::request::Request;
use crate::http::response::Response;

#[derive(Debug)]
pub struct IpFilter {
    rules: Vec<(IpNet, Handler)>,
    inner: Handler,
}

impl IpFilter {
    pub fn new(inner: impl Into<Handler>) -> Self {
        Self {
            rules: Vec::new(),
            inner: inner.into(),
        }
    }

    /// Wraps `inner` and hands the new filter to `configure` once.
    pub fn build<F>(inner: impl Into<Handler>, configure: F) -> Result<Self, RouteError>
    where
        F: FnOnce(&mut IpFilter) -> Result<(), RouteError>,
    {
        let mut filter = IpFilter::new(inner);
        configure(&mut filter)?;
        Ok(filter)
    }

    /// Routes clients in `range` to `handler`. `range` is a CIDR block such
    /// as `192.168.0.0/16` or a single address.
    pub fn map(&mut self, range: &str, handler: impl Into<Handler>) -> Result<&mut Self, RouteError> {
        let net = parse_range(range)?;
        Ok(self.map_net(net, handler))
    }

    pub fn map_net(&mut self, net: IpNet, handler: impl Into<Handler>) -> &mut Self {
        self.rules.push((net, handler.into()));
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &IpNet> {
        self.rules.iter().map(|(net, _)| net)
    }
}

impl Dispatch for IpFilter {
    fn call(&self, req: &Request) -> Response {
        let ip = req.client_ip.to_canonical();
        for (net, handler) in &self.rules {
            if net.contains(&ip) {
                trace!(%ip, range = %net, "client matched range");
                return handler.call(req);
            }
        }
        self.inner.call(req)
    }
}

fn parse_range(range: &str) -> Result<IpNet, RouteError> {
    let range = range.trim();
    if let Ok(net) = range.parse::<IpNet>() {
        return Ok(net);
    }
    range
        .parse::<IpAddr>()
        .map(IpNet::from)
        .map_err(|_| RouteError::InvalidRange(range.to_string()))
}
