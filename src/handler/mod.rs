//! Request handlers and the routing tree built from them.
//!
//! Everything that answers a request implements [`Dispatch`]: routers, IP
//! filters, plain closures and the [`Handler`] enum that routing tables
//! store. A dispatch never fails; error conditions are answered with an
//! error response.

pub mod middleware;
pub mod mime;
pub mod responses;
pub mod router;
pub mod static_files;

use std::fmt;
use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::Response;
use crate::ip_filter::IpFilter;
use router::Router;
use static_files::StaticFiles;

pub trait Dispatch: Send + Sync {
    fn call(&self, req: &Request) -> Response;
}

impl<F> Dispatch for F
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn call(&self, req: &Request) -> Response {
        self(req)
    }
}

/// A value stored in a routing table.
pub enum Handler {
    Static(StaticFiles),
    Router(Box<Router>),
    Custom(Arc<dyn Dispatch>),
    NotFound,
}

impl Handler {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        Handler::Custom(Arc::new(f))
    }

    pub fn service<D>(service: D) -> Self
    where
        D: Dispatch + 'static,
    {
        Handler::Custom(Arc::new(service))
    }
}

impl Dispatch for Handler {
    fn call(&self, req: &Request) -> Response {
        match self {
            Handler::Static(files) => files.serve(req),
            Handler::Router(router) => router.call(req),
            Handler::Custom(service) => service.call(req),
            Handler::NotFound => responses::not_found(req),
        }
    }
}

impl Default for Handler {
    fn default() -> Self {
        Handler::NotFound
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Static(files) => f.debug_tuple("Static").field(files).finish(),
            Handler::Router(_) => f.write_str("Router"),
            Handler::Custom(_) => f.write_str("Custom"),
            Handler::NotFound => f.write_str("NotFound"),
        }
    }
}

impl From<Router> for Handler {
    fn from(router: Router) -> Self {
        Handler::Router(Box::new(router))
    }
}

impl From<StaticFiles> for Handler {
    fn from(files: StaticFiles) -> Self {
        Handler::Static(files)
    }
}

impl From<IpFilter> for Handler {
    fn from(filter: IpFilter) -> Self {
        Handler::service(filter)
    }
}
