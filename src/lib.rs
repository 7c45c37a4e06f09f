//! Embeddable HTTP dispatch layer.
//!
//! - [`Router`]: a tree of host and path rules with static file serving.
//! - [`IpFilter`]: sends requests to different applications by client address.
//! - [`Server`]: a small async HTTP/1.1 front end driving either of them.
//!
//! Both the router and the filter implement [`Dispatch`], the single
//! "request in, response out" contract, so they compose freely.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod ip_filter;
pub mod net;

pub use config::ServerConfig;
pub use error::{ConfigError, RouteError};
pub use handler::router::Router;
pub use handler::static_files::{FileOptions, StaticFiles};
pub use handler::{Dispatch, Handler};
pub use http::request::Request;
pub use http::response::{Body, Response};
pub use http::status::Status;
pub use ip_filter::IpFilter;
pub use net::server::Server;
