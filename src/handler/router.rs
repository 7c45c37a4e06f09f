//! Hierarchical request router.
//!
//! A [`Router`] is a node in a tree of dispatch rules. Each node owns child
//! routers selected by host, and handlers selected by path. Rules are tried
//! in this order, the first match answering the request:
//!
//! 1. host patterns, in registration order (delegate to the child router),
//! 2. exact host names (delegate to the child router),
//! 3. path patterns, in registration order,
//! 4. directory prefixes, in registration order,
//! 5. exact paths,
//! 6. the node's default handler (404 unless replaced).
//!
//! Host rules are only consulted when the request carries a host, path rules
//! only when it carries a path. A host match hands the whole request to the
//! child; the parent's path rules are not tried afterwards.
//!
//! Patterns are regular expressions matched anywhere in the subject. Anchor
//! them with `^` and `$` to match whole host names or paths. Since the first
//! match wins within a category, register specific rules before general ones.
//!
//! Registration needs `&mut Router` and dispatch `&Router`, so once a router
//! is shared with the server it can no longer change.
//!
//! ```
//! use rustyroute::{Dispatch, Handler, Request, Response, Router};
//!
//! let router = Router::build(|r| {
//!     r.host("api.example.com", |api| {
//!         api.bind("/status", Handler::func(|_: &Request| Response::text("up")));
//!         Ok(())
//!     })?;
//!     r.paths_like(r"^/users/\d+$", Handler::func(|_: &Request| Response::text("user")))?;
//!     r.dir("/assets", Handler::func(|_: &Request| Response::text("asset")));
//!     Ok(())
//! })
//! .unwrap();
//!
//! let res = router.call(&Request::get("/status").with_host("api.example.com"));
//! assert_eq!(res.body.as_bytes(), Some(&b"up"[..]));
//! ```

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use tracing::trace;

use crate::error::RouteError;
use crate::handler::static_files::{self, FileOptions, StaticFiles};
use crate::handler::{Dispatch, Handler};
use crate::http::request::Request;
use crate::http::response::Response;

#[derive(Debug, Default)]
pub struct Router {
    host_patterns: IndexMap<String, (Regex, Router)>,
    exact_hosts: HashMap<String, Router>,
    path_patterns: IndexMap<String, (Regex, Handler)>,
    directory_prefixes: IndexMap<String, Handler>,
    exact_paths: HashMap<String, Handler>,
    default_handler: Handler,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router and hands it to `configure` once.
    pub fn build<F>(configure: F) -> Result<Self, RouteError>
    where
        F: FnOnce(&mut Router) -> Result<(), RouteError>,
    {
        let mut router = Router::new();
        configure(&mut router)?;
        Ok(router)
    }

    /// Replaces the handler used when no rule matches.
    pub fn fallback(&mut self, handler: impl Into<Handler>) -> &mut Self {
        self.default_handler = handler.into();
        self
    }

    /// Adds a child router for hosts matching `pattern`, after the existing
    /// host patterns. Registering the same pattern again replaces its child
    /// and keeps its position.
    pub fn hosts_like<F>(&mut self, pattern: &str, configure: F) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut Router) -> Result<(), RouteError>,
    {
        let regex = compile(pattern)?;
        let child = Router::build(configure)?;
        self.host_patterns.insert(pattern.to_string(), (regex, child));
        Ok(self)
    }

    /// Adds a child router for the host `name`. Host names compare
    /// case-insensitively.
    pub fn host<F>(&mut self, name: &str, configure: F) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut Router) -> Result<(), RouteError>,
    {
        let child = Router::build(configure)?;
        self.exact_hosts.insert(name.to_ascii_lowercase(), child);
        Ok(self)
    }

    /// Binds `handler` to the exact request path `path`.
    pub fn bind(&mut self, path: &str, handler: impl Into<Handler>) -> &mut Self {
        self.exact_paths.insert(path.to_string(), handler.into());
        self
    }

    /// Binds `handler` to request paths matching `pattern`, after the
    /// existing path patterns.
    pub fn paths_like(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self, RouteError> {
        let regex = compile(pattern)?;
        self.path_patterns.insert(pattern.to_string(), (regex, handler.into()));
        Ok(self)
    }

    /// Binds `handler` to every request path below `path`. A trailing `/` is
    /// added to `path` if missing, so `/downloads` does not catch
    /// `/downloads2`.
    pub fn dir(&mut self, path: &str, handler: impl Into<Handler>) -> &mut Self {
        self.directory_prefixes
            .insert(static_files::with_trailing_slash(path), handler.into());
        self
    }

    /// Serves the file at `fs_path` for the exact request path `path`.
    /// `fs_path` is made absolute now; whether it exists is checked per
    /// request.
    pub fn file(
        &mut self,
        path: &str,
        fs_path: impl AsRef<Path>,
        options: FileOptions,
    ) -> Result<&mut Self, RouteError> {
        let files = StaticFiles::file(fs_path, options)?;
        Ok(self.bind(path, files))
    }

    /// Serves the tree below `fs_dir` for request paths under `url_prefix`.
    /// Paths that would leave `fs_dir` are answered with 404.
    pub fn mount(&mut self, url_prefix: &str, fs_dir: impl AsRef<Path>) -> Result<&mut Self, RouteError> {
        let files = StaticFiles::dir(url_prefix, fs_dir)?;
        Ok(self.dir(url_prefix, files))
    }
}

impl Dispatch for Router {
    fn call(&self, req: &Request) -> Response {
        if let Some(host) = req.host.as_deref() {
            for (pattern, (regex, child)) in &self.host_patterns {
                if regex.is_match(host) {
                    trace!(host, pattern = pattern.as_str(), "host pattern matched");
                    return child.call(req);
                }
            }

            if let Some(child) = self.exact_hosts.get(&host.to_ascii_lowercase()) {
                trace!(host, "exact host matched");
                return child.call(req);
            }
        }

        if let Some(path) = req.path.as_deref() {
            for (pattern, (regex, handler)) in &self.path_patterns {
                if regex.is_match(path) {
                    trace!(path, pattern = pattern.as_str(), "path pattern matched");
                    return handler.call(req);
                }
            }

            for (prefix, handler) in &self.directory_prefixes {
                if path.starts_with(prefix.as_str()) {
                    trace!(path, prefix = prefix.as_str(), "directory prefix matched");
                    return handler.call(req);
                }
            }

            if let Some(handler) = self.exact_paths.get(path) {
                trace!(path, "exact path matched");
                return handler.call(req);
            }
        }

        self.default_handler.call(req)
    }
}

fn compile(pattern: &str) -> Result<Regex, RouteError> {
    Regex::new(pattern).map_err(|source| RouteError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::status::Status;

    fn reply(tag: &'static str) -> Handler {
        Handler::func(move |_: &Request| Response::text(tag))
    }

    fn body(res: Response) -> String {
        String::from_utf8(res.body.into_bytes().unwrap()).unwrap()
    }

    #[test]
    fn empty_router_answers_404() {
        let router = Router::new();
        let res = router.call(&Request::get("/anything").with_host("example.com"));
        assert_eq!(res.status, Status::NotFound);
    }

    #[test]
    fn fallback_replaces_not_found() {
        let mut router = Router::new();
        router.fallback(reply("fallback"));
        assert_eq!(body(router.call(&Request::get("/x"))), "fallback");
        assert_eq!(body(router.call(&Request::new())), "fallback");
    }

    #[test]
    fn host_pattern_delegates_like_direct_call() {
        let router = Router::build(|r| {
            r.hosts_like(r"^.*\.example\.com$", |child| {
                child.bind("/", reply("sub"));
                Ok(())
            })?;
            r.bind("/", reply("root"));
            Ok(())
        })
        .unwrap();

        let req = Request::get("/").with_host("blog.example.com");
        assert_eq!(body(router.call(&req)), "sub");

        let (_, (_, child)) = router.host_patterns.get_index(0).unwrap();
        assert_eq!(body(child.call(&req)), "sub");

        // Unmatched path inside the child hits the child's fallback,
        // not the parent's path rules.
        let res = router.call(&Request::get("/other").with_host("blog.example.com"));
        assert_eq!(res.status, Status::NotFound);

        assert_eq!(body(router.call(&Request::get("/").with_host("example.org"))), "root");
    }

    #[test]
    fn host_patterns_first_registered_wins() {
        let router = Router::build(|r| {
            r.hosts_like("example", |c| {
                c.fallback(reply("first"));
                Ok(())
            })?;
            r.hosts_like(r"\.com$", |c| {
                c.fallback(reply("second"));
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        assert_eq!(body(router.call(&Request::get("/").with_host("example.com"))), "first");
        assert_eq!(body(router.call(&Request::get("/").with_host("rust.com"))), "second");
    }

    #[test]
    fn host_pattern_precedes_exact_host() {
        let router = Router::build(|r| {
            r.host("www.example.com", |c| {
                c.fallback(reply("exact"));
                Ok(())
            })?;
            r.hosts_like("^www\\.", |c| {
                c.fallback(reply("pattern"));
                Ok(())
            })?;
            r.host("api.example.com", |c| {
                c.fallback(reply("api"));
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        assert_eq!(body(router.call(&Request::get("/").with_host("www.example.com"))), "pattern");
        assert_eq!(body(router.call(&Request::get("/").with_host("api.example.com"))), "api");
    }

    #[test]
    fn exact_host_ignores_case_of_registration() {
        let router = Router::build(|r| {
            r.host("Example.COM", |c| {
                c.fallback(reply("exact"));
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();
        assert_eq!(body(router.call(&Request::get("/").with_host("EXAMPLE.com:80"))), "exact");

        // Requests built by hand skip the normalization of `with_host`.
        let mut req = Request::get("/");
        req.host = Some("Example.com".to_string());
        assert_eq!(body(router.call(&req)), "exact");
    }

    #[test]
    fn exact_host_short_circuits_path_rules() {
        let router = Router::build(|r| {
            r.host("static.example.com", |_| Ok(()))?;
            r.bind("/index.html", reply("root index"));
            Ok(())
        })
        .unwrap();

        let res = router.call(&Request::get("/index.html").with_host("static.example.com"));
        assert_eq!(res.status, Status::NotFound);
        let res = router.call(&Request::get("/index.html").with_host("other.example.com"));
        assert_eq!(body(res), "root index");
    }

    #[test]
    fn path_priority_pattern_prefix_exact() {
        let router = Router::build(|r| {
            r.bind("/docs/guide", reply("exact"));
            r.dir("/docs", reply("prefix"));
            r.paths_like(r"\.pdf$", reply("pattern"))?;
            Ok(())
        })
        .unwrap();

        assert_eq!(body(router.call(&Request::get("/docs/manual.pdf"))), "pattern");
        assert_eq!(body(router.call(&Request::get("/docs/guide"))), "prefix");
        assert_eq!(router.call(&Request::get("/docs")).status, Status::NotFound);
    }

    #[test]
    fn exact_path_when_nothing_else_matches() {
        let router = Router::build(|r| {
            r.dir("/docs", reply("prefix"));
            r.bind("/about", reply("exact"));
            Ok(())
        })
        .unwrap();

        assert_eq!(body(router.call(&Request::get("/about"))), "exact");
        assert_eq!(body(router.call(&Request::get("/about?lang=en"))), "exact");
        assert_eq!(router.call(&Request::get("/about/")).status, Status::NotFound);
    }

    #[test]
    fn path_patterns_and_prefixes_first_registered_wins() {
        let router = Router::build(|r| {
            r.paths_like("^/api/v1/", reply("v1"))?;
            r.paths_like("^/api/", reply("api"))?;
            r.dir("/static/img", reply("img"));
            r.dir("/static", reply("static"));
            Ok(())
        })
        .unwrap();

        assert_eq!(body(router.call(&Request::get("/api/v1/users"))), "v1");
        assert_eq!(body(router.call(&Request::get("/api/v2/users"))), "api");
        assert_eq!(body(router.call(&Request::get("/static/img/logo.png"))), "img");
        assert_eq!(body(router.call(&Request::get("/static/site.css"))), "static");
    }

    #[test]
    fn rebinding_exact_path_replaces_handler() {
        let mut router = Router::new();
        router.bind("/x", reply("old"));
        router.bind("/x", reply("new"));
        assert_eq!(body(router.call(&Request::get("/x"))), "new");
    }

    #[test]
    fn dir_needs_trailing_segment() {
        let mut router = Router::new();
        router.dir("/downloads", reply("downloads"));

        assert_eq!(body(router.call(&Request::get("/downloads/file.txt"))), "downloads");
        assert_eq!(body(router.call(&Request::get("/downloads/"))), "downloads");
        assert_eq!(router.call(&Request::get("/download")).status, Status::NotFound);
        assert_eq!(router.call(&Request::get("/downloads")).status, Status::NotFound);
        assert_eq!(router.call(&Request::get("/downloadsX/a")).status, Status::NotFound);
    }

    #[test]
    fn request_without_host_skips_host_rules() {
        let router = Router::build(|r| {
            r.hosts_like(".*", |c| {
                c.fallback(reply("any host"));
                Ok(())
            })?;
            r.bind("/", reply("no host"));
            Ok(())
        })
        .unwrap();

        assert_eq!(body(router.call(&Request::get("/"))), "no host");
        assert_eq!(body(router.call(&Request::get("/").with_host("x"))), "any host");
    }

    #[test]
    fn nested_routers_recurse() {
        let router = Router::build(|r| {
            r.host("example.com", |site| {
                site.dir(
                    "/api",
                    Router::build(|api| {
                        api.bind("/api/health", reply("healthy"));
                        api.fallback(reply("api fallback"));
                        Ok(())
                    })?,
                );
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let req = Request::get("/api/health").with_host("example.com");
        assert_eq!(body(router.call(&req)), "healthy");
        let req = Request::get("/api/missing").with_host("example.com");
        assert_eq!(body(router.call(&req)), "api fallback");
    }

    #[test]
    fn invalid_patterns_fail_at_registration() {
        let mut router = Router::new();
        assert!(matches!(
            router.paths_like("([", reply("x")),
            Err(RouteError::InvalidPattern { .. })
        ));
        assert!(router.hosts_like("*.example.com", |_| Ok(())).is_err());
    }

    #[test]
    fn builder_error_propagates() {
        let res = Router::build(|r| {
            r.host("example.com", |c| {
                c.paths_like("(", reply("x"))?;
                Ok(())
            })?;
            Ok(())
        });
        assert!(res.is_err());
    }
}
