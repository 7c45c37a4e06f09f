use std::fs::File;
use std::io::ErrorKind::*;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::RouteError;
use crate::handler::mime;
use crate::handler::responses;
use crate::http::request::Request;
use crate::http::response::{Body, Response, ResponseHeader};
use crate::http::status::Status;

/// Options for [`Router::file`](crate::handler::router::Router::file).
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// Overrides the content type derived from the file extension.
    pub content_type: Option<String>,
}

impl FileOptions {
    pub fn content_type(content_type: &str) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
        }
    }
}

/// Static content responder.
#[derive(Debug, Clone)]
pub enum StaticFiles {
    /// A single file, served for whatever request reaches this handler.
    File {
        path: PathBuf,
        content_type: Option<String>,
    },
    /// A directory tree: the request path minus `prefix` is looked up below
    /// `root`.
    Dir { prefix: String, root: PathBuf },
}

impl StaticFiles {
    pub fn file(path: impl AsRef<Path>, options: FileOptions) -> Result<Self, RouteError> {
        Ok(StaticFiles::File {
            path: absolute(path.as_ref())?,
            content_type: options.content_type,
        })
    }

    /// `prefix` gets a trailing `/` if it lacks one.
    pub fn dir(prefix: &str, root: impl AsRef<Path>) -> Result<Self, RouteError> {
        Ok(StaticFiles::Dir {
            prefix: with_trailing_slash(prefix),
            root: absolute(root.as_ref())?,
        })
    }

    pub fn serve(&self, req: &Request) -> Response {
        match self {
            StaticFiles::File { path, content_type } => {
                serve_file(req, path, content_type.as_deref())
            }
            StaticFiles::Dir { prefix, root } => {
                let Some(path) = req.path.as_deref().and_then(|p| resolve(prefix, root, p)) else {
                    debug!(path = ?req.path, prefix = prefix.as_str(), "path does not map below mount");
                    return responses::not_found(req);
                };
                if !stays_within(root, &path) {
                    warn!(path = %path.display(), root = %root.display(), "mounted path escapes its root");
                    return responses::not_found(req);
                }
                serve_file(req, &path, None)
            }
        }
    }
}

/// Serves the regular file at `path`, streaming its content. Length and
/// modification time are read from the open handle.
pub fn serve_file(req: &Request, path: &Path, content_type: Option<&str>) -> Response {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => return io_failure(req, path, err),
    };
    let meta = match file.metadata() {
        Ok(meta) if meta.is_file() => meta,
        Ok(_) => return responses::not_found(req),
        Err(err) => return io_failure(req, path, err),
    };

    debug!(path = %path.display(), len = meta.len(), "serving static file");

    let mut response = Response::new(Status::Ok);
    let content_type = content_type.unwrap_or_else(|| mime::content_type_for(path));
    response.set_header(ResponseHeader::ContentType, content_type);
    if let Ok(modified) = meta.modified() {
        response.set_header(ResponseHeader::LastModified, &httpdate::fmt_http_date(modified));
    }
    response.set_body(Body::File {
        file,
        len: meta.len(),
    });
    response
}

fn io_failure(req: &Request, path: &Path, err: std::io::Error) -> Response {
    match err.kind() {
        NotFound | PermissionDenied => responses::not_found(req),
        _ => {
            warn!(path = %path.display(), error = %err, "failed to open static file");
            responses::internal_server_error()
        }
    }
}

/// Maps a request path below `prefix` onto `root`. Only plain path
/// segments are accepted; `..`, absolute remainders and drive prefixes map
/// to nothing.
pub(crate) fn resolve(prefix: &str, root: &Path, request_path: &str) -> Option<PathBuf> {
    let rest = request_path.strip_prefix(prefix)?;
    let mut path = root.to_path_buf();
    for comp in Path::new(rest).components() {
        match comp {
            Component::Normal(s) => path.push(s),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(path)
}

/// Symlinks may still point outside the mounted tree.
fn stays_within(root: &Path, path: &Path) -> bool {
    match (root.canonicalize(), path.canonicalize()) {
        (Ok(root), Ok(path)) => path.starts_with(root),
        // Missing files are answered by serve_file.
        _ => true,
    }
}

pub(crate) fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

fn absolute(path: &Path) -> Result<PathBuf, RouteError> {
    std::path::absolute(path).map_err(|source| RouteError::InvalidPath {
        path: path.to_path_buf(),
        source,
    })
}
