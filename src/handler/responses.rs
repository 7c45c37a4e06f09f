use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::status::Status;

pub fn welcome(server_name: &str) -> Response {
    let body = format!("<h1>Welcome to {}!</h1>", escape_html(server_name));
    Response::html(Status::Ok, body)
}

/// Built-in fallback of every router. The requested path is echoed back
/// HTML-escaped.
pub fn not_found(req: &Request) -> Response {
    let path = escape_html(req.path.as_deref().unwrap_or(""));
    let body = format!(
        "<html><head><title>404 Not Found</title></head>\
         <body><h1>Not Found</h1>\
         <p>The requested URL {path} was not found on this server.</p>\
         </body></html>"
    );
    Response::html(Status::NotFound, body)
}

pub fn internal_server_error() -> Response {
    error(Status::InternalServerError)
}

/// Minimal HTML page for any status, used when no request is available
/// (parse failures, timeouts) or for plain server errors.
pub fn error(status: Status) -> Response {
    let body = format!("<h1>{} {}</h1>", status.code(), status.reason());
    Response::html(status, body)
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_string(res: Response) -> String {
        String::from_utf8(res.body.into_bytes().unwrap()).unwrap()
    }

    #[test]
    fn not_found_escapes_markup() {
        let req = Request::get("/<script>alert('x')</script>");
        let res = not_found(&req);
        assert_eq!(res.status, Status::NotFound);
        assert_eq!(res.headers.get("Content-Type"), Some("text/html"));

        let body = body_string(res);
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn not_found_is_stateless() {
        let req = Request::get("/missing").with_host("example.com");
        let first = not_found(&req);
        let second = not_found(&req);
        assert_eq!(first.head(), second.head());
        assert_eq!(body_string(first), body_string(second));
    }

    #[test]
    fn not_found_without_path() {
        let res = not_found(&Request::new());
        assert!(body_string(res).contains("The requested URL  was not found"));
    }

    #[test]
    fn error_page_names_status() {
        let res = error(Status::UriTooLong);
        assert_eq!(res.status, Status::UriTooLong);
        assert_eq!(body_string(res), "<h1>414 URI Too Long</h1>");
    }
}
