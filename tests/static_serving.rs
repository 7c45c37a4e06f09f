use std::fs;

use rustyroute::{Dispatch, FileOptions, Request, Response, Router, Status};

fn body(res: Response) -> Vec<u8> {
    res.body.into_bytes().unwrap()
}

#[test]
fn file_serves_literal_bytes_until_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("robots_src.txt");
    fs::write(&source, b"User-agent: *\nDisallow: /private\n").unwrap();

    let mut router = Router::new();
    router.file("/robots.txt", &source, FileOptions::default()).unwrap();

    let res = router.call(&Request::get("/robots.txt"));
    assert_eq!(res.status, Status::Ok);
    assert_eq!(res.headers.get("Content-Type"), Some("text/plain"));
    assert_eq!(body(res), b"User-agent: *\nDisallow: /private\n");

    fs::remove_file(&source).unwrap();
    let res = router.call(&Request::get("/robots.txt"));
    assert_eq!(res.status, Status::NotFound);
}

#[test]
fn file_content_type_override() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("feed");
    fs::write(&source, b"<rss/>").unwrap();

    let mut router = Router::new();
    router
        .file("/feed", &source, FileOptions::content_type("application/rss+xml"))
        .unwrap();

    let res = router.call(&Request::get("/feed"));
    assert_eq!(res.headers.get("Content-Type"), Some("application/rss+xml"));
}

#[test]
fn mount_serves_files_below_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("report.pdf"), b"%PDF-1.4").unwrap();
    fs::create_dir(dir.path().join("css")).unwrap();
    fs::write(dir.path().join("css").join("Site.CSS"), b"body{}").unwrap();

    let mut router = Router::new();
    router.mount("/files/", dir.path()).unwrap();

    let res = router.call(&Request::get("/files/report.pdf"));
    assert_eq!(res.status, Status::Ok);
    assert_eq!(res.headers.get("Content-Type"), Some("application/pdf"));
    assert_eq!(res.headers.get("Content-Length"), Some("8"));
    assert_eq!(body(res), b"%PDF-1.4");

    let res = router.call(&Request::get("/files/css/Site.CSS"));
    assert_eq!(res.headers.get("Content-Type"), Some("text/css"));

    assert_eq!(router.call(&Request::get("/files/missing.pdf")).status, Status::NotFound);
    assert_eq!(router.call(&Request::get("/files/css")).status, Status::NotFound);
    assert_eq!(router.call(&Request::get("/files/")).status, Status::NotFound);
}

#[test]
fn mount_without_trailing_slash() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"a").unwrap();

    let mut router = Router::new();
    router.mount("/pub", dir.path()).unwrap();

    assert_eq!(router.call(&Request::get("/pub/a.txt")).status, Status::Ok);
    assert_eq!(router.call(&Request::get("/puba.txt")).status, Status::NotFound);
}

#[test]
fn mount_rejects_traversal() {
    let outer = tempfile::tempdir().unwrap();
    fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
    let public = outer.path().join("public");
    fs::create_dir(&public).unwrap();
    fs::write(public.join("index.html"), b"<h1>hi</h1>").unwrap();

    let mut router = Router::new();
    router.mount("/site/", &public).unwrap();

    assert_eq!(router.call(&Request::get("/site/index.html")).status, Status::Ok);

    let res = router.call(&Request::get("/site/../secret.txt"));
    assert_eq!(res.status, Status::NotFound);
    let res = router.call(&Request::get("/site/x/../../secret.txt"));
    assert_eq!(res.status, Status::NotFound);
    let page = String::from_utf8(body(res)).unwrap();
    assert!(!page.contains("secret\n"));
}

#[test]
fn mount_inside_virtual_host() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("logo.png"), b"\x89PNG").unwrap();

    let router = Router::build(|r| {
        r.host("cdn.example.com", |cdn| {
            cdn.mount("/", dir.path())?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();

    let res = router.call(&Request::get("/logo.png").with_host("cdn.example.com"));
    assert_eq!(res.status, Status::Ok);
    assert_eq!(res.headers.get("Content-Type"), Some("text/png"));

    let res = router.call(&Request::get("/logo.png").with_host("www.example.com"));
    assert_eq!(res.status, Status::NotFound);
}
