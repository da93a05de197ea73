//! End-to-end tests over a real socket.

use super::*;
use crate::purge::PurgeOptions;
use std::{
    fs,
    io::{Read, Write},
    net::TcpStream,
    path::Path,
    thread,
};

const PAGE: &str = "<!doctype html><html><head><style amp-custom>.yes { color: green; } .no { color: red; }</style></head><body><p class=\"yes\">hi</p></body></html>";

struct Reply {
    head: String,
    body: Vec<u8>,
}

impl Reply {
    fn status(&self) -> &str {
        self.head.split(' ').nth(1).unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn config(root: &Path, options: PurgeOptions) -> AppConfig {
    let mut config = AppConfig::default();
    config.serve.root = root.to_path_buf();
    config.purge = options;
    config
}

/// Send one raw request and run `handle_request` for it.
fn exchange(config: AppConfig, method: &str, url: &str) -> Reply {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    let raw_request =
        format!("{method} {url} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(raw_request.as_bytes()).unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).unwrap();
        raw
    });

    let request = server.recv().unwrap();
    handle_request(request, &config).unwrap();

    let raw = client.join().unwrap();
    let split = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    Reply {
        head: String::from_utf8_lossy(&raw[..split]).into_owned(),
        body: raw[split + 4..].to_vec(),
    }
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), PAGE).unwrap();
    fs::write(dir.path().join("style.css"), ".no { color: red; }").unwrap();
    dir
}

#[test]
fn test_html_is_purged() {
    let dir = site();
    let reply = exchange(config(dir.path(), PurgeOptions::default()), "GET", "/");

    assert_eq!(reply.status(), "200");
    assert!(reply.header("content-type").unwrap().starts_with("text/html"));
    assert!(
        reply
            .text()
            .contains("<style amp-custom>.yes{color:green}</style>")
    );
    assert_eq!(
        reply.header("content-length"),
        Some(reply.body.len().to_string().as_str())
    );
}

#[test]
fn test_other_files_untouched() {
    let dir = site();
    let reply = exchange(
        config(dir.path(), PurgeOptions::default()),
        "GET",
        "/style.css",
    );

    assert_eq!(reply.status(), "200");
    assert!(reply.header("content-type").unwrap().starts_with("text/css"));
    assert_eq!(reply.text(), ".no { color: red; }");
}

#[test]
fn test_head_reports_purified_length() {
    let dir = site();
    let get = exchange(config(dir.path(), PurgeOptions::default()), "GET", "/");
    let head = exchange(config(dir.path(), PurgeOptions::default()), "HEAD", "/");

    assert_eq!(head.status(), "200");
    assert!(head.body.is_empty());
    assert_eq!(
        head.header("content-length"),
        Some(get.body.len().to_string().as_str())
    );
}

#[test]
fn test_not_found() {
    let dir = site();
    let reply = exchange(
        config(dir.path(), PurgeOptions::default()),
        "GET",
        "/missing.html",
    );

    assert_eq!(reply.status(), "404");
    assert_eq!(reply.text(), "404 Not Found");
}

#[test]
fn test_custom_not_found_is_purged() {
    let dir = site();
    fs::write(dir.path().join("404.html"), PAGE.replace("hi", "gone")).unwrap();
    let reply = exchange(
        config(dir.path(), PurgeOptions::default().with_minify(false)),
        "GET",
        "/missing",
    );

    assert_eq!(reply.status(), "404");
    let text = reply.text();
    assert!(text.contains("gone"));
    assert!(text.contains(".yes {\n  color: green;\n}"));
    assert!(!text.contains(".no"));
}
