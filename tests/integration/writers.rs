//! Response writer tests: content types, raw bytes, commit invariant,
//! serialization failure.

use crate::helpers::*;
use reqwest::StatusCode;
use rin::Engine;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("refusing to serialize"))
    }
}

/// string() applies the plain-text content type
#[tokio::test]
async fn test_string_writer() {
    let mut app = Engine::new();
    app.get("/text", |c| c.string(rin::StatusCode::CREATED, "created it"));

    let server = TestServer::spawn(app).await;
    let resp = server.get("/text").await;

    assert_status(&resp, StatusCode::CREATED);
    assert_header(&resp, "content-type", "text/plain; charset=utf-8");
    assert_eq!(resp.text().await.unwrap(), "created it");
}

/// html() applies the HTML content type
#[tokio::test]
async fn test_html_writer() {
    let mut app = Engine::new();
    app.get("/page", |c| {
        c.html(rin::StatusCode::OK, "<html><body>hi</body></html>");
    });

    let server = TestServer::spawn(app).await;
    let resp = server.get("/page").await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-type", "text/html; charset=utf-8");
    assert_eq!(resp.text().await.unwrap(), "<html><body>hi</body></html>");
}

/// data() sends bytes verbatim with only the caller-supplied content type
#[tokio::test]
async fn test_data_writer_with_caller_content_type() {
    let mut app = Engine::new();
    app.get("/blob", |c| {
        c.set_header("Content-Type", "application/octet-stream");
        c.data(rin::StatusCode::OK, &[0x00, 0xff, 0x10]);
    });

    let server = TestServer::spawn(app).await;
    let resp = server.get("/blob").await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-type", "application/octet-stream");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &[0x00, 0xff, 0x10]);
}

/// Headers set before the terminal write reach the wire
#[tokio::test]
async fn test_header_set_before_write() {
    let mut app = Engine::new();
    app.get("/tagged", |c| {
        c.set_header("X-Request-Tag", "tag-123");
        c.string(rin::StatusCode::OK, "ok");
    });

    let server = TestServer::spawn(app).await;
    let resp = server.get("/tagged").await;

    assert_header(&resp, "x-request-tag", "tag-123");
}

/// Headers set after the response commit never reach the wire
#[tokio::test]
async fn test_header_set_after_commit_is_dropped() {
    let mut app = Engine::new();
    app.get("/late", |c| {
        c.string(rin::StatusCode::OK, "done");
        c.set_header("X-Too-Late", "nope");
    });

    let server = TestServer::spawn(app).await;
    let resp = server.get("/late").await;

    assert_status(&resp, StatusCode::OK);
    assert!(resp.headers().get("x-too-late").is_none());
}

/// Handlers can read inbound request headers through the context
#[tokio::test]
async fn test_handler_reads_request_header() {
    let mut app = Engine::new();
    app.get("/whoami", |c| {
        let agent = c
            .req
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        c.string(rin::StatusCode::OK, agent);
    });

    let server = TestServer::spawn(app).await;
    let resp = server
        .client
        .get(format!("{}/whoami", server.base_url))
        .header("User-Agent", "rin-test/1.0")
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.text().await.unwrap(), "rin-test/1.0");
}

/// json() on an unserializable value responds 500 with the error text
#[tokio::test]
async fn test_json_serialization_failure() {
    let mut app = Engine::new();
    app.get("/broken", |c| c.json(rin::StatusCode::OK, &Unserializable));

    let server = TestServer::spawn(app).await;
    let resp = server.get("/broken").await;

    assert_status(&resp, StatusCode::INTERNAL_SERVER_ERROR);
    assert_header(&resp, "content-type", "text/plain; charset=utf-8");
    let body = resp.text().await.unwrap();
    assert!(body.contains("refusing to serialize"));
}
