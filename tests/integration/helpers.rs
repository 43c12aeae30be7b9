//! Test helpers and utilities

use reqwest::{Client, Response, StatusCode};
use rin::Engine;
use std::time::Duration;
use tokio::net::TcpListener;

/// An engine served on an ephemeral port for the duration of a test.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

#[allow(dead_code)]
impl TestServer {
    /// Bind 127.0.0.1:0 and serve `app` on a background task.
    pub async fn spawn(app: Engine) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("read local addr");

        tokio::spawn(async move {
            let _ = app.serve_on(listener).await;
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("build HTTP client");

        Self {
            base_url: format!("http://{}", addr),
            client,
        }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// Make a POST request with urlencoded form data
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }
}

/// Assert the response has the expected status
pub fn assert_status(resp: &Response, expected: StatusCode) {
    assert_eq!(resp.status(), expected, "unexpected status");
}

/// Assert a header equals the expected value exactly
#[allow(dead_code)]
pub fn assert_header(resp: &Response, name: &str, expected: &str) {
    let value = resp
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {}", name));
    assert_eq!(value.to_str().unwrap(), expected);
}
