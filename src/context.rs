//! Per-request context: parameter readers and response writers.

use bytes::Bytes;
use http::header::{HeaderName, CONTENT_TYPE};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

use crate::request::Params;

// Static header values (zero allocation)
mod content_types {
    use http::HeaderValue;

    pub static TEXT_PLAIN_UTF8: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");
    pub static TEXT_HTML_UTF8: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");
    pub static APPLICATION_JSON_UTF8: HeaderValue =
        HeaderValue::from_static("application/json; charset=utf-8");
}

/// Per-request state: the inbound request plus the response under
/// construction.
///
/// A `Context` is built by the [`Engine`](crate::Engine) for each incoming
/// request, handed to exactly one handler, and torn down into the wire
/// response when the handler returns. It is never shared across requests.
///
/// A well-behaved handler performs exactly one terminal write
/// ([`string`](Self::string), [`json`](Self::json), [`html`](Self::html) or
/// [`data`](Self::data)). Once the response head is committed, further
/// header or status changes are programmer errors and are dropped with a
/// warning; body bytes written later are appended as-is.
pub struct Context {
    /// Inbound request head (headers, URI, version).
    pub req: Parts,
    // Cached at construction so handlers don't re-derive them from the URI.
    method: Method,
    path: String,
    query: Params,
    form: Params,
    // Response under construction.
    status_code: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    committed: bool,
}

impl Context {
    /// Build a context from a request head and its pre-parsed form fields.
    ///
    /// The query string is parsed here; the form body is parsed by the
    /// caller because reading it is async.
    pub(crate) fn new(req: Parts, form: Params) -> Self {
        let method = req.method.clone();
        let path = req.uri.path().to_string();
        let query = req
            .uri
            .query()
            .map(crate::request::parse_query_string)
            .unwrap_or_default();

        Self {
            req,
            method,
            path,
            query,
            form,
            status_code: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            committed: false,
        }
    }

    /// Request method, captured at construction.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request path, captured at construction.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Response status as recorded by the last successful commit.
    pub fn status(&self) -> StatusCode {
        self.status_code
    }

    /// First value for `key` in the URL query string.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key` from the form-encoded request body.
    ///
    /// Falls back to the URL query when the body has no such field; when
    /// both carry the key, the body value wins.
    pub fn post_form(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .or_else(|| self.query(key))
    }

    /// Set a response header. Must be called before the response head is
    /// committed; afterwards the call is dropped with a warning.
    pub fn set_header(&mut self, key: &str, value: &str) {
        if self.committed {
            warn!(key, "set_header after response commit is ignored");
            return;
        }
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(val)) => {
                self.headers.insert(name, val);
            }
            _ => warn!(key, value, "invalid response header dropped"),
        }
    }

    /// Record the status code and commit the response head. After this no
    /// header or status mutation takes effect.
    pub fn set_status(&mut self, code: StatusCode) {
        if self.committed {
            warn!(
                code = code.as_u16(),
                "set_status after response commit is ignored"
            );
            return;
        }
        self.status_code = code;
        self.committed = true;
    }

    /// Write a plain-text response.
    pub fn string(&mut self, code: StatusCode, body: impl Into<String>) {
        self.set_content_type(content_types::TEXT_PLAIN_UTF8.clone());
        self.set_status(code);
        self.body.extend_from_slice(body.into().as_bytes());
    }

    /// Serialize `value` as JSON and write it as the response.
    ///
    /// A serialization failure is terminal: the intended response is
    /// discarded and a 500 carrying the error text is written instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        let data = match serde_json::to_vec(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("JSON serialization failed: {}", e);
                self.set_content_type(content_types::TEXT_PLAIN_UTF8.clone());
                self.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                self.body.extend_from_slice(e.to_string().as_bytes());
                self.body.push(b'\n');
                return;
            }
        };
        self.set_content_type(content_types::APPLICATION_JSON_UTF8.clone());
        self.set_status(code);
        self.body.extend_from_slice(&data);
    }

    /// Write raw bytes. No Content-Type is applied; set one beforehand
    /// with [`set_header`](Self::set_header) if the client needs it.
    pub fn data(&mut self, code: StatusCode, data: &[u8]) {
        self.set_status(code);
        self.body.extend_from_slice(data);
    }

    /// Write an HTML response.
    pub fn html(&mut self, code: StatusCode, body: impl Into<String>) {
        self.set_content_type(content_types::TEXT_HTML_UTF8.clone());
        self.set_status(code);
        self.body.extend_from_slice(body.into().as_bytes());
    }

    fn set_content_type(&mut self, value: HeaderValue) {
        if self.committed {
            warn!("content-type after response commit is ignored");
            return;
        }
        self.headers.insert(CONTENT_TYPE, value);
    }

    /// Tear the context down into the wire response.
    pub(crate) fn into_response(self) -> Response<Full<Bytes>> {
        let mut resp = Response::new(Full::new(Bytes::from(self.body)));
        *resp.status_mut() = self.status_code;
        *resp.headers_mut() = self.headers;
        resp
    }
}
