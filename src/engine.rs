//! Engine: route registration sugar and the transport adapter.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming as IncomingBody;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::context::Context;
use crate::error::Error;
use crate::request;
use crate::router::Router;

static BAD_REQUEST_BODY: Bytes = Bytes::from_static(b"Failed to read request body");

/// The public entry point: owns the route table and adapts hyper's
/// service contract onto it.
///
/// Registration happens on `&mut self`; [`run`](Self::run) and
/// [`serve_on`](Self::serve_on) take the engine by value, so the route
/// table is frozen by the move before the first request is served.
/// Multiple engines can coexist; there is no process-wide table.
pub struct Engine {
    router: Router,
}

impl Engine {
    /// Create an engine with an empty route table.
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Bind `handler` to the exact `(method, pattern)` pair.
    pub fn register<H>(&mut self, method: Method, pattern: impl Into<String>, handler: H)
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.router.register(method, pattern, handler);
    }

    /// Register a GET route.
    pub fn get<H>(&mut self, pattern: impl Into<String>, handler: H)
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.register(Method::GET, pattern, handler);
    }

    /// Register a POST route.
    pub fn post<H>(&mut self, pattern: impl Into<String>, handler: H)
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.register(Method::POST, pattern, handler);
    }

    /// Register a PUT route.
    pub fn put<H>(&mut self, pattern: impl Into<String>, handler: H)
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.register(Method::PUT, pattern, handler);
    }

    /// Register a DELETE route.
    pub fn delete<H>(&mut self, pattern: impl Into<String>, handler: H)
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.register(Method::DELETE, pattern, handler);
    }

    /// Register a PATCH route.
    pub fn patch<H>(&mut self, pattern: impl Into<String>, handler: H)
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.register(Method::PATCH, pattern, handler);
    }

    /// Register a HEAD route.
    pub fn head<H>(&mut self, pattern: impl Into<String>, handler: H)
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.register(Method::HEAD, pattern, handler);
    }

    /// Number of registered routes.
    pub fn routes(&self) -> usize {
        self.router.len()
    }

    /// Bind `addr` and serve forever.
    ///
    /// The only error this returns is a bind failure; after the listener
    /// is up, per-connection errors are logged and absorbed.
    pub async fn run(self, addr: &str) -> Result<(), Error> {
        let listener = TcpListener::bind(addr).await.map_err(|e| Error::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        self.serve_on(listener).await
    }

    /// Accept loop over an already-bound listener.
    ///
    /// Split out from [`run`](Self::run) so callers (and tests) can bind
    /// port 0 themselves and read the assigned address first.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), Error> {
        if let Ok(addr) = listener.local_addr() {
            info!("listening on http://{} ({} routes)", addr, self.router.len());
        }

        let engine = Arc::new(self);
        loop {
            let (stream, remote_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("accept error: {}", e);
                    continue;
                }
            };

            let _ = stream.set_nodelay(true);

            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine.handle_connection(stream, remote_addr).await;
            });
        }
    }

    /// Serve HTTP/1.1 or HTTP/2 on one connection until the peer is done.
    async fn handle_connection(self: Arc<Self>, stream: TcpStream, remote_addr: SocketAddr) {
        let engine = Arc::clone(&self);
        let service = service_fn(move |req| {
            let engine = Arc::clone(&engine);
            async move { engine.serve(req).await }
        });

        let io = TokioIo::new(stream);
        if let Err(err) = auto::Builder::new(TokioExecutor::new())
            .serve_connection(io, service)
            .await
        {
            debug!("connection error ({}): {:?}", remote_addr, err);
        }
    }

    /// Transport-facing request handler: buffer the body, build the
    /// context, dispatch, and materialize the response.
    ///
    /// The response is fully written by the time this resolves; nothing
    /// about a request outlives it.
    async fn serve(&self, req: Request<IncomingBody>) -> Result<Response<Full<Bytes>>, Infallible> {
        let (parts, body) = req.into_parts();

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!("failed to read request body: {:?}", e);
                return Ok(bad_request_response());
            }
        };

        let form = request::parse_form_body(&parts.headers, body).await;

        let mut ctx = Context::new(parts, form);
        self.router.dispatch(&mut ctx);

        debug!(
            method = %ctx.method(),
            path = %ctx.path(),
            status = ctx.status().as_u16(),
            "request handled"
        );

        Ok(ctx.into_response())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn bad_request_response() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(BAD_REQUEST_BODY.clone()));
    *resp.status_mut() = StatusCode::BAD_REQUEST;
    resp
}
