//! Exact-match request routing.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::{debug, warn};

use crate::context::Context;

/// A registered handler: takes the request context, performs exactly one
/// terminal write, returns nothing.
///
/// Handlers are invoked concurrently for independent requests; the `Send +
/// Sync` bounds mean a closure mutating shared state must bring its own
/// synchronization.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Route table key: a structured `(method, path)` pair.
///
/// Kept structured rather than a `"METHOD-path"` string so no method or
/// path spelling can collide with another pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

/// Exact-match router: `(method, path)` to handler, nothing fancier.
///
/// Paths match byte-for-byte; there are no templates, parameters, or
/// prefix trees. Re-registering a pair silently replaces the old handler.
#[derive(Default)]
pub struct Router {
    handlers: HashMap<RouteKey, HandlerFunc>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Bind `handler` to the exact `(method, pattern)` pair. The last
    /// registration for a pair wins.
    pub fn register<H>(&mut self, method: Method, pattern: impl Into<String>, handler: H)
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        let key = RouteKey {
            method,
            path: pattern.into(),
        };
        debug!(method = %key.method, path = %key.path, "route registered");
        self.handlers.insert(key, Arc::new(handler));
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Resolve the context's `(method, path)` and invoke the handler.
    ///
    /// A miss is not an error: it writes the canonical 404 response
    /// (`404 NOT FOUND: <path>`) through the context. Unknown method and
    /// unknown path are not distinguished.
    pub fn dispatch(&self, ctx: &mut Context) {
        let key = RouteKey {
            method: ctx.method().clone(),
            path: ctx.path().to_string(),
        };
        match self.handlers.get(&key) {
            Some(handler) => handler(ctx),
            None => {
                warn!(method = %key.method, path = %key.path, "no route matched");
                let body = format!("404 NOT FOUND: {}\n", key.path);
                ctx.string(StatusCode::NOT_FOUND, body);
            }
        }
    }
}
