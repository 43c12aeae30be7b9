//! rin - Minimal exact-match HTTP routing engine on hyper.
//!
//! This crate provides the smallest useful web framework shape: register
//! handlers under an exact `(method, path)` pair, and handle each request
//! through a per-request [`Context`] that unifies parameter reads and
//! response writes.
//!
//! # Features
//!
//! - **Exact-match routing**: `(method, path)` keyed dispatch, no
//!   templates, no prefix trees
//! - **Per-request Context**: query/form readers plus string, JSON, HTML,
//!   and raw-byte response writers
//! - **Form parsing**: urlencoded and multipart bodies, body values
//!   shadowing same-named query values
//! - **Async transport**: HTTP/1.1 and HTTP/2 via hyper, one tokio task
//!   per connection
//!
//! # Example
//!
//! ```rust,no_run
//! use rin::{Engine, StatusCode};
//!
//! # async fn run() -> Result<(), rin::Error> {
//! let mut app = Engine::new();
//!
//! app.get("/", |c| {
//!     c.json(StatusCode::OK, &serde_json::json!({"message": "Hello, World!"}));
//! });
//!
//! app.post("/login", |c| {
//!     let user = c.post_form("username").unwrap_or_default().to_string();
//!     c.string(StatusCode::OK, format!("welcome, {user}"));
//! });
//!
//! app.run("0.0.0.0:8080").await
//! # }
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod context;
pub mod engine;
pub mod error;
pub mod request;
pub mod router;

// Re-exports for convenience
pub use context::Context;
pub use engine::Engine;
pub use error::Error;
pub use http::{Method, StatusCode};
pub use router::{HandlerFunc, Router};
