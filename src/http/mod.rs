//! HTTP protocol implementation.
//!
//! This module implements a one-request-per-connection HTTP/1.1 server.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: Reads one request from a client and hands it to the router
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation
//! - **`response`**: The write-once response handed to route handlers
//! - **`writer`**: Serializes status lines and header blocks onto the stream
//! - **`encoding`**: gzip negotiation and compression
//!
//! # Connection Flow
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Buffer bytes until a full request parses
//!        └──────┬──────┘
//!               │ Request parsed          (malformed → drop, or 400)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← First matching route's handler runs
//!        └──────┬───────────┘
//!               │ Handler returned        (no route → 404)
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │ ← Response closed, socket shut down
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use waypoint::http::request::Request;
//! use waypoint::http::response::Response;
//! use waypoint::routing::Router;
//!
//! async fn hello(_req: &Request, res: &mut Response) -> anyhow::Result<()> {
//!     res.body("hello")?;
//!     res.send().await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut router = Router::new();
//!     router.get("/", |req, res| Box::pin(hello(req, res)));
//!     router.listen("127.0.0.1:4221").await
//! }
//! ```

pub mod connection;
pub mod encoding;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
