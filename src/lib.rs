//! Waypoint - minimal HTTP/1.1 server engine
//!
//! Parses one request per connection, routes it by method and path pattern
//! to a handler, and writes a single response back.

pub mod config;
pub mod handlers;
pub mod http;
pub mod routing;
pub mod server;
