//! Route patterns and the route table.
//!
//! - **`matcher`**: segment-wise path matching with `[name]` placeholders and `*` wildcards
//! - **`router`**: per-method route lists, first-match-wins dispatch

pub mod matcher;
pub mod router;

pub use matcher::{Pattern, Segment, path_match, route_params};
pub use router::{BoxFuture, Route, RouteHandler, Router};
