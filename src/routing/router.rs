//! Route lookup and dispatch.
//!
//! Routes are kept per method in registration order and the first pattern
//! that matches wins, even when a later one would match more precisely.
//! The table is only mutable while the [`Router`] is owned; listening moves
//! it behind an `Arc`, so connection tasks share it read-only.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionOptions};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::routing::matcher::Pattern;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Application code invoked once per matched request.
///
/// A handler should leave the response closed (`send`, `close`). If it does
/// not, the router closes it after the handler returns.
pub type RouteHandler = Arc<
    dyn for<'a> Fn(&'a Request, &'a mut Response) -> BoxFuture<'a, anyhow::Result<()>>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct Route {
    pattern: Pattern,
    handler: RouteHandler,
}

impl Route {
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route for `method`.
    pub fn route<F>(&mut self, method: Method, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a Request, &'a mut Response) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.routes.entry(method).or_default().push(Route {
            pattern: Pattern::parse(pattern),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a Request, &'a mut Response) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a Request, &'a mut Response) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    pub fn routes(&self, method: Method) -> &[Route] {
        self.routes.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First route for `method` whose pattern matches `path`.
    pub fn find(&self, method: Method, path: &str) -> Option<&Route> {
        self.routes(method).iter().find(|route| route.matches(path))
    }

    /// Runs the matching handler for `request`, or answers 404.
    ///
    /// A gzip-capable client gets `Content-Encoding: gzip` preset before the
    /// handler runs. The response is always closed on return.
    pub async fn dispatch(
        &self,
        mut request: Request,
        response: &mut Response,
    ) -> anyhow::Result<()> {
        if request.accepts_gzip() {
            response.set_header("Content-Encoding", crate::http::encoding::GZIP)?;
        }

        match self.find(request.method.clone(), &request.path) {
            Some(route) => {
                request.route_params = route.pattern.extract(&request.path);

                debug!(
                    method = %request.method,
                    path = %request.path,
                    pattern = route.pattern.as_str(),
                    "Dispatching request"
                );

                if let Err(e) = (route.handler)(&request, response).await {
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        error = %e,
                        "Handler failed"
                    );
                }
            }
            None => {
                debug!(method = %request.method, path = %request.path, "No route matched");
                response.status_code(StatusCode::NotFound)?;
            }
        }

        if !response.is_closed() {
            response.close().await?;
        }

        Ok(())
    }

    /// Serves one connection with default options.
    pub async fn serve<S>(self: Arc<Self>, stream: S) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        Connection::new(stream, self, ConnectionOptions::default())
            .run()
            .await
    }

    /// Binds `address` and serves forever. Returns only if binding fails.
    pub async fn listen(self, address: &str) -> anyhow::Result<()> {
        let cfg = Config {
            listen_addr: address.to_string(),
            ..Config::default()
        };
        crate::server::listener::run(&cfg, self).await
    }
}
