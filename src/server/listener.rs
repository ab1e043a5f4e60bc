use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionOptions};
use crate::routing::router::Router;

/// Binds `cfg.listen_addr` and serves `router` until the task is dropped.
///
/// Each accepted socket runs on its own task. Only a bind failure is
/// returned; accept and connection errors are logged and the loop goes on.
pub async fn run(cfg: &Config, router: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, Arc::new(router), ConnectionOptions::from(cfg)).await
}

/// Accept loop over an already bound listener.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    options: ConnectionOptions,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "Failed to accept connection");
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            let conn = Connection::new(socket, router, options);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
