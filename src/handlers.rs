//! The application served by the `waypoint` binary.
//!
//! Plain handlers on top of the routing contract: an index, an echo
//! endpoint, a user-agent reflector and a small file store under
//! `/files/[filename]`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::config::Config;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::routing::router::Router;

const FILE_CHUNK: usize = 8192;

/// Builds the route table. File routes exist only when `files_dir` is set.
pub fn app(cfg: &Config) -> Router {
    let mut router = Router::new();

    router
        .get("/", |req, res| Box::pin(index(req, res)))
        .get("/echo/[message]", |req, res| Box::pin(echo(req, res)))
        .get("/user-agent", |req, res| Box::pin(user_agent(req, res)));

    if let Some(dir) = &cfg.files_dir {
        let root = Arc::new(dir.clone());
        let read_root = Arc::clone(&root);

        router
            .get("/files/[filename]", move |req, res| {
                Box::pin(serve_file(Arc::clone(&read_root), req, res))
            })
            .post("/files/[filename]", move |req, res| {
                Box::pin(save_file(Arc::clone(&root), req, res))
            });
    }

    router.get("*", |req, res| Box::pin(not_found(req, res)));
    router
}

pub async fn index(_req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.send().await?;
    Ok(())
}

pub async fn echo(req: &Request, res: &mut Response) -> anyhow::Result<()> {
    let message = req.route_param("message").unwrap_or_default();

    res.set_header("Content-Type", "text/plain")?.body(message)?;
    res.send().await?;
    Ok(())
}

pub async fn user_agent(req: &Request, res: &mut Response) -> anyhow::Result<()> {
    let agent = req.header_values("User-Agent").join(", ");

    res.set_header("Content-Type", "text/plain")?.body(agent)?;
    res.send().await?;
    Ok(())
}

pub async fn not_found(req: &Request, res: &mut Response) -> anyhow::Result<()> {
    res.status_code(StatusCode::NotFound)?
        .body(format!("{} not found.", req.path))?;
    res.send().await?;
    Ok(())
}

/// Streams `<root>/<filename>` as an octet stream.
pub async fn serve_file(
    root: Arc<PathBuf>,
    req: &Request,
    res: &mut Response,
) -> anyhow::Result<()> {
    let Some(path) = file_path(&root, req) else {
        return not_found(req, res).await;
    };

    let mut file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return not_found(req, res).await,
        Err(e) => return internal_error(res, e).await,
    };

    let len = match file.metadata().await {
        Ok(meta) => meta.len(),
        Err(e) => return internal_error(res, e).await,
    };

    // Raw file bytes, so a negotiated gzip encoding no longer applies.
    res.remove_header("Content-Encoding")?
        .set_header("Content-Type", "application/octet-stream")?
        .set_header("Content-Length", len.to_string())?;

    let mut buf = vec![0u8; FILE_CHUNK];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        res.write(&buf[..n]).await?;
    }

    res.close().await?;
    Ok(())
}

/// Stores the request body as `<root>/<filename>`.
pub async fn save_file(
    root: Arc<PathBuf>,
    req: &Request,
    res: &mut Response,
) -> anyhow::Result<()> {
    let Some(path) = file_path(&root, req) else {
        return not_found(req, res).await;
    };

    if let Err(e) = tokio::fs::write(&path, &req.body).await {
        return internal_error(res, e).await;
    }

    res.status_code(StatusCode::Created)?;
    res.close().await?;
    Ok(())
}

fn file_path(root: &Path, req: &Request) -> Option<PathBuf> {
    match req.route_param("filename")? {
        "." | ".." => None,
        name => Some(root.join(name)),
    }
}

async fn internal_error(res: &mut Response, error: std::io::Error) -> anyhow::Result<()> {
    warn!(error = %error, "File operation failed");

    res.status_code(StatusCode::InternalServerError)?
        .body(error.to_string())?;
    res.send().await?;
    Ok(())
}
