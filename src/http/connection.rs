use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::debug;

use crate::config::Config;
use crate::http::parser::{ParseError, parse_http_request};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::routing::router::Router;

/// Per-connection read limits and the malformed-request policy.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    /// Bytes requested from the socket per read.
    pub read_chunk_size: usize,
    /// Largest request (head and body) that will be buffered.
    pub max_request_bytes: usize,
    /// Answer malformed requests with 400 instead of dropping them.
    pub reject_malformed: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ConnectionOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            read_chunk_size: cfg.read_chunk_size.max(1),
            max_request_bytes: cfg.max_request_bytes,
            reject_malformed: cfg.reject_malformed,
        }
    }
}

/// One accepted client: read a single request, dispatch it, close.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    router: Arc<Router>,
    options: ConnectionOptions,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(stream: S, router: Arc<Router>, options: ConnectionOptions) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(options.read_chunk_size),
            router,
            options,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let request = match self.read_request().await {
            Ok(Some(request)) => request,
            Ok(None) => {
                debug!("Client closed connection before sending a request");
                return Ok(());
            }
            Err(ReadError::Parse(e)) => return self.reject(e).await,
            Err(ReadError::Io(e)) => return Err(e.into()),
        };

        let mut response = Response::new(Box::new(self.stream));
        self.router.dispatch(request, &mut response).await
    }

    /// Reads until one full request is buffered.
    ///
    /// `Ok(None)` means the client went away without sending anything.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ReadError> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Err(e.into()),
            }

            if self.buffer.len() >= self.options.max_request_bytes {
                return Err(ParseError::TooLarge(self.options.max_request_bytes).into());
            }

            self.buffer.reserve(self.options.read_chunk_size);
            let n = (&mut self.stream)
                .take(self.options.read_chunk_size as u64)
                .read_buf(&mut self.buffer)
                .await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ParseError::Incomplete.into());
            }
        }
    }

    async fn reject(self, error: ParseError) -> anyhow::Result<()> {
        debug!(error = %error, "Malformed request");

        if !self.options.reject_malformed {
            return Ok(());
        }

        let mut response = Response::new(Box::new(self.stream));
        response.status_code(StatusCode::BadRequest)?;
        response.close().await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
