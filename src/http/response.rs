use std::collections::HashMap;
use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::encoding;
use crate::http::writer::ResponseWriter;

/// HTTP status codes supported by the server.
///
/// Common HTTP status codes used in responses:
/// - `Ok` (200): Request successful
/// - `Created` (201): Resource created successfully
/// - `NoContent` (204): Successful request with no content
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): Resource not found
/// - `MethodNotAllowed` (405): HTTP method not supported
/// - `InternalServerError` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCode {
    /// 200 OK
    #[default]
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use waypoint::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            201 => Some(StatusCode::Created),
            204 => Some(StatusCode::NoContent),
            400 => Some(StatusCode::BadRequest),
            404 => Some(StatusCode::NotFound),
            405 => Some(StatusCode::MethodNotAllowed),
            500 => Some(StatusCode::InternalServerError),
            _ => None,
        }
    }

    /// Like [`StatusCode::from_u16`], but unknown codes become `200 OK`.
    pub fn from_u16_lossy(code: u16) -> Self {
        Self::from_u16(code).unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("connection already closed")]
    AlreadyClosed,
    #[error("headers already sent")]
    HeadersAlreadySent,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where a [`Response`] is in its lifecycle.
///
/// ```text
///   Fresh ──write()──▶ HeaderSent ──send()/close()──▶ Closed
///     └──────────────send()/close()───────────────────▲
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Nothing has reached the wire yet.
    Fresh,
    /// Status line and headers are on the wire; only raw bytes may follow.
    HeaderSent,
    /// The connection is shut down. Every further call fails.
    Closed,
}

/// The client side of the connection, as seen by a response.
pub type Transport = Box<dyn AsyncWrite + Send + Unpin>;

/// A write-once HTTP response bound to one connection.
///
/// Handlers set the status, headers and body, then finish with
/// [`send`](Response::send) or [`close`](Response::close). Large payloads
/// can be streamed with [`write`](Response::write), in which case the
/// handler is responsible for framing (`Content-Length`).
pub struct Response {
    stream: Transport,
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    state: ResponseState,
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Response {
    pub fn new(stream: Transport) -> Self {
        Self {
            stream,
            status: StatusCode::Ok,
            headers: HashMap::new(),
            body: Vec::new(),
            state: ResponseState::Fresh,
        }
    }

    pub fn state(&self) -> ResponseState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ResponseState::Closed
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// A custom header previously set on this response.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Adds or replaces a custom header. Has no effect on the wire once the
    /// headers have been sent.
    pub fn set_header(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, ResponseError> {
        self.ensure_open()?;
        self.headers.insert(key.into(), value.into());
        Ok(self)
    }

    pub fn remove_header(&mut self, key: &str) -> Result<&mut Self, ResponseError> {
        self.ensure_open()?;
        self.headers.remove(key);
        Ok(self)
    }

    pub fn status_code(&mut self, status: StatusCode) -> Result<&mut Self, ResponseError> {
        self.ensure_open()?;
        self.status = status;
        Ok(self)
    }

    /// Buffers the full body for [`send`](Response::send).
    pub fn body(&mut self, body: impl Into<Vec<u8>>) -> Result<&mut Self, ResponseError> {
        self.ensure_open()?;
        self.body = body.into();
        Ok(self)
    }

    /// Streams raw bytes to the client.
    ///
    /// The first call flushes the status line and custom headers without
    /// computing `Content-Length` or `Content-Type`.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<usize, ResponseError> {
        self.ensure_open()?;

        if self.state == ResponseState::Fresh {
            self.write_head(&[]).await?;
        }

        self.flush(ResponseWriter::raw(bytes)).await?;
        Ok(bytes.len())
    }

    /// Writes the buffered body with computed `Content-Type` and
    /// `Content-Length`, then closes the connection.
    ///
    /// The body is gzip-compressed when the `Content-Encoding` header is
    /// `gzip`. An empty body sends only the status line and headers.
    pub async fn send(&mut self) -> Result<(), ResponseError> {
        self.ensure_open()?;

        if self.body.is_empty() {
            return self.close().await;
        }

        if self.state == ResponseState::HeaderSent {
            self.close().await?;
            return Err(ResponseError::HeadersAlreadySent);
        }

        let body = std::mem::take(&mut self.body);
        let message = if self.header("Content-Encoding") == Some(encoding::GZIP) {
            encoding::gzip(&body).map_err(|e| self.abandon(e))?
        } else {
            body
        };

        let computed = [
            ("Content-Type", "plain/text".to_string()),
            ("Content-Length", message.len().to_string()),
        ];
        let writer = ResponseWriter::head(self.status, &computed, &self.headers).body(&message);
        self.flush(writer).await?;
        self.state = ResponseState::HeaderSent;

        self.close().await
    }

    /// Shuts the connection down. If nothing was sent yet, the status line
    /// and custom headers go out first so the client always sees a valid
    /// response.
    pub async fn close(&mut self) -> Result<(), ResponseError> {
        self.ensure_open()?;

        if self.state == ResponseState::Fresh {
            self.write_head(&[]).await?;
        }

        self.state = ResponseState::Closed;
        self.stream.shutdown().await?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ResponseError> {
        if self.is_closed() {
            return Err(ResponseError::AlreadyClosed);
        }
        Ok(())
    }

    async fn write_head(&mut self, computed: &[(&str, String)]) -> Result<(), ResponseError> {
        let writer = ResponseWriter::head(self.status, computed, &self.headers);
        self.flush(writer).await?;
        self.state = ResponseState::HeaderSent;
        Ok(())
    }

    async fn flush(&mut self, mut writer: ResponseWriter) -> Result<(), ResponseError> {
        writer
            .write_to_stream(&mut self.stream)
            .await
            .map_err(|e| self.abandon(e))
    }

    /// A failed transport leaves nothing worth writing to.
    fn abandon(&mut self, e: io::Error) -> ResponseError {
        self.state = ResponseState::Closed;
        ResponseError::Io(e)
    }
}
